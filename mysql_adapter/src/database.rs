//! Statement execution over a MySQL pool

use std::time::{Duration, Instant};

use config::{AdapterKind, DatabaseConfig};
use query_core::{Database, NamedValues, Query, QueryResult, SqlText};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tokio::sync::Mutex;

use crate::dialect::MySqlDialect;
use crate::errors::{AdapterError, AdapterResult};

/// One executed statement, recorded when profiling is on
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    pub sql: String,
    pub elapsed: Duration,
}

pub struct MySqlDatabase {
    pool: MySqlPool,
    dialect: MySqlDialect,
    profiling: bool,
    profile: Mutex<Vec<ProfileEntry>>,
}

impl MySqlDatabase {
    /// Open a pool and wait for the first connection
    pub async fn connect(config: &DatabaseConfig) -> AdapterResult<Self> {
        let pool = pool_options(config)?
            .connect_with(connect_options(config))
            .await?;
        tracing::info!(
            "Connected to MySQL database {} at {}:{}",
            config.database,
            config.host,
            config.port
        );
        Ok(Self::with_pool(pool, config.profiling))
    }

    /// Open a pool that connects on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> AdapterResult<Self> {
        let pool = pool_options(config)?.connect_lazy_with(connect_options(config));
        Ok(Self::with_pool(pool, config.profiling))
    }

    pub fn with_pool(pool: MySqlPool, profiling: bool) -> Self {
        Self {
            pool,
            dialect: MySqlDialect::new(),
            profiling,
            profile: Mutex::new(Vec::new()),
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn dialect(&self) -> &MySqlDialect {
        &self.dialect
    }

    /// Bind named values into the statement and fetch every row
    pub async fn query(&self, statement: &SqlText, values: &NamedValues) -> AdapterResult<Vec<MySqlRow>> {
        let sql = self.prepare_statement(statement, values)?;
        self.query_raw(&sql).await
    }

    /// Bind named values into the statement and return the affected row count
    pub async fn non_query(&self, statement: &SqlText, values: &NamedValues) -> AdapterResult<u64> {
        let sql = self.prepare_statement(statement, values)?;
        self.non_query_raw(&sql).await
    }

    pub async fn query_raw(&self, sql: &str) -> AdapterResult<Vec<MySqlRow>> {
        tracing::debug!("[QUERY] SQL: {}", sql);
        let started = Instant::now();
        let rows = sqlx::raw_sql(sql).fetch_all(&self.pool).await?;
        self.record(sql, started.elapsed()).await;
        tracing::debug!("[QUERY] Rows: {}", rows.len());
        Ok(rows)
    }

    pub async fn non_query_raw(&self, sql: &str) -> AdapterResult<u64> {
        tracing::debug!("[EXECUTE] SQL: {}", sql);
        let started = Instant::now();
        let result = sqlx::raw_sql(sql).execute(&self.pool).await?;
        self.record(sql, started.elapsed()).await;
        tracing::debug!("[EXECUTE] Rows affected: {}", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Render a query against this database and fetch its rows
    pub async fn select(&self, query: &Query, values: &NamedValues) -> AdapterResult<Vec<MySqlRow>> {
        let statement = query.build(self)?;
        self.query(&statement, values).await
    }

    /// Row count for a query, via its count-only rendering
    pub async fn count(&self, query: &Query, values: &NamedValues) -> AdapterResult<i64> {
        let statement = query.clone().count_only().build(self)?;
        let rows = self.query(&statement, values).await?;
        match rows.first() {
            Some(row) => Ok(row.try_get::<i64, _>("q_row_count")?),
            None => Ok(0),
        }
    }

    pub fn is_profiling(&self) -> bool {
        self.profiling
    }

    /// Statements recorded since the pool was opened or last cleared
    pub async fn profile_entries(&self) -> Vec<ProfileEntry> {
        self.profile.lock().await.clone()
    }

    pub async fn clear_profile(&self) {
        self.profile.lock().await.clear();
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("MySQL pool closed");
    }

    async fn record(&self, sql: &str, elapsed: Duration) {
        if !self.profiling {
            return;
        }
        crate::debug_log!("Profiled {:?} for {}", elapsed, sql);
        self.profile.lock().await.push(ProfileEntry {
            sql: sql.to_string(),
            elapsed,
        });
    }
}

impl Database for MySqlDatabase {
    fn escape_identifier_begin(&self) -> &str {
        self.dialect.escape_identifier_begin()
    }

    fn escape_identifier_end(&self) -> &str {
        self.dialect.escape_identifier_end()
    }

    fn escape_string(&self, value: &str) -> String {
        self.dialect.escape_string(value)
    }

    fn sql_limit_variable_prefix(&self, limit_info: &str) -> QueryResult<Option<String>> {
        self.dialect.sql_limit_variable_prefix(limit_info)
    }

    fn sql_limit_variable_suffix(&self, limit_info: &str) -> QueryResult<Option<String>> {
        self.dialect.sql_limit_variable_suffix(limit_info)
    }

    fn sql_sort_by_variable(&self, sort_by_info: &str) -> QueryResult<Option<String>> {
        self.dialect.sql_sort_by_variable(sort_by_info)
    }
}

fn pool_options(config: &DatabaseConfig) -> AdapterResult<MySqlPoolOptions> {
    if config.adapter != AdapterKind::MySql {
        return Err(AdapterError::Config(format!(
            "Adapter {:?} is not handled by the MySQL adapter",
            config.adapter
        )));
    }
    let mut options = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds));
    if config.idle_timeout_seconds > 0 {
        options = options.idle_timeout(Duration::from_secs(config.idle_timeout_seconds));
    }
    if config.max_lifetime_seconds > 0 {
        options = options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
    }
    Ok(options)
}

fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.username)
        .password(&config.password)
        .charset(&config.encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_core::{Condition, Node, TableInfo};
    use type_mapping::SqlType;

    fn config() -> DatabaseConfig {
        DatabaseConfig::new(
            AdapterKind::MySql,
            "localhost".to_string(),
            3306,
            "app".to_string(),
            "root".to_string(),
            "secret".to_string(),
        )
        .with_pool(0, 1)
        .with_profiling(true)
    }

    #[tokio::test]
    async fn test_lazy_pool_renders_mysql_statements() {
        let db = MySqlDatabase::connect_lazy(&config()).unwrap();
        assert!(db.is_profiling());
        assert!(db.profile_entries().await.is_empty());

        let root = Node::table(TableInfo::new("person", "id").with_column("name", SqlType::Text)).unwrap();
        let query = Query::new(&root)
            .with_condition(Condition::equal(&root.column("name").unwrap(), "O'Hara").unwrap());
        let sql = query.to_sql(&db, &NamedValues::new()).unwrap();
        assert_eq!(
            sql,
            "SELECT\n    `t0`.`id` AS `a0`,\n    `t0`.`name` AS `a1`\nFROM\n    `person` AS `t0`\nWHERE\n    `t0`.`name` = 'O\\'Hara'"
        );
    }

    #[tokio::test]
    async fn test_unbound_parameter_is_reported_before_execution() {
        let db = MySqlDatabase::connect_lazy(&config()).unwrap();
        let mut statement = SqlText::sql("SELECT 1 WHERE 1 ");
        statement.push_named("flag", query_core::ParameterForm::Equal);
        let err = db.query(&statement, &NamedValues::new()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Query(_)));
        assert!(db.profile_entries().await.is_empty());
    }

    #[test]
    fn test_pool_options_follow_config() {
        let mut cfg = config();
        cfg.max_lifetime_seconds = 60;
        assert!(pool_options(&cfg).is_ok());
    }
}
