//! LIMIT / OFFSET

use crate::query_builder::QueryBuilder;

/// Maximum row count and offset
///
/// Negative values are passed through unchanged; the dialect decides what
/// to make of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub max_row_count: i64,
    pub offset: i64,
}

impl Limit {
    pub fn new(max_row_count: i64, offset: i64) -> Self {
        Self {
            max_row_count,
            offset,
        }
    }

    pub fn max(max_row_count: i64) -> Self {
        Self::new(max_row_count, 0)
    }

    /// `offset,max` when an offset is set, otherwise just `max`
    pub fn limit_info(&self) -> String {
        if self.offset != 0 {
            format!("{},{}", self.offset, self.max_row_count)
        } else {
            self.max_row_count.to_string()
        }
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) {
        builder.set_limit_info(self.limit_info());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_info() {
        assert_eq!(Limit::new(10, 20).limit_info(), "20,10");
        assert_eq!(Limit::max(5).limit_info(), "5");
        assert_eq!(Limit::new(5, 0).limit_info(), "5");
    }

    #[test]
    fn test_negative_values_pass_through() {
        assert_eq!(Limit::new(-1, 3).limit_info(), "3,-1");
    }
}
