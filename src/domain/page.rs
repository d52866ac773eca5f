pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_CURSOR: i64 = 0;

/// Cursor page: rows with `id > cursor`, ascending by id, at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cursor: DEFAULT_CURSOR,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(cursor: i64, limit: i64) -> Self {
        Self { cursor, limit }
    }

    /// Missing or non-numeric values fall back to the defaults.
    pub fn from_query(cursor: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            cursor: cursor
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(DEFAULT_CURSOR),
            limit: limit
                .and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or(DEFAULT_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults() {
        assert_eq!(PageRequest::from_query(None, None), PageRequest::new(0, 10));
        assert_eq!(
            PageRequest::from_query(Some("abc"), Some("ten")),
            PageRequest::new(0, 10)
        );
        assert_eq!(
            PageRequest::from_query(Some("7"), Some("3")),
            PageRequest::new(7, 3)
        );
    }
}
