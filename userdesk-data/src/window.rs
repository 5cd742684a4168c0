use serde::Deserialize;

/// Default number of rows returned when the caller gives no `limit`.
pub const DEFAULT_LIMIT: u64 = 10;

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// Offset/limit parameters, extractable from the query string
/// (`?skip=20&limit=10`). Both are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Window {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// `skip` as a signed SQL bind value, saturating at `i64::MAX`.
    pub fn offset_param(&self) -> i64 {
        i64::try_from(self.skip).unwrap_or(i64::MAX)
    }

    /// `limit` as a signed SQL bind value, saturating at `i64::MAX`.
    pub fn limit_param(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_and_ten() {
        assert_eq!(Window::default(), Window::new(0, 10));
    }

    #[test]
    fn huge_values_saturate() {
        let window = Window::new(u64::MAX, u64::MAX);
        assert_eq!(window.offset_param(), i64::MAX);
        assert_eq!(window.limit_param(), i64::MAX);
    }
}
