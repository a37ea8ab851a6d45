pub mod product;

pub use product::*;

// Status markers for operator-facing log lines
pub const MARK_OK: &str = "✓";
pub const MARK_FAIL: &str = "✗";
pub const MARK_WARN: &str = "⚠";
