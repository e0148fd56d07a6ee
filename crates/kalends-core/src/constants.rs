/// Product identifier components stamped on calendars created by this library
pub const PRODUCT_VENDOR: &str = "kalends";
pub const PRODUCT_NAME: &str = "Kalends Calendar Library";
pub const DEFAULT_PRODID: &str =
    const_str::concat!("-//", PRODUCT_VENDOR, "//", PRODUCT_NAME, "//EN");

/// iCalendar version written to VERSION
pub const ICALENDAR_VERSION: &str = "2.0";

/// Maximum content line length in octets before folding (CRLF excluded)
pub const DEFAULT_FOLD_WIDTH: usize = 75;

/// Consecutive empty candidate periods tolerated before a recurrence stream ends
pub const DEFAULT_MAX_EMPTY_PERIODS: u32 = 10_000;

/// Default upper bound for collecting a recurrence stream into memory
pub const DEFAULT_COLLECT_LIMIT: usize = 10_000;
