use std::time::Duration;

/// Pause between two dates of one provider's backfill walk.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);

/// Wall-clock time (UTC) at which the daily job fires by default.
pub const DEFAULT_JOB_RUNNING_TIME: &str = "07:00:00";

/// Format accepted for the daily job time.
pub const JOB_TIME_FORMAT: &str = "%H:%M:%S";

/// Date format used on every boundary (CLI, HTTP, storage).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
