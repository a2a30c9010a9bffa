// Status bands derived from the sand level
use serde::Serialize;

/// Readings strictly above this are at least a warning.
pub const WARNING_THRESHOLD: f64 = 500.0;
/// Readings strictly above this are critical.
pub const CRITICAL_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Status {
    /// Classify a single reading. No smoothing: every call looks at `sand_level` alone.
    pub fn classify(sand_level: f64) -> Self {
        if sand_level > CRITICAL_THRESHOLD {
            Status::Critical
        } else if sand_level > WARNING_THRESHOLD {
            Status::Warning
        } else {
            Status::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Normal => "NORMAL",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Normal => "green",
            Status::Warning => "yellow",
            Status::Critical => "red",
        }
    }

    pub fn alert_message(self) -> &'static str {
        match self {
            Status::Normal => "System operating normally",
            Status::Warning => "Warning - Check pipeline",
            Status::Critical => "Critical - Check pipeline",
        }
    }
}
