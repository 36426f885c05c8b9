use std::time::Duration;

/// UI-facing position fields, recomputed on every position tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    /// Share of the track played, in `0.0..=1.0`.
    pub fraction: f64,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
}

impl Progress {
    /// Derive progress from the engine's position and duration.
    ///
    /// An unknown or zero duration yields a fraction of 0 and no remaining time.
    pub fn compute(position: Duration, duration: Option<Duration>) -> Self {
        let fraction = match duration {
            Some(d) if !d.is_zero() => (position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0),
            _ => 0.0,
        };

        Self {
            fraction,
            elapsed_secs: position.as_secs(),
            remaining_secs: duration.map_or(0, |d| d.saturating_sub(position).as_secs()),
        }
    }
}

/// Convert a float seconds value from a backend into a duration.
/// NaN, infinite and negative values mean "unknown".
pub fn duration_from_secs_f64(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs >= 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

/// Format whole seconds as `m:ss`, minutes right-aligned to three columns.
pub fn format_mmss(secs: u64) -> String {
    format!("{:>3}:{:02}", secs / 60, secs % 60)
}
