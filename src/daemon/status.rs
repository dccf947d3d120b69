//! Status-line rendering.

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{Phase, StatusFormats, TimerState};

/// Placeholder replaced with the formatted time.
const TIME_PLACEHOLDER: &str = "{time}";

/// Suffix appended while paused.
const PAUSED_SUFFIX: &str = " (paused)";

/// Formats a duration as `MM:SS`, using its magnitude.
///
/// Minutes are not wrapped, so 90 minutes renders as `90:00`.
pub fn format_clock(delta: TimeDelta) -> String {
    let total = delta.num_seconds().unsigned_abs();
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Renders the status line for `state` at `now`.
///
/// Countdown phases show the time left; overtime shows the time spent past
/// the deadline. An inactive timer renders as an empty string.
pub fn render(state: &TimerState, formats: &StatusFormats, now: DateTime<Utc>) -> String {
    let Some(template) = formats.for_phase(state.phase) else {
        return String::new();
    };

    let remaining = state.remaining(now);
    let shown = match state.phase {
        Phase::Overtime => -remaining,
        _ => remaining.max(TimeDelta::zero()),
    };

    let mut text = template.replace(TIME_PLACEHOLDER, &format_clock(shown));
    if state.paused {
        text.push_str(PAUSED_SUFFIX);
    }
    text
}
