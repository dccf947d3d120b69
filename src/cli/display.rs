//! Display utilities for the pomodoro clock CLI.
//!
//! This module provides formatted output for:
//! - Command results
//! - Error messages
//! - Status display

use crate::types::{IpcResponse, ResponseData};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the result of an `invoke`.
    pub fn show_invoke_result(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(data) = &response.data {
            if let Some(task_name) = &data.task_name {
                println!("  Task: {}", task_name);
            }
            if let Some(line) = Self::remaining_line(data) {
                println!("  {}", line);
            }
        }
    }

    /// Shows the result of pause, resume, toggle-pause or kill.
    pub fn show_result(response: &IpcResponse) {
        println!("* {}", response.message);

        if let Some(line) = response.data.as_ref().and_then(Self::remaining_line) {
            println!("  {}", line);
        }
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("Pomodoro clock status");
        println!("─────────────────────");

        let Some(data) = &response.data else {
            println!("The daemon reported no status");
            return;
        };

        println!("Phase: {}", Self::phase_display(data));

        if data.is_active() {
            if let Some(line) = Self::remaining_line(data) {
                println!("{}", line);
            }
            if let Some(task) = &data.task_name {
                println!("Task: {}", task);
            }
        }
        if let Some(count) = data.pomodoro_count {
            println!("Pomodoros this cycle: {}", count);
        }
        if let Some(text) = data.status_text.as_deref().filter(|text| !text.is_empty()) {
            println!("Status line: {}", text);
        }
        if data.session_expired {
            println!("The cycle has expired; the next invoke offers a reset");
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn phase_display(data: &ResponseData) -> String {
        let phase = match data.phase.as_deref().unwrap_or("unknown") {
            "none" => "idle",
            "pomodoro" => "pomodoro",
            "overtime" => "overtime",
            "short_break" => "short break",
            "long_break" => "long break",
            other => other,
        };
        if data.paused {
            format!("{} (paused)", phase)
        } else {
            phase.to_string()
        }
    }

    fn remaining_line(data: &ResponseData) -> Option<String> {
        let seconds = data.remaining_seconds?;
        if data.is_overtime() {
            Some(format!("Overtime: {}", Self::format_time(-seconds)))
        } else {
            Some(format!("Remaining: {}", Self::format_time(seconds.max(0))))
        }
    }

    /// Formats seconds as `M:SS`, with a leading `-` for negative values.
    fn format_time(total_seconds: i64) -> String {
        let sign = if total_seconds < 0 { "-" } else { "" };
        let magnitude = total_seconds.unsigned_abs();
        format!("{}{}:{:02}", sign, magnitude / 60, magnitude % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Format Time Tests
    // ------------------------------------------------------------------------

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_format_time_zero() {
            assert_eq!(Display::format_time(0), "0:00");
        }

        #[test]
        fn test_format_time_mixed() {
            assert_eq!(Display::format_time(90), "1:30");
        }

        #[test]
        fn test_format_time_25_minutes() {
            assert_eq!(Display::format_time(25 * 60), "25:00");
        }

        #[test]
        fn test_format_time_negative() {
            assert_eq!(Display::format_time(-61), "-1:01");
        }
    }

    // ------------------------------------------------------------------------
    // Line Building Tests
    // ------------------------------------------------------------------------

    mod line_tests {
        use super::*;

        fn data(phase: &str, remaining: i64) -> ResponseData {
            ResponseData {
                phase: Some(phase.to_string()),
                remaining_seconds: Some(remaining),
                pomodoro_count: Some(1),
                ..ResponseData::default()
            }
        }

        #[test]
        fn test_remaining_line_countdown() {
            assert_eq!(
                Display::remaining_line(&data("pomodoro", 754)).as_deref(),
                Some("Remaining: 12:34")
            );
        }

        #[test]
        fn test_remaining_line_overtime_counts_up() {
            assert_eq!(
                Display::remaining_line(&data("overtime", -125)).as_deref(),
                Some("Overtime: 2:05")
            );
        }

        #[test]
        fn test_phase_display_paused() {
            let mut paused = data("long_break", 600);
            paused.paused = true;
            assert_eq!(Display::phase_display(&paused), "long break (paused)");
        }

        #[test]
        fn test_show_functions_do_not_panic() {
            let response = IpcResponse::success("Pomodoro started", Some(data("pomodoro", 1500)));
            Display::show_invoke_result(&response);
            Display::show_result(&response);
            Display::show_status(&response);
            Display::show_status(&IpcResponse::success("", None));
            Display::show_error("boom");
        }
    }
}
