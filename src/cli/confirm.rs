//! Answers to the daemon's confirmation prompts.
//!
//! The daemon cannot ask the user anything, so the client looks at the
//! current status first and collects answers from flags or stdin.

use std::io::{self, BufRead, Write};

use crate::cli::commands::InvokeArgs;
use crate::daemon::Answers;
use crate::types::ResponseData;

/// Collects answers for an `invoke` against the daemon state in `status`.
///
/// Flags answer a question outright; otherwise `ask` is called, and only for
/// questions the daemon would actually pose.
pub fn resolve_answers(
    status: &ResponseData,
    args: &InvokeArgs,
    mut ask: impl FnMut(&str) -> bool,
) -> Answers {
    let reset_expired = status.session_expired
        && (args.reset_count || ask("The last pomodoro was long ago. Reset the cycle count?"));

    let needs_kill = status.is_active() && !status.is_overtime() && status.ask_before_kill;
    let kill = needs_kill && {
        let phase = status.phase.as_deref().unwrap_or("phase");
        args.yes || ask(&format!("A {} is running. Kill it?", phase.replace('_', " ")))
    };

    Answers {
        kill,
        reset_expired,
    }
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` means no.
pub fn ask_stdin(question: &str) -> bool {
    let stdin = io::stdin();
    ask_with(question, &mut stdin.lock(), &mut io::stderr())
}

fn ask_with(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{} [y/N] ", question)
        .and_then(|()| output.flush())
        .is_err()
    {
        return false;
    }

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(phase: &str) -> ResponseData {
        ResponseData {
            phase: Some(phase.to_string()),
            pomodoro_count: Some(2),
            ask_before_kill: true,
            ..ResponseData::default()
        }
    }

    fn never_asked(question: &str) -> bool {
        panic!("unexpected question: {}", question)
    }

    mod resolve_answers_tests {
        use super::*;

        #[test]
        fn test_idle_asks_nothing() {
            let answers = resolve_answers(&status("none"), &InvokeArgs::default(), never_asked);
            assert_eq!(answers, Answers::default());
        }

        #[test]
        fn test_overtime_needs_no_kill_confirmation() {
            let answers = resolve_answers(&status("overtime"), &InvokeArgs::default(), never_asked);
            assert!(!answers.kill);
        }

        #[test]
        fn test_running_asks_to_kill() {
            let mut questions = Vec::new();
            let answers = resolve_answers(&status("short_break"), &InvokeArgs::default(), |q| {
                questions.push(q.to_string());
                true
            });

            assert!(answers.kill);
            assert_eq!(questions, vec!["A short break is running. Kill it?"]);
        }

        #[test]
        fn test_yes_flag_skips_question() {
            let args = InvokeArgs {
                yes: true,
                ..InvokeArgs::default()
            };
            let answers = resolve_answers(&status("pomodoro"), &args, never_asked);
            assert!(answers.kill);
        }

        #[test]
        fn test_no_question_when_kill_confirmation_disabled() {
            let mut data = status("pomodoro");
            data.ask_before_kill = false;
            let answers = resolve_answers(&data, &InvokeArgs::default(), never_asked);
            assert!(!answers.kill);
        }

        #[test]
        fn test_expired_session_asks_to_reset() {
            let mut data = status("none");
            data.session_expired = true;
            let answers = resolve_answers(&data, &InvokeArgs::default(), |_| false);
            assert!(!answers.reset_expired);

            let args = InvokeArgs {
                reset_count: true,
                ..InvokeArgs::default()
            };
            let answers = resolve_answers(&data, &args, never_asked);
            assert!(answers.reset_expired);
        }
    }

    mod ask_with_tests {
        use super::*;

        #[test]
        fn test_accepts_yes() {
            let mut output = Vec::new();
            assert!(ask_with("Kill?", &mut "yes\n".as_bytes(), &mut output));
            assert_eq!(String::from_utf8(output).unwrap(), "Kill? [y/N] ");
        }

        #[test]
        fn test_accepts_uppercase_y() {
            assert!(ask_with("Kill?", &mut "Y\n".as_bytes(), &mut Vec::new()));
        }

        #[test]
        fn test_default_is_no() {
            assert!(!ask_with("Kill?", &mut "\n".as_bytes(), &mut Vec::new()));
            assert!(!ask_with("Kill?", &mut "".as_bytes(), &mut Vec::new()));
            assert!(!ask_with("Kill?", &mut "nope\n".as_bytes(), &mut Vec::new()));
        }
    }
}
