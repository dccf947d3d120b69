//! CLI module for the pomodoro clock.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `client`: IPC client for daemon communication
//! - `confirm`: answers to kill and expiry prompts
//! - `display`: Output formatting and display logic

pub mod client;
pub mod commands;
pub mod confirm;
pub mod display;

pub use client::IpcClient;
pub use commands::{Cli, Commands, DaemonArgs, InvokeArgs};
pub use confirm::{ask_stdin, resolve_answers};
pub use display::Display;
