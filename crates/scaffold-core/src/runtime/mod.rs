//! External tools and commands
//!
//! This module provides:
//! - Package manager availability detection
//! - Command execution with streamed output
//! - The workspace install/format post-processing step

pub mod check;
pub mod command;
pub mod post_process;

pub use check::{check_tool, ToolInfo};
pub use command::{run_command, CapturedOutput, CommandSpec, OutputSink, Stream, TerminalSink};
pub use post_process::PostProcessor;
