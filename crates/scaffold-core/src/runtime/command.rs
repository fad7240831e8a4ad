//! External command execution with streamed output
//!
//! Commands run in an explicit working directory and report their output
//! line by line to an [`OutputSink`] instead of the process's own streams.

use crate::error::{Result, ScaffoldError};
use colored::Colorize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Which stream a line of command output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Receives the output of external commands
pub trait OutputSink: Send {
    /// Called once before the command is spawned
    fn started(&mut self, _command: &CommandSpec) {}

    /// Called for every line the command prints
    fn line(&mut self, stream: Stream, line: &str);
}

/// Writes command output to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn started(&mut self, command: &CommandSpec) {
        println!();
        println!("{} {}", "Running:".dimmed(), command.to_string().yellow());
        println!();
    }

    fn line(&mut self, stream: Stream, line: &str) {
        match stream {
            Stream::Stdout => println!("  {}", line),
            Stream::Stderr => eprintln!("  {}", line.yellow()),
        }
    }
}

/// Collects command output in memory
#[derive(Debug, Default, Clone)]
pub struct CapturedOutput {
    pub commands: Vec<String>,
    pub lines: Vec<(Stream, String)>,
}

impl OutputSink for CapturedOutput {
    fn started(&mut self, command: &CommandSpec) {
        self.commands.push(command.to_string());
    }

    fn line(&mut self, stream: Stream, line: &str) {
        self.lines.push((stream, line.to_string()));
    }
}

/// Run `command` in `working_dir`, streaming its output to `sink`
///
/// A spawn failure or a nonzero exit becomes
/// [`ScaffoldError::PostProcessingError`].
pub async fn run_command(
    command: &CommandSpec,
    working_dir: &Path,
    sink: &mut dyn OutputSink,
) -> Result<()> {
    let failed = |exit_code: Option<i32>| ScaffoldError::PostProcessingError {
        command: command.to_string(),
        exit_code,
    };

    sink.started(command);
    tracing::debug!(%command, dir = %working_dir.display(), "spawning command");

    let mut child = TokioCommand::new(&command.program)
        .args(&command.args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            tracing::warn!(%command, error = %e, "failed to spawn command");
            failed(None)
        })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill().await;
        return Err(failed(None));
    };

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            line = stdout_reader.next_line(), if stdout_open => match line {
                Ok(Some(line)) => sink.line(Stream::Stdout, &line),
                Ok(None) => stdout_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "error reading stdout");
                    stdout_open = false;
                }
            },
            line = stderr_reader.next_line(), if stderr_open => match line {
                Ok(Some(line)) => sink.line(Stream::Stderr, &line),
                Ok(None) => stderr_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "error reading stderr");
                    stderr_open = false;
                }
            },
        }
    }

    let status = child.wait().await.map_err(|_| failed(None))?;
    if status.success() {
        Ok(())
    } else {
        Err(failed(status.code()))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    #[test]
    fn test_display() {
        let spec = CommandSpec::new("pnpm", ["run", "format"]);
        assert_eq!(spec.to_string(), "pnpm run format");
    }

    #[tokio::test]
    async fn test_streams_both_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CapturedOutput::default();

        run_command(&sh("echo out; echo err >&2"), dir.path(), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.commands, vec!["sh -c echo out; echo err >&2"]);
        assert!(sink.lines.contains(&(Stream::Stdout, "out".to_string())));
        assert!(sink.lines.contains(&(Stream::Stderr, "err".to_string())));
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let mut sink = CapturedOutput::default();

        run_command(&sh("cat marker.txt"), dir.path(), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.lines, vec![(Stream::Stdout, "here".to_string())]);
    }

    #[tokio::test]
    async fn test_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_command(&sh("exit 3"), dir.path(), &mut CapturedOutput::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScaffoldError::PostProcessingError { exit_code: Some(3), .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new("definitely-not-a-real-binary-4821", Vec::<String>::new());
        let err = run_command(&spec, dir.path(), &mut CapturedOutput::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScaffoldError::PostProcessingError { exit_code: None, .. }
        ));
    }
}
