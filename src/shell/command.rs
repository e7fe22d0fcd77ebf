//! External command execution.

use crate::error::{PipelineError, Result};
use crate::shell::signal::InterruptFlag;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit and interruption.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A command to run, either through the shell or as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "command", rename_all = "snake_case")]
pub enum CommandSpec {
    /// A command line interpreted by `bash -o pipefail -c` (pipes, redirects allowed).
    Shell(String),

    /// A program and its arguments, run directly.
    Argv(Vec<String>),
}

impl CommandSpec {
    /// Build a shell command.
    pub fn shell(command: impl Into<String>) -> Self {
        CommandSpec::Shell(command.into())
    }

    /// Build an argument-vector command.
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::Argv(args.into_iter().map(Into::into).collect())
    }

    /// Whether this command is run through the shell.
    pub fn is_shell(&self) -> bool {
        matches!(self, CommandSpec::Shell(_))
    }

    /// Whether there is nothing to run.
    pub fn is_empty(&self) -> bool {
        match self {
            CommandSpec::Shell(line) => line.trim().is_empty(),
            CommandSpec::Argv(args) => args.first().is_none_or(|p| p.trim().is_empty()),
        }
    }

    fn to_command(&self) -> Command {
        match self {
            CommandSpec::Shell(line) => {
                let (shell, flags) = shell_program();
                let mut cmd = Command::new(shell);
                cmd.args(flags).arg(line);
                cmd
            }
            CommandSpec::Argv(args) => {
                let mut cmd = Command::new(&args[0]);
                cmd.args(&args[1..]);
                cmd
            }
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Shell(line) => write!(f, "{}", line),
            CommandSpec::Argv(args) => write!(f, "{}", args.join(" ")),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed because of an interrupt.
    pub interrupted: bool,
}

impl CommandResult {
    fn finished(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
            success: status.success(),
            interrupted: false,
        }
    }

    fn interrupted(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: None,
            stdout,
            stderr,
            duration,
            success: false,
            interrupted: true,
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

/// Output line from command execution.
#[derive(Debug, Clone)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output. Invoked from reader threads.
pub type OutputCallback = Arc<dyn Fn(OutputLine) + Send + Sync>;

/// Execute a command, blocking until it exits or `interrupt` is raised.
///
/// Captured lines are passed to `callback` as they arrive. When the
/// interrupt flag is raised the child (and on Unix its whole process
/// group) is terminated and the result is marked `interrupted`.
pub fn execute(
    spec: &CommandSpec,
    options: &CommandOptions,
    interrupt: &InterruptFlag,
    callback: Option<OutputCallback>,
) -> Result<CommandResult> {
    if spec.is_empty() {
        return Err(PipelineError::ToolFailure {
            step: "command".to_string(),
            command: spec.to_string(),
            code: None,
        });
    }

    let start = Instant::now();
    let mut cmd = spec.to_command();

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(if options.capture_stdout {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });
    cmd.stderr(if options.capture_stderr {
        Stdio::piped()
    } else {
        Stdio::inherit()
    });

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| PipelineError::ToolFailure {
        step: "command".to_string(),
        command: format!("{} ({})", spec, e),
        code: None,
    })?;

    let stdout_handle = child
        .stdout
        .take()
        .map(|out| spawn_reader(out, OutputLine::Stdout, callback.clone()));
    let stderr_handle = child
        .stderr
        .take()
        .map(|err| spawn_reader(err, OutputLine::Stderr, callback));

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if interrupt.is_set() {
            terminate(&mut child);
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();
    let stderr = stderr_handle
        .map(|h| h.join().unwrap_or_default())
        .unwrap_or_default();
    let duration = start.elapsed();

    Ok(match status {
        Some(status) => CommandResult::finished(status, stdout, stderr, duration),
        None => CommandResult::interrupted(stdout, stderr, duration),
    })
}

/// Execute a command with captured output and no interrupt handling.
pub fn execute_quiet(spec: &CommandSpec) -> Result<CommandResult> {
    let options = CommandOptions {
        capture_stdout: true,
        capture_stderr: true,
        ..Default::default()
    };
    execute(spec, &options, &InterruptFlag::new(), None)
}

fn spawn_reader<R>(
    stream: R,
    wrap: fn(String) -> OutputLine,
    callback: Option<OutputCallback>,
) -> thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            if let Some(cb) = &callback {
                cb(wrap(line));
            }
        }
        output
    })
}

/// Kill the child and anything it spawned, then reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        // SAFETY: kill() with a negative pid signals the process group we
        // created for this child; it touches no memory.
        unsafe {
            libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Shell used for [`CommandSpec::Shell`] commands.
///
/// `pipefail` makes a pipeline fail when any stage fails, not only the
/// last one writing the output file.
fn shell_program() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("cmd.exe", &["/C"])
    } else {
        ("bash", &["-o", "pipefail", "-c"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn captured() -> CommandOptions {
        CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    #[test]
    fn execute_shell_command() {
        let result = execute_quiet(&CommandSpec::shell("echo hello | tr a-z A-Z")).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("HELLO"));
    }

    #[test]
    fn pipeline_fails_when_an_early_stage_fails() {
        let result = execute_quiet(&CommandSpec::shell("false | cat")).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn execute_argv_does_not_interpret_shell_syntax() {
        let spec = CommandSpec::argv(["echo", "a", "|", "b"]);
        let result = execute_quiet(&spec).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("a | b"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute_quiet(&CommandSpec::shell("exit 3")).unwrap();

        assert!(!result.success);
        assert!(!result.interrupted);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_missing_program_is_error() {
        let spec = CommandSpec::argv(["definitely-not-a-real-program-xyz"]);
        assert!(execute_quiet(&spec).is_err());
    }

    #[test]
    fn execute_rejects_empty_command() {
        assert!(execute_quiet(&CommandSpec::shell("  ")).is_err());
        assert!(execute_quiet(&CommandSpec::Argv(vec![])).is_err());
    }

    #[test]
    fn execute_with_env_and_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut options = captured();
        options.cwd = Some(temp.path().to_path_buf());
        options.env.insert("MY_VAR".into(), "my_value".into());

        let result = execute(
            &CommandSpec::shell("echo $MY_VAR > out.txt"),
            &options,
            &InterruptFlag::new(),
            None,
        )
        .unwrap();

        assert!(result.success);
        let content = std::fs::read_to_string(temp.path().join("out.txt")).unwrap();
        assert!(content.contains("my_value"));
    }

    #[test]
    fn execute_streams_both_channels_to_callback() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let callback: OutputCallback = Arc::new(move |line| sink.lock().unwrap().push(line));

        let result = execute(
            &CommandSpec::shell("echo out; echo err >&2"),
            &captured(),
            &InterruptFlag::new(),
            Some(callback),
        )
        .unwrap();

        assert!(result.success);
        assert!(result.stderr.contains("err"));
        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| matches!(l, OutputLine::Stdout(s) if s == "out")));
        assert!(lines.iter().any(|l| matches!(l, OutputLine::Stderr(s) if s == "err")));
    }

    #[test]
    fn raised_interrupt_kills_long_command() {
        let flag = InterruptFlag::new();
        let trigger = flag.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.trigger();
        });

        let result = execute(
            &CommandSpec::shell("sleep 30"),
            &captured(),
            &flag,
            None,
        )
        .unwrap();
        handle.join().unwrap();

        assert!(result.interrupted);
        assert!(!result.success);
        assert!(result.duration < Duration::from_secs(10));
    }

    #[test]
    fn display_shows_command_line() {
        assert_eq!(CommandSpec::shell("a | b").to_string(), "a | b");
        assert_eq!(CommandSpec::argv(["samtools", "index", "x.bam"]).to_string(), "samtools index x.bam");
        assert!(CommandSpec::shell("x").is_shell());
        assert!(!CommandSpec::argv(["x"]).is_shell());
    }
}
