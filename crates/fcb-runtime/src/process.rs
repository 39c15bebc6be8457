//! Launching rendered commands, blocking or streaming.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;

use crate::{FoamCommand, Invocation, RuntimeEnvironment, RuntimeError, RuntimeResult};

/// Captured result of a completed process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub type LineCallback = Box<dyn FnMut(&str) + Send>;

/// Hooks for a streamed process. Output arrives one line at a time from
/// reader threads; `on_finished` fires once with the exit code.
#[derive(Default)]
pub struct OutputCallbacks {
    pub on_stdout: Option<LineCallback>,
    pub on_stderr: Option<LineCallback>,
    pub on_finished: Option<Box<dyn FnOnce(i32) + Send>>,
}

/// Runs solver tools through a detected [`RuntimeEnvironment`].
#[derive(Clone, Copy, Debug)]
pub struct ProcessRunner<'a> {
    env: &'a RuntimeEnvironment,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(env: &'a RuntimeEnvironment) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &RuntimeEnvironment {
        self.env
    }

    /// Blocks until the tool exits. A non-zero exit is reported in the
    /// outcome, not as an error.
    pub fn run(&self, cmd: &FoamCommand) -> RuntimeResult<RunOutcome> {
        tracing::info!(program = %cmd.program, args = ?cmd.args, "running");
        run_invocation(&self.env.render(cmd)?)
    }

    /// Like [`run`](Self::run) but turns a non-zero exit into
    /// [`RuntimeError::NonZeroExit`].
    pub fn run_checked(&self, cmd: &FoamCommand) -> RuntimeResult<RunOutcome> {
        let outcome = self.run(cmd)?;
        if outcome.success() {
            Ok(outcome)
        } else {
            Err(RuntimeError::NonZeroExit {
                program: cmd.app_name().to_string(),
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            })
        }
    }

    /// Starts the tool and returns immediately.
    pub fn start(&self, cmd: &FoamCommand, callbacks: OutputCallbacks) -> RuntimeResult<ProcessHandle> {
        tracing::info!(program = %cmd.program, log = ?cmd.log_file, "starting");
        start_invocation(&self.env.render(cmd)?, callbacks)
    }
}

fn command_for(inv: &Invocation) -> Command {
    let mut command = Command::new(&inv.program);
    command.args(&inv.args).envs(&inv.env).stdin(Stdio::null());
    if let Some(dir) = &inv.cwd {
        command.current_dir(dir);
    }
    command
}

fn launch_error(inv: &Invocation, source: std::io::Error) -> RuntimeError {
    RuntimeError::Launch {
        program: inv.program.clone(),
        source,
    }
}

/// Runs an already-rendered invocation to completion.
pub fn run_invocation(inv: &Invocation) -> RuntimeResult<RunOutcome> {
    let output = command_for(inv)
        .output()
        .map_err(|e| launch_error(inv, e))?;
    let outcome = RunOutcome {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !outcome.success() {
        tracing::warn!(program = %inv.program, exit_code = outcome.exit_code, "process exited with error");
    }
    Ok(outcome)
}

/// Spawns an already-rendered invocation with streamed output.
///
/// On unix the child leads its own process group, so [`ProcessHandle::kill`]
/// reaches the solver and the `tee` processes the wrapper shell started.
pub fn start_invocation(inv: &Invocation, callbacks: OutputCallbacks) -> RuntimeResult<ProcessHandle> {
    let mut command = command_for(inv);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| launch_error(inv, e))?;

    let mut readers = Vec::with_capacity(2);
    if let Some(out) = child.stdout.take() {
        readers.push(spawn_reader(out, callbacks.on_stdout));
    }
    if let Some(err) = child.stderr.take() {
        readers.push(spawn_reader(err, callbacks.on_stderr));
    }
    tracing::debug!(pid = child.id(), program = %inv.program, "process started");
    Ok(ProcessHandle {
        child,
        readers,
        on_finished: callbacks.on_finished,
        exit_code: None,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: R,
    mut callback: Option<LineCallback>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for line in BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            if let Some(cb) = callback.as_mut() {
                cb(&line);
            }
        }
    })
}

/// Sends SIGTERM to the process group led by `pid`.
#[cfg(unix)]
fn terminate_group(pid: u32) -> std::io::Result<()> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("kill -s TERM -- -{pid}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("kill exited with {status}")))
    }
}

#[cfg(not(unix))]
fn terminate_group(_pid: u32) -> std::io::Result<()> {
    Ok(())
}

/// A running child process.
pub struct ProcessHandle {
    child: Child,
    readers: Vec<JoinHandle<()>>,
    on_finished: Option<Box<dyn FnOnce(i32) + Send>>,
    exit_code: Option<i32>,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Polls for completion without blocking.
    pub fn try_wait(&mut self) -> RuntimeResult<Option<i32>> {
        if let Some(code) = self.exit_code {
            return Ok(Some(code));
        }
        match self.child.try_wait()? {
            Some(status) => Ok(Some(self.finish(status.code().unwrap_or(-1)))),
            None => Ok(None),
        }
    }

    /// Blocks until the process exits and all output has been delivered.
    pub fn wait(&mut self) -> RuntimeResult<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        let status = self.child.wait()?;
        Ok(self.finish(status.code().unwrap_or(-1)))
    }

    /// Terminates the process, everything it spawned, and reaps it.
    pub fn kill(&mut self) -> RuntimeResult<i32> {
        if self.exit_code.is_none() {
            tracing::info!(pid = self.pid(), "terminating process");
            if let Err(e) = terminate_group(self.pid()) {
                tracing::debug!(error = %e, "group signal failed, killing leader only");
            }
            if let Err(e) = self.child.kill() {
                // Already exited between the check and the signal.
                tracing::debug!(error = %e, "kill failed");
            }
        }
        self.wait()
    }

    fn finish(&mut self, code: i32) -> i32 {
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                tracing::warn!("output callback panicked");
            }
        }
        self.exit_code = Some(code);
        if let Some(cb) = self.on_finished.take() {
            cb(code);
        }
        tracing::debug!(pid = self.child.id(), exit_code = code, "process finished");
        code
    }
}
