//! Driving an external engine process over a command/status pipe.
//!
//! The engine runs as a child process in scripting mode: it reads one
//! command per line on stdin and reports each command's outcome on
//! stdout as a `status:` line (`status: success` or
//! `status: error <message>`), possibly preceded by free-form log
//! output which is passed through at trace level.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use astroblend_pipeline::Operation;

use crate::{EngineError, ImageEngine};

/// Reply prefix for a successfully executed command.
const STATUS_SUCCESS: &str = "status: success";
/// Reply prefix for a rejected command.
const STATUS_ERROR: &str = "status: error";

/// An [`ImageEngine`] backed by an external engine process.
pub struct ProcessEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessEngine {
    /// Spawn the engine program with the given arguments.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the process cannot be spawned, or
    /// [`EngineError::Protocol`] if it comes up without the expected
    /// stdio pipes.
    pub fn spawn<I, S>(program: &str, args: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine spawned without stdin pipe".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::Protocol("engine spawned without stdout pipe".to_owned()))?;

        log::info!("engine process started: {program}");
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    /// Ask the engine to exit and wait for the process to finish.
    ///
    /// # Errors
    ///
    /// [`EngineError::Io`] if the exit command cannot be delivered or
    /// the process cannot be reaped.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        writeln!(self.stdin, "exit")?;
        self.stdin.flush()?;
        let status = self.child.wait()?;
        log::info!("engine process exited: {status}");
        Ok(())
    }

    /// Read reply lines until a `status:` line arrives.
    ///
    /// There is no timeout on this read: a hung engine hangs the whole
    /// control loop. That matches the single-threaded execution model
    /// and is a known, accepted risk.
    fn await_status(&mut self, command: &str) -> Result<(), EngineError> {
        loop {
            let mut line = String::new();
            let bytes = self.stdout.read_line(&mut line)?;
            if bytes == 0 {
                return Err(EngineError::Closed);
            }
            let line = line.trim_end();

            if line == STATUS_SUCCESS {
                return Ok(());
            }
            if let Some(message) = line.strip_prefix(STATUS_ERROR) {
                return Err(EngineError::Rejected {
                    command: command.to_owned(),
                    message: message.trim().to_owned(),
                });
            }
            if line.starts_with("status:") {
                return Err(EngineError::Protocol(line.to_owned()));
            }
            // Anything else is engine log output.
            log::trace!("engine: {line}");
        }
    }
}

impl ImageEngine for ProcessEngine {
    fn execute(&mut self, op: &Operation) -> Result<(), EngineError> {
        let command = op.to_command();
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        self.await_status(&command)
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        // Best effort: if shutdown() was not called, do not leave the
        // engine process behind.
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
