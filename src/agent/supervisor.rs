//! Agent subprocess supervision.
//!
//! Owns the lifecycle of one agent process: spawn with piped output, stream
//! stdout lines while the process is still running, wait for exit, and kill
//! on timeout. A dedicated reader thread drains stdout into a channel so the
//! supervising thread can interleave line receipt with deadline checking;
//! channel disconnect means the stream is closed and the reader has exited.
//!
//! A single deadline, computed at spawn, bounds both the streaming phase and
//! the wait phase. On expiry the child is killed before the timeout error
//! propagates; a timed-out agent is never left running.
//!
//! Stderr is intentionally not streamed; only stdout carries the progress
//! protocol. It is read as a single block after the process exits.

use crate::error::{DroverError, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Poll interval while waiting for process exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One read from the agent's stdout stream.
#[derive(Debug, PartialEq, Eq)]
pub enum LineRead {
    /// A line of output (possibly empty due to buffering).
    Line(String),
    /// The stream is closed and fully drained.
    Eof,
}

/// A running agent subprocess.
///
/// Exclusively owned by one execution call for its lifetime; dropping the
/// handle kills the process if it is still running.
#[derive(Debug)]
pub struct AgentProcess {
    agent_name: String,
    timeout_seconds: u64,
    deadline: Instant,
    child: Child,
    lines: Receiver<String>,
    reader: Option<JoinHandle<()>>,
    stderr: Option<ChildStderr>,
    transcript: Vec<String>,
}

impl AgentProcess {
    /// Spawn the agent process in `dir` with piped stdout/stderr.
    ///
    /// The run deadline starts now: `timeout_seconds` bounds everything from
    /// spawn to exit. A spawn failure (binary missing, not executable)
    /// returns [`DroverError::Launch`]: the process never ran, which is
    /// distinct from a non-zero exit.
    pub fn spawn(
        agent_name: &str,
        program: &str,
        args: &[String],
        dir: &Path,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DroverError::Launch(format!(
                    "failed to launch '{}': {}\n\
                     Fix: ensure the agent binary is installed and on PATH.",
                    program, e
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DroverError::UserError("failed to capture agent stdout".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DroverError::UserError("failed to capture agent stderr".to_string())
        })?;

        let (tx, rx) = mpsc::channel();
        let reader = thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            agent_name: agent_name.to_string(),
            timeout_seconds,
            deadline: Instant::now() + Duration::from_secs(timeout_seconds),
            child,
            lines: rx,
            reader: Some(reader),
            stderr: Some(stderr),
            transcript: Vec::new(),
        })
    }

    /// OS process identifier.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Receive the next stdout line, bounded by the run deadline.
    ///
    /// Returns [`LineRead::Eof`] once the reader thread has drained the
    /// stream. Every received line is appended to the transcript, whether or
    /// not it turns out to be valid protocol data. On deadline expiry the
    /// child is killed and [`DroverError::AgentTimeout`] is returned.
    pub fn next_line(&mut self) -> Result<LineRead> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            self.kill();
            return Err(self.timeout_error());
        }

        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                self.transcript.push(line.clone());
                Ok(LineRead::Line(line))
            }
            Err(RecvTimeoutError::Disconnected) => Ok(LineRead::Eof),
            Err(RecvTimeoutError::Timeout) => {
                self.kill();
                Err(self.timeout_error())
            }
        }
    }

    /// Wait for the child to exit, bounded by the run deadline.
    ///
    /// Polls so the deadline is honored even though the child keeps running.
    /// On expiry the child is killed and [`DroverError::AgentTimeout`] is
    /// returned. An exit by signal (no code) is reported as -1.
    pub fn wait(&mut self) -> Result<i32> {
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    if let Some(reader) = self.reader.take() {
                        let _ = reader.join();
                    }
                    return Ok(status.code().unwrap_or(-1));
                }
                Ok(None) => {
                    if Instant::now() >= self.deadline {
                        self.kill();
                        return Err(self.timeout_error());
                    }
                    thread::sleep(WAIT_POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(DroverError::UserError(format!(
                        "failed to check agent process status: {}",
                        e
                    )));
                }
            }
        }
    }

    /// Read captured stderr as a single block.
    ///
    /// Call after the process has exited (or been killed); the pipe is
    /// closed at that point so the read is bounded.
    pub fn read_stderr(&mut self) -> String {
        let mut buf = String::new();
        if let Some(mut stderr) = self.stderr.take() {
            let _ = stderr.read_to_string(&mut buf);
        }
        buf
    }

    /// Every stdout line received so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether the child is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the child and reap it.
    fn kill(&mut self) {
        // On Unix this is SIGKILL; on Windows it is TerminateProcess.
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }

    fn timeout_error(&self) -> DroverError {
        DroverError::AgentTimeout {
            agent: self.agent_name.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

impl Drop for AgentProcess {
    fn drop(&mut self) {
        if self.is_running() {
            self.kill();
        }
    }
}
