//! Spawn a tool and deliver its merged output line by line

use super::error::{ProcessError, ProcessResult};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// A command line for the external tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-ish rendering for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Run `command` in `cwd`, calling `on_line` once per output line
///
/// stdout and stderr are merged as lines arrive. Each line has its trailing
/// `\n` (and `\r`) removed and is decoded lossily as UTF-8. The next line is
/// not read until `on_line` returns. Returns the exit code once both streams
/// are exhausted; a process without an exit code (killed by a signal) reports
/// 0. The child is killed if the returned future is dropped.
pub async fn spawn_and_stream<F>(command: &ToolCommand, cwd: &Path, mut on_line: F) -> ProcessResult<i32>
where
    F: FnMut(&str),
{
    let program = command.program.clone();
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or_else(|| ProcessError::Pipe {
        program: program.clone(),
        stream: "stdout",
    })?;
    let stderr = child.stderr.take().ok_or_else(|| ProcessError::Pipe {
        program: program.clone(),
        stream: "stderr",
    })?;

    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let mut out_open = true;
    let mut err_open = true;

    // read_until keeps partial data in the buffer when the other branch wins
    while out_open || err_open {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut out_buf), if out_open => {
                let n = read.map_err(|source| ProcessError::Read {
                    program: program.clone(),
                    stream: "stdout",
                    source,
                })?;
                if n == 0 {
                    // unterminated last line
                    if !out_buf.is_empty() {
                        deliver(&mut out_buf, &mut on_line);
                    }
                    out_open = false;
                } else {
                    deliver(&mut out_buf, &mut on_line);
                }
            }
            read = stderr.read_until(b'\n', &mut err_buf), if err_open => {
                let n = read.map_err(|source| ProcessError::Read {
                    program: program.clone(),
                    stream: "stderr",
                    source,
                })?;
                if n == 0 {
                    // unterminated last line
                    if !err_buf.is_empty() {
                        deliver(&mut err_buf, &mut on_line);
                    }
                    err_open = false;
                } else {
                    deliver(&mut err_buf, &mut on_line);
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|source| ProcessError::Wait { program, source })?;
    Ok(status.code().unwrap_or(0))
}

fn deliver<F: FnMut(&str)>(buf: &mut Vec<u8>, on_line: &mut F) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    on_line(&String::from_utf8_lossy(buf));
    buf.clear();
}
