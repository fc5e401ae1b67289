use crate::prelude::*;

use std::ffi::{OsStr, OsString};
use std::process::{ExitStatus, Stdio};

use super::Error;

/// Convenience macro for building an argument list
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        {
            let args: Vec<&std::ffi::OsStr> = vec![$($arg.as_ref()),*];
            args
        }
    };
}

/// Convenience wrapper around `Command` for
/// building a child process
pub struct Command {
    executable: OsString,
    command: std::process::Command,
}

impl Command {
    pub fn new(executable: impl AsRef<OsStr>) -> Self {
        Self {
            executable: executable.as_ref().to_os_string(),
            command: std::process::Command::new(executable),
        }
    }

    /// Set args as in `Command`
    #[inline]
    pub fn args(mut self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Self {
        self.command.args(args);
        self
    }

    /// Give the child an empty stdin
    #[inline]
    pub fn null_stdin(mut self) -> Self {
        self.command.stdin(Stdio::null());
        self
    }

    /// Set stdout and stderr to pipe
    #[inline]
    pub fn piped(mut self) -> Self {
        self.command.stdout(Stdio::piped());
        self.command.stderr(Stdio::piped());
        self
    }

    /// Spawn the child, wait for it and collect its output
    pub fn output(mut self) -> Result<Finished, Error> {
        verboseln!("running {}", self.get_command_string());
        let child = self
            .command
            .spawn()
            .change_context_lazy(|| Error::Spawn(self.executable.to_string_lossy().to_string()))?;
        let output = child
            .wait_with_output()
            .change_context_lazy(|| {
                Error::Subcommand(self.executable.to_string_lossy().to_string())
            })
            .attach_printable_lazy(|| format!("running {}", self.get_command_string()))?;

        Ok(Finished {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
            command: self,
        })
    }

    /// Get a string representation of the command for debugging purposes
    pub fn get_command_string(&self) -> String {
        // we don't care about escaping it properly, just for debugging
        let args_str = self
            .command
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", self.executable.to_string_lossy(), args_str)
    }
}

/// A finished process with its captured output
pub struct Finished {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    command: Command,
}

impl Finished {
    /// Dump the captured stderr using `errorln!` with the prefix
    ///
    /// Note this does not check the exit status of the child
    pub fn dump_stderr(&self, prefix: &str) {
        for line in String::from_utf8_lossy(&self.stderr).lines() {
            errorln!(prefix, "{}", line);
        }
    }

    /// Check if the process was successful
    pub fn is_success(&self) -> bool {
        self.status.success()
    }

    /// Check the exit status of the process, return an error if it failed
    pub fn check(&self) -> Result<(), Error> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::ExitStatus(
                self.command.executable.to_string_lossy().to_string(),
                self.status,
            ))
            .attach_printable(format!("running {}", self.command.get_command_string()))
        }
    }

    /// Get stdout as a string, replacing invalid utf-8
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}
