//! Turning statements into launchable commands and pipelines.

use crate::error::ShellError;
use crate::lexer::{self, PIPE_SEPARATOR, WORD_SEPARATORS};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::os::fd::OwnedFd;

/// A single program invocation.
///
/// `argv` is never empty; `argv[0]` is the program name. The optional
/// endpoints replace the standard input/output the child would otherwise
/// inherit from the interpreter. Dropping a `Command` closes any endpoint it
/// still holds.
#[derive(Debug)]
pub struct Command {
    argv: Vec<String>,
    stdin: Option<OwnedFd>,
    stdout: Option<OwnedFd>,
}

impl Command {
    /// Split `text` into words. Returns `None` when there are no words.
    pub fn parse(text: &str) -> Option<Self> {
        let argv: Vec<String> = lexer::split(text, WORD_SEPARATORS)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv,
            stdin: None,
            stdout: None,
        })
    }

    /// The program name, `argv[0]`.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn has_input(&self) -> bool {
        self.stdin.is_some()
    }

    pub fn has_output(&self) -> bool {
        self.stdout.is_some()
    }

    /// Hand the endpoints over to the launcher.
    pub(crate) fn take_endpoints(&mut self) -> (Option<OwnedFd>, Option<OwnedFd>) {
        (self.stdin.take(), self.stdout.take())
    }

    #[cfg(test)]
    pub(crate) fn set_output(&mut self, endpoint: OwnedFd) {
        self.stdout = Some(endpoint);
    }
}

/// Two or more commands joined by one-directional channels.
///
/// For stages `i` and `i + 1`, the output endpoint of `i` and the input
/// endpoint of `i + 1` are the two ends of the same channel. The first stage
/// has no input endpoint and the last stage has no output endpoint.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Command>,
}

impl Pipeline {
    /// Build a pipeline from a line containing the pipe separator.
    ///
    /// Every segment between separators is split into words; a channel is
    /// allocated as soon as the stage it feeds has been parsed. If a segment
    /// holds no words, or a channel cannot be created, the stages built so far
    /// are dropped, which closes all of their endpoints before the error is
    /// returned.
    ///
    /// # Errors
    /// * [`ShellError::EmptyStage`] - a segment without words, or fewer than two segments.
    /// * [`ShellError::Channel`] - the OS refused to create a pipe.
    pub fn build(line: &str) -> Result<Self, ShellError> {
        let segments = lexer::split(line, PIPE_SEPARATOR);
        let mut stages: Vec<Command> = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().enumerate() {
            let mut stage =
                Command::parse(segment).ok_or(ShellError::EmptyStage { stage: index + 1 })?;
            if let Some(previous) = stages.last_mut() {
                let (reader, writer) = channel()?;
                previous.stdout = Some(writer);
                stage.stdin = Some(reader);
            }
            stages.push(stage);
        }

        if stages.len() < 2 {
            return Err(ShellError::EmptyStage {
                stage: stages.len() + 1,
            });
        }
        Ok(Self { stages })
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Command] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<Command> {
        self.stages
    }

    #[cfg(test)]
    pub(crate) fn stages_mut(&mut self) -> &mut [Command] {
        &mut self.stages
    }
}

/// Create a channel as `(read end, write end)`.
///
/// Both ends are close-on-exec: a child only keeps the end that was dup'd onto
/// its standard input or output, so every channel stays open in exactly its
/// designated reader and writer.
pub(crate) fn channel() -> Result<(OwnedFd, OwnedFd), ShellError> {
    pipe2(OFlag::O_CLOEXEC).map_err(ShellError::Channel)
}
