use crate::lexer::Keyword;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Everything that can go wrong while servicing a statement.
///
/// Syntax-class errors abort only the statement being composed; the session
/// keeps running. Every other variant leaves no safe partial state behind and
/// terminates the session with a non-zero status (see [`ShellError::is_fatal`]).
#[derive(Debug, Error)]
pub enum ShellError {
    /// A control keyword arrived in a state with no transition for it.
    #[error("syntax error near unexpected `{keyword}`: {expected}")]
    Syntax {
        keyword: Keyword,
        expected: &'static str,
    },

    /// Input ended while an `if` statement was still open.
    #[error("syntax error: unexpected end of input, `{pending}` block is not closed by `fi`")]
    Unterminated { pending: &'static str },

    /// A pipeline segment holds no words (`a | | b`, `a |`).
    #[error("syntax error: pipeline stage {stage} is empty")]
    EmptyStage { stage: usize },

    /// The operating system refused to create a channel between two stages.
    #[error("cannot create pipe: {0}")]
    Channel(#[source] nix::Error),

    /// Creating the child process failed for lack of resources.
    #[error("cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Awaiting a child process failed.
    #[error("cannot wait for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the next line from the operator failed.
    #[error("cannot read input: {0}")]
    Input(#[from] ReadlineError),
}

impl ShellError {
    /// Whether the error has to end the session.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ShellError::Syntax { .. } | ShellError::Unterminated { .. } | ShellError::EmptyStage { .. }
        )
    }
}
