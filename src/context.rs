//! State machine for `if` / `then` / `else` / `fi` statements typed over
//! several lines.

use crate::error::ShellError;
use crate::lexer::Keyword;

/// Raw command lines collected for one branch of a conditional.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A closed conditional, ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub condition: Block,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
}

/// The statement being composed.
///
/// Each collecting state owns the blocks opened so far, so an `else` block
/// without a `then` block cannot be expressed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum Context {
    #[default]
    Default,
    CollectingIf(Block),
    CollectingThen(Block, Block),
    CollectingElse(Block, Block, Block),
}

impl Context {
    /// Whether a conditional is open, i.e. lines are being collected.
    pub fn is_collecting(&self) -> bool {
        !matches!(self, Context::Default)
    }

    /// Name of the block currently receiving lines.
    pub fn pending_block(&self) -> Option<&'static str> {
        match self {
            Context::Default => None,
            Context::CollectingIf(_) => Some("if"),
            Context::CollectingThen(..) => Some("then"),
            Context::CollectingElse(..) => Some("else"),
        }
    }

    /// Append a raw line to the open block.
    ///
    /// Returns `false`, leaving the context untouched, when no block is open.
    pub fn append(&mut self, line: &str) -> bool {
        let block = match self {
            Context::Default => return false,
            Context::CollectingIf(condition) => condition,
            Context::CollectingThen(_, then_branch) => then_branch,
            Context::CollectingElse(_, _, else_branch) => else_branch,
        };
        block.push(line);
        true
    }

    /// Apply a control keyword.
    ///
    /// `fi` closes the statement: the collected blocks are handed back and the
    /// context returns to [`Context::Default`]. A keyword with no transition
    /// from the current state discards everything collected, also leaving the
    /// context in [`Context::Default`].
    pub fn advance(&mut self, keyword: Keyword) -> Result<Option<Conditional>, ShellError> {
        let state = std::mem::take(self);
        match (state, keyword) {
            (Context::Default, Keyword::If) => {
                *self = Context::CollectingIf(Block::default());
                Ok(None)
            }
            (Context::CollectingIf(condition), Keyword::Then) if !condition.is_empty() => {
                *self = Context::CollectingThen(condition, Block::default());
                Ok(None)
            }
            (Context::CollectingThen(condition, then_branch), Keyword::Else)
                if !then_branch.is_empty() =>
            {
                *self = Context::CollectingElse(condition, then_branch, Block::default());
                Ok(None)
            }
            (Context::CollectingThen(condition, then_branch), Keyword::Fi) => Ok(Some(Conditional {
                condition,
                then_branch,
                else_branch: None,
            })),
            (Context::CollectingElse(condition, then_branch, else_branch), Keyword::Fi) => {
                Ok(Some(Conditional {
                    condition,
                    then_branch,
                    else_branch: Some(else_branch),
                }))
            }
            (state, keyword) => Err(ShellError::Syntax {
                keyword,
                expected: state.expectation(),
            }),
        }
    }

    /// Drop any collected blocks.
    pub fn reset(&mut self) {
        *self = Context::Default;
    }

    fn expectation(&self) -> &'static str {
        match self {
            Context::Default => "no `if` is open",
            Context::CollectingIf(condition) if condition.is_empty() => {
                "expected a command after `if`"
            }
            Context::CollectingIf(_) => "expected a command or `then`",
            Context::CollectingThen(_, then_branch) if then_branch.is_empty() => {
                "expected a command or `fi` after `then`"
            }
            Context::CollectingThen(..) => "expected a command, `else` or `fi`",
            Context::CollectingElse(..) => "expected a command or `fi`",
        }
    }
}
