use crate::builtin;
use crate::command::{ExitCode, SUCCESS, USAGE_ERROR};
use crate::context::{Block, Conditional, Context};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external;
use crate::lexer::{self, STATEMENT_SEPARATOR, Statement};
use crate::parser::{Command, Pipeline};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Prompt shown while an `if` statement is still open.
pub const CONTINUATION_PROMPT: &str = "> ";

/// What the session should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A minimal command interpreter with `if`/`then`/`else`/`fi` and pipelines.
///
/// The interpreter owns the session [`Environment`] and the control-flow
/// [`Context`]. Lines are fed one at a time through [`Interpreter::execute_line`];
/// [`Interpreter::repl`] does so with lines read from the operator.
///
/// Example
/// ```no_run
/// use tinysh::{Environment, Flow, Interpreter};
/// let mut sh = Interpreter::new(Environment::new());
/// assert_eq!(sh.execute_line("if true; then echo A; fi").unwrap(), Flow::Continue);
/// assert_eq!(sh.last_status(), 0);
/// ```
pub struct Interpreter {
    env: Environment,
    context: Context,
    last_status: ExitCode,
    xtrace: bool,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            context: Context::default(),
            last_status: SUCCESS,
            xtrace: false,
        }
    }

    /// Print every command on stderr before launching it.
    pub fn with_xtrace(mut self, xtrace: bool) -> Self {
        self.xtrace = xtrace;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Exit status of the last command that ran.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// The prompt for the next line.
    pub fn prompt(&self) -> String {
        if self.context.is_collecting() {
            CONTINUATION_PROMPT.to_string()
        } else {
            self.env.prompt()
        }
    }

    /// Handle one input line.
    ///
    /// A line containing `|` is a single pipeline. Any other line is split on
    /// `;` and each statement is either a control keyword, `exit`, or a command
    /// that runs now (no open statement) or is collected into the open block.
    /// A syntax error discards the rest of the line. A fatal error also drops
    /// whatever the context had collected.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let result = self.dispatch(line);
        if matches!(&result, Err(e) if e.is_fatal()) {
            self.context.reset();
        }
        result
    }

    /// Execute `script` line by line, as given to `-c`.
    ///
    /// Syntax errors, including an `if` left open at the end, are reported on
    /// stderr and yield status 2; otherwise the status of the last command is
    /// returned.
    pub fn run_script(&mut self, script: &str) -> Result<ExitCode, ShellError> {
        for line in script.lines() {
            match self.execute_line(line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(self.last_status),
                Err(e) if !e.is_fatal() => {
                    eprintln!("tinysh: {e}");
                    return Ok(USAGE_ERROR);
                }
                Err(e) => return Err(e),
            }
        }
        if let Some(pending) = self.context.pending_block() {
            self.context.reset();
            eprintln!("tinysh: {}", ShellError::Unterminated { pending });
            return Ok(USAGE_ERROR);
        }
        Ok(self.last_status)
    }

    /// Read lines from the operator until `exit` or end of input.
    ///
    /// `interrupted` is raised by the signal handlers; when it is found set at
    /// the top of the loop the prompt is shown again on a fresh line.
    pub fn repl(&mut self, interrupted: &AtomicBool) -> Result<ExitCode, ShellError> {
        let mut rl = DefaultEditor::new()?;

        loop {
            if interrupted.swap(false, Ordering::SeqCst) {
                println!();
            }

            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    match self.execute_line(&line) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Exit) => break,
                        Err(e) if !e.is_fatal() => eprintln!("tinysh: {e}"),
                        Err(e) => return Err(e),
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(ShellError::Input(err)),
            }
        }

        println!("exit");
        Ok(SUCCESS)
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow, ShellError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if lexer::is_pipeline(line) {
            if !self.context.append(line) {
                self.run_unit(line)?;
            }
            return Ok(Flow::Continue);
        }

        for statement in lexer::split(line, STATEMENT_SEPARATOR) {
            match lexer::classify(statement) {
                Statement::Blank => {}
                Statement::Exit => return Ok(Flow::Exit),
                Statement::Control(keyword, command) => {
                    if let Some(conditional) = self.context.advance(keyword)? {
                        self.run_conditional(conditional)?;
                    }
                    if let Some(command) = command {
                        self.context.append(command);
                    }
                }
                Statement::Command(command) => {
                    if !self.context.append(command) {
                        self.run_unit(command)?;
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Run the condition, then the branch its last status selects.
    fn run_conditional(&mut self, conditional: Conditional) -> Result<(), ShellError> {
        let status = self.run_block(&conditional.condition)?;
        if status == SUCCESS {
            self.run_block(&conditional.then_branch)?;
        } else if let Some(else_branch) = &conditional.else_branch {
            self.run_block(else_branch)?;
        }
        Ok(())
    }

    fn run_block(&mut self, block: &Block) -> Result<ExitCode, ShellError> {
        let mut status = SUCCESS;
        for entry in block.lines() {
            status = self.run_unit(entry)?;
        }
        Ok(status)
    }

    /// Run a simple command or a pipeline and record its status.
    fn run_unit(&mut self, text: &str) -> Result<ExitCode, ShellError> {
        let status = if lexer::is_pipeline(text) {
            let pipeline = Pipeline::build(text)?;
            self.trace(&pipeline_words(&pipeline));
            external::launch_pipeline(pipeline, &self.env)?
        } else {
            match Command::parse(text) {
                Some(command) => {
                    self.trace(&command.argv().join(" "));
                    match builtin::try_run(command.argv(), &mut self.env) {
                        Some(status) => status,
                        None => external::run(command, &self.env)?,
                    }
                }
                None => return Ok(self.last_status),
            }
        };
        self.last_status = status;
        Ok(status)
    }

    fn trace(&self, words: &str) {
        if self.xtrace {
            eprintln!("+ {words}");
        }
    }
}

fn pipeline_words(pipeline: &Pipeline) -> String {
    pipeline
        .stages()
        .iter()
        .map(|stage| stage.argv().join(" "))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Environment::new())
    }
}
