//! Line tokenization for the interpreter.
//!
//! A single splitting routine serves both levels of the grammar: cutting a line
//! into `;`-separated statements (or `|`-separated pipeline stages) and cutting
//! one command into its words. Quoting and escaping are not interpreted: a
//! delimiter always splits, wherever it appears.

use std::fmt;

/// Separates sequential statements written on one line.
pub const STATEMENT_SEPARATOR: &[char] = &[';'];

/// Separates the stages of a pipeline.
pub const PIPE_SEPARATOR: &[char] = &['|'];

/// Separates the words of a single command.
pub const WORD_SEPARATORS: &[char] = &[' ', '\t'];

/// Split `line` on any of `delimiters`, dropping empty fields.
///
/// Consecutive delimiters collapse, so a line made only of delimiters yields
/// an empty vector. Fields are returned verbatim and in order; a field may
/// still contain characters that are delimiters at another level (a statement
/// keeps its spaces, a word keeps a `;`).
pub fn split<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    line.split(|c: char| delimiters.contains(&c))
        .filter(|field| !field.is_empty())
        .collect()
}

/// Whether the line has to be treated as a pipeline.
///
/// The pipe separator anywhere on the line takes precedence over `;`.
pub fn is_pipeline(line: &str) -> bool {
    line.contains(PIPE_SEPARATOR)
}

/// Keywords that drive the control-flow context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Then,
    Else,
    Fi,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Then => "then",
            Keyword::Else => "else",
            Keyword::Fi => "fi",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single statement is handled by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Nothing but whitespace.
    Blank,
    /// The `exit` keyword.
    Exit,
    /// One of `if`, `then`, `else`, `fi`, with the command that follows it on
    /// the same statement, if any.
    Control(Keyword, Option<&'a str>),
    /// Anything else, trimmed.
    Command(&'a str),
}

/// Classify a statement.
///
/// Keywords are case-sensitive. `if`, `then` and `else` only have to be the
/// first word: `then echo A` is the keyword followed by the command `echo A`.
/// `fi` and `exit` must make up the entire trimmed statement, so `exit 3` and
/// `fi now` are plain commands.
pub fn classify(statement: &str) -> Statement<'_> {
    let statement = statement.trim();
    let (head, rest) = match statement.split_once(WORD_SEPARATORS) {
        Some((head, rest)) => (head, Some(rest.trim_start())),
        None => (statement, None),
    };

    match (head, rest) {
        ("", _) => Statement::Blank,
        ("exit", None) => Statement::Exit,
        ("if", rest) => Statement::Control(Keyword::If, rest),
        ("then", rest) => Statement::Control(Keyword::Then, rest),
        ("else", rest) => Statement::Control(Keyword::Else, rest),
        ("fi", None) => Statement::Control(Keyword::Fi, None),
        _ => Statement::Command(statement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_only_lines_yield_nothing() {
        assert!(split("", WORD_SEPARATORS).is_empty());
        assert!(split("   \t ", WORD_SEPARATORS).is_empty());
        assert!(split(";;;", STATEMENT_SEPARATOR).is_empty());
        assert!(split("|", PIPE_SEPARATOR).is_empty());
    }

    #[test]
    fn consecutive_delimiters_collapse() {
        assert_eq!(split("ls   -l  /tmp", WORD_SEPARATORS), ["ls", "-l", "/tmp"]);
        assert_eq!(
            split(";echo a;;echo b;", STATEMENT_SEPARATOR),
            ["echo a", "echo b"]
        );
    }

    #[test]
    fn both_levels_behave_identically() {
        let words = split("a  b c", &[' ']);
        let statements = split("a;;b;c", &[';']);
        assert_eq!(words, statements);
    }

    #[test]
    fn quotes_do_not_protect_delimiters() {
        assert_eq!(
            split("echo \"hello world\"", WORD_SEPARATORS),
            ["echo", "\"hello", "world\""]
        );
    }

    #[test]
    fn statements_keep_inner_whitespace() {
        assert_eq!(
            split("if true ; then", STATEMENT_SEPARATOR),
            ["if true ", " then"]
        );
    }

    #[test]
    fn pipe_anywhere_makes_a_pipeline() {
        assert!(is_pipeline("ls | wc"));
        assert!(is_pipeline("echo a; echo b|wc"));
        assert!(!is_pipeline("echo a; echo b"));
    }

    #[test]
    fn bare_keywords() {
        assert_eq!(classify("  if "), Statement::Control(Keyword::If, None));
        assert_eq!(classify("then"), Statement::Control(Keyword::Then, None));
        assert_eq!(classify("\telse"), Statement::Control(Keyword::Else, None));
        assert_eq!(classify("fi"), Statement::Control(Keyword::Fi, None));
        assert_eq!(classify("exit"), Statement::Exit);
        assert_eq!(classify("   "), Statement::Blank);
    }

    #[test]
    fn opening_keywords_carry_the_following_command() {
        assert_eq!(
            classify(" if true "),
            Statement::Control(Keyword::If, Some("true"))
        );
        assert_eq!(
            classify("then  echo A"),
            Statement::Control(Keyword::Then, Some("echo A"))
        );
        assert_eq!(
            classify("else\techo B -n"),
            Statement::Control(Keyword::Else, Some("echo B -n"))
        );
    }

    #[test]
    fn closing_keywords_must_be_the_whole_statement() {
        assert_eq!(classify("fi now"), Statement::Command("fi now"));
        assert_eq!(classify("exit 3"), Statement::Command("exit 3"));
    }

    #[test]
    fn keywords_are_case_sensitive_whole_words() {
        assert_eq!(classify("Then"), Statement::Command("Then"));
        assert_eq!(classify("iffy x"), Statement::Command("iffy x"));
        assert_eq!(classify("thenx"), Statement::Command("thenx"));
    }
}
