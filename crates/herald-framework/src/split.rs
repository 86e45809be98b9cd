//! Splitting message text into a command token and arguments.
//!
//! Splitting is deliberately naive: text is cut on every single space, with
//! no quoting or escaping, so consecutive spaces produce empty tokens.
//! Trailing empty tokens are dropped, but at least one token is always
//! returned.

/// Splits `text` on single `' '` boundaries.
pub fn split_tokens(text: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = text.split(' ').collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    tokens
}

/// A message split into its leading token and the remaining arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// The first token, prefix included.
    pub token: &'a str,
    /// Every token after the first.
    pub args: Vec<&'a str>,
}

impl<'a> CommandLine<'a> {
    /// Splits `text` into a command line.
    pub fn parse(text: &'a str) -> Self {
        let mut tokens = split_tokens(text).into_iter();
        Self {
            token: tokens.next().unwrap_or_default(),
            args: tokens.collect(),
        }
    }

    /// Returns the arguments as owned strings.
    pub fn owned_args(&self) -> Vec<String> {
        self.args.iter().map(|arg| (*arg).to_owned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_spaces_yield_empty_tokens() {
        assert_eq!(split_tokens("!ping  a b"), ["!ping", "", "a", "b"]);

        let line = CommandLine::parse("!ping  a b");
        assert_eq!(line.token, "!ping");
        assert_eq!(line.args, ["", "a", "b"]);
    }

    #[test]
    fn test_trailing_spaces_dropped() {
        assert_eq!(split_tokens("!ping a  "), ["!ping", "a"]);
    }

    #[test]
    fn test_leading_space_gives_empty_token() {
        let line = CommandLine::parse(" !ping");
        assert_eq!(line.token, "");
        assert_eq!(line.args, ["!ping"]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        assert_eq!(split_tokens(""), [""]);
        assert_eq!(split_tokens("   "), [""]);
        assert!(CommandLine::parse("").args.is_empty());
    }

    #[test]
    fn test_no_tab_or_quote_handling() {
        assert_eq!(split_tokens("!say \"a b\"\tc"), ["!say", "\"a", "b\"\tc"]);
    }
}
