/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Upper bound on tokens accepted per command; later tokens are dropped.
pub const MAX_TOKENS: usize = 25;

/// One parsed command: its argument tokens and its pipe-connection flags.
///
/// Token 0 is the program name (or builtin verb); the rest are arguments in
/// order. `pipe_in` means standard input comes from the previous command's
/// pipe, `pipe_out` means standard output feeds the next command's pipe.
/// The parser guarantees the flags are consistent across a sealed sequence:
/// `pipe_out` on one command implies `pipe_in` on its successor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Command {
    pub tokens: Vec<String>,
    pub pipe_in: bool,
    pub pipe_out: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token, silently ignoring it once [`MAX_TOKENS`] is reached.
    pub fn add_token(&mut self, tok: &str) {
        if self.tokens.len() < MAX_TOKENS {
            self.tokens.push(tok.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The command verb, i.e. token 0.
    pub fn verb(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_token_caps_at_limit() {
        let mut cmd = Command::new();
        for i in 0..MAX_TOKENS + 5 {
            cmd.add_token(&format!("tok{}", i));
        }
        assert_eq!(cmd.tokens.len(), MAX_TOKENS);
        assert_eq!(cmd.tokens.last().unwrap(), "tok24");
    }

    #[test]
    fn test_verb_and_args() {
        let mut cmd = Command::new();
        assert!(cmd.is_empty());
        assert_eq!(cmd.verb(), None);
        assert!(cmd.args().is_empty());

        cmd.add_token("echo");
        cmd.add_token("hi");
        assert!(!cmd.is_empty());
        assert_eq!(cmd.verb(), Some("echo"));
        assert_eq!(cmd.args(), ["hi".to_string()]);
    }
}
