//! Splits one input line into an ordered sequence of [`Command`]s.
//!
//! The grammar is deliberately small: tokens are maximal runs of
//! non-delimiter characters, commands are separated by `;` (sequential) or
//! `|` (piped). There is no quoting, no escaping and no reject state:
//! malformed delimiter runs degrade to fewer commands rather than errors.

use crate::command::Command;

/// Parse a line into a pipeline sequence.
///
/// Empty commands are never materialized: consecutive separators collapse,
/// a lone `|` at the start of a line is a no-op, and a trailing `|` leaves
/// the preceding command without a write obligation. `pipe_out` on command
/// *i* and `pipe_in` on command *i+1* are always set (and cleared) as a
/// pair.
pub fn parse_line(line: &str) -> Vec<Command> {
    let mut sequence: Vec<Command> = Vec::new();
    let mut current = Command::new();
    let mut tok_start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                close_token(line, &mut tok_start, i, &mut current);
            }
            '|' => {
                // Decided before the open token is flushed into `current`.
                let had_tokens = !current.is_empty() || tok_start.is_some();
                close_token(line, &mut tok_start, i, &mut current);
                if had_tokens {
                    current.pipe_out = true;
                    sequence.push(std::mem::take(&mut current));
                    current.pipe_in = true;
                }
            }
            ';' => {
                let had_tokens = !current.is_empty() || tok_start.is_some();
                close_token(line, &mut tok_start, i, &mut current);
                if had_tokens {
                    sequence.push(std::mem::take(&mut current));
                } else {
                    // `a|;`: the pipe never found a consumer, so the
                    // predecessor loses its write obligation too.
                    if current.pipe_in {
                        drop_dangling_pipe(&mut sequence);
                    }
                    current = Command::new();
                }
            }
            _ => {
                if tok_start.is_none() {
                    tok_start = Some(i);
                }
            }
        }
    }

    close_token(line, &mut tok_start, line.len(), &mut current);
    if !current.is_empty() {
        sequence.push(current);
    } else if current.pipe_in {
        // Trailing `|` with nothing after it.
        drop_dangling_pipe(&mut sequence);
    }
    sequence
}

fn close_token(line: &str, tok_start: &mut Option<usize>, end: usize, cmd: &mut Command) {
    if let Some(start) = tok_start.take() {
        cmd.add_token(&line[start..end]);
    }
}

fn drop_dangling_pipe(sequence: &mut [Command]) {
    if let Some(last) = sequence.last_mut() {
        last.pipe_out = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MAX_TOKENS;

    fn tokens(cmd: &Command) -> Vec<&str> {
        cmd.tokens.iter().map(String::as_str).collect()
    }

    fn assert_pair_invariant(seq: &[Command]) {
        for pair in seq.windows(2) {
            assert_eq!(
                pair[0].pipe_out, pair[1].pipe_in,
                "pipe_out/pipe_in must be set as a pair: {:?}",
                seq
            );
        }
        if let Some(last) = seq.last() {
            assert!(!last.pipe_out, "a sequence may not end expecting a successor");
        }
        if let Some(first) = seq.first() {
            assert!(!first.pipe_in, "the first command has no predecessor");
        }
    }

    #[test]
    fn test_single_command() {
        let seq = parse_line("ls");
        assert_eq!(seq.len(), 1);
        assert_eq!(tokens(&seq[0]), ["ls"]);
        assert!(!seq[0].pipe_in);
        assert!(!seq[0].pipe_out);
    }

    #[test]
    fn test_pipe_and_semicolon_mix() {
        let seq = parse_line("echo hi|grep h;pwd");
        assert_eq!(seq.len(), 3);

        assert_eq!(tokens(&seq[0]), ["echo", "hi"]);
        assert!(!seq[0].pipe_in);
        assert!(seq[0].pipe_out);

        assert_eq!(tokens(&seq[1]), ["grep", "h"]);
        assert!(seq[1].pipe_in);
        assert!(!seq[1].pipe_out);

        assert_eq!(tokens(&seq[2]), ["pwd"]);
        assert!(!seq[2].pipe_in);
        assert!(!seq[2].pipe_out);
    }

    #[test]
    fn test_consecutive_semicolons_collapse() {
        let seq = parse_line("ls;;pwd;");
        assert_eq!(seq.len(), 2);
        assert_eq!(tokens(&seq[0]), ["ls"]);
        assert_eq!(tokens(&seq[1]), ["pwd"]);
        for cmd in &seq {
            assert!(!cmd.pipe_in && !cmd.pipe_out);
        }
    }

    #[test]
    fn test_trailing_pipe_dropped() {
        let seq = parse_line("echo hi|");
        assert_eq!(seq.len(), 1);
        assert_eq!(tokens(&seq[0]), ["echo", "hi"]);
        assert!(!seq[0].pipe_in);
        assert!(!seq[0].pipe_out);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn test_delimiters_only() {
        for line in ["   ", "\t\t", ";", ";;;", "|", "|;|", "  ; | ;; ||  ", "\r\n"] {
            assert!(parse_line(line).is_empty(), "expected empty for {:?}", line);
        }
    }

    #[test]
    fn test_leading_pipe_is_noop() {
        let seq = parse_line("|ls");
        assert_eq!(seq.len(), 1);
        assert_eq!(tokens(&seq[0]), ["ls"]);
        assert!(!seq[0].pipe_in);
        assert!(!seq[0].pipe_out);
    }

    #[test]
    fn test_double_pipe_collapses() {
        let seq = parse_line("a||b");
        assert_eq!(seq.len(), 2);
        assert!(seq[0].pipe_out);
        assert!(seq[1].pipe_in);
        assert_pair_invariant(&seq);
    }

    #[test]
    fn test_semicolon_after_pipe_drops_obligation() {
        let seq = parse_line("a|;b");
        assert_eq!(seq.len(), 2);
        assert_eq!(tokens(&seq[0]), ["a"]);
        assert!(!seq[0].pipe_out, "dangling pipe obligation must be dropped");
        assert_eq!(tokens(&seq[1]), ["b"]);
        assert!(!seq[1].pipe_in);
        assert_pair_invariant(&seq);
    }

    #[test]
    fn test_whitespace_variants_between_tokens() {
        let seq = parse_line("echo\t  hi \r there");
        assert_eq!(seq.len(), 1);
        assert_eq!(tokens(&seq[0]), ["echo", "hi", "there"]);
    }

    #[test]
    fn test_whitespace_around_separators() {
        let seq = parse_line("  echo hi | grep h ; pwd  ");
        assert_eq!(seq.len(), 3);
        assert_eq!(tokens(&seq[0]), ["echo", "hi"]);
        assert_eq!(tokens(&seq[1]), ["grep", "h"]);
        assert_eq!(tokens(&seq[2]), ["pwd"]);
        assert_pair_invariant(&seq);
    }

    #[test]
    fn test_token_cap_does_not_leak_into_next_command() {
        let many: Vec<String> = (0..MAX_TOKENS + 3).map(|i| format!("t{}", i)).collect();
        let line = format!("{};pwd", many.join(" "));
        let seq = parse_line(&line);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].tokens.len(), MAX_TOKENS);
        assert_eq!(seq[0].tokens[MAX_TOKENS - 1], "t24");
        assert_eq!(tokens(&seq[1]), ["pwd"]);
    }

    #[test]
    fn test_descriptor_count_matches_nonempty_segments() {
        let cases = [
            ("a;b;c", 3),
            ("a|b|c", 3),
            ("a;;b", 2),
            (";a;", 1),
            ("a | b ; ; c | d", 4),
            ("||;;||", 0),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_line(line).len(), expected, "line {:?}", line);
        }
    }

    #[test]
    fn test_pair_invariant_on_mixed_lines() {
        for line in [
            "a|b|c;d|e;;f|",
            "x|;y|z",
            "|a|b;",
            "a;b|c|",
            "a|b;c",
        ] {
            assert_pair_invariant(&parse_line(line));
        }
    }

    #[test]
    fn test_last_token_runs_to_end_of_line() {
        let seq = parse_line("cat /etc/hostname");
        assert_eq!(tokens(&seq[0]), ["cat", "/etc/hostname"]);
    }
}
