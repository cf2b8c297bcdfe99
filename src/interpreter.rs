use crate::env::Environment;
use crate::executor;
use crate::parser;
use crate::remote::RemoteClient;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// The interactive shell: owns the [`Environment`] and the single
/// storage-session handle for the lifetime of the session.
///
/// One line at a time: read, parse, execute to completion (including
/// waiting for every spawned child), repeat until `quit` or end of input.
pub struct Interpreter {
    env: Environment,
    remote: Option<RemoteClient>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            remote: None,
        }
    }

    /// Parse and execute one input line.
    pub fn eval_line(&mut self, line: &str) -> Result<()> {
        let sequence = parser::parse_line(line);
        executor::run_commands(&sequence, &mut self.env, &mut self.remote)
    }

    /// True once a `quit` verb has been executed.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    fn prompt(&self) -> String {
        format!("\x1b[1;32m[{}]\x1b[0m $ ", self.env.current_dir.display())
    }

    /// The read-eval-print loop. Returns on `quit` or end of input.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    let line = line.trim_end();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;
                    if let Err(e) = self.eval_line(line) {
                        eprintln!("cloudsh: {:#}", e);
                    }
                    if self.should_exit() {
                        break;
                    }
                }
                // ^C drops the in-progress line but keeps the session.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("cloudsh: read error: {}", err);
                    break;
                }
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
