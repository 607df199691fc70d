use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::IgtokenError;

/// Blocking user interaction used by the interactive flows.
pub trait Prompter {
    /// A line of text. An empty answer yields `default` when one is given.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, IgtokenError>;

    /// A line of text that is not echoed when read from a terminal.
    fn secret(&mut self, message: &str) -> Result<String, IgtokenError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, IgtokenError>;

    /// Index into `choices` of the picked entry.
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, IgtokenError>;

    /// Try to open `url` in a browser. Returns `false` when that failed.
    fn open_url(&mut self, url: &str) -> bool;

    fn progress(&mut self, message: &str);
}

/// [`Prompter`] over a line reader, writing prompts to stdout.
pub struct TerminalPrompter<R> {
    reader: R,
    interactive: bool,
}

impl TerminalPrompter<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Self {
            reader: stdin.lock(),
            interactive,
        }
    }
}

impl<R: BufRead> TerminalPrompter<R> {
    /// Non-interactive prompter: secrets are read as plain lines.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            interactive: false,
        }
    }

    fn read_line(&mut self, message: &str) -> Result<String, IgtokenError> {
        print!("{message}");
        io::stdout().flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(IgtokenError::validation("input", "unexpected end of input"));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead> Prompter for TerminalPrompter<R> {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, IgtokenError> {
        let label = match default {
            Some(d) => format!("{message} [{d}]: "),
            None => format!("{message}: "),
        };
        let answer = self.read_line(&label)?;
        match default {
            Some(d) if answer.is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn secret(&mut self, message: &str) -> Result<String, IgtokenError> {
        if !self.interactive {
            return self.read_line(&format!("{message}: "));
        }
        print!("{message}: ");
        io::stdout().flush()?;
        let secret = rpassword::read_password()?;
        Ok(secret.trim().to_string())
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, IgtokenError> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.read_line(&format!("{message} [{hint}]: "))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("Please answer y or n."),
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, IgtokenError> {
        if choices.is_empty() {
            return Err(IgtokenError::validation("selection", "nothing to choose from"));
        }
        println!("{message}");
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}. {choice}", i + 1);
        }
        loop {
            let answer = self.read_line(&format!("Choose 1-{}: ", choices.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => println!("Invalid choice. Enter a number between 1 and {}.", choices.len()),
            }
        }
    }

    fn open_url(&mut self, url: &str) -> bool {
        if !self.interactive {
            return false;
        }
        match webbrowser::open(url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("could not open browser: {e}");
                false
            }
        }
    }

    fn progress(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
