use std::io;

use console::Term;

/// The terminal as seen by the menu loop.
pub trait MenuIo {
    /// Reads one keystroke without echoing it.
    fn read_key(&mut self) -> io::Result<char>;
    /// Reads one line, without its line terminator.
    fn read_line(&mut self) -> io::Result<String>;
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text)?;
        self.write("\n")
    }

    fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        self.write(prompt)?;
        self.read_line()
    }
}

/// [`MenuIo`] over the process's terminal.
#[derive(Debug, Clone)]
pub struct TermMenuIo {
    term: Term,
}

impl TermMenuIo {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermMenuIo {
    fn default() -> Self {
        Self::stdout()
    }
}

impl MenuIo for TermMenuIo {
    fn read_key(&mut self) -> io::Result<char> {
        self.term.read_char()
    }

    fn read_line(&mut self) -> io::Result<String> {
        let line = self.term.read_line()?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        self.term.flush()
    }
}
