//! Colored terminal output on stderr.

use console::{Style, Term};

/// How a line is styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Highlight,
    Warning,
    Error,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Tone::Plain => Style::new(),
            Tone::Highlight => Style::new().cyan().bold(),
            Tone::Warning => Style::new().yellow(),
            Tone::Error => Style::new().red(),
        }
    }
}

/// Writes styled status lines for the CLI.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Write one line. Failures to write to the terminal are ignored.
    pub(crate) fn print(&self, tone: Tone, msg: &str) {
        let _ = self.term.write_line(&tone.style().apply_to(msg).to_string());
    }
}
