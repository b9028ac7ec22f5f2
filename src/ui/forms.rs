use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Single-field form used to add or rename a book set. Validation happens in
/// the registry; the form only collects text and shows the last error.
#[derive(Default, Clone)]
pub(crate) struct NameForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl NameForm {
    /// Pre-fill the form, e.g. with the name being renamed.
    pub(crate) fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error: None,
        }
    }

    /// Append a character, ignoring control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.name.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    /// Render the input line for the form widget.
    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.name.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.name.clone(), Style::default().fg(Color::Yellow))
        };

        Line::from(vec![Span::raw("Name: "), Span::styled(display, style)])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.name.chars().count()
    }
}

/// Pending removal awaiting a yes/no answer.
#[derive(Clone)]
pub(crate) struct ConfirmSetRemove {
    pub(crate) name: String,
}
