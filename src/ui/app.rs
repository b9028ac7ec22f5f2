use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::editor::{BookSetEditor, Gesture, Notice, Outcome};
use crate::models::BookId;
use crate::store::BookSetStore;

use super::forms::{ConfirmSetRemove, NameForm};
use super::helpers::{book_row_line, centered_rect, notice_style, set_tabs_line};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp / PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the editor.
enum Mode {
    Normal,
    AddingSet(NameForm),
    RenamingSet(NameForm),
    ConfirmSetRemove(ConfirmSetRemove),
    ConfirmQuit,
}

/// Terminal front-end for the book set editor. It owns nothing but the
/// cursor, the modal state and the last notice; everything else is read from
/// the editor each frame.
pub struct App<S: BookSetStore> {
    editor: BookSetEditor<S>,
    cursor: usize,
    mode: Mode,
    status: Option<Notice>,
}

impl<S: BookSetStore> App<S> {
    pub fn new(editor: BookSetEditor<S>) -> Self {
        Self {
            editor,
            cursor: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn editor(&self) -> &BookSetEditor<S> {
        &self.editor
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingSet(form) => self.handle_add_set(code, form),
            Mode::RenamingSet(form) => self.handle_rename_set(code, form),
            Mode::ConfirmSetRemove(confirm) => self.handle_confirm_remove(code, confirm),
            Mode::ConfirmQuit => self.handle_confirm_quit(code, &mut exit),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.editor.has_unsaved_changes() {
                    return Mode::ConfirmQuit;
                }
                *exit = true;
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE_STEP),
            KeyCode::PageDown => self.move_cursor(PAGE_STEP),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.book_count().saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(book) = self.book_under_cursor() {
                    self.dispatch(Gesture::ToggleBook(book));
                }
            }
            KeyCode::Tab | KeyCode::Right => self.switch_relative(1),
            KeyCode::BackTab | KeyCode::Left => self.switch_relative(-1),
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::AddingSet(NameForm::default());
            }
            KeyCode::Char('-') => {
                let view = self.editor.view();
                let name = view.current.to_string();
                if view.can_remove {
                    self.clear_status();
                    return Mode::ConfirmSetRemove(ConfirmSetRemove { name });
                }
                // Let the registry explain why.
                self.dispatch(Gesture::RemoveSet(name));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let view = self.editor.view();
                if view.can_edit {
                    let form = NameForm::with_name(view.current);
                    self.clear_status();
                    return Mode::RenamingSet(form);
                }
                let current = view.current.to_string();
                self.dispatch(Gesture::RenameCurrent(current));
            }
            KeyCode::Char('a') | KeyCode::Char('A') => self.dispatch(Gesture::SelectAll),
            KeyCode::Char('n') | KeyCode::Char('N') => self.dispatch(Gesture::SelectNone),
            KeyCode::Char('i') | KeyCode::Char('I') => self.dispatch(Gesture::SelectInverse),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                let notice = self
                    .editor
                    .retry_save()
                    .into_notice()
                    .unwrap_or_else(|| Notice::info("Nothing to save."));
                self.set_status(notice);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_set(&mut self, code: KeyCode, mut form: NameForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(Notice::info("Add book set cancelled."));
                Mode::Normal
            }
            KeyCode::Enter => {
                let outcome = self.editor.apply(Gesture::AddSet(form.name.clone()));
                self.submit_form(outcome, form, Mode::AddingSet)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::AddingSet(form)
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Mode::AddingSet(form)
            }
            _ => Mode::AddingSet(form),
        }
    }

    fn handle_rename_set(&mut self, code: KeyCode, mut form: NameForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(Notice::info("Rename cancelled."));
                Mode::Normal
            }
            KeyCode::Enter => {
                let outcome = self.editor.apply(Gesture::RenameCurrent(form.name.clone()));
                self.submit_form(outcome, form, Mode::RenamingSet)
            }
            KeyCode::Backspace => {
                form.backspace();
                Mode::RenamingSet(form)
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Mode::RenamingSet(form)
            }
            _ => Mode::RenamingSet(form),
        }
    }

    /// Close the form unless the registry rejected the name. A save failure
    /// still closes it: the change is in memory and the footer says so.
    fn submit_form(
        &mut self,
        outcome: Outcome,
        mut form: NameForm,
        reopen: fn(NameForm) -> Mode,
    ) -> Mode {
        if let Outcome::Rejected(notice) = outcome {
            form.error = Some(notice.text.clone());
            self.set_status(notice);
            return reopen(form);
        }
        self.cursor = self.cursor.min(self.book_count().saturating_sub(1));
        if let Some(notice) = outcome.into_notice() {
            self.set_status(notice);
        }
        Mode::Normal
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmSetRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status(Notice::info("Removal cancelled."));
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.dispatch(Gesture::RemoveSet(confirm.name));
                Mode::Normal
            }
            _ => Mode::ConfirmSetRemove(confirm),
        }
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('w') | KeyCode::Char('W') => {
                if let Outcome::Unsaved(notice) = self.editor.retry_save() {
                    self.set_status(notice);
                    return Mode::ConfirmQuit;
                }
                *exit = true;
                Mode::Normal
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => Mode::Normal,
            _ => Mode::ConfirmQuit,
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_editor(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingSet(form) => self.draw_name_form(frame, area, "Add Book Set", form),
            Mode::RenamingSet(form) => self.draw_name_form(frame, area, "Rename Book Set", form),
            Mode::ConfirmSetRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::ConfirmQuit => self.draw_confirm_quit(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_editor(&self, frame: &mut Frame, area: Rect) {
        let view = self.editor.view();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let tabs = Paragraph::new(set_tabs_line(&view.set_names, view.current))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Search Book Sets"),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(tabs, chunks[0]);

        let locked = !view.can_edit;
        let items: Vec<ListItem> = view
            .rows
            .iter()
            .map(|row| ListItem::new(book_row_line(row, locked)))
            .collect();

        let mut title = format!(
            "{}  ({} of {} books)",
            view.current,
            view.included,
            view.rows.len()
        );
        if locked {
            title.push_str("  [read-only]");
        }
        if view.unsaved {
            title.push_str("  [unsaved]");
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(notice) => Line::from(vec![Span::styled(
                notice.text.clone(),
                notice_style(notice.kind),
            )]),
            None => Line::from(""),
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::styled("[Space]", key_style),
            Span::raw(" Toggle   "),
            Span::styled("[Tab]", key_style),
            Span::raw(" Next Set   "),
            Span::styled("[+/-]", key_style),
            Span::raw(" Add/Remove   "),
            Span::styled("[r]", key_style),
            Span::raw(" Rename   "),
            Span::styled("[a/n/i]", key_style),
            Span::raw(" All/None/Inverse   "),
        ];
        if self.editor.has_unsaved_changes() {
            spans.push(Span::styled("[w]", key_style));
            spans.push(Span::raw(" Retry Save   "));
        }
        spans.push(Span::styled("[q]", key_style));
        spans.push(Span::raw(" Quit"));
        Line::from(spans)
    }

    fn draw_name_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &NameForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line(), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save, Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let prefix = "Name: ".len();
        let offset = u16::try_from(prefix + form.value_len())
            .unwrap_or(u16::MAX)
            .min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x.saturating_add(offset), inner.y));
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSetRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Remove book set '{}'?", confirm.name)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Unsaved Changes")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from("Some book set changes could not be saved."),
            Line::from(""),
            Line::from(Span::styled(
                "W: retry and quit   Y: quit anyway   N / Esc: stay",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    /// Forward a gesture and show the outcome. No-op gestures leave the
    /// previous message in place.
    fn dispatch(&mut self, gesture: Gesture) {
        if let Some(notice) = self.editor.apply(gesture).into_notice() {
            self.set_status(notice);
        }
    }

    fn switch_relative(&mut self, offset: isize) {
        let view = self.editor.view();
        let len = view.set_names.len() as isize;
        if len <= 1 {
            return;
        }
        let index = view
            .set_names
            .iter()
            .position(|name| *name == view.current)
            .unwrap_or(0) as isize;
        let next = (index + offset).rem_euclid(len) as usize;
        let name = view.set_names[next].to_string();
        self.dispatch(Gesture::SwitchSet(name));
    }

    fn book_under_cursor(&self) -> Option<BookId> {
        self.editor
            .registry()
            .catalog()
            .list()
            .get(self.cursor)
            .map(|book| book.id.clone())
    }

    fn book_count(&self) -> usize {
        self.editor.registry().catalog().len()
    }

    fn move_cursor(&mut self, offset: isize) {
        let len = self.book_count() as isize;
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + offset).clamp(0, len - 1) as usize;
    }

    fn set_status(&mut self, notice: Notice) {
        self.status = Some(notice);
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
