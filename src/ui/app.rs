use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::db::{Store, StoreError, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use crate::models::{RecordId, StudentRecord};

use super::forms::{ConfirmDelete, IdPrompt, LoginField, LoginForm, StudentField, StudentForm};
use super::helpers::{centered_rect, record_detail_lines, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows of the title banner on the login screen.
const BANNER: &[&str] = &[
    "  _____ _             _            _   ",
    " / ____| |           | |          | |  ",
    "| (___ | |_ _   _  __| | ___ _ __ | |_ ",
    " \\___ \\| __| | | |/ _` |/ _ \\ '_ \\| __|",
    " ____) | |_| |_| | (_| |  __/ | | | |_ ",
    "|_____/ \\__|\\__,_|\\__,_|\\___|_| |_|\\__|",
    "",
    "       Record Management System",
];

/// Top-level navigation: nothing past the login form is reachable without
/// valid credentials.
enum Screen {
    Login(LoginForm),
    Records,
}

/// Modal states layered over the records screen.
enum Mode {
    Normal,
    Adding(StudentForm),
    Editing { id: RecordId, form: StudentForm },
    ConfirmDelete(ConfirmDelete),
    Searching(SearchState),
    GoToId(IdPrompt),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the TUI. Owns the store for the whole session.
pub struct App {
    store: Store,
    records: Vec<StudentRecord>,
    selected: usize,
    filter: Option<String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store) -> Self {
        let status = store.created_default_admin().then(|| StatusMessage {
            text: format!(
                "Default admin created: username='{DEFAULT_ADMIN_USERNAME}', password='{DEFAULT_ADMIN_PASSWORD}'"
            ),
            kind: StatusKind::Info,
        });
        Self {
            store,
            records: Vec::new(),
            selected: 0,
            filter: None,
            screen: Screen::Login(LoginForm::default()),
            mode: Mode::Normal,
            status,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.screen, Screen::Records)
    }

    /// Route a key press to the active screen or modal. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;

        if let Screen::Login(form) = &mut self.screen {
            let form = mem::take(form);
            self.handle_login_key(code, form, &mut exit);
            return Ok(exit);
        }

        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add_student(code, form),
            Mode::Editing { id, form } => self.handle_edit_student(code, id, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::GoToId(prompt) => self.handle_go_to_id(code, prompt),
        };

        Ok(exit)
    }

    fn handle_login_key(&mut self, code: KeyCode, mut form: LoginForm, exit: &mut bool) {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter if form.active == LoginField::Username => form.toggle_field(),
            KeyCode::Enter => {
                if self.store.verify_credential(&form.username, &form.password) {
                    self.log_in(&form.username);
                    return;
                }
                form.reject("Invalid credentials!");
                self.set_status("Invalid credentials!", StatusKind::Error);
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        self.screen = Screen::Login(form);
    }

    fn log_in(&mut self, username: &str) {
        tracing::info!(username, "admin logged in");
        self.screen = Screen::Records;
        self.mode = Mode::Normal;
        self.filter = None;
        self.selected = 0;
        self.refresh_records(None);
        self.set_status(
            format!("Login successful! Welcome, {username}!"),
            StatusKind::Info,
        );
    }

    fn log_out(&mut self) {
        tracing::info!("admin logged out");
        self.screen = Screen::Login(LoginForm::default());
        self.mode = Mode::Normal;
        self.records.clear();
        self.filter = None;
        self.selected = 0;
        self.set_status("Logged out successfully!", StatusKind::Info);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Esc if self.filter.is_some() => {
                self.filter = None;
                self.refresh_records(self.current_record().map(|r| r.id));
                self.set_status("Search cleared.", StatusKind::Info);
            }
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.records.len().saturating_sub(1),
            KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Adding(StudentForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(record) = self.current_record() {
                    let form = StudentForm::from_record(record);
                    let id = record.id;
                    self.clear_status();
                    return Ok(Mode::Editing { id, form });
                }
                self.set_status("No students to update.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.current_record() {
                    return Ok(Mode::ConfirmDelete(ConfirmDelete::from(record)));
                }
                self.set_status("No students to delete.", StatusKind::Error);
            }
            KeyCode::Char('/') | KeyCode::Char('s') => {
                let query = self.filter.clone().unwrap_or_default();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('g') => return Ok(Mode::GoToId(IdPrompt::default())),
            KeyCode::Char('l') => self.log_out(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_student(&mut self, code: KeyCode, mut form: StudentForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add student cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_student(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::Adding(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_edit_student(&mut self, code: KeyCode, id: RecordId, mut form: StudentForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Update cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_student(id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::Editing { id, form }
        } else {
            Mode::Normal
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Err(err) = self.perform_delete(&confirm) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
                Mode::Normal
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.filter = None;
                self.refresh_records(None);
                self.set_status("Search cleared.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                self.apply_filter(&state.query);
                let count = self.records.len();
                if state.query.is_empty() {
                    self.clear_status();
                } else if count == 0 {
                    self.set_status(
                        format!("No students found matching '{}'", state.query),
                        StatusKind::Error,
                    );
                } else {
                    self.set_status(
                        format!("Found {count} result(s) for '{}'", state.query),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Mode::Searching(state),
        }
        self.apply_filter(&state.query);
        Mode::Searching(state)
    }

    fn handle_go_to_id(&mut self, code: KeyCode, mut prompt: IdPrompt) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Enter => match self.jump_to_record(&prompt) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if prompt.push_char(ch) {
                    prompt.error = None;
                }
            }
            _ => {}
        }
        Mode::GoToId(prompt)
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

        match &self.screen {
            Screen::Login(form) => self.draw_login(frame, content_area, form),
            Screen::Records => self.draw_records(frame, content_area),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if matches!(self.screen, Screen::Login(_)) {
            return;
        }

        match &self.mode {
            Mode::Adding(form) => self.draw_student_form(frame, area, "Add New Student", form),
            Mode::Editing { id, form } => {
                self.draw_student_form(frame, area, &format!("Update Student {id}"), form)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::GoToId(prompt) => self.draw_id_prompt(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(BANNER.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let banner: Vec<Line> = BANNER
            .iter()
            .map(|row| {
                Line::from(Span::styled(
                    *row,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            })
            .collect();
        frame.render_widget(
            Paragraph::new(banner)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::BOTTOM)),
            chunks[0],
        );

        let popup_area = centered_rect(50, 60, chunks[1]);
        frame.render_widget(Clear, popup_area);
        let block = Block::default().title("Admin Login").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(LoginField::Username),
            form.build_line(LoginField::Password),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to log in • Tab to switch • Esc to exit",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            LoginField::Username => ("Username: ".len(), 0),
            LoginField::Password => ("Password: ".len(), 1),
        };
        let cursor_x = inner.x + prefix as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_records(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let title = match &self.filter {
            Some(query) => format!(
                " Search '{}': {} result(s) ",
                query,
                self.records.len()
            ),
            None => format!(" All Students: {} ", self.records.len()),
        };
        let list_block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.records.is_empty() {
            let message = match &self.filter {
                Some(query) => format!("No students found matching '{query}'"),
                None => "No students found in the database.".to_string(),
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(list_block)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, chunks[0]);
        } else {
            let items: Vec<ListItem> = self
                .records
                .iter()
                .map(|record| ListItem::new(record.to_string()))
                .collect();
            let list = List::new(items)
                .block(list_block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            let mut state = ListState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(list, chunks[0], &mut state);
        }

        let detail_block = Block::default()
            .title(" Student Details ")
            .borders(Borders::ALL);
        let detail_lines = match self.current_record() {
            Some(record) => record_detail_lines(record),
            None => vec![Line::from("")],
        };
        frame.render_widget(
            Paragraph::new(detail_lines)
                .block(detail_block)
                .wrap(Wrap { trim: false }),
            chunks[1],
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.screen, &self.mode) {
            (Screen::Login(_), _) => &[("[Enter]", " Log in   "), ("[Esc]", " Exit")],
            (_, Mode::Adding(_)) | (_, Mode::Editing { .. }) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmDelete(_)) => &[("[Y]", " Delete   "), ("[N]", " Keep")],
            (_, Mode::Searching(_)) => &[
                ("[Enter]", " Keep results   "),
                ("[Esc]", " Clear search"),
            ],
            (_, Mode::GoToId(_)) => &[("[Enter]", " Go   "), ("[Esc]", " Cancel")],
            (Screen::Records, Mode::Normal) => &[
                ("[↑↓]", " Navigate   "),
                ("[A]", " Add   "),
                ("[E]", " Edit   "),
                ("[D]", " Delete   "),
                ("[/]", " Search   "),
                ("[G]", " Go to ID   "),
                ("[L]", " Logout   "),
                ("[Q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, action)| {
                    [Span::styled(*key, key_style), Span::raw(*action)]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = StudentField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = StudentField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or_default() as u16;
        let prefix = form.active.label().len() as u16 + 2;
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Student")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                format!("About to delete: {} (ID {})", confirm.summary, confirm.id),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from("This cannot be undone."),
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

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search (name, reg no, or major)");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_id_prompt(&self, frame: &mut Frame, area: Rect, prompt: &IdPrompt) {
        let popup_area = centered_rect(40, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("View Student by ID")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Student ID: {}", prompt.input))];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Student ID: ".len() as u16 + prompt.input.len() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new_student(&mut self, form: &StudentForm) -> Result<()> {
        let draft = form.parse_inputs()?;
        match self.store.add_record(draft) {
            Ok(id) => {
                self.refresh_records(Some(id));
                self.set_status(
                    format!("Student added successfully! (ID: {id})"),
                    StatusKind::Info,
                );
                Ok(())
            }
            Err(err @ StoreError::PersistenceUnavailable { .. }) => {
                self.report_unsaved(err);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save_existing_student(&mut self, id: RecordId, form: &StudentForm) -> Result<()> {
        let draft = form.parse_inputs()?;
        match self.store.update_record(id, draft) {
            Ok(()) => {
                self.refresh_records(Some(id));
                self.set_status("Student updated successfully!", StatusKind::Info);
                Ok(())
            }
            Err(err @ StoreError::PersistenceUnavailable { .. }) => {
                self.report_unsaved(err);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        match self.store.delete_record(confirm.id) {
            Ok(()) => {
                self.refresh_records(None);
                self.set_status("Student deleted successfully!", StatusKind::Info);
                Ok(())
            }
            Err(err @ StoreError::PersistenceUnavailable { .. }) => {
                self.report_unsaved(err);
                Ok(())
            }
            Err(err) => {
                self.refresh_records(None);
                Err(err.into())
            }
        }
    }

    /// The change went through in memory but the file was not written.
    fn report_unsaved(&mut self, err: StoreError) {
        self.refresh_records(None);
        self.set_status(
            format!("{err} (changes kept in memory)"),
            StatusKind::Error,
        );
    }

    fn jump_to_record(&mut self, prompt: &IdPrompt) -> Result<()> {
        let id = prompt.parse()?;
        let record = self.store.get_record(id)?;
        if !self.records.iter().any(|r| r.id == record.id) {
            self.filter = None;
        }
        self.refresh_records(Some(record.id));
        self.set_status(format!("Showing {record}"), StatusKind::Info);
        Ok(())
    }

    fn apply_filter(&mut self, query: &str) {
        self.filter = (!query.is_empty()).then(|| query.to_string());
        self.selected = 0;
        self.refresh_records(None);
    }

    /// Re-read the visible records from the store, keeping `focus_id` selected
    /// when it is still visible.
    fn refresh_records(&mut self, focus_id: Option<RecordId>) {
        self.records = match &self.filter {
            Some(query) => self.store.search_records(query),
            None => self.store.list_records(),
        };

        if let Some(id) = focus_id {
            if let Some(idx) = self.records.iter().position(|r| r.id == id) {
                self.selected = idx;
                return;
            }
        }

        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
    }

    fn current_record(&self) -> Option<&StudentRecord> {
        self.records.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let max = self.records.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(max);
    }
}
