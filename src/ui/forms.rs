use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{RecordId, StudentDraft, StudentRecord};

/// Longest age input accepted by the form.
const AGE_MAX_DIGITS: usize = 3;

/// Which login field receives keystrokes.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LoginField {
    #[default]
    Username,
    Password,
}

/// Username/password entry shown before the dashboard.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) active: LoginField,
    pub(crate) error: Option<String>,
}

impl LoginForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoginField::Username => self.username.push(ch),
            LoginField::Password => self.password.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoginField::Username => {
                self.username.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    /// Clear the password after a failed attempt but keep the username.
    pub(crate) fn reject(&mut self, message: &str) {
        self.password.clear();
        self.active = LoginField::Password;
        self.error = Some(message.to_string());
    }

    /// Render a field line. The password is only ever shown as asterisks.
    pub(crate) fn build_line(&self, field: LoginField) -> Line<'static> {
        let (label, display, is_active) = match field {
            LoginField::Username => (
                "Username",
                self.username.clone(),
                self.active == LoginField::Username,
            ),
            LoginField::Password => (
                "Password",
                "*".repeat(self.password.chars().count()),
                self.active == LoginField::Password,
            ),
        };
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: LoginField) -> usize {
        match field {
            LoginField::Username => self.username.chars().count(),
            LoginField::Password => self.password.chars().count(),
        }
    }
}

/// Fields of the student form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum StudentField {
    #[default]
    Name,
    RegistrationNumber,
    Age,
    Major,
}

impl StudentField {
    pub(crate) const ALL: [StudentField; 4] = [
        StudentField::Name,
        StudentField::RegistrationNumber,
        StudentField::Age,
        StudentField::Major,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            StudentField::Name => "Full Name",
            StudentField::RegistrationNumber => "Registration Number",
            StudentField::Age => "Age",
            StudentField::Major => "Major/Department",
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }
}

/// Form state for adding a student or editing an existing one.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    pub(crate) name: String,
    pub(crate) registration_number: String,
    pub(crate) age: String,
    pub(crate) major: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

impl StudentForm {
    /// Pre-fill every field so an edit that touches nothing keeps the record as is.
    pub(crate) fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            registration_number: record.registration_number.clone(),
            age: record.age.to_string(),
            major: record.major.clone(),
            active: StudentField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        let idx = (self.active.index() + 1) % StudentField::ALL.len();
        self.active = StudentField::ALL[idx];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = StudentField::ALL.len();
        let idx = (self.active.index() + len - 1) % len;
        self.active = StudentField::ALL[idx];
    }

    fn value(&self, field: StudentField) -> &String {
        match field {
            StudentField::Name => &self.name,
            StudentField::RegistrationNumber => &self.registration_number,
            StudentField::Age => &self.age,
            StudentField::Major => &self.major,
        }
    }

    fn value_mut(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::Name => &mut self.name,
            StudentField::RegistrationNumber => &mut self.registration_number,
            StudentField::Age => &mut self.age,
            StudentField::Major => &mut self.major,
        }
    }

    /// Append a character to the active field. Age only takes digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == StudentField::Age
            && (!ch.is_ascii_digit() || self.age.len() >= AGE_MAX_DIGITS)
        {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Validate inputs and build the draft handed to the store.
    pub(crate) fn parse_inputs(&self) -> Result<StudentDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Full name is required."));
        }
        let registration_number = self.registration_number.trim();
        if registration_number.is_empty() {
            return Err(anyhow!("Registration number is required."));
        }
        let age_raw = self.age.trim();
        if age_raw.is_empty() {
            return Err(anyhow!("Age is required."));
        }
        let age = age_raw
            .parse::<i32>()
            .context("Age must be an integer.")?;
        let major = self.major.trim();
        if major.is_empty() {
            return Err(anyhow!("Major is required."));
        }
        Ok(StudentDraft::new(name, registration_number, age, major))
    }

    pub(crate) fn build_line(&self, field: StudentField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        self.value(field).chars().count()
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: RecordId,
    pub(crate) summary: String,
}

impl ConfirmDelete {
    pub(crate) fn from(record: &StudentRecord) -> Self {
        Self {
            id: record.id,
            summary: record.display_line(),
        }
    }
}

/// Input for the "go to student by ID" prompt.
#[derive(Default, Clone)]
pub(crate) struct IdPrompt {
    pub(crate) input: String,
    pub(crate) error: Option<String>,
}

impl IdPrompt {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() && self.input.len() < 18 {
            self.input.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn parse(&self) -> Result<RecordId> {
        let raw = self.input.trim();
        if raw.is_empty() {
            return Err(anyhow!("Enter a student ID."));
        }
        raw.parse::<RecordId>()
            .context("Student ID must be a number.")
    }
}
