//! Domain models shared by the store, the text codec and the TUI. They are
//! plain data holders; uniqueness and persistence rules live in `db::store`.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier assigned by the store. Always positive.
pub type RecordId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One student's stored data. Values handed out by the store are copies, so
/// editing one never reaches back into the store.
pub struct StudentRecord {
    /// Assigned on insert, never reused while the process runs.
    pub id: RecordId,
    pub name: String,
    /// Unique across the store (exact, case-sensitive comparison).
    pub registration_number: String,
    pub age: i32,
    pub major: String,
}

impl StudentRecord {
    /// `Name - REG` summary used by list rows and confirmation dialogs.
    pub fn display_line(&self) -> String {
        if self.registration_number.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.registration_number)
        }
    }

    /// Case-insensitive substring match against name, registration number and
    /// major. `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.registration_number, &self.major]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.display_line())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The caller-supplied fields for adding or replacing a record. Updates
/// overwrite all four, so callers pass unchanged values through to keep them.
pub struct StudentDraft {
    pub name: String,
    pub registration_number: String,
    pub age: i32,
    pub major: String,
}

impl StudentDraft {
    pub fn new(
        name: impl Into<String>,
        registration_number: impl Into<String>,
        age: i32,
        major: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            registration_number: registration_number.into(),
            age,
            major: major.into(),
        }
    }

    pub(crate) fn into_record(self, id: RecordId) -> StudentRecord {
        StudentRecord {
            id,
            name: self.name,
            registration_number: self.registration_number,
            age: self.age,
            major: self.major,
        }
    }
}

impl From<&StudentRecord> for StudentDraft {
    fn from(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            registration_number: record.registration_number.clone(),
            age: record.age,
            major: record.major.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Administrator username -> password table. Passwords are kept in plaintext,
/// matching the on-disk format. Ordered so the file is written sorted by user.
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the password for `username`.
    pub fn insert(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.0.insert(username.into(), password.into());
    }

    /// Exact-match lookup. Unknown users simply fail.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.0
            .get(username)
            .is_some_and(|stored| stored == password)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}
