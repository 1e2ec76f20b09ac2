//! The in-memory store of student records and administrator credentials.
//!
//! The store is the only writer of its backing file. Every mutation is applied
//! in memory first and then the whole file is rewritten (temp file + rename),
//! so what is on disk always matches the last successful call.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::models::{Credentials, RecordId, StudentDraft, StudentRecord};

use super::codec::{self, Document};
use super::error::{Result, StoreError};
use super::location::ensure_parent_dir;

/// Administrator created when a file holds no credentials.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Authoritative holder of all student records and administrator credentials.
/// A store is created once per process through [`Store::initialize`] and owns
/// its backing file exclusively; nothing else is expected to write to it.
pub struct Store {
    /// Records file rewritten after every mutation.
    path: PathBuf,
    /// Administrator logins. Only populated from the file or by the bootstrap.
    credentials: Credentials,
    /// Records in insertion order, which is also the display order.
    records: Vec<StudentRecord>,
    /// Id handed to the next added record. `None` once the id space is used up,
    /// which only happens when a file carries ids near `RecordId::MAX`.
    next_id: Option<RecordId>,
    /// Set when `initialize` found no credentials and created the default admin,
    /// so the front-end can show the login once.
    created_default_admin: bool,
}

impl Store {
    /// Load the store from `path`. A missing file is an empty store. When no
    /// administrator exists afterwards the default one is created and saved.
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let Document {
            credentials,
            records,
        } = read_document(&path)?;

        let mut store = Self {
            path,
            credentials,
            records: Vec::new(),
            next_id: Some(1),
            created_default_admin: false,
        };
        store.absorb_records(records);

        tracing::info!(
            path = %store.path.display(),
            records = store.records.len(),
            admins = store.credentials.len(),
            "loaded student records"
        );

        if store.credentials.is_empty() {
            store
                .credentials
                .insert(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD);
            store.created_default_admin = true;
            tracing::info!(username = DEFAULT_ADMIN_USERNAME, "created default admin");
            if let Err(err) = store.persist() {
                tracing::error!(error = %err, "default admin is only held in memory");
            }
        }

        Ok(store)
    }

    /// Whether [`Store::initialize`] had to create the default administrator.
    pub fn created_default_admin(&self) -> bool {
        self.created_default_admin
    }

    /// Location of the backing records file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact, case-sensitive username and password check. Unknown users and
    /// wrong passwords both just return `false`.
    pub fn verify_credential(&self, username: &str, password: &str) -> bool {
        let ok = self.credentials.verify(username, password);
        if !ok {
            tracing::info!(username, "rejected login");
        }
        ok
    }

    /// Insert a new record and return its id.
    pub fn add_record(&mut self, draft: StudentDraft) -> Result<RecordId> {
        validate(&draft)?;
        if self.registration_taken(&draft.registration_number, None) {
            return Err(StoreError::DuplicateRegistration(draft.registration_number));
        }

        let id = self.next_id.ok_or(StoreError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        self.records.push(draft.into_record(id));
        tracing::info!(id, "added student record");

        self.persist()?;
        Ok(id)
    }

    /// Copies of every record in insertion order.
    pub fn list_records(&self) -> Vec<StudentRecord> {
        self.records.clone()
    }

    /// Copy of the record with `id`; changing it does not affect the store.
    pub fn get_record(&self, id: RecordId) -> Result<StudentRecord> {
        self.records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Overwrite all four editable fields of record `id`. Keeping the record's
    /// own registration number is not a collision.
    pub fn update_record(&mut self, id: RecordId, draft: StudentDraft) -> Result<()> {
        let index = self.position(id)?;
        validate(&draft)?;
        if self.registration_taken(&draft.registration_number, Some(id)) {
            return Err(StoreError::DuplicateRegistration(draft.registration_number));
        }

        self.records[index] = draft.into_record(id);
        tracing::info!(id, "updated student record");

        self.persist()
    }

    /// Remove record `id` for good and rewrite the file. Its id is not reused.
    pub fn delete_record(&mut self, id: RecordId) -> Result<()> {
        let index = self.position(id)?;
        self.records.remove(index);
        tracing::info!(id, "deleted student record");

        self.persist()
    }

    /// Case-insensitive substring search over name, registration number and
    /// major. An empty query returns every record.
    pub fn search_records(&self, query: &str) -> Vec<StudentRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.matches(&needle))
            .cloned()
            .collect()
    }

    /// Rewrite the backing file with the current state. Used at shutdown.
    pub fn flush(&self) -> Result<()> {
        self.persist()
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn registration_taken(&self, registration_number: &str, except: Option<RecordId>) -> bool {
        self.records.iter().any(|record| {
            Some(record.id) != except && record.registration_number == registration_number
        })
    }

    /// Take decoded records, dropping any that would break id or registration
    /// uniqueness, and move `next_id` past the highest id seen.
    fn absorb_records(&mut self, records: Vec<StudentRecord>) {
        let mut ids = HashSet::new();
        let mut registrations = HashSet::new();

        for record in records {
            if !ids.insert(record.id) {
                tracing::warn!(id = record.id, "dropping record with duplicate id");
                continue;
            }
            if !registrations.insert(record.registration_number.clone()) {
                tracing::warn!(
                    id = record.id,
                    registration = %record.registration_number,
                    "dropping record with duplicate registration number"
                );
                continue;
            }
            self.next_id = match (self.next_id, record.id.checked_add(1)) {
                (Some(current), Some(after)) => Some(current.max(after)),
                _ => None,
            };
            self.records.push(record);
        }
    }

    fn persist(&self) -> Result<()> {
        let text = codec::encode(&self.credentials, &self.records);
        write_atomically(&self.path, text.as_bytes()).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "failed to save records");
            StoreError::PersistenceUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "saved records");
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no records file yet, starting empty");
            return Ok(Document::default());
        }
        Err(source) => {
            return Err(StoreError::Load {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), "records file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    Ok(codec::decode(&text))
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn validate(draft: &StudentDraft) -> Result<()> {
    let checks = [
        ("Name", draft.name.as_str(), true),
        ("Registration number", draft.registration_number.as_str(), true),
        ("Major", draft.major.as_str(), false),
    ];

    for (field, value, pipe_forbidden) in checks {
        if value.contains(['\n', '\r']) {
            return Err(StoreError::InvalidField {
                field,
                reason: "line breaks",
            });
        }
        if pipe_forbidden && value.contains('|') {
            return Err(StoreError::InvalidField {
                field,
                reason: "'|'",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn scratch() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.db");
        (dir, path)
    }

    fn draft(name: &str, reg: &str, major: &str) -> StudentDraft {
        StudentDraft::new(name, reg, 20, major)
    }

    fn seeded(path: &Path, body: &str) -> Store {
        fs::write(path, format!("[ADMINS]\nadmin:secret\n[STUDENTS]\n{body}")).unwrap();
        Store::initialize(path).unwrap()
    }

    #[test]
    fn bootstrap_creates_and_persists_single_admin() {
        let (_dir, path) = scratch();
        let store = Store::initialize(&path).unwrap();

        assert!(store.created_default_admin());
        assert!(store.verify_credential(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD));

        let on_disk = codec::decode(&fs::read_to_string(&path).unwrap());
        assert_eq!(on_disk.credentials.len(), 1);
        assert!(on_disk.records.is_empty());
    }

    #[test]
    fn existing_admins_skip_bootstrap() {
        let (_dir, path) = scratch();
        let store = seeded(&path, "");
        assert!(!store.created_default_admin());
        assert!(store.verify_credential("admin", "secret"));
        assert!(!store.verify_credential("admin", "admin123"));
        assert!(!store.verify_credential("ghost", "secret"));
    }

    #[test]
    fn next_id_follows_highest_loaded_id() {
        let (_dir, path) = scratch();
        let mut store = seeded(&path, "3|A|R3|20|M\n7|B|R7|20|M\n5|C|R5|20|M\n");
        let id = store.add_record(draft("D", "R8", "M")).unwrap();
        assert_eq!(id, 8);
    }

    #[test]
    fn highest_possible_id_loads_but_blocks_new_records() {
        let (_dir, path) = scratch();
        let mut store = seeded(&path, &format!("{}|A|R1|20|M\n", RecordId::MAX));
        assert_eq!(store.len(), 1);

        let err = store.add_record(draft("B", "R2", "M")).unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn last_free_id_is_assigned_once() {
        let (_dir, path) = scratch();
        let mut store = seeded(&path, &format!("{}|A|R1|20|M\n", RecordId::MAX - 1));

        let id = store.add_record(draft("B", "R2", "M")).unwrap();
        assert_eq!(id, RecordId::MAX);
        assert!(matches!(
            store.add_record(draft("C", "R3", "M")),
            Err(StoreError::IdsExhausted)
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let first = store.add_record(draft("A", "R1", "M")).unwrap();
        store.delete_record(first).unwrap();
        let second = store.add_record(draft("B", "R2", "M")).unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn duplicate_registration_is_rejected_on_add() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        store.add_record(draft("A", "REG1", "M")).unwrap();

        let err = store.add_record(draft("B", "REG1", "M")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRegistration(ref reg) if reg == "REG1"));
        assert_eq!(store.len(), 1);

        // Uniqueness is case-sensitive.
        store.add_record(draft("C", "reg1", "M")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_allows_keeping_own_registration() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let id = store.add_record(draft("A", "REG1", "M")).unwrap();

        store
            .update_record(id, StudentDraft::new("Ann", "REG1", 30, "Physics"))
            .unwrap();
        let record = store.get_record(id).unwrap();
        assert_eq!(record.name, "Ann");
        assert_eq!(record.age, 30);
        assert_eq!(record.major, "Physics");
    }

    #[test]
    fn update_rejects_registration_of_another_record() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let a = store.add_record(draft("A", "REG1", "M")).unwrap();
        store.add_record(draft("B", "REG2", "M")).unwrap();

        let err = store.update_record(a, draft("A", "REG2", "M")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateRegistration(_)));
        assert_eq!(store.get_record(a).unwrap().registration_number, "REG1");
    }

    #[test]
    fn update_and_delete_of_unknown_id_are_not_found() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        assert!(matches!(
            store.update_record(42, draft("A", "R", "M")),
            Err(StoreError::NotFound(42))
        ));
        assert!(matches!(store.delete_record(42), Err(StoreError::NotFound(42))));
        assert!(matches!(store.get_record(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let id = store.add_record(draft("A", "R1", "M")).unwrap();
        store.delete_record(id).unwrap();
        assert!(matches!(store.get_record(id), Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn get_record_returns_a_detached_copy() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let id = store.add_record(draft("A", "R1", "M")).unwrap();

        let mut copy = store.get_record(id).unwrap();
        copy.name.push_str(" changed");
        assert_eq!(store.get_record(id).unwrap().name, "A");
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        store.add_record(draft("Ada", "REG1", "Computer Science")).unwrap();
        store.add_record(draft("Alan", "MATH-7", "Mathematics")).unwrap();

        let names = |query: &str| -> Vec<String> {
            store
                .search_records(query)
                .into_iter()
                .map(|r| r.name)
                .collect()
        };
        assert_eq!(names("computer"), vec!["Ada"]);
        assert_eq!(names("SCI"), vec!["Ada"]);
        assert_eq!(names("math"), vec!["Alan"]);
        assert_eq!(names("a"), vec!["Ada", "Alan"]);
        assert_eq!(names(""), vec!["Ada", "Alan"]);
        assert!(names("biology").is_empty());
    }

    #[test]
    fn mutations_are_visible_after_reload() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let a = store.add_record(draft("A", "R1", "M")).unwrap();
        let b = store.add_record(draft("B", "R2", "M")).unwrap();
        store.update_record(b, draft("Bea", "R2", "Music")).unwrap();
        store.delete_record(a).unwrap();

        let reloaded = Store::initialize(&path).unwrap();
        assert!(!reloaded.created_default_admin());
        assert_eq!(reloaded.list_records(), store.list_records());

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }

    #[test]
    fn invalid_fields_are_rejected_before_touching_state() {
        let (_dir, path) = scratch();
        let mut store = Store::initialize(&path).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let err = store.add_record(draft("A|B", "R1", "M")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "Name", .. }));
        let err = store.add_record(draft("A", "R1", "line\nbreak")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "Major", .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert!(store.is_empty());

        // A pipe in the final field is representable.
        store.add_record(draft("A", "R1", "Arts|Crafts")).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_rows_in_file_keep_the_first() {
        let (_dir, path) = scratch();
        let store = seeded(
            &path,
            "1|A|REG1|20|M\n2|B|REG1|20|M\n1|C|REG3|20|M\n4|D|REG4|20|M\n",
        );
        let ids: Vec<_> = store.list_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn unreadable_path_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Store::initialize(dir.path()).err().unwrap();
        assert!(matches!(err, StoreError::Load { .. }));
    }

    #[test]
    fn failed_save_keeps_in_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.db");
        let mut store = Store::initialize(&path).unwrap();

        // Turn the target into a directory so the rename cannot succeed.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store.add_record(draft("A", "R1", "M")).unwrap_err();
        assert!(matches!(err, StoreError::PersistenceUnavailable { .. }));
        assert_eq!(store.len(), 1);
        assert!(store.flush().is_err());
    }
}
