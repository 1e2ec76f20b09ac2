//! Line-oriented text format for the records file:
//!
//! ```text
//! # comment
//! [ADMINS]
//! <username>:<password>
//! [STUDENTS]
//! <id>|<name>|<registration number>|<age>|<major>
//! ```
//!
//! Decoding is lenient: lines that do not fit their section are skipped and
//! logged, never reported as errors.

use std::fmt::Write as _;

use crate::models::{Credentials, RecordId, StudentRecord};

const FILE_HEADER: &str = "# Student Management System Database";
const ADMINS_MARKER: &str = "[ADMINS]";
const STUDENTS_MARKER: &str = "[STUDENTS]";

/// Everything the records file holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub credentials: Credentials,
    pub records: Vec<StudentRecord>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Admins,
    Students,
}

/// Parse the full file contents. Malformed lines are dropped with a warning.
pub fn decode(raw: &str) -> Document {
    let mut doc = Document::default();
    let mut section = Section::None;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || line.starts_with('#') {
            continue;
        }

        match trimmed {
            ADMINS_MARKER => {
                section = Section::Admins;
                continue;
            }
            STUDENTS_MARKER => {
                section = Section::Students;
                continue;
            }
            _ => {}
        }

        match section {
            Section::None => {
                tracing::debug!(line = line_no, "ignoring line outside of any section");
            }
            Section::Admins => match parse_admin(line) {
                Some((username, password)) => doc.credentials.insert(username, password),
                None => tracing::warn!(line = line_no, "skipping malformed admin line"),
            },
            Section::Students => match parse_student(line) {
                Some(record) => doc.records.push(record),
                None => tracing::warn!(line = line_no, "skipping malformed student line"),
            },
        }
    }

    doc
}

/// Serialize the full store state. The output always decodes back to the same
/// credentials and records as long as the store's field rules were respected.
pub fn encode(credentials: &Credentials, records: &[StudentRecord]) -> String {
    let mut out = String::new();
    out.push_str(FILE_HEADER);
    out.push_str("\n\n");

    out.push_str(ADMINS_MARKER);
    out.push('\n');
    for (username, password) in credentials.iter() {
        let _ = writeln!(out, "{username}:{password}");
    }

    out.push('\n');
    out.push_str(STUDENTS_MARKER);
    out.push('\n');
    for record in records {
        let _ = writeln!(
            out,
            "{}|{}|{}|{}|{}",
            record.id, record.name, record.registration_number, record.age, record.major
        );
    }

    out
}

fn parse_admin(line: &str) -> Option<(&str, &str)> {
    let (username, password) = line.split_once(':')?;
    if username.is_empty() {
        return None;
    }
    Some((username, password))
}

fn parse_student(line: &str) -> Option<StudentRecord> {
    let mut fields = line.splitn(5, '|');
    let id: RecordId = fields.next()?.trim().parse().ok()?;
    let name = fields.next()?;
    let registration_number = fields.next()?;
    let age: i32 = fields.next()?.trim().parse().ok()?;
    let major = fields.next()?;

    if id <= 0 {
        return None;
    }

    Some(StudentRecord {
        id,
        name: name.to_string(),
        registration_number: registration_number.to_string(),
        age,
        major: major.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn student(id: RecordId, name: &str, reg: &str, age: i32, major: &str) -> StudentRecord {
        StudentRecord {
            id,
            name: name.to_string(),
            registration_number: reg.to_string(),
            age,
            major: major.to_string(),
        }
    }

    #[test]
    fn decodes_both_sections() {
        let raw = "# Student Management System Database\n\n\
                   [ADMINS]\nadmin:admin123\nroot:pa:ss\n\n\
                   [STUDENTS]\n1|Ada Lovelace|REG1|20|Computer Science\n\
                   4|Alan Turing|REG2|22|Mathematics\n";
        let doc = decode(raw);

        assert_eq!(doc.credentials.len(), 2);
        assert!(doc.credentials.verify("admin", "admin123"));
        assert!(doc.credentials.verify("root", "pa:ss"));
        assert_eq!(
            doc.records,
            vec![
                student(1, "Ada Lovelace", "REG1", 20, "Computer Science"),
                student(4, "Alan Turing", "REG2", 22, "Mathematics"),
            ]
        );
    }

    #[test]
    fn skips_short_student_line_and_keeps_neighbours() {
        let raw = "[STUDENTS]\n1|Ada|REG1|20|CS\n2|Broken|REG2\n3|Alan|REG3|22|Math\n";
        let doc = decode(raw);
        let ids: Vec<_> = doc.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn skips_unparseable_numbers_and_non_positive_ids() {
        let raw = "[STUDENTS]\nx|Ada|REG1|20|CS\n0|Zero|REG0|20|CS\n-2|Neg|REGN|20|CS\n\
                   5|Bob|REG5|old|CS\n6|Eve|REG6|30|CS\n";
        let doc = decode(raw);
        assert_eq!(doc.records, vec![student(6, "Eve", "REG6", 30, "CS")]);
    }

    #[test]
    fn admin_lines_need_colon_and_username() {
        let raw = "[ADMINS]\nnocolon\n:orphan\nok:\n";
        let doc = decode(raw);
        assert_eq!(doc.credentials.len(), 1);
        assert!(doc.credentials.verify("ok", ""));
    }

    #[test]
    fn ignores_comments_blank_lines_and_preamble() {
        let raw = "stray line\n# [ADMINS]\n\n   \r\n[ADMINS]\r\nadmin:secret\r\n# note\n";
        let doc = decode(raw);
        assert_eq!(doc.credentials.len(), 1);
        assert!(doc.credentials.verify("admin", "secret"));
        assert!(doc.records.is_empty());
    }

    #[test]
    fn major_keeps_trailing_pipes_and_whitespace_around_numbers_is_allowed() {
        let doc = decode("[STUDENTS]\n 7 |Ada|REG1| 19 |Arts|Crafts\n");
        assert_eq!(doc.records, vec![student(7, "Ada", "REG1", 19, "Arts|Crafts")]);
    }

    #[test]
    fn sections_can_repeat() {
        let raw = "[STUDENTS]\n1|A|R1|1|M\n[ADMINS]\nu:p\n[STUDENTS]\n2|B|R2|2|M\n";
        let doc = decode(raw);
        assert_eq!(doc.records.len(), 2);
        assert!(doc.credentials.verify("u", "p"));
    }

    #[test]
    fn encode_writes_expected_layout() {
        let mut creds = Credentials::new();
        creds.insert("zed", "z");
        creds.insert("admin", "admin123");
        let records = vec![student(3, "Ada", "REG1", 20, "CS")];

        let text = encode(&creds, &records);
        assert_eq!(
            text,
            "# Student Management System Database\n\n\
             [ADMINS]\nadmin:admin123\nzed:z\n\n\
             [STUDENTS]\n3|Ada|REG1|20|CS\n"
        );
    }

    #[test]
    fn encode_empty_state_decodes_to_empty() {
        let text = encode(&Credentials::new(), &[]);
        assert_eq!(decode(&text), Document::default());
    }

    prop_compose! {
        fn arb_record()(
            id in 1..RecordId::MAX,
            name in "[A-Za-z .'-]{0,20}",
            reg in "[A-Z0-9/-]{0,12}",
            age in any::<i32>(),
            major in "[ -~]{0,24}",
        ) -> StudentRecord {
            student(id, &name, &reg, age, &major)
        }
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            users in proptest::collection::btree_map("[a-z][a-z0-9_]{0,11}", "[ -~]{0,16}", 0..4),
            records in proptest::collection::vec(arb_record(), 0..8),
        ) {
            let mut creds = Credentials::new();
            for (user, pass) in &users {
                creds.insert(user.clone(), pass.clone());
            }

            let doc = decode(&encode(&creds, &records));
            prop_assert_eq!(doc.credentials, creds);
            prop_assert_eq!(doc.records, records);
        }
    }
}
