use redb::{Database, ReadableTable, TableDefinition};

use super::DbError;
use crate::models::Submission;

pub const SUBMISSIONS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("submissions");
pub const SUBMISSION_EMAIL_INDEX: TableDefinition<&str, &[u8; 16]> =
    TableDefinition::new("submission_email_index");

/// Outcome of an idempotent lead submission: either a fresh record or the
/// one already stored under that email.
pub enum SubmissionOutcome {
    Created(Submission),
    AlreadySubscribed(Submission),
}

/// Stores a newsletter lead, deduplicating on the lowercased email. A repeat
/// submission is a success that returns the existing record untouched.
pub fn create_submission(db: &Database, submission: &Submission) -> Result<SubmissionOutcome, DbError> {
    let email_key = submission.email.trim().to_lowercase();
    let id_bytes = submission.id.into_bytes();

    let write_txn = db.begin_write()?;
    let outcome = {
        let mut submissions_table = write_txn.open_table(SUBMISSIONS)?;
        let mut email_index = write_txn.open_table(SUBMISSION_EMAIL_INDEX)?;

        let existing_id = email_index.get(email_key.as_str())?.map(|g| *g.value());
        match existing_id {
            Some(existing_id) => {
                let guard = submissions_table
                    .get(&existing_id)?
                    .ok_or_else(|| DbError::NotFound(email_key.clone()))?;
                SubmissionOutcome::AlreadySubscribed(serde_json::from_str(guard.value())?)
            }
            None => {
                let mut stored = submission.clone();
                stored.email = email_key.clone();
                let doc = serde_json::to_string(&stored)?;
                submissions_table.insert(&id_bytes, doc.as_str())?;
                email_index.insert(email_key.as_str(), &id_bytes)?;
                SubmissionOutcome::Created(stored)
            }
        }
    };
    write_txn.commit()?;
    Ok(outcome)
}

/// Admin listing, newest-first.
pub fn list_submissions(db: &Database) -> Result<Vec<Submission>, DbError> {
    let read_txn = db.begin_read()?;
    let submissions_table = read_txn.open_table(SUBMISSIONS)?;
    let mut submissions = Vec::new();
    for item in submissions_table.iter()? {
        let (_, doc) = item?;
        submissions.push(serde_json::from_str(doc.value())?);
    }
    submissions.sort_by(|a: &Submission, b: &Submission| b.created_at.cmp(&a.created_at));
    Ok(submissions)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use redb::Database;
    use uuid::Uuid;

    use super::*;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create(dir.path().join("content.db")).unwrap();
        crate::setup::db_setup::setup_content_db(&db).unwrap();
        (dir, db)
    }

    fn lead(name: &str, email: &str) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            company: "Acme Chemicals".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn resubmission_is_a_no_op_returning_the_original() {
        let (_dir, db) = open_db();
        let first = lead("Nadia", "nadia@example.com");
        let created = create_submission(&db, &first).unwrap();
        assert!(matches!(created, SubmissionOutcome::Created(_)));

        // Same address, different case and name: no second record.
        let repeat = lead("N. Haddad", "Nadia@Example.COM");
        match create_submission(&db, &repeat).unwrap() {
            SubmissionOutcome::AlreadySubscribed(existing) => {
                assert_eq!(existing.id, first.id);
                assert_eq!(existing.name, "Nadia");
            }
            SubmissionOutcome::Created(_) => panic!("duplicate email must not create"),
        }
        assert_eq!(list_submissions(&db).unwrap().len(), 1);
    }
}
