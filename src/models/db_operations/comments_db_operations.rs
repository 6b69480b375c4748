use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::posts_db_operations::POSTS;
use super::DbError;
use crate::models::{Comment, PendingComment, Post};

pub const COMMENTS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("comments");

/// Stores a new comment after confirming the referenced post exists.
/// Public submissions always arrive unapproved; the caller sets the flag.
pub fn create_comment(db: &Database, comment: &Comment) -> Result<(), DbError> {
    let id_bytes = comment.id.into_bytes();
    let doc = serde_json::to_string(comment)?;

    let write_txn = db.begin_write()?;
    {
        let posts_table = write_txn.open_table(POSTS)?;
        if posts_table.get(&comment.post_id.into_bytes())?.is_none() {
            return Err(DbError::NotFound(comment.post_id.to_string()));
        }
        let mut comments_table = write_txn.open_table(COMMENTS)?;
        comments_table.insert(&id_bytes, doc.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

/// Approved comments for one post, newest-first. The only comment read the
/// public site gets.
pub fn read_approved_for_post(db: &Database, post_id: Uuid) -> Result<Vec<Comment>, DbError> {
    let mut comments = read_matching(db, |c| c.post_id == post_id && c.is_approved)?;
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(comments)
}

/// Moderation queue, newest-first, with post titles attached for context.
pub fn read_pending(db: &Database) -> Result<Vec<PendingComment>, DbError> {
    let mut comments = read_matching(db, |c| !c.is_approved)?;
    comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let read_txn = db.begin_read()?;
    let posts_table = read_txn.open_table(POSTS)?;
    let mut pending = Vec::with_capacity(comments.len());
    for comment in comments {
        let post_title = match posts_table.get(&comment.post_id.into_bytes())? {
            Some(guard) => serde_json::from_str::<Post>(guard.value())?.title,
            None => String::new(),
        };
        pending.push(PendingComment { comment, post_title });
    }
    Ok(pending)
}

fn read_matching<F>(db: &Database, keep: F) -> Result<Vec<Comment>, DbError>
where
    F: Fn(&Comment) -> bool,
{
    let read_txn = db.begin_read()?;
    let comments_table = read_txn.open_table(COMMENTS)?;
    let mut comments = Vec::new();
    for item in comments_table.iter()? {
        let (_, doc) = item?;
        let comment: Comment = serde_json::from_str(doc.value())?;
        if keep(&comment) {
            comments.push(comment);
        }
    }
    Ok(comments)
}

pub fn approve_comment(db: &Database, id: Uuid) -> Result<Comment, DbError> {
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    let approved = {
        let mut comments_table = write_txn.open_table(COMMENTS)?;
        let mut comment: Comment = {
            let guard = comments_table
                .get(&id_bytes)?
                .ok_or_else(|| DbError::NotFound(id.to_string()))?;
            serde_json::from_str(guard.value())?
        };
        comment.is_approved = true;
        let doc = serde_json::to_string(&comment)?;
        comments_table.insert(&id_bytes, doc.as_str())?;
        comment
    };
    write_txn.commit()?;
    Ok(approved)
}

pub fn delete_comment(db: &Database, id: Uuid) -> Result<(), DbError> {
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    {
        let mut comments_table = write_txn.open_table(COMMENTS)?;
        if comments_table.remove(&id_bytes)?.is_none() {
            return Err(DbError::NotFound(id.to_string()));
        }
    }
    write_txn.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use redb::Database;
    use uuid::Uuid;

    use super::*;
    use crate::models::{default_excerpt_color, Category};
    use crate::models::db_operations::posts_db_operations;

    fn open_db_with_post() -> (tempfile::TempDir, Database, Uuid) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create(dir.path().join("content.db")).unwrap();
        crate::setup::db_setup::setup_content_db(&db).unwrap();

        let post = Post {
            id: Uuid::new_v4(),
            slug: "commented".to_string(),
            title: "Commented post".to_string(),
            content: "<p>body</p>".to_string(),
            image: String::new(),
            category: Category::NewsRoundup,
            author: "Admin".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap(),
            views: 0,
            is_story_of_the_day: false,
            excerpt_color: default_excerpt_color(),
            company_name: None,
            product_name: None,
            contact_number: None,
            website: None,
            email: None,
            subcategory: None,
            ad_size: None,
            ad_duration: None,
            expiry_date: None,
            research_topic: None,
            video: None,
            ceo_details: None,
            company_services: None,
            early_beginning: None,
            fails: None,
            success: None,
            awards: None,
            topic: None,
        };
        posts_db_operations::create_post(&db, &post).unwrap();
        (dir, db, post.id)
    }

    fn sample_comment(post_id: Uuid, author: &str, minute: u32) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id,
            author_name: author.to_string(),
            content: "Interesting read".to_string(),
            is_approved: false,
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, minute, 0).unwrap(),
        }
    }

    #[test]
    fn comment_on_missing_post_is_rejected() {
        let (_dir, db, _) = open_db_with_post();
        let orphan = sample_comment(Uuid::new_v4(), "Nadia", 0);
        assert!(matches!(
            create_comment(&db, &orphan).unwrap_err(),
            DbError::NotFound(_)
        ));
    }

    #[test]
    fn only_approved_comments_are_public() {
        let (_dir, db, post_id) = open_db_with_post();
        let first = sample_comment(post_id, "Nadia", 0);
        let second = sample_comment(post_id, "Ravi", 5);
        create_comment(&db, &first).unwrap();
        create_comment(&db, &second).unwrap();

        assert!(read_approved_for_post(&db, post_id).unwrap().is_empty());
        let pending = read_pending(&db).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].post_title, "Commented post");
        // Newest pending first.
        assert_eq!(pending[0].comment.author_name, "Ravi");

        approve_comment(&db, first.id).unwrap();
        let public = read_approved_for_post(&db, post_id).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].author_name, "Nadia");
        assert_eq!(read_pending(&db).unwrap().len(), 1);
    }

    #[test]
    fn moderation_can_delete_instead_of_approving() {
        let (_dir, db, post_id) = open_db_with_post();
        let comment = sample_comment(post_id, "Nadia", 0);
        create_comment(&db, &comment).unwrap();
        delete_comment(&db, comment.id).unwrap();
        assert!(read_pending(&db).unwrap().is_empty());
        assert!(matches!(
            delete_comment(&db, comment.id).unwrap_err(),
            DbError::NotFound(_)
        ));
    }
}
