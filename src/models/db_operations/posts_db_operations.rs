use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::DbError;
use crate::models::{Category, Post};

// Post documents are stored as JSON keyed by uuid bytes. The slug index
// enforces uniqueness and serves the public detail lookup; the chronological
// index (negated timestamp) keeps newest-first reads cheap.
pub const POSTS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("posts");
pub const SLUG_INDEX: TableDefinition<&str, &[u8; 16]> = TableDefinition::new("slug_index");
pub const CHRONOLOGICAL_INDEX: TableDefinition<(i64, &[u8; 16]), ()> =
    TableDefinition::new("chronological_index");

/// Clears the story-of-the-day flag on every post except `keep`, inside the
/// caller's open write transaction. Combined with setting the flag on `keep`
/// in the same transaction, this keeps the at-most-one invariant atomic.
fn unset_story_elsewhere(
    table: &mut redb::Table<&'static [u8; 16], &'static str>,
    keep: &[u8; 16],
) -> Result<(), DbError> {
    let mut demoted: Vec<([u8; 16], String)> = Vec::new();
    for item in table.iter()? {
        let (key, doc) = item?;
        let id = *key.value();
        if &id == keep {
            continue;
        }
        let mut post: Post = serde_json::from_str(doc.value())?;
        if post.is_story_of_the_day {
            post.is_story_of_the_day = false;
            demoted.push((id, serde_json::to_string(&post)?));
        }
    }
    for (id, doc) in demoted {
        table.insert(&id, doc.as_str())?;
    }
    Ok(())
}

/// Persists a fully validated post. Fails with `DuplicateSlug` if the slug is
/// taken; no automatic disambiguation is attempted.
pub fn create_post(db: &Database, post: &Post) -> Result<(), DbError> {
    let id_bytes = post.id.into_bytes();
    let doc = serde_json::to_string(post)?;

    let write_txn = db.begin_write()?;
    {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut slug_index = write_txn.open_table(SLUG_INDEX)?;
        let mut chrono_index = write_txn.open_table(CHRONOLOGICAL_INDEX)?;

        if slug_index.get(post.slug.as_str())?.is_some() {
            return Err(DbError::DuplicateSlug(post.slug.clone()));
        }

        posts_table.insert(&id_bytes, doc.as_str())?;
        slug_index.insert(post.slug.as_str(), &id_bytes)?;
        chrono_index.insert((-post.created_at.timestamp(), &id_bytes), ())?;

        if post.is_story_of_the_day {
            unset_story_elsewhere(&mut posts_table, &id_bytes)?;
        }
    }
    write_txn.commit()?;
    Ok(())
}

/// Public detail read: resolves the slug and increments the view counter in
/// the same write transaction, so the returned post already carries the new
/// count.
pub fn fetch_post_by_slug(db: &Database, slug: &str) -> Result<Option<Post>, DbError> {
    let write_txn = db.begin_write()?;
    let updated = {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let slug_index = write_txn.open_table(SLUG_INDEX)?;

        let id_bytes = match slug_index.get(slug)? {
            Some(guard) => *guard.value(),
            None => return Ok(None),
        };

        let mut post: Post = {
            let guard = posts_table
                .get(&id_bytes)?
                .ok_or_else(|| DbError::NotFound(slug.to_string()))?;
            serde_json::from_str(guard.value())?
        };
        post.views += 1;
        let doc = serde_json::to_string(&post)?;
        posts_table.insert(&id_bytes, doc.as_str())?;
        post
    };
    write_txn.commit()?;
    Ok(Some(updated))
}

/// Admin lookup by id. Does not touch the view counter.
pub fn read_post_by_id(db: &Database, id: Uuid) -> Result<Option<Post>, DbError> {
    let read_txn = db.begin_read()?;
    let posts_table = read_txn.open_table(POSTS)?;
    let result = match posts_table.get(&id.into_bytes())? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    };
    result
}

/// Newest-first post listing with the public filters applied: exact category
/// match (None keeps everything) and case-insensitive title substring search.
pub fn read_posts_filtered(
    db: &Database,
    category: Option<Category>,
    search: Option<&str>,
) -> Result<Vec<Post>, DbError> {
    let read_txn = db.begin_read()?;
    let chrono_index = read_txn.open_table(CHRONOLOGICAL_INDEX)?;
    let posts_table = read_txn.open_table(POSTS)?;

    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut posts = Vec::new();
    for item in chrono_index.iter()? {
        let (key, _) = item?;
        let id_bytes = key.value().1;
        let guard = match posts_table.get(id_bytes)? {
            Some(guard) => guard,
            None => continue,
        };
        let post: Post = serde_json::from_str(guard.value())?;
        if let Some(cat) = category {
            if post.category != cat {
                continue;
            }
        }
        if let Some(needle) = &needle {
            if !post.title.to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }
        posts.push(post);
    }
    Ok(posts)
}

/// Overwrites an existing post document. The slug and created_at are stable
/// across updates, so the indexes need no maintenance here.
pub fn update_post(db: &Database, post: &Post) -> Result<(), DbError> {
    let id_bytes = post.id.into_bytes();
    let doc = serde_json::to_string(post)?;

    let write_txn = db.begin_write()?;
    {
        let mut posts_table = write_txn.open_table(POSTS)?;
        if posts_table.get(&id_bytes)?.is_none() {
            return Err(DbError::NotFound(post.id.to_string()));
        }
        posts_table.insert(&id_bytes, doc.as_str())?;

        if post.is_story_of_the_day {
            unset_story_elsewhere(&mut posts_table, &id_bytes)?;
        }
    }
    write_txn.commit()?;
    Ok(())
}

pub fn delete_post(db: &Database, id: Uuid) -> Result<(), DbError> {
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut slug_index = write_txn.open_table(SLUG_INDEX)?;
        let mut chrono_index = write_txn.open_table(CHRONOLOGICAL_INDEX)?;

        let post: Post = match posts_table.remove(&id_bytes)? {
            Some(guard) => serde_json::from_str(guard.value())?,
            None => return Err(DbError::NotFound(id.to_string())),
        };
        slug_index.remove(post.slug.as_str())?;
        chrono_index.remove((-post.created_at.timestamp(), &id_bytes))?;
    }
    write_txn.commit()?;
    Ok(())
}

/// Promotes one post to story of the day and demotes every other post in the
/// same transaction.
pub fn set_story_of_the_day(db: &Database, id: Uuid) -> Result<Post, DbError> {
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    let promoted = {
        let mut posts_table = write_txn.open_table(POSTS)?;

        let mut post: Post = {
            let guard = posts_table
                .get(&id_bytes)?
                .ok_or_else(|| DbError::NotFound(id.to_string()))?;
            serde_json::from_str(guard.value())?
        };
        post.is_story_of_the_day = true;
        let doc = serde_json::to_string(&post)?;
        posts_table.insert(&id_bytes, doc.as_str())?;

        unset_story_elsewhere(&mut posts_table, &id_bytes)?;
        post
    };
    write_txn.commit()?;
    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use redb::Database;
    use uuid::Uuid;

    use super::*;
    use crate::models::default_excerpt_color;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create(dir.path().join("content.db")).unwrap();
        crate::setup::db_setup::setup_content_db(&db).unwrap();
        (dir, db)
    }

    fn sample_post(slug: &str, title: &str, day: u32) -> Post {
        Post {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            image: String::new(),
            category: Category::NewsRoundup,
            author: "Admin".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
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
        }
    }

    fn story_count(db: &Database) -> usize {
        read_posts_filtered(db, None, None)
            .unwrap()
            .iter()
            .filter(|p| p.is_story_of_the_day)
            .count()
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let (_dir, db) = open_db();
        create_post(&db, &sample_post("solvent-prices", "Solvent prices", 1)).unwrap();
        let err = create_post(&db, &sample_post("solvent-prices", "Other title", 2)).unwrap_err();
        assert!(matches!(err, DbError::DuplicateSlug(slug) if slug == "solvent-prices"));
    }

    #[test]
    fn deleted_slug_becomes_available_again() {
        let (_dir, db) = open_db();
        let post = sample_post("reusable", "First", 1);
        create_post(&db, &post).unwrap();
        delete_post(&db, post.id).unwrap();
        create_post(&db, &sample_post("reusable", "Second", 2)).unwrap();
    }

    #[test]
    fn at_most_one_story_of_the_day() {
        let (_dir, db) = open_db();
        let mut a = sample_post("a", "A", 1);
        a.is_story_of_the_day = true;
        let mut b = sample_post("b", "B", 2);
        b.is_story_of_the_day = true;
        let c = sample_post("c", "C", 3);

        create_post(&db, &a).unwrap();
        create_post(&db, &b).unwrap();
        create_post(&db, &c).unwrap();
        assert_eq!(story_count(&db), 1);
        assert!(read_post_by_id(&db, b.id).unwrap().unwrap().is_story_of_the_day);

        let promoted = set_story_of_the_day(&db, c.id).unwrap();
        assert!(promoted.is_story_of_the_day);
        assert_eq!(story_count(&db), 1);
        assert!(!read_post_by_id(&db, b.id).unwrap().unwrap().is_story_of_the_day);
    }

    #[test]
    fn update_to_story_demotes_the_current_story() {
        let (_dir, db) = open_db();
        let mut a = sample_post("a", "A", 1);
        a.is_story_of_the_day = true;
        let b = sample_post("b", "B", 2);
        create_post(&db, &a).unwrap();
        create_post(&db, &b).unwrap();

        let mut edited = b.clone();
        edited.is_story_of_the_day = true;
        update_post(&db, &edited).unwrap();

        assert_eq!(story_count(&db), 1);
        assert!(read_post_by_id(&db, b.id).unwrap().unwrap().is_story_of_the_day);
        assert!(!read_post_by_id(&db, a.id).unwrap().unwrap().is_story_of_the_day);
    }

    #[test]
    fn story_toggle_on_unknown_post_is_not_found() {
        let (_dir, db) = open_db();
        let err = set_story_of_the_day(&db, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn slug_fetch_increments_views_synchronously() {
        let (_dir, db) = open_db();
        create_post(&db, &sample_post("read-me", "Read me", 1)).unwrap();

        let first = fetch_post_by_slug(&db, "read-me").unwrap().unwrap();
        assert_eq!(first.views, 1);
        let second = fetch_post_by_slug(&db, "read-me").unwrap().unwrap();
        assert_eq!(second.views, 2);
        assert!(fetch_post_by_slug(&db, "missing").unwrap().is_none());
    }

    #[test]
    fn filtered_listing_is_newest_first() {
        let (_dir, db) = open_db();
        create_post(&db, &sample_post("old", "Old roundup", 1)).unwrap();
        let mut mart = sample_post("mart", "Ethanol listing", 2);
        mart.category = Category::ChemicalMart;
        create_post(&db, &mart).unwrap();
        create_post(&db, &sample_post("new", "New roundup", 3)).unwrap();

        let all = read_posts_filtered(&db, None, None).unwrap();
        let slugs: Vec<&str> = all.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mart", "old"]);

        let mart_only = read_posts_filtered(&db, Some(Category::ChemicalMart), None).unwrap();
        assert_eq!(mart_only.len(), 1);
        assert_eq!(mart_only[0].slug, "mart");

        let searched = read_posts_filtered(&db, None, Some("ROUNDUP")).unwrap();
        assert_eq!(searched.len(), 2);
    }
}
