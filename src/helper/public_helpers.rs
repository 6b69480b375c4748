use actix_web::web;
use chrono::Utc;
use redb::Database;
use uuid::Uuid;

use crate::helper::{feed_helpers, sanitization_helpers};
use crate::models::db_operations::submissions_db_operations::SubmissionOutcome;
use crate::models::db_operations::DbError;
use crate::models::db_operations::users_db_operations::AuthError;
use crate::models::db_operations::{
    ads_db_operations, comments_db_operations, posts_db_operations, submissions_db_operations,
    users_db_operations,
};
use crate::models::{Ad, Category, Comment, FeedItem, Post, Role, Submission};
use crate::DbPool;

pub fn verify_staff_credentials(
    pool: &web::Data<DbPool>,
    username: &str,
    password: &str,
) -> Result<(String, Role), AuthError> {
    let conn = pool.get()?;
    let verified = users_db_operations::verify_credentials(&conn, username, password)?;
    users_db_operations::update_last_login_time(&conn, username)?;
    Ok(verified)
}

/// Slug read for the article page. Counts the view as part of the fetch.
pub fn fetch_post_by_slug(db: &web::Data<Database>, slug: &str) -> Result<Option<Post>, DbError> {
    posts_db_operations::fetch_post_by_slug(db, slug)
}

pub fn fetch_post_by_id(db: &web::Data<Database>, id: Uuid) -> Result<Option<Post>, DbError> {
    posts_db_operations::read_post_by_id(db, id)
}

pub fn fetch_posts(
    db: &web::Data<Database>,
    category: Option<Category>,
    search: Option<&str>,
) -> Result<Vec<Post>, DbError> {
    posts_db_operations::read_posts_filtered(db, category, search)
}

pub fn fetch_active_ads(db: &web::Data<Database>) -> Result<Vec<Ad>, DbError> {
    ads_db_operations::list_active(db, Utc::now())
}

/// Home page payload: newest posts interleaved with every currently active
/// campaign.
pub fn compose_home_feed(
    db: &web::Data<Database>,
    category: Option<Category>,
) -> Result<Vec<FeedItem>, DbError> {
    let posts = posts_db_operations::read_posts_filtered(db, category, None)?;
    let ads = ads_db_operations::list_active(db, Utc::now())?;
    Ok(feed_helpers::compose_home_feed(posts, ads))
}

/// All-posts page payload, optionally filtered, with cyclic ad placement.
pub fn compose_posts_feed(
    db: &web::Data<Database>,
    category: Option<Category>,
    search: Option<&str>,
) -> Result<Vec<FeedItem>, DbError> {
    let posts = posts_db_operations::read_posts_filtered(db, category, search)?;
    let ads = ads_db_operations::list_active(db, Utc::now())?;
    Ok(feed_helpers::compose_posts_feed(posts, ads))
}

/// Accepts a visitor comment. The body and name are stripped to plain text
/// and the comment always enters the moderation queue unapproved.
pub fn submit_comment(
    db: &web::Data<Database>,
    post_id: Uuid,
    author_name: &str,
    content: &str,
) -> Result<Comment, DbError> {
    let comment = Comment {
        id: Uuid::new_v4(),
        post_id,
        author_name: sanitization_helpers::strip_all_html(author_name.trim()),
        content: sanitization_helpers::strip_all_html(content.trim()),
        is_approved: false,
        created_at: Utc::now(),
    };
    comments_db_operations::create_comment(db, &comment)?;
    Ok(comment)
}

pub fn fetch_approved_comments(
    db: &web::Data<Database>,
    post_id: Uuid,
) -> Result<Vec<Comment>, DbError> {
    comments_db_operations::read_approved_for_post(db, post_id)
}

/// Stores a newsletter lead; a repeat email is a success, not an error.
pub fn submit_lead(
    db: &web::Data<Database>,
    name: &str,
    email: &str,
    company: &str,
) -> Result<SubmissionOutcome, DbError> {
    let submission = Submission {
        id: Uuid::new_v4(),
        name: sanitization_helpers::strip_all_html(name.trim()),
        email: email.trim().to_string(),
        company: sanitization_helpers::strip_all_html(company.trim()),
        created_at: Utc::now(),
    };
    submissions_db_operations::create_submission(db, &submission)
}
