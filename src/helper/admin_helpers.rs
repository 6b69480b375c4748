use actix_web::web;
use chrono::Utc;
use redb::Database;
use thiserror::Error;
use uuid::Uuid;

use crate::helper::content_helpers::{self, ContentError};
use crate::helper::campaign_helpers;
use crate::models::db_operations::DbError;
use crate::models::db_operations::{
    ads_db_operations, comments_db_operations, posts_db_operations, submissions_db_operations,
    users_db_operations,
};
use crate::models::{
    Account, Ad, AdDraft, Comment, PendingComment, Post, PostDraft, Role, Submission,
};
use crate::DbPool;

#[derive(Error, Debug)]
pub enum AdminHelperError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Content database error: {0}")]
    ContentDatabase(#[from] DbError),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("{0}")]
    Validation(#[from] ContentError),
}

fn get_conn(
    pool: &web::Data<DbPool>,
) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>, AdminHelperError> {
    pool.get().map_err(AdminHelperError::Pool)
}

// --- Content ---

pub fn create_post(
    db: &web::Data<Database>,
    draft: &PostDraft,
) -> Result<Post, AdminHelperError> {
    let post = content_helpers::build_post(draft, Utc::now())?;
    posts_db_operations::create_post(db, &post)?;
    Ok(post)
}

pub fn update_post(
    db: &web::Data<Database>,
    id: Uuid,
    draft: &PostDraft,
) -> Result<Post, AdminHelperError> {
    let mut post = posts_db_operations::read_post_by_id(db, id)?
        .ok_or_else(|| DbError::NotFound(id.to_string()))?;
    content_helpers::apply_update(&mut post, draft)?;
    posts_db_operations::update_post(db, &post)?;
    Ok(post)
}

pub fn delete_post(db: &web::Data<Database>, id: Uuid) -> Result<(), AdminHelperError> {
    Ok(posts_db_operations::delete_post(db, id)?)
}

pub fn promote_story_of_the_day(
    db: &web::Data<Database>,
    id: Uuid,
) -> Result<Post, AdminHelperError> {
    Ok(posts_db_operations::set_story_of_the_day(db, id)?)
}

// --- Campaigns ---

pub fn launch_campaign(
    db: &web::Data<Database>,
    draft: &AdDraft,
) -> Result<Ad, AdminHelperError> {
    let ad = campaign_helpers::build_campaign(draft, Utc::now())?;
    ads_db_operations::create_ad(db, &ad)?;
    Ok(ad)
}

pub fn retire_campaign(db: &web::Data<Database>, id: Uuid) -> Result<Ad, AdminHelperError> {
    Ok(ads_db_operations::retire_ad(db, id)?)
}

pub fn fetch_all_campaigns(db: &web::Data<Database>) -> Result<Vec<Ad>, AdminHelperError> {
    Ok(ads_db_operations::list_all(db)?)
}

// --- Moderation ---

pub fn fetch_pending_comments(
    db: &web::Data<Database>,
) -> Result<Vec<PendingComment>, AdminHelperError> {
    Ok(comments_db_operations::read_pending(db)?)
}

pub fn approve_comment(db: &web::Data<Database>, id: Uuid) -> Result<Comment, AdminHelperError> {
    Ok(comments_db_operations::approve_comment(db, id)?)
}

pub fn delete_comment(db: &web::Data<Database>, id: Uuid) -> Result<(), AdminHelperError> {
    Ok(comments_db_operations::delete_comment(db, id)?)
}

pub fn fetch_submissions(db: &web::Data<Database>) -> Result<Vec<Submission>, AdminHelperError> {
    Ok(submissions_db_operations::list_submissions(db)?)
}

// --- Staff accounts ---

pub fn create_staff_account(
    pool: &web::Data<DbPool>,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), AdminHelperError> {
    let conn = get_conn(pool)?;
    users_db_operations::create_account(&conn, username, email, password, role)?;
    Ok(())
}

pub fn fetch_all_accounts(pool: &web::Data<DbPool>) -> Result<Vec<Account>, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::read_all_accounts(&conn)?)
}

pub fn fetch_account_by_id(
    pool: &web::Data<DbPool>,
    id: i32,
) -> Result<Option<Account>, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::read_account_by_id(&conn, id))
}

pub fn toggle_account_status(
    pool: &web::Data<DbPool>,
    id: i32,
) -> Result<Option<bool>, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::toggle_account_status(&conn, id)?)
}

pub fn delete_account(pool: &web::Data<DbPool>, id: i32) -> Result<usize, AdminHelperError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::delete_account(&conn, id)?)
}
