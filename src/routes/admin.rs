use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::helper::admin_helpers::{self, AdminHelperError};
use crate::middleware::AuthenticatedAccount;
use crate::models::db_operations::DbError;
use crate::models::{AdDraft, PostDraft, Role};
use crate::DbPool;

#[derive(Deserialize)]
struct AccountForm {
    username: String,
    email: String,
    password: String,
    role: Role,
}

/// Staff half of the `/api` scope. Every handler takes the session extractor,
/// so an anonymous request never reaches a helper. Moderators may create
/// posts and moderate comments; everything else needs the admin role.
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts", web::post().to(create_post))
        .route("/posts/story/{id}", web::put().to(promote_story))
        .route("/posts/{id}", web::put().to(update_post))
        .route("/posts/{id}", web::delete().to(delete_post))
        .route("/ads/all", web::get().to(list_campaigns))
        .route("/ads", web::post().to(launch_campaign))
        .route("/ads/{id}", web::delete().to(retire_campaign))
        .route("/comments/pending", web::get().to(pending_comments))
        .route("/comments/{id}/approve", web::put().to(approve_comment))
        .route("/comments/{id}", web::delete().to(delete_comment))
        .route("/submissions", web::get().to(list_submissions))
        .route("/users", web::get().to(list_accounts))
        .route("/users", web::post().to(create_account))
        .route("/users/{id}/status", web::put().to(toggle_account))
        .route("/users/{id}", web::delete().to(delete_account));
}

fn error_response(context: &str, e: AdminHelperError) -> HttpResponse {
    match e {
        AdminHelperError::Validation(v) => {
            HttpResponse::BadRequest().json(json!({ "message": v.to_string() }))
        }
        AdminHelperError::ContentDatabase(DbError::NotFound(what)) => {
            HttpResponse::NotFound().json(json!({ "message": format!("Not found: {}", what) }))
        }
        AdminHelperError::ContentDatabase(DbError::DuplicateSlug(slug)) => HttpResponse::Conflict()
            .json(json!({ "message": format!("Slug '{}' is already in use.", slug) })),
        other => {
            log::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(json!({ "message": "Administrator access required." }))
}

// --- Content ---

async fn create_post(
    _auth: AuthenticatedAccount,
    db: web::Data<Database>,
    draft: web::Json<PostDraft>,
) -> impl Responder {
    match admin_helpers::create_post(&db, &draft) {
        Ok(post) => HttpResponse::Created().json(post),
        Err(e) => error_response("Failed to create post", e),
    }
}

async fn update_post(
    auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
    draft: web::Json<PostDraft>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::update_post(&db, *id, &draft) {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(e) => error_response("Failed to update post", e),
    }
}

async fn delete_post(
    auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::delete_post(&db, *id) {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Post deleted." })),
        Err(e) => error_response("Failed to delete post", e),
    }
}

async fn promote_story(
    auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::promote_story_of_the_day(&db, *id) {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(e) => error_response("Failed to set story of the day", e),
    }
}

// --- Campaigns ---

async fn list_campaigns(auth: AuthenticatedAccount, db: web::Data<Database>) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::fetch_all_campaigns(&db) {
        Ok(ads) => HttpResponse::Ok().json(ads),
        Err(e) => error_response("Failed to list campaigns", e),
    }
}

async fn launch_campaign(
    auth: AuthenticatedAccount,
    db: web::Data<Database>,
    draft: web::Json<AdDraft>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::launch_campaign(&db, &draft) {
        Ok(ad) => HttpResponse::Created().json(ad),
        Err(e) => error_response("Failed to launch campaign", e),
    }
}

async fn retire_campaign(
    auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::retire_campaign(&db, *id) {
        Ok(ad) => HttpResponse::Ok().json(ad),
        Err(e) => error_response("Failed to retire campaign", e),
    }
}

// --- Moderation ---

async fn pending_comments(_auth: AuthenticatedAccount, db: web::Data<Database>) -> impl Responder {
    match admin_helpers::fetch_pending_comments(&db) {
        Ok(pending) => HttpResponse::Ok().json(pending),
        Err(e) => error_response("Failed to list pending comments", e),
    }
}

async fn approve_comment(
    _auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
) -> impl Responder {
    match admin_helpers::approve_comment(&db, *id) {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => error_response("Failed to approve comment", e),
    }
}

async fn delete_comment(
    _auth: AuthenticatedAccount,
    id: web::Path<Uuid>,
    db: web::Data<Database>,
) -> impl Responder {
    match admin_helpers::delete_comment(&db, *id) {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Comment deleted." })),
        Err(e) => error_response("Failed to delete comment", e),
    }
}

async fn list_submissions(auth: AuthenticatedAccount, db: web::Data<Database>) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::fetch_submissions(&db) {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => error_response("Failed to list submissions", e),
    }
}

// --- Staff accounts (administrators only) ---

async fn list_accounts(auth: AuthenticatedAccount, pool: web::Data<DbPool>) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::fetch_all_accounts(&pool) {
        Ok(accounts) => HttpResponse::Ok().json(accounts),
        Err(e) => error_response("Failed to list accounts", e),
    }
}

async fn create_account(
    auth: AuthenticatedAccount,
    pool: web::Data<DbPool>,
    form: web::Json<AccountForm>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    if form.username.trim().is_empty() || form.password.is_empty() || !form.email.contains('@') {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Username, email and password are required." }));
    }
    match admin_helpers::create_staff_account(
        &pool,
        form.username.trim(),
        &form.email,
        &form.password,
        form.role,
    ) {
        Ok(()) => HttpResponse::Created()
            .json(json!({ "message": format!("Account '{}' created.", form.username.trim()) })),
        Err(AdminHelperError::Database(e)) => {
            log::warn!("Account creation rejected: {}", e);
            HttpResponse::Conflict()
                .json(json!({ "message": "Username or email is already taken." }))
        }
        Err(e) => error_response("Failed to create account", e),
    }
}

async fn toggle_account(
    auth: AuthenticatedAccount,
    id: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    // An administrator cannot suspend their own account.
    match admin_helpers::fetch_account_by_id(&pool, *id) {
        Ok(Some(account)) if account.username == auth.username => {
            return HttpResponse::BadRequest()
                .json(json!({ "message": "You cannot change the status of your own account." }));
        }
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "message": "Account not found." }))
        }
        Err(e) => return error_response("Failed to look up account", e),
    }
    match admin_helpers::toggle_account_status(&pool, *id) {
        Ok(Some(is_active)) => HttpResponse::Ok().json(json!({ "is_active": is_active })),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Account not found." })),
        Err(e) => error_response("Failed to toggle account", e),
    }
}

async fn delete_account(
    auth: AuthenticatedAccount,
    id: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> impl Responder {
    if !auth.is_admin() {
        return forbidden();
    }
    match admin_helpers::delete_account(&pool, *id) {
        Ok(0) => HttpResponse::NotFound().json(json!({ "message": "Account not found." })),
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Account deleted." })),
        Err(e) => error_response("Failed to delete account", e),
    }
}
