use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::helper::public_helpers;
use crate::models::db_operations::submissions_db_operations::SubmissionOutcome;
use crate::models::db_operations::users_db_operations::AuthError;
use crate::models::db_operations::DbError;
use crate::models::Category;
use crate::DbPool;

#[derive(Deserialize)]
pub struct PostQuery {
    category: Option<String>,
    search: Option<String>,
}

#[derive(Deserialize)]
struct CommentForm {
    post_id: Uuid,
    author_name: String,
    content: String,
}

#[derive(Deserialize)]
struct SubmissionForm {
    name: String,
    email: String,
    #[serde(default)]
    company: String,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// Public half of the `/api` scope. Paths shared with the admin half differ
/// by method and fall through during routing.
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/is_server_active", web::get().to(is_server_active))
        .route("/posts", web::get().to(get_posts))
        .route("/posts/id/{id}", web::get().to(get_post_by_id))
        .route("/posts/{slug}", web::get().to(get_post_by_slug))
        .route("/feed/home", web::get().to(get_home_feed))
        .route("/feed/posts", web::get().to(get_posts_feed))
        .route("/ads", web::get().to(get_active_ads))
        .route("/comments", web::post().to(submit_comment))
        .route("/comments/post/{post_id}", web::get().to(get_post_comments))
        .route("/submissions", web::post().to(submit_lead))
        .route("/auth/login", web::post().to(handle_login))
        .route("/auth/logout", web::post().to(handle_logout));
}

/// "All" (or no category at all) means no filter; anything else must be a
/// known category name, matched exactly.
fn parse_category_filter(raw: Option<&str>) -> Result<Option<Category>, HttpResponse> {
    match raw {
        None | Some("All") => Ok(None),
        Some(name) => match Category::parse(name) {
            Some(category) => Ok(Some(category)),
            None => Err(HttpResponse::BadRequest()
                .json(json!({ "message": format!("Unknown category '{}'.", name) }))),
        },
    }
}

fn db_error_response(context: &str, e: DbError) -> HttpResponse {
    match e {
        DbError::NotFound(what) => {
            HttpResponse::NotFound().json(json!({ "message": format!("Not found: {}", what) }))
        }
        DbError::DuplicateSlug(slug) => HttpResponse::Conflict()
            .json(json!({ "message": format!("Slug '{}' is already in use.", slug) })),
        other => {
            log::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn get_posts(db: web::Data<Database>, query: web::Query<PostQuery>) -> impl Responder {
    let category = match parse_category_filter(query.category.as_deref()) {
        Ok(c) => c,
        Err(response) => return response,
    };
    match public_helpers::fetch_posts(&db, category, query.search.as_deref()) {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => db_error_response("Failed to fetch posts", e),
    }
}

async fn get_post_by_slug(slug: web::Path<String>, db: web::Data<Database>) -> impl Responder {
    match public_helpers::fetch_post_by_slug(&db, &slug) {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Post not found" })),
        Err(e) => db_error_response("Failed to fetch post by slug", e),
    }
}

async fn get_post_by_id(id: web::Path<Uuid>, db: web::Data<Database>) -> impl Responder {
    match public_helpers::fetch_post_by_id(&db, *id) {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(json!({ "message": "Post not found" })),
        Err(e) => db_error_response("Failed to fetch post by id", e),
    }
}

async fn get_home_feed(db: web::Data<Database>, query: web::Query<PostQuery>) -> impl Responder {
    let category = match parse_category_filter(query.category.as_deref()) {
        Ok(c) => c,
        Err(response) => return response,
    };
    match public_helpers::compose_home_feed(&db, category) {
        Ok(feed) => HttpResponse::Ok().json(feed),
        Err(e) => db_error_response("Failed to compose home feed", e),
    }
}

async fn get_posts_feed(db: web::Data<Database>, query: web::Query<PostQuery>) -> impl Responder {
    let category = match parse_category_filter(query.category.as_deref()) {
        Ok(c) => c,
        Err(response) => return response,
    };
    match public_helpers::compose_posts_feed(&db, category, query.search.as_deref()) {
        Ok(feed) => HttpResponse::Ok().json(feed),
        Err(e) => db_error_response("Failed to compose posts feed", e),
    }
}

async fn get_active_ads(db: web::Data<Database>) -> impl Responder {
    match public_helpers::fetch_active_ads(&db) {
        Ok(ads) => HttpResponse::Ok().json(ads),
        Err(e) => db_error_response("Failed to fetch active ads", e),
    }
}

async fn submit_comment(
    db: web::Data<Database>,
    form: web::Json<CommentForm>,
) -> impl Responder {
    if form.author_name.trim().is_empty() || form.content.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "Name and comment text are required." }));
    }
    match public_helpers::submit_comment(&db, form.post_id, &form.author_name, &form.content) {
        Ok(comment) => HttpResponse::Created().json(comment),
        Err(e) => db_error_response("Failed to store comment", e),
    }
}

async fn get_post_comments(post_id: web::Path<Uuid>, db: web::Data<Database>) -> impl Responder {
    match public_helpers::fetch_approved_comments(&db, *post_id) {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => db_error_response("Failed to fetch comments", e),
    }
}

async fn submit_lead(db: web::Data<Database>, form: web::Json<SubmissionForm>) -> impl Responder {
    let email = form.email.trim();
    if form.name.trim().is_empty() || email.is_empty() || !email.contains('@') {
        return HttpResponse::BadRequest()
            .json(json!({ "message": "A name and a valid email are required." }));
    }
    match public_helpers::submit_lead(&db, &form.name, email, &form.company) {
        Ok(SubmissionOutcome::Created(submission)) => HttpResponse::Created().json(submission),
        Ok(SubmissionOutcome::AlreadySubscribed(submission)) => {
            HttpResponse::Ok().json(submission)
        }
        Err(e) => db_error_response("Failed to store submission", e),
    }
}

async fn handle_login(
    session: Session,
    pool: web::Data<DbPool>,
    form: web::Json<LoginForm>,
) -> impl Responder {
    match public_helpers::verify_staff_credentials(&pool, &form.username, &form.password) {
        Ok((username, role)) => {
            if session.insert("username", &username).is_err()
                || session.insert("role", role.as_str()).is_err()
            {
                return HttpResponse::InternalServerError().finish();
            }
            HttpResponse::Ok().json(json!({ "username": username, "role": role.as_str() }))
        }
        Err(AuthError::InvalidCredentials) => HttpResponse::Unauthorized()
            .json(json!({ "message": "Invalid username or password." })),
        Err(AuthError::Suspended) => {
            HttpResponse::Forbidden().json(json!({ "message": "Account suspended." }))
        }
        Err(e) => {
            log::error!("Login failed: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn handle_logout(session: Session) -> impl Responder {
    session.purge();
    HttpResponse::Ok().json(json!({ "message": "Logged out." }))
}
