use actix_session::SessionExt;
use actix_web::{dev, FromRequest, HttpRequest};
use serde::Serialize;
use std::future::{ready, Ready};

use crate::models::Role;

/// Extractor for any logged-in staff member. Handlers that take this as an
/// argument reject unauthenticated requests with 401 before running.
#[derive(Serialize)]
pub struct AuthenticatedAccount {
    pub username: String,
    pub role: Role,
}

impl AuthenticatedAccount {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequest for AuthenticatedAccount {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        let username = session.get::<String>("username").unwrap_or(None);
        let role = session
            .get::<String>("role")
            .unwrap_or(None)
            .and_then(|r| Role::parse(&r));
        match (username, role) {
            (Some(username), Some(role)) => ready(Ok(AuthenticatedAccount { username, role })),
            _ => ready(Err(actix_web::error::ErrorUnauthorized("Not logged in."))),
        }
    }
}
