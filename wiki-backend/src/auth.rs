//! Auth gate
//!
//! Privileged handlers have no second line of authorization, so every one of
//! them must call `require_admin` and return its redirect on denial.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{http::header, HttpRequest, HttpResponse};

use crate::config::AdminCredentials;
use crate::db::Database;
use crate::models::Session;

pub const SESSION_COOKIE: &str = "wiki_session";

/// Where denied requests are sent. A redirect, not a 403.
pub const ERROR_ROUTE: &str = "/error";

/// Fail-closed: only a present session with the flag set is authenticated.
pub fn is_authenticated(session: Option<&Session>) -> bool {
    session.is_some_and(|s| s.authenticated)
}

/// Load the session named by the request's cookie, if any.
pub fn session_from_request(
    db: &Database,
    req: &HttpRequest,
) -> Result<Option<Session>, crate::db::StoreError> {
    match req.cookie(SESSION_COOKIE) {
        Some(cookie) => db.validate_session(cookie.value()),
        None => Ok(None),
    }
}

/// Gate a privileged handler. `Err` carries the response to return instead.
pub fn require_admin(db: &Database, req: &HttpRequest) -> Result<(), HttpResponse> {
    match session_from_request(db, req) {
        Ok(session) if is_authenticated(session.as_ref()) => Ok(()),
        Ok(_) => {
            log::info!("[AUTH] Denied unauthenticated access to {}", req.path());
            Err(redirect(ERROR_ROUTE))
        }
        Err(e) => {
            log::error!("[AUTH] Session validation error: {}", e);
            Err(HttpResponse::InternalServerError().body("Internal server error"))
        }
    }
}

/// Compare submitted credentials against the configured admin account.
pub fn verify_credentials(admin: Option<&AdminCredentials>, username: &str, password: &str) -> bool {
    match admin {
        Some(creds) => {
            constant_time_eq(creds.username.as_bytes(), username.as_bytes())
                & constant_time_eq(creds.password.as_bytes(), password.as_bytes())
        }
        None => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie("");
    cookie.make_removal();
    cookie
}

/// 302 Found to `location`
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}
