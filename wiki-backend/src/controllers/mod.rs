//! HTTP dispatch table
//!
//! Each controller exposes `config` to register its routes; `configure`
//! wires all of them in the order the router should try them.

pub mod admin;
pub mod assets;
pub mod edit;
pub mod health;
pub mod login;
pub mod wiki;

use actix_web::{http::header::ContentType, web, HttpResponse};

use crate::db::StoreError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::config_routes)
        .configure(login::config)
        .configure(admin::config)
        .configure(edit::config)
        .configure(assets::config)
        .configure(wiki::config);
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub(crate) fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(format!(
            "<!DOCTYPE html><html><body><h1>404</h1><p>{} not found</p><a href=\"/\">Main page</a></body></html>",
            crate::views::escape_html(what)
        ))
}

/// Store failures are operational errors: log them and answer 500, never a partial page.
pub(crate) fn store_failure(context: &str, e: &StoreError) -> HttpResponse {
    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": format!("Database error: {}", e)
    }))
}
