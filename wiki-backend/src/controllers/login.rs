//! Login lifecycle: `/login`, `/loginPost`, `/logout`.

use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::store_failure;
use crate::auth::{expired_session_cookie, redirect, session_cookie, verify_credentials, SESSION_COOKIE};
use crate::device::DeviceClass;
use crate::views::render_login;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

async fn login_form(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    super::html(render_login(
        &data.config.site_title,
        false,
        DeviceClass::detect(&req),
    ))
}

async fn login_post(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<LoginForm>,
) -> impl Responder {
    if !verify_credentials(data.config.admin.as_ref(), &form.username, &form.password) {
        log::info!("[AUTH] Failed login for {}", form.username);
        return HttpResponse::Unauthorized()
            .content_type(header::ContentType::html())
            .body(render_login(&data.config.site_title, true, DeviceClass::detect(&req)));
    }

    match data.db.create_session() {
        Ok(session) => {
            log::info!(
                "[AUTH] {} logged in (session {} created {}, expires {})",
                form.username,
                session.id,
                session.created_at,
                session.expires_at
            );
            HttpResponse::Found()
                .cookie(session_cookie(&session.token))
                .insert_header((header::LOCATION, "/admin/manage"))
                .finish()
        }
        Err(e) => store_failure("[AUTH] Failed to create session", &e),
    }
}

async fn logout(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Err(e) = data.db.delete_session(cookie.value()) {
            log::error!("[AUTH] Failed to delete session: {}", e);
        }
    }
    let mut resp = redirect("/");
    if let Err(e) = resp.add_removal_cookie(&expired_session_cookie()) {
        log::warn!("[AUTH] Failed to clear session cookie: {}", e);
    }
    resp
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(login_form))
        .route("/loginPost", web::post().to(login_post))
        .route("/logout", web::get().to(logout));
}
