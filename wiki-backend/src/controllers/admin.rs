//! Admin surface: dashboard, add page/category, delete.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{html, store_failure};
use crate::auth::{redirect, require_admin, ERROR_ROUTE};
use crate::device::DeviceClass;
use crate::routing::resolver::{special_page_names, title_href};
use crate::routing::route_identifier;
use crate::views::{render_add, render_admin};
use crate::AppState;

/// Where delete sends the admin afterwards
const MANAGE_ROUTE: &str = "/admin/manage";

#[derive(Debug, Deserialize)]
pub struct NewContentForm {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Titles created through forms must satisfy the route grammar in full,
/// otherwise they could never be addressed again.
fn valid_new_title(raw: &str) -> Option<&str> {
    let title = raw.trim();
    route_identifier(title).filter(|id| id.len() == title.len())
}

async fn dashboard(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let pages = match data.db.list_page_titles() {
        Ok(p) => p,
        Err(e) => return store_failure("[ADMIN] Failed to list pages", &e),
    };
    let categories = match data.db.list_category_titles() {
        Ok(c) => c,
        Err(e) => return store_failure("[ADMIN] Failed to list categories", &e),
    };
    html(render_admin(
        &data.config.site_title,
        &pages,
        &categories,
        &special_page_names(),
        DeviceClass::detect(&req),
    ))
}

async fn add_form(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    match data.db.list_category_titles() {
        Ok(menu) => html(render_add(
            &data.config.site_title,
            &menu,
            DeviceClass::detect(&req),
        )),
        Err(e) => store_failure("[ADMIN] Error loading menu", &e),
    }
}

async fn add_page(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<NewContentForm>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let Some(title) = valid_new_title(&form.title) else {
        return HttpResponse::BadRequest().body("Invalid page title");
    };
    match data.db.save_page(title, &form.body) {
        Ok(page) => {
            log::info!("[ADMIN] Added page {}", page.title);
            redirect(&title_href(&page.title))
        }
        Err(e) => store_failure("[ADMIN] Failed to add page", &e),
    }
}

async fn add_category(
    data: web::Data<AppState>,
    req: HttpRequest,
    form: web::Form<NewContentForm>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let Some(title) = valid_new_title(&form.title) else {
        return HttpResponse::BadRequest().body("Invalid category title");
    };
    match data.db.save_category(title, &form.body) {
        Ok(category) => {
            log::info!("[ADMIN] Added category {}", category.title);
            redirect("/title/Special:Categories")
        }
        Err(e) => store_failure("[ADMIN] Failed to add category", &e),
    }
}

/// `/delete/{page|category}/{title}`
async fn delete_resource(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let tail = path.into_inner();
    let Some((resource_type, title)) = tail.split_once('/') else {
        return HttpResponse::BadRequest().body("Invalid URL format");
    };

    let result = match resource_type {
        "page" => data.db.delete_page(title),
        "category" => data.db.delete_category(title),
        other => {
            log::info!("[ADMIN] Delete of unknown resource type {}", other);
            return redirect(ERROR_ROUTE);
        }
    };
    match result {
        Ok(existed) => {
            log::info!("[ADMIN] Deleted {} {} (existed: {})", resource_type, title, existed);
            redirect(MANAGE_ROUTE)
        }
        Err(e) => store_failure("[ADMIN] Failed to delete", &e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/{tail:.*}", web::get().to(dashboard))
        .route("/add", web::get().to(add_form))
        .route("/addpage", web::post().to(add_page))
        .route("/category/{tail:.*}", web::post().to(add_category))
        .route("/delete/{tail:.*}", web::get().to(delete_resource));
}
