//! Editing: `/edit/{tail}`, `/save/{tail}`, `/savecat/{tail}`. All admin-only.

use actix_web::{web, HttpRequest, Responder};
use serde::Deserialize;

use super::{html, not_found, store_failure};
use crate::auth::{redirect, require_admin};
use crate::db::StoreError;
use crate::device::DeviceClass;
use crate::routing::resolver::title_href;
use crate::routing::route_identifier;
use crate::views::{render_edit, EditForm, EditTarget};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub body: String,
}

/// Edit form for a page, or for a category when the tail has a `:`.
/// Unknown titles get an empty form.
async fn edit_page(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let tail = path.into_inner();
    let Some(title) = route_identifier(&tail) else {
        return not_found("Page");
    };

    let menu = match data.db.list_category_titles() {
        Ok(m) => m,
        Err(e) => return store_failure("[EDIT] Failed to load menu", &e),
    };

    let (target, title, loaded) = match tail.split_once(':') {
        Some((_, name)) => {
            let name = name.trim().to_string();
            log::info!("[EDIT] Editing category {}", name);
            let loaded = data.db.get_category(&name).map(|c| (c.body, c.updated_at));
            (EditTarget::Category, name, loaded)
        }
        None => {
            let loaded = data.db.get_page(title).map(|p| (p.body, p.updated_at));
            (EditTarget::Page, title.to_string(), loaded)
        }
    };

    let (body, updated_at) = match loaded {
        Ok((body, updated)) => (body, Some(updated)),
        Err(StoreError::NotFound) => (String::new(), None),
        Err(e) => return store_failure("[EDIT] Failed to load content", &e),
    };

    html(render_edit(&EditForm {
        nav_title: data.config.site_title.clone(),
        title,
        body,
        updated_at,
        target,
        device: DeviceClass::detect(&req),
        menu,
    }))
}

async fn save_page(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<SaveForm>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let tail = path.into_inner();
    let Some(title) = route_identifier(&tail) else {
        return not_found("Page");
    };

    match data.db.save_page(title, &form.body) {
        Ok(page) => {
            log::info!("[EDIT] Saved page {}", page.title);
            redirect(&title_href(&page.title))
        }
        Err(e) => store_failure("[EDIT] Failed to save page", &e),
    }
}

async fn save_category(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<SaveForm>,
) -> impl Responder {
    if let Err(resp) = require_admin(&data.db, &req) {
        return resp;
    }
    let tail = path.into_inner();
    let Some(title) = route_identifier(&tail) else {
        return not_found("Category");
    };

    match data.db.save_category(title, &form.body) {
        Ok(category) => {
            log::info!("[EDIT] Saved category {}", category.title);
            redirect("/title/Special:Categories")
        }
        Err(e) => store_failure("[EDIT] Failed to save category", &e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/edit/{tail:.*}", web::get().to(edit_page))
        .route("/save/{tail:.*}", web::post().to(save_page))
        .route("/savecat/{tail:.*}", web::post().to(save_category));
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    use crate::controllers::test_support;

    #[actix_web::test]
    async fn test_edit_requires_login() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/edit/Dog").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/error");
    }

    #[actix_web::test]
    async fn test_save_without_login_does_not_write() {
        let state = test_support::state();
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/save/Dog")
            .set_form([("body", "Woof")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/error");
        assert!(state.db.get_page("Dog").is_err());
    }

    #[actix_web::test]
    async fn test_savecat_without_login_does_not_write() {
        let state = test_support::state();
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/savecat/Mammals")
            .set_form([("body", "[[Category:Animals]]")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/error");
        assert!(state.db.get_category("Mammals").is_err());
    }

    #[actix_web::test]
    async fn test_edit_unknown_page_shows_empty_form() {
        let state = test_support::state();
        let cookie = test_support::admin_cookie(&state);
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get().uri("/edit/New_page").cookie(cookie).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("action=\"/save/New_page\""));
        assert!(body.contains("Not Available"));
    }

    #[actix_web::test]
    async fn test_edit_category_targets_savecat() {
        let state = test_support::state();
        state.db.save_category("Mammals", "Warm blooded").unwrap();
        let cookie = test_support::admin_cookie(&state);
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get()
            .uri("/edit/Category:Mammals")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("action=\"/savecat/Mammals\""));
        assert!(body.contains("Warm blooded"));
    }

    #[actix_web::test]
    async fn test_save_page_and_category() {
        let state = test_support::state();
        let cookie = test_support::admin_cookie(&state);
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::post()
            .uri("/save/Dog")
            .cookie(cookie.clone())
            .set_form([("body", "Woof [[Category:Mammals]]")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/title/Dog");
        assert_eq!(state.db.get_page("Dog").unwrap().body, "Woof [[Category:Mammals]]");

        let req = test::TestRequest::post()
            .uri("/savecat/Mammals")
            .cookie(cookie)
            .set_form([("body", "[[Category:Animals]]")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/title/Special:Categories"
        );
        assert_eq!(state.db.get_category("Mammals").unwrap().body, "[[Category:Animals]]");
    }
}
