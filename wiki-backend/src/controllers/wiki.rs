//! Page viewing: `/`, `/title/{tail}` and `/error`.

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::{html, not_found, store_failure};
use crate::auth::redirect;
use crate::device::DeviceClass;
use crate::routing::{classify, route_identifier, PageResolver, Resolution, ResolveError, MAIN_PAGE};
use crate::views::render_page;
use crate::AppState;

fn respond(result: Result<Resolution, ResolveError>) -> HttpResponse {
    match result {
        Ok(Resolution::Render(view)) => html(render_page(&view)),
        Ok(Resolution::Redirect(location)) => redirect(&location),
        Ok(Resolution::NoOp) => HttpResponse::NoContent().finish(),
        Err(ResolveError::NotFound(what)) => {
            log::info!("[ROUTE] {} not found", what);
            not_found(&what)
        }
        Err(ResolveError::Store(e)) => store_failure("[ROUTE] Failed to resolve page", &e),
    }
}

/// `/` shows the main page
async fn view_root(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let resolver = PageResolver::new(&data.db, &data.config);
    respond(resolver.resolve(&classify(""), MAIN_PAGE, DeviceClass::detect(&req)))
}

async fn view_title(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let fragment = path.into_inner();
    let Some(title) = route_identifier(&fragment) else {
        log::debug!("[ROUTE] Rejected malformed path /title/{}", fragment);
        return not_found("Page");
    };

    let route = classify(&fragment);
    log::debug!("[ROUTE] /title/{} -> {:?}", fragment, route);
    let resolver = PageResolver::new(&data.db, &data.config);
    respond(resolver.resolve(&route, title, DeviceClass::detect(&req)))
}

async fn error_page(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let resolver = PageResolver::new(&data.db, &data.config);
    respond(resolver.resolve_special("Error", "Error", DeviceClass::detect(&req)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(view_root))
        .route("/title/{tail:.*}", web::get().to(view_title))
        .route("/error", web::get().to(error_page));
}

#[cfg(test)]
mod tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    use crate::controllers::test_support;

    #[actix_web::test]
    async fn test_help_page_renders_when_present() {
        let state = test_support::state();
        state.db.save_page("Help-Intro", "<p>Start here.</p>").unwrap();
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get().uri("/title/Help:Intro").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Start here."));
    }

    #[actix_web::test]
    async fn test_missing_help_page_redirects_to_root() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        let req = test::TestRequest::get().uri("/title/Help:Intro").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn test_root_renders_main_page() {
        let state = test_support::state();
        state.db.save_page("Main_page", "Welcome to the wiki").unwrap();
        let app = test::init_service(test_support::app(state)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("Welcome to the wiki"));
        assert!(body.contains("TestWiki"));
    }

    #[actix_web::test]
    async fn test_missing_page_redirects_to_main_page() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        let req = test::TestRequest::get().uri("/title/Nowhere").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/title/Main_page");
    }

    #[actix_web::test]
    async fn test_random_page() {
        let state = test_support::state();
        let app = test::init_service(test_support::app(state.clone())).await;

        let req = test::TestRequest::get().uri("/title/Special:Random").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        state.db.save_page("Only", "").unwrap();
        let req = test::TestRequest::get().uri("/title/Special:Random").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/title/Only");
    }

    #[actix_web::test]
    async fn test_unknown_special_page_and_category_are_404() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        for uri in ["/title/Special:Nope", "/title/Category:Nope"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_category_page_shows_members() {
        let state = test_support::state();
        state.db.save_category("Mammals", "Warm blooded").unwrap();
        state
            .db
            .replace_member_links("Dog", crate::models::MemberKind::Page, &["Mammals".to_string()])
            .unwrap();
        let app = test::init_service(test_support::app(state)).await;

        let req = test::TestRequest::get().uri("/title/Animals:Mammals").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("/title/Dog"));
    }

    #[actix_web::test]
    async fn test_malformed_route_is_404() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        for uri in ["/title/", "/title/:Intro", "/nope/Foo"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_error_page_renders() {
        let app = test::init_service(test_support::app(test_support::state())).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/error").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
