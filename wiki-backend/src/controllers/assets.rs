use actix_web::{web, HttpResponse};
use std::path::Path;

use crate::AppState;

/// Extensions served from the images directory
const ALLOWED_EXTENSIONS: &[&str] = &["css", "js", "png", "svg", "jpg", "jpeg", "gif", "webp"];

fn extension(filename: &str) -> String {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).unwrap_or_default()
}

fn mime_for_ext(ext: &str) -> &'static str {
    match ext {
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

async fn read_asset(dir: &Path, filename: &str) -> HttpResponse {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') || filename.starts_with('.') {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid filename"
        }));
    }

    let ext = extension(filename);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "File type not served"
        }));
    }

    let (Ok(canonical_dir), Ok(canonical_file)) =
        (dir.canonicalize(), dir.join(filename).canonicalize())
    else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "File not found"
        }));
    };

    if !canonical_file.starts_with(&canonical_dir) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Access denied"
        }));
    }

    match tokio::fs::read(&canonical_file).await {
        Ok(contents) => HttpResponse::Ok()
            .content_type(mime_for_ext(&ext))
            .append_header(("Cache-Control", "public, max-age=300"))
            .body(contents),
        Err(e) => {
            log::warn!("[ASSETS] Failed to read {}: {}", canonical_file.display(), e);
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "File not found"
            }))
        }
    }
}

/// `/images/{filename}`
async fn serve_image(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    read_asset(&data.config.images_dir, &path.into_inner()).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/images/{filename}", web::get().to(serve_image));
}
