use actix_web::{http::StatusCode, web, HttpResponse};
use std::path::{Component, Path, PathBuf};
use crate::models::AssetErrorResponse;
use crate::routes::AppState;

/// Extensions served from the frontend root
const ROOT_EXTENSIONS: [&str; 4] = ["html", "css", "js", "ico"];

/// Configure static frontend routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/", web::get().to(index))
        .route("/static/{path:.*}", web::get().to(static_file))
        .route("/{file_name}", web::get().to(frontend_file));
}

/// Landing page
async fn index(state: web::Data<AppState>) -> HttpResponse {
    serve(state.frontend_dir.join("index.html"), root_miss_status(&state)).await
}

/// GET /{file_name} for top-level html/css/js/ico files
async fn frontend_file(state: web::Data<AppState>, file_name: web::Path<String>) -> HttpResponse {
    let file_name = file_name.into_inner();

    let miss = root_miss_status(&state);

    let allowed = has_root_extension(&file_name) && safe_relative_path(&file_name).is_some();
    if !allowed {
        return not_found(miss);
    }

    serve(state.frontend_dir.join(&file_name), miss).await
}

/// GET /static/{path} for anything under the frontend directory
///
/// Misses here are always 404, whatever `strict_not_found` says.
async fn static_file(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match safe_relative_path(&path) {
        Some(relative) => serve(state.frontend_dir.join(relative), StatusCode::NOT_FOUND).await,
        None => not_found(StatusCode::NOT_FOUND),
    }
}

async fn serve(path: PathBuf, miss: StatusCode) -> HttpResponse {
    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        tracing::debug!("Asset not found: {}", path.display());
        return not_found(miss);
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type(&path))
            .body(bytes),
        Err(e) => {
            tracing::warn!("Failed to read asset {}: {}", path.display(), e);
            not_found(miss)
        }
    }
}

/// Status for a miss on `/` or `/{file_name}`
fn root_miss_status(state: &AppState) -> StatusCode {
    if state.strict_not_found {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

fn not_found(status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(AssetErrorResponse {
        error: "File not found".to_string(),
    })
}

fn has_root_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ROOT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Relative path made only of normal components, or `None` if the request
/// tries to leave the frontend directory
fn safe_relative_path(raw: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("ico") => "image/x-icon",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_extensions() {
        assert!(has_root_extension("index.html"));
        assert!(has_root_extension("app.js"));
        assert!(has_root_extension("favicon.ico"));
        assert!(!has_root_extension("model.txt"));
        assert!(!has_root_extension("Makefile"));
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(safe_relative_path("css/app.css"), Some(PathBuf::from("css/app.css")));
        assert_eq!(safe_relative_path("./app.js"), Some(PathBuf::from("app.js")));
        assert_eq!(safe_relative_path("../models/gdm.txt"), None);
        assert_eq!(safe_relative_path("/etc/passwd"), None);
        assert_eq!(safe_relative_path(""), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(content_type(Path::new("blob.bin")), "application/octet-stream");
    }
}
