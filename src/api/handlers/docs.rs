use axum::response::Redirect;

pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Temporary redirect from the root to the Swagger UI
pub async fn documentation() -> Redirect {
    Redirect::temporary(DOCS_PATH)
}
