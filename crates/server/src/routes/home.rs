//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use serde::Deserialize;

use crate::filters;

/// Query parameters carrying a message from a failed request.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorQuery {
    pub error: Option<String>,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub error: Option<String>,
}

/// Display the landing page with the login and registration forms.
pub async fn index(Query(query): Query<ErrorQuery>) -> impl IntoResponse {
    IndexTemplate {
        error: query.error.filter(|e| !e.is_empty()),
    }
}
