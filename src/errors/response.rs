use axum::{
    response::{IntoResponse, Response, Redirect},
    http::StatusCode,
};
use urlencoding;
use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed
// HTTP response: recoverable user errors become a redirect carrying a flash
// message, store and rendering failures become 5xx responses.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Form input problems go back to the form that produced them
            AppError::Validation { form, message } => flash_redirect(&form, &message, "danger"),

            // Credential failures redisplay the login page
            AppError::Auth { message, level } => flash_redirect("/login", &message, level),

            AppError::AuthRequired => {
                flash_redirect("/login", "Please log in to access this page.", "info")
            }

            // A session that fails to load reads as "not logged in"
            AppError::Session(_) => {
                flash_redirect("/login", "Please log in to access this page.", "info")
            }

            AppError::Authorization(msg) => flash_redirect("/dashboard", &msg, "danger"),

            AppError::Immutable(msg) => flash_redirect("/dashboard", &msg, "warning"),

            AppError::DuplicateMeal(msg) => flash_redirect("/dashboard", &msg, "warning"),

            AppError::NotFound => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),

            AppError::Forbidden => (StatusCode::FORBIDDEN, "403 Forbidden").into_response(),

            // Store errors are internal server errors, never retried
            AppError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            )
                .into_response(),

            AppError::Hash(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Password hash error: {}", e),
            )
                .into_response(),

            AppError::Template(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response(),

            AppError::Http(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Response error: {}", e),
            )
                .into_response(),
        }
    }
}

// Redirect to `target` with the message in the query string, where the page
// handler renders it as a flash banner.
fn flash_redirect(target: &str, message: &str, level: &str) -> Response {
    Redirect::to(&format!(
        "{}?error={}&level={}",
        target,
        urlencoding::encode(message),
        level
    ))
    .into_response()
}
