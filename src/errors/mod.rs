// Error taxonomy for the request path, built on thiserror. The response
// module maps each variant to a redirect-with-flash or a bare status code.
use thiserror::Error;

pub mod response;

#[derive(Error, Debug)]
pub enum AppError {
    // Bad form input; sent back to the originating form with the message
    #[error("{message}")]
    Validation { form: String, message: String },

    // Bad credentials at login; level picks the flash category
    #[error("{message}")]
    Auth { message: String, level: &'static str },

    // Protected route hit without an active session
    #[error("login required")]
    AuthRequired,

    // Acting on a meal owned by another user
    #[error("{0}")]
    Authorization(String),

    // Editing or deleting a meal outside its creation day
    #[error("{0}")]
    Immutable(String),

    // Second meal of the same type for the same user and day
    #[error("{0}")]
    DuplicateMeal(String),

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("template error: {0}")]
    Template(#[from] std::io::Error),

    #[error("response error: {0}")]
    Http(#[from] axum::http::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
