use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::models::User;
use crate::services::MealStore;

const SESSION_USER_KEY: &str = "user_id";

/// Binds the session to a user after a successful login.
pub async fn establish(session: &Session, user_id: i64) -> AppResult<()> {
    session.insert(SESSION_USER_KEY, user_id).await?;
    Ok(())
}

/// Destroys the session and its server-side record.
pub async fn clear(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

/// The logged-in user, if the session carries an id that still resolves.
pub async fn current_user(session: &Session, store: &MealStore) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<i64>(SESSION_USER_KEY).await? else {
        return Ok(None);
    };
    Ok(store.find_user_by_id(user_id).await?)
}

/// Guard for routes that require a login. Handlers call this before any work.
pub async fn require_user(session: &Session, store: &MealStore) -> AppResult<User> {
    current_user(session, store)
        .await?
        .ok_or(AppError::AuthRequired)
}

/// Guard for admin-only routes. A logged-in non-admin gets a 403.
pub async fn require_admin(session: &Session, store: &MealStore) -> AppResult<User> {
    let user = require_user(session, store).await?;
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
