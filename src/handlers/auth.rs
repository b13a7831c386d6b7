use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use bcrypt::{hash, verify, DEFAULT_COST};
use std::fs;
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::handlers::flash_html;
use crate::models::{FlashQuery, LoginForm, RegisterForm};
use crate::services::{auth, MealStore};

/// Sends logged-in visitors to their dashboard, everyone else to login.
pub async fn home(State(store): State<MealStore>, session: Session) -> AppResult<Response> {
    if auth::current_user(&session, &store).await?.is_some() {
        Ok(Redirect::to("/dashboard").into_response())
    } else {
        Ok(Redirect::to("/login").into_response())
    }
}

pub async fn serve_login_page(Query(query): Query<FlashQuery>) -> AppResult<Response> {
    let login_html = fs::read_to_string("templates/login.html")?;
    let login_html = login_html.replace(
        "{{flash}}",
        &flash_html(
            query.error.as_deref(),
            query.msg.as_deref(),
            query.level.as_deref(),
        ),
    );
    Ok(Html(login_html).into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(store): State<MealStore>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for {}", login_form.email);

    let Some(user) = store.find_user_by_email(&login_form.email).await? else {
        tracing::info!("Unknown email at login: {}", login_form.email);
        return Err(AppError::Auth {
            message: "Email not registered".into(),
            level: "danger",
        });
    };

    if !verify(&login_form.password, &user.password_hash)? {
        tracing::info!("Password mismatch for {}", login_form.email);
        return Err(AppError::Auth {
            message: "Wrong Password, try again".into(),
            level: "warning",
        });
    }

    auth::establish(&session, user.id).await?;
    tracing::info!("User {} logged in", user.username);
    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn serve_register_page(Query(query): Query<FlashQuery>) -> AppResult<Response> {
    let register_html = fs::read_to_string("templates/register.html")?;
    let register_html = register_html.replace(
        "{{flash}}",
        &flash_html(
            query.error.as_deref(),
            query.msg.as_deref(),
            query.level.as_deref(),
        ),
    );
    Ok(Html(register_html).into_response())
}

pub async fn handle_register(
    State(store): State<MealStore>,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    register_form.validate().map_err(|message| AppError::Validation {
        form: "/register".into(),
        message,
    })?;

    // Check availability before hashing; the UNIQUE constraints still
    // backstop a concurrent registration.
    if store
        .find_user_by_username(&register_form.username)
        .await?
        .is_some()
    {
        return Err(AppError::Validation {
            form: "/register".into(),
            message: "Username already taken.".into(),
        });
    }
    if store
        .find_user_by_email(&register_form.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation {
            form: "/register".into(),
            message: "Email already registered.".into(),
        });
    }

    let password_hash = hash(register_form.password.as_bytes(), DEFAULT_COST)?;
    match store
        .create_user(&register_form.username, &register_form.email, &password_hash)
        .await
    {
        Ok(user_id) => {
            tracing::info!("Registered user {} ({})", register_form.username, user_id);
            // Only successful registration returns to the login form
            Ok(
                Redirect::to("/login?msg=Account%20created!%20You%20can%20now%20log%20in.&level=success")
                    .into_response(),
            )
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(AppError::Validation {
                form: "/register".into(),
                message: "Username or email already taken.".into(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn handle_logout(
    State(store): State<MealStore>,
    session: Session,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    auth::clear(&session).await?;
    tracing::info!("User {} logged out", user.username);
    Ok(Redirect::to("/login?msg=Logged%20out%20successfully!&level=info").into_response())
}
