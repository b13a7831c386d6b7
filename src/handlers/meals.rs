use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Local;
use std::fs;
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::export::format_cost;
use crate::handlers::{escape_html, flash_html};
use crate::models::{FlashQuery, Meal, MealForm, MealType, User};
use crate::services::{auth, MealStore};

pub async fn serve_add_meal(
    State(store): State<MealStore>,
    session: Session,
    Query(query): Query<FlashQuery>,
) -> AppResult<Response> {
    auth::require_user(&session, &store).await?;
    render_meal_form(None, &query)
}

#[axum::debug_handler]
pub async fn handle_add_meal(
    State(store): State<MealStore>,
    session: Session,
    Form(meal_form): Form<MealForm>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    meal_form.validate().map_err(|message| AppError::Validation {
        form: "/add".into(),
        message,
    })?;

    let today = Local::now().date_naive();
    if store.has_meal(user.id, today, meal_form.meal_type).await? {
        return Err(duplicate_meal(meal_form.meal_type));
    }

    match store
        .insert_meal(
            user.id,
            meal_form.meal_type,
            meal_form.description.trim(),
            meal_form.cost,
            today,
        )
        .await
    {
        Ok(meal_id) => {
            tracing::info!(
                "User {} logged {} (meal {})",
                user.username,
                meal_form.meal_type,
                meal_id
            );
            Ok(Redirect::to("/dashboard?msg=Meal%20added%20successfully!&level=success")
                .into_response())
        }
        // The pre-check can lose a race; the constraint is authoritative
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(duplicate_meal(meal_form.meal_type))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn serve_edit_meal(
    State(store): State<MealStore>,
    session: Session,
    Path(meal_id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    let meal = editable_meal(&store, &user, meal_id, "edit").await?;
    render_meal_form(Some(&meal), &query)
}

#[axum::debug_handler]
pub async fn handle_edit_meal(
    State(store): State<MealStore>,
    session: Session,
    Path(meal_id): Path<i64>,
    Form(meal_form): Form<MealForm>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    let meal = editable_meal(&store, &user, meal_id, "edit").await?;
    meal_form.validate().map_err(|message| AppError::Validation {
        form: format!("/edit/{}", meal.id),
        message,
    })?;

    match store
        .update_meal(
            meal.id,
            meal_form.meal_type,
            meal_form.description.trim(),
            meal_form.cost,
        )
        .await
    {
        Ok(()) => {
            tracing::info!("User {} updated meal {}", user.username, meal.id);
            Ok(Redirect::to("/dashboard?msg=Meal%20updated%20successfully!&level=success")
                .into_response())
        }
        // Retyping a meal into a slot that is already taken for the day
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(duplicate_meal(meal_form.meal_type))
        }
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn handle_delete_meal(
    State(store): State<MealStore>,
    session: Session,
    Path(meal_id): Path<i64>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    let meal = editable_meal(&store, &user, meal_id, "delete").await?;

    store.delete_meal(meal.id).await?;
    tracing::info!("User {} deleted meal {}", user.username, meal.id);
    Ok(Redirect::to("/dashboard?msg=Meal%20deleted%20successfully!&level=success").into_response())
}

/// Loads a meal and applies the ownership and same-day rules shared by
/// edit and delete. `verb` fills the refusal messages.
async fn editable_meal(
    store: &MealStore,
    user: &User,
    meal_id: i64,
    verb: &str,
) -> AppResult<Meal> {
    let meal = store.find_meal(meal_id).await?.ok_or(AppError::NotFound)?;

    if meal.user_id != user.id {
        tracing::warn!(
            "User {} tried to {} meal {} owned by user {}",
            user.username,
            verb,
            meal.id,
            meal.user_id
        );
        return Err(AppError::Authorization(format!(
            "You are not authorized to {} this meal.",
            verb
        )));
    }

    // Meals are only mutable on the day they were logged
    if meal.date != Local::now().date_naive() {
        return Err(AppError::Immutable(format!(
            "You cannot {} past meals.",
            verb
        )));
    }

    Ok(meal)
}

fn duplicate_meal(meal_type: MealType) -> AppError {
    AppError::DuplicateMeal(format!("You have already logged {} for today.", meal_type))
}

/// Renders the meal form, prefilled when editing an existing meal.
fn render_meal_form(meal: Option<&Meal>, query: &FlashQuery) -> AppResult<Response> {
    let template = fs::read_to_string("templates/add_meal.html")?;

    let html = match meal {
        Some(meal) => template
            .replace("{{heading}}", "Edit Meal")
            .replace("{{action}}", &format!("/edit/{}", meal.id))
            .replace("{{submit_label}}", "Update Meal")
            .replace("{{meal_type_options}}", &meal_type_options(Some(meal.meal_type)))
            .replace("{{description}}", &escape_html(&meal.description))
            .replace("{{cost}}", &format_cost(meal.cost)),
        None => template
            .replace("{{heading}}", "Add Meal")
            .replace("{{action}}", "/add")
            .replace("{{submit_label}}", "Add Meal")
            .replace("{{meal_type_options}}", &meal_type_options(None))
            .replace("{{description}}", "")
            .replace("{{cost}}", ""),
    };
    let html = html.replace(
        "{{flash}}",
        &flash_html(
            query.error.as_deref(),
            query.msg.as_deref(),
            query.level.as_deref(),
        ),
    );
    Ok(Html(html).into_response())
}

fn meal_type_options(selected: Option<MealType>) -> String {
    MealType::ALL
        .iter()
        .map(|meal_type| {
            let marker = if selected == Some(*meal_type) { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                meal_type, marker, meal_type
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
