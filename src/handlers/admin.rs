use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::fs;
use tower_sessions::Session;

use crate::errors::{AppError, AppResult};
use crate::export;
use crate::handlers::{escape_html, flash_html};
use crate::models::{FlashQuery, Meal};
use crate::services::{auth, MealStore};
use crate::stats::round2;

/// Site-wide usage statistics: headline counts, a 7-day spend trend and a
/// per-user roll-up. Admin only.
pub async fn admin_dashboard(
    State(store): State<MealStore>,
    session: Session,
    Query(query): Query<FlashQuery>,
) -> AppResult<Response> {
    let admin = auth::require_admin(&session, &store).await?;
    tracing::info!("Admin dashboard viewed by {}", admin.username);

    let total_users = store.count_users().await?;
    let total_meals = store.count_meals().await?;
    let total_spend = store.total_spend().await?;
    let avg_cost = if total_meals > 0 {
        round2(total_spend / total_meals as f64)
    } else {
        0.0
    };

    // Most recent day first, matching how the trend table reads
    let totals_by_day = store.recent_daily_totals(7).await?;
    let labels: Vec<String> = totals_by_day
        .iter()
        .map(|(day, _)| day.format("%b %d").to_string())
        .collect();
    let values: Vec<f64> = totals_by_day.iter().map(|(_, total)| *total).collect();

    let users = store.user_spend_rollup().await?;
    let user_rows = if users.is_empty() {
        r#"<tr><td colspan="4" class="empty">No registered users.</td></tr>"#.to_string()
    } else {
        users
            .iter()
            .map(|user| {
                format!(
                    r#"<tr>
                <td><a href="/admin/user/{}">{}</a></td>
                <td>{}</td>
                <td>Ksh {:.2}</td>
                <td class="action-cell"><a href="/admin/user/{}/export" class="view-btn">Export CSV</a></td>
            </tr>"#,
                    user.user_id,
                    escape_html(&user.username),
                    user.meal_count,
                    user.total_cost,
                    user.user_id
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let template = fs::read_to_string("templates/admin_dashboard.html").map_err(|e| {
        tracing::error!("Failed to read admin dashboard template: {}", e);
        e
    })?;

    let html = template
        .replace("{{flash}}", &flash_html(
            query.error.as_deref(),
            query.msg.as_deref(),
            query.level.as_deref(),
        ))
        .replace("{{total_users}}", &total_users.to_string())
        .replace("{{total_meals}}", &total_meals.to_string())
        .replace("{{total_spend}}", &format!("{:.2}", total_spend))
        .replace("{{avg_cost}}", &format!("{:.2}", avg_cost))
        .replace("{{user_rows}}", &user_rows)
        .replace("{{chart_labels}}", &serde_json::to_string(&labels).unwrap_or_default())
        .replace("{{chart_values}}", &serde_json::to_string(&values).unwrap_or_default());

    Ok(Html(html).into_response())
}

/// One user's complete meal history with their spend trend. Admin only.
pub async fn admin_user_detail(
    State(store): State<MealStore>,
    session: Session,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    let admin = auth::require_admin(&session, &store).await?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("Admin {} viewing user {}", admin.username, user.username);

    // History newest-first for the table, trend oldest-first for the chart
    let meals = store.meals_for_user_desc(user.id).await?;
    let totals_by_day = store.daily_totals(user.id).await?;

    let total_meals = meals.len();
    let total_spent: f64 = meals.iter().map(|meal| meal.cost).sum();

    let labels: Vec<String> = totals_by_day
        .iter()
        .map(|(day, _)| day.format("%b %d").to_string())
        .collect();
    let values: Vec<f64> = totals_by_day.iter().map(|(_, total)| *total).collect();

    let meal_rows = if meals.is_empty() {
        r#"<tr><td colspan="4" class="empty">No meals logged.</td></tr>"#.to_string()
    } else {
        meals.iter().map(detail_meal_row).collect::<Vec<_>>().join("\n")
    };

    let template = fs::read_to_string("templates/admin_user_detail.html").map_err(|e| {
        tracing::error!("Failed to read admin user detail template: {}", e);
        e
    })?;

    let html = template
        .replace("{{username}}", &escape_html(&user.username))
        .replace("{{email}}", &escape_html(&user.email))
        .replace("{{user_id}}", &user.id.to_string())
        .replace("{{total_meals}}", &total_meals.to_string())
        .replace("{{total_spent}}", &format!("{:.2}", total_spent))
        .replace("{{meal_rows}}", &meal_rows)
        .replace("{{chart_labels}}", &serde_json::to_string(&labels).unwrap_or_default())
        .replace("{{chart_values}}", &serde_json::to_string(&values).unwrap_or_default());

    Ok(Html(html).into_response())
}

fn detail_meal_row(meal: &Meal) -> String {
    format!(
        r#"<tr>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>Ksh {:.2}</td>
            </tr>"#,
        meal.date.format("%Y-%m-%d"),
        meal.meal_type,
        escape_html(&meal.description),
        meal.cost
    )
}

/// Downloads one user's meal history as CSV. Admin only.
pub async fn admin_user_export(
    State(store): State<MealStore>,
    session: Session,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    let admin = auth::require_admin(&session, &store).await?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!("Admin {} exporting meals for {}", admin.username, user.username);

    let meals = store.meals_for_user_desc(user.id).await?;
    let csv = export::meals_csv(&meals);
    let filename = export::admin_export_filename(&user.username);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))?;

    Ok(response)
}
