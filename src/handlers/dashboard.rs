use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use chrono::{Duration, Local, NaiveDate};
use std::fs;
use tower_sessions::Session;

use crate::errors::AppResult;
use crate::handlers::{escape_html, flash_html};
use crate::models::{DashboardQuery, Meal};
use crate::services::{auth, MealStore};
use crate::stats;

/// The landing page after login: today's meals with a reminder for the
/// ones not logged yet, or the running week when `?week=1`.
pub async fn serve_dashboard(
    State(store): State<MealStore>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    tracing::info!("Rendering dashboard for {}", user.username);

    let flash = flash_html(
        query.error.as_deref(),
        query.msg.as_deref(),
        query.level.as_deref(),
    );
    let today = Local::now().date_naive();

    if query.week_mode() {
        return render_week(&store, user.id, &user.username, today, &flash).await;
    }

    // Bad or absent date parameters fall back to today
    let selected = query
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .unwrap_or(today);

    let meals = store.meals_for_day(user.id, selected).await?;
    let total: f64 = meals.iter().map(|meal| meal.cost).sum();

    let logged: Vec<_> = meals.iter().map(|meal| meal.meal_type).collect();
    let missing = stats::missing_meal_types(selected, today, &logged);
    let reminder = if missing.is_empty() {
        String::new()
    } else {
        let names: Vec<_> = missing
            .iter()
            .map(|meal_type| meal_type.as_str().to_lowercase())
            .collect();
        format!(
            r#"<div class="alert alert-info">You haven't logged {} today.</div>"#,
            names.join(", ")
        )
    };

    let meal_rows = if meals.is_empty() {
        r#"<tr><td colspan="4" class="empty">No meals logged for this day.</td></tr>"#.to_string()
    } else {
        meals
            .iter()
            .map(|meal| daily_meal_row(meal, today))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let template = fs::read_to_string("templates/dashboard.html").map_err(|e| {
        tracing::error!("Failed to read dashboard template: {}", e);
        e
    })?;

    let html = template
        .replace("{{username}}", &escape_html(&user.username))
        .replace("{{flash}}", &flash)
        .replace("{{date_heading}}", &selected.format("%A, %b %d, %Y").to_string())
        .replace("{{date}}", &selected.format("%Y-%m-%d").to_string())
        .replace(
            "{{prev_date}}",
            &(selected - Duration::days(1)).format("%Y-%m-%d").to_string(),
        )
        .replace(
            "{{next_date}}",
            &(selected + Duration::days(1)).format("%Y-%m-%d").to_string(),
        )
        .replace("{{reminder}}", &reminder)
        .replace("{{meal_rows}}", &meal_rows)
        .replace("{{total}}", &format!("{:.2}", total));

    Ok(Html(html).into_response())
}

async fn render_week(
    store: &MealStore,
    user_id: i64,
    username: &str,
    today: NaiveDate,
    flash: &str,
) -> AppResult<Response> {
    let (start, end) = stats::week_bounds(today);
    let meals = store.meals_in_range(user_id, start, end).await?;
    let totals_by_day = store.daily_totals_in_range(user_id, start, end).await?;
    let total_spent: f64 = totals_by_day.iter().map(|(_, total)| total).sum();

    let meal_rows = if meals.is_empty() {
        r#"<tr><td colspan="4" class="empty">No meals logged this week.</td></tr>"#.to_string()
    } else {
        meals
            .iter()
            .map(|meal| {
                format!(
                    r#"<tr>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>Ksh {:.2}</td>
            </tr>"#,
                    meal.date.format("%a, %b %d"),
                    meal.meal_type,
                    escape_html(&meal.description),
                    meal.cost
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let day_total_rows = totals_by_day
        .iter()
        .map(|(day, total)| {
            format!(
                r#"<tr><td>{}</td><td>Ksh {:.2}</td></tr>"#,
                day.format("%a, %b %d"),
                total
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let template = fs::read_to_string("templates/dashboard_week.html").map_err(|e| {
        tracing::error!("Failed to read weekly dashboard template: {}", e);
        e
    })?;

    let html = template
        .replace("{{username}}", &escape_html(username))
        .replace("{{flash}}", flash)
        .replace("{{week_start}}", &start.format("%b %d").to_string())
        .replace("{{week_end}}", &end.format("%b %d, %Y").to_string())
        .replace("{{meal_rows}}", &meal_rows)
        .replace("{{day_total_rows}}", &day_total_rows)
        .replace("{{total_spent}}", &format!("{:.2}", total_spent));

    Ok(Html(html).into_response())
}

// Edit and delete only make sense while the meal is still mutable, so the
// action cell stays empty for past days.
fn daily_meal_row(meal: &Meal, today: NaiveDate) -> String {
    let actions = if meal.date == today {
        format!(
            r#"<a href="/edit/{}" class="edit-btn">Edit</a>
                    <form method="post" action="/delete/{}" class="inline-form"><button type="submit" class="delete-btn">Delete</button></form>"#,
            meal.id, meal.id
        )
    } else {
        String::new()
    };
    format!(
        r#"<tr>
                <td>{}</td>
                <td>{}</td>
                <td>Ksh {:.2}</td>
                <td class="action-cell">{}</td>
            </tr>"#,
        meal.meal_type,
        escape_html(&meal.description),
        meal.cost,
        actions
    )
}
