use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, Local};
use std::fs;
use tower_sessions::Session;

use crate::errors::AppResult;
use crate::export;
use crate::handlers::escape_html;
use crate::models::{Meal, ReportQuery};
use crate::services::{auth, MealStore};
use crate::stats::{self, SpendSummary};

/// Spend report: the current week's or month's meals plus all-time
/// per-day aggregates feeding the chart and the summary cards.
pub async fn serve_reports(
    State(store): State<MealStore>,
    session: Session,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;

    let today = Local::now().date_naive();
    // Anything that is not "month" reads as the default week view
    let (view, period_label, meals) = if query.view.as_deref() == Some("month") {
        let meals = store
            .meals_in_month(user.id, today.year(), today.month())
            .await?;
        ("month", today.format("%B %Y").to_string(), meals)
    } else {
        let (start, end) = stats::week_bounds(today);
        let meals = store.meals_in_range(user.id, start, end).await?;
        let label = format!("{} - {}", start.format("%b %d"), end.format("%b %d, %Y"));
        ("week", label, meals)
    };
    let period_total: f64 = meals.iter().map(|meal| meal.cost).sum();

    let totals_by_day = store.daily_totals(user.id).await?;
    let summary = SpendSummary::from_daily_totals(&totals_by_day);

    let meal_rows = if meals.is_empty() {
        r#"<tr><td colspan="4" class="empty">No meals in this period.</td></tr>"#.to_string()
    } else {
        meals.iter().map(report_meal_row).collect::<Vec<_>>().join("\n")
    };

    let template = fs::read_to_string("templates/reports.html").map_err(|e| {
        tracing::error!("Failed to read reports template: {}", e);
        e
    })?;

    let html = template
        .replace("{{view}}", view)
        .replace("{{period_label}}", &period_label)
        .replace("{{meal_rows}}", &meal_rows)
        .replace("{{period_total}}", &format!("{:.2}", period_total))
        .replace("{{total_spent}}", &format!("{:.2}", summary.total_spent))
        .replace("{{avg_spent}}", &format!("{:.2}", summary.avg_spent))
        .replace("{{max_day}}", summary.max_day.as_deref().unwrap_or("-"))
        .replace("{{min_day}}", summary.min_day.as_deref().unwrap_or("-"))
        .replace("{{max_value}}", &format!("{:.2}", summary.max_value))
        .replace("{{min_value}}", &format!("{:.2}", summary.min_value))
        .replace("{{chart_labels}}", &serde_json::to_string(&summary.labels).unwrap_or_default())
        .replace("{{chart_values}}", &serde_json::to_string(&summary.values).unwrap_or_default());

    Ok(Html(html).into_response())
}

fn report_meal_row(meal: &Meal) -> String {
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

/// Downloads the user's full meal history as a CSV attachment.
pub async fn export_csv(
    State(store): State<MealStore>,
    session: Session,
) -> AppResult<Response> {
    let user = auth::require_user(&session, &store).await?;
    tracing::info!("CSV export for {}", user.username);

    let meals = store.meals_for_user_desc(user.id).await?;
    let csv = export::meals_csv(&meals);
    let filename = export::export_filename(&user.username);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        // Tell the browser to download the file instead of displaying it
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))?;

    Ok(response)
}
