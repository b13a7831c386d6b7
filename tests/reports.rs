mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use chrono::{Datelike, Duration, NaiveDate};
use foodtrack::models::MealType;
use foodtrack::stats::week_bounds;

/// Some day of the current calendar month that is not in the current week.
fn day_in_month_outside_week() -> Option<NaiveDate> {
    let today = common::today();
    let (start, end) = week_bounds(today);
    (1..=28)
        .filter_map(|day| NaiveDate::from_ymd_opt(today.year(), today.month(), day))
        .find(|day| *day < start || *day > end)
}

#[tokio::test]
async fn week_view_lists_only_the_current_week() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;
    common::add_meal(&mut client, "Lunch", "This week rice", "150").await?;

    let user_id = app.user_id("alice@example.com").await?;
    let (start, _) = week_bounds(common::today());
    common::seed_meal(
        &app,
        user_id,
        MealType::Supper,
        "Ten days ago stew",
        90.0,
        start - Duration::days(10),
    )
    .await?;

    let response = client.get("/reports").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This week rice"));
    assert!(!response.body.contains("Ten days ago stew"));
    Ok(())
}

#[tokio::test]
async fn month_view_spans_the_calendar_month() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;
    common::add_meal(&mut client, "Lunch", "Today rice", "150").await?;

    let user_id = app.user_id("alice@example.com").await?;
    common::seed_meal(
        &app,
        user_id,
        MealType::Supper,
        "Long ago stew",
        90.0,
        common::today() - Duration::days(40),
    )
    .await?;

    if let Some(day) = day_in_month_outside_week() {
        common::seed_meal(&app, user_id, MealType::Breakfast, "Same month tea", 30.0, day)
            .await?;

        let response = client.get("/reports?view=month").await?;
        assert!(response.body.contains("Today rice"));
        assert!(response.body.contains("Same month tea"));
        assert!(!response.body.contains("Long ago stew"));

        // the default week view must not include it
        let response = client.get("/reports").await?;
        assert!(!response.body.contains("Same month tea"));
    }
    Ok(())
}

#[tokio::test]
async fn summary_aggregates_all_time_daily_totals() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;

    let user_id = app.user_id("alice@example.com").await?;
    let low_day = common::today() - Duration::days(100);
    let high_day = common::today() - Duration::days(99);
    common::seed_meal(&app, user_id, MealType::Lunch, "Cheap day", 70.0, low_day).await?;
    common::seed_meal(&app, user_id, MealType::Lunch, "Pricey lunch", 100.0, high_day).await?;
    common::seed_meal(&app, user_id, MealType::Supper, "Pricey supper", 50.0, high_day).await?;

    let response = client.get("/reports").await?;
    assert_eq!(response.status, StatusCode::OK);

    let low_label = low_day.format("%b %d").to_string();
    let high_label = high_day.format("%b %d").to_string();
    assert!(response
        .body
        .contains(&format!(r#"const labels = ["{}","{}"];"#, low_label, high_label)));
    assert!(response.body.contains("const values = [70.0,150.0];"));

    assert!(response.body.contains("Ksh 220.00"));
    assert!(response.body.contains("Ksh 110.00"));
    assert!(response.body.contains(&format!("{} (Ksh 150.00)", high_label)));
    assert!(response.body.contains(&format!("{} (Ksh 70.00)", low_label)));
    Ok(())
}

#[tokio::test]
async fn empty_report_has_zeroed_summary() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;

    let response = client.get("/reports").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No meals in this period."));
    assert!(response.body.contains("- (Ksh 0.00)"));
    assert!(response.body.contains("const labels = [];"));
    assert!(response.body.contains("const values = [];"));
    Ok(())
}

#[tokio::test]
async fn csv_export_is_byte_exact() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;

    let user_id = app.user_id("alice@example.com").await?;
    common::seed_meal(
        &app,
        user_id,
        MealType::Lunch,
        "Rice",
        150.0,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
    .await?;
    common::seed_meal(
        &app,
        user_id,
        MealType::Breakfast,
        "Tea, with milk",
        30.5,
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    )
    .await?;

    let response = client.get("/export_csv").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "text/csv");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"foodtrack_alice_meals.csv\""
    );

    // newest first, quoted comma field, raw float rendering
    assert_eq!(
        response.body,
        "Date,Meal Type,Description,Cost\n\
         2024-01-02,Breakfast,\"Tea, with milk\",30.5\n\
         2024-01-01,Lunch,Rice,150.0\n"
    );
    Ok(())
}
