mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};
use chrono::Duration;
use foodtrack::models::MealType;

async fn make_admin(app: &common::TestApp, email: &str) -> Result<i64> {
    let user_id = app.user_id(email).await?;
    app.store.set_admin(user_id, true).await?;
    Ok(user_id)
}

#[tokio::test]
async fn admin_routes_are_forbidden_for_regular_users() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut client = app.client();
    common::register_and_login(&mut client, "alice", "alice@example.com").await?;

    for path in ["/admin", "/admin/user/1", "/admin/user/1/export"] {
        let response = client.get(path).await?;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", path);
    }

    // without a session they redirect to login instead
    let mut anonymous = app.client();
    let response = anonymous.get("/admin").await?;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.location().starts_with("/login"));
    Ok(())
}

#[tokio::test]
async fn admin_dashboard_aggregates_across_users() -> Result<()> {
    let app = common::spawn_app().await?;

    let mut bob = app.client();
    common::register_and_login(&mut bob, "bob", "bob@example.com").await?;
    common::add_meal(&mut bob, "Lunch", "Rice", "150").await?;
    common::add_meal(&mut bob, "Supper", "Ugali", "50").await?;

    let mut admin = app.client();
    common::register_and_login(&mut admin, "alice", "alice@example.com").await?;
    make_admin(&app, "alice@example.com").await?;

    let response = admin.get("/admin").await?;
    assert_eq!(response.status, StatusCode::OK);
    // 2 users, 2 meals, 200 total, 100 average
    assert!(response.body.contains("Ksh 200.00"));
    assert!(response.body.contains("Ksh 100.00"));
    // per-user roll-up: alice zero-filled, bob with totals
    assert!(response.body.contains("alice"));
    assert!(response.body.contains("Ksh 0.00"));
    assert!(response.body.contains("Ksh 200.00"));

    let bob_id = app.user_id("bob@example.com").await?;
    assert!(response.body.contains(&format!("/admin/user/{}", bob_id)));
    Ok(())
}

#[tokio::test]
async fn admin_dashboard_handles_the_empty_store() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut admin = app.client();
    common::register_and_login(&mut admin, "alice", "alice@example.com").await?;
    make_admin(&app, "alice@example.com").await?;

    let response = admin.get("/admin").await?;
    assert_eq!(response.status, StatusCode::OK);
    // no meals: spend and average are zero, not an error
    assert!(response.body.contains("Ksh 0.00"));
    assert!(response.body.contains("const labels = [];"));
    Ok(())
}

#[tokio::test]
async fn user_detail_shows_history_newest_first() -> Result<()> {
    let app = common::spawn_app().await?;

    let mut bob = app.client();
    common::register_and_login(&mut bob, "bob", "bob@example.com").await?;
    let bob_id = app.user_id("bob@example.com").await?;

    let today = common::today();
    common::seed_meal(&app, bob_id, MealType::Lunch, "Older lunch", 80.0, today - Duration::days(2)).await?;
    common::seed_meal(&app, bob_id, MealType::Lunch, "Newer lunch", 120.0, today).await?;

    let mut admin = app.client();
    common::register_and_login(&mut admin, "alice", "alice@example.com").await?;
    make_admin(&app, "alice@example.com").await?;

    let response = admin.get(&format!("/admin/user/{}", bob_id)).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("bob@example.com"));
    assert!(response.body.contains("Ksh 200.00"));

    // table rows are newest first
    let newer = response.body.find("Newer lunch").unwrap();
    let older = response.body.find("Older lunch").unwrap();
    assert!(newer < older);

    // the chart runs oldest to newest
    let labels_line = format!(
        r#"const labels = ["{}","{}"];"#,
        (today - Duration::days(2)).format("%b %d"),
        today.format("%b %d")
    );
    assert!(response.body.contains(&labels_line));
    Ok(())
}

#[tokio::test]
async fn unknown_user_detail_is_a_404() -> Result<()> {
    let app = common::spawn_app().await?;
    let mut admin = app.client();
    common::register_and_login(&mut admin, "alice", "alice@example.com").await?;
    make_admin(&app, "alice@example.com").await?;

    let response = admin.get("/admin/user/9999").await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = admin.get("/admin/user/9999/export").await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admin_export_uses_the_plain_filename() -> Result<()> {
    let app = common::spawn_app().await?;

    let mut bob = app.client();
    common::register_and_login(&mut bob, "bob", "bob@example.com").await?;
    common::add_meal(&mut bob, "Lunch", "Rice", "150").await?;

    let mut admin = app.client();
    common::register_and_login(&mut admin, "alice", "alice@example.com").await?;
    make_admin(&app, "alice@example.com").await?;

    let bob_id = app.user_id("bob@example.com").await?;
    let response = admin.get(&format!("/admin/user/{}/export", bob_id)).await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "text/csv");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=\"bob_meals.csv\""
    );
    assert!(response.body.starts_with("Date,Meal Type,Description,Cost\n"));
    assert!(response.body.contains(",Lunch,Rice,150.0\n"));
    Ok(())
}
