use foodtrack::config::Config;
use foodtrack::services::MealStore;
use tower_sessions::cookie::Key;
use tracing_subscriber;

#[tokio::main]
async fn main() {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().expect("Failed to load configuration");

    // Open the database and create the schema if missing
    let store = MealStore::connect(&config.database.url)
        .await
        .expect("Failed to open database");
    store.migrate().await.expect("Failed to create schema");

    // Session cookies are signed with the configured secret
    let session_key = Key::try_from(config.secret_key.as_bytes())
        .expect("secret_key is not usable as a signing key");

    let app = foodtrack::create_router(store, session_key);

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))
    .await
    .expect("Failed to bind server");

    tracing::info!(
        "Server running on {}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Failed to start server");
}
