#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{Local, NaiveDate};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::cookie::Key;

use foodtrack::models::MealType;
use foodtrack::services::MealStore;

const TEST_SECRET: &str =
    "test-secret-key-0123456789abcdefghijklmnopqrstuvwxyz-0123456789abcdef";

/// An in-memory application instance: the router plus direct store access
/// for seeding and inspection.
pub struct TestApp {
    pub router: Router,
    pub store: MealStore,
}

pub async fn spawn_app() -> Result<TestApp> {
    let store = MealStore::open_in_memory().await?;
    store.migrate().await?;
    let key = Key::try_from(TEST_SECRET.as_bytes()).context("bad test signing key")?;
    let router = foodtrack::create_router(store.clone(), key);
    Ok(TestApp { router, store })
}

impl TestApp {
    /// A fresh browser-like client with its own cookie jar.
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
        }
    }

    pub async fn user_id(&self, email: &str) -> Result<i64> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .context("no such user")?;
        Ok(user.id)
    }
}

/// Drives the router request by request, carrying the session cookie
/// between them the way a browser would.
pub struct Client {
    router: Router,
    cookie: Option<String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }
}

impl Client {
    pub async fn get(&mut self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Result<TestResponse> {
        let body = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))?;
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Result<TestResponse> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse()?);
        }

        let response = self.router.clone().oneshot(request).await?;

        // Adopt any refreshed session cookie, attributes stripped
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let raw = set_cookie.to_str()?;
            if let Some(pair) = raw.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        Ok(TestResponse {
            status: parts.status,
            headers: parts.headers,
            body: String::from_utf8(bytes.to_vec())?,
        })
    }
}

pub const PASSWORD: &str = "hunter22";

/// Registers the user and logs the client in, asserting both redirects.
pub async fn register_and_login(client: &mut Client, username: &str, email: &str) -> Result<()> {
    let response = client
        .post_form(
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ],
        )
        .await?;
    anyhow::ensure!(
        response.status == StatusCode::SEE_OTHER && response.location().starts_with("/login"),
        "registration did not redirect to login: {} {}",
        response.status,
        response.location()
    );

    let response = client
        .post_form("/login", &[("email", email), ("password", PASSWORD)])
        .await?;
    anyhow::ensure!(
        response.status == StatusCode::SEE_OTHER && response.location() == "/dashboard",
        "login did not redirect to dashboard: {} {}",
        response.status,
        response.location()
    );
    Ok(())
}

pub async fn add_meal(client: &mut Client, meal_type: &str, description: &str, cost: &str) -> Result<TestResponse> {
    client
        .post_form(
            "/add",
            &[
                ("meal_type", meal_type),
                ("description", description),
                ("cost", cost),
            ],
        )
        .await
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Seeds a meal directly, bypassing the HTTP layer's today-only dating.
pub async fn seed_meal(
    app: &TestApp,
    user_id: i64,
    meal_type: MealType,
    description: &str,
    cost: f64,
    date: NaiveDate,
) -> Result<i64> {
    let id = app
        .store
        .insert_meal(user_id, meal_type, description, cost, date)
        .await?;
    Ok(id)
}
