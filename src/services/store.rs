use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::models::{Meal, MealType, User};

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0
)";

const CREATE_MEALS: &str = "CREATE TABLE IF NOT EXISTS meals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    meal_type TEXT NOT NULL,
    description TEXT NOT NULL,
    cost REAL NOT NULL,
    date TEXT NOT NULL,
    CONSTRAINT unique_meal_per_user_per_day UNIQUE (user_id, date, meal_type)
)";

/// Per-user roll-up row for the admin dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSpend {
    pub user_id: i64,
    pub username: String,
    pub meal_count: i64,
    pub total_cost: f64,
}

#[derive(Clone)]
pub struct MealStore {
    pool: SqlitePool,
}

impl MealStore {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// In-memory store; a single never-recycled connection keeps the
    /// database alive for the pool's lifetime.
    pub async fn open_in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Creates the schema on startup if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_USERS).execute(&self.pool).await?;
        sqlx::query(CREATE_MEALS).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_admin FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_admin FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_admin FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// Admins are provisioned out of band by flipping this flag.
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET is_admin = ? WHERE id = ?")
            .bind(is_admin)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a meal. The UNIQUE (user_id, date, meal_type) constraint is
    /// the final arbiter for duplicates; callers convert that violation.
    pub async fn insert_meal(
        &self,
        user_id: i64,
        meal_type: MealType,
        description: &str,
        cost: f64,
        date: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO meals (user_id, meal_type, description, cost, date)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(meal_type)
        .bind(description)
        .bind(cost)
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_meal(&self, meal_id: i64) -> Result<Option<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(
            "SELECT id, user_id, meal_type, description, cost, date FROM meals WHERE id = ?",
        )
        .bind(meal_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_meal(
        &self,
        meal_id: i64,
        meal_type: MealType,
        description: &str,
        cost: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE meals SET meal_type = ?, description = ?, cost = ? WHERE id = ?")
            .bind(meal_type)
            .bind(description)
            .bind(cost)
            .bind(meal_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_meal(&self, meal_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM meals WHERE id = ?")
            .bind(meal_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Advisory duplicate pre-check for the add-meal path.
    pub async fn has_meal(
        &self,
        user_id: i64,
        date: NaiveDate,
        meal_type: MealType,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM meals WHERE user_id = ? AND date = ? AND meal_type = ? LIMIT 1",
        )
        .bind(user_id)
        .bind(date)
        .bind(meal_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn meals_for_day(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(
            "SELECT id, user_id, meal_type, description, cost, date FROM meals
             WHERE user_id = ? AND date = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn meals_in_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(
            "SELECT id, user_id, meal_type, description, cost, date FROM meals
             WHERE user_id = ? AND date >= ? AND date <= ? ORDER BY date, id",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn meals_in_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<Meal>, sqlx::Error> {
        let month_key = format!("{:04}-{:02}", year, month);
        sqlx::query_as::<_, Meal>(
            "SELECT id, user_id, meal_type, description, cost, date FROM meals
             WHERE user_id = ? AND strftime('%Y-%m', date) = ? ORDER BY date, id",
        )
        .bind(user_id)
        .bind(month_key)
        .fetch_all(&self.pool)
        .await
    }

    /// Full history newest-first, the order used by exports and the admin
    /// detail view.
    pub async fn meals_for_user_desc(&self, user_id: i64) -> Result<Vec<Meal>, sqlx::Error> {
        sqlx::query_as::<_, Meal>(
            "SELECT id, user_id, meal_type, description, cost, date FROM meals
             WHERE user_id = ? ORDER BY date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// All-time per-day cost totals for one user, date-ascending.
    pub async fn daily_totals(&self, user_id: i64) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT date, SUM(cost) FROM meals WHERE user_id = ?
             GROUP BY date ORDER BY date",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn daily_totals_in_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT date, SUM(cost) FROM meals
             WHERE user_id = ? AND date >= ? AND date <= ?
             GROUP BY date ORDER BY date",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_meals(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM meals")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn total_spend(&self) -> Result<f64, sqlx::Error> {
        let (total,): (f64,) = sqlx::query_as("SELECT COALESCE(SUM(cost), 0.0) FROM meals")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Cross-user per-day totals, most recent day first, capped at `days`.
    pub async fn recent_daily_totals(
        &self,
        days: i64,
    ) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT date, SUM(cost) FROM meals GROUP BY date ORDER BY date DESC LIMIT ?",
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await
    }

    /// Meal count and total cost per user, zero-filled for users with no
    /// meals, ordered by username.
    pub async fn user_spend_rollup(&self) -> Result<Vec<UserSpend>, sqlx::Error> {
        sqlx::query_as::<_, UserSpend>(
            "SELECT u.id AS user_id, u.username, COUNT(m.id) AS meal_count,
                    COALESCE(SUM(m.cost), 0.0) AS total_cost
             FROM users u LEFT JOIN meals m ON m.user_id = u.id
             GROUP BY u.id, u.username ORDER BY u.username",
        )
        .fetch_all(&self.pool)
        .await
    }
}
