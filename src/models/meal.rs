use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;
use std::fmt;

// Stored as text ("Breakfast", "Lunch", ...) to match the unique
// (user_id, date, meal_type) constraint in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, sqlx::Type)]
pub enum MealType {
    Breakfast,
    Lunch,
    Supper,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Supper,
        MealType::Snack,
    ];

    // Snack is optional and never drives the daily reminder
    pub const EXPECTED_DAILY: [MealType; 3] =
        [MealType::Breakfast, MealType::Lunch, MealType::Supper];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Supper => "Supper",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    pub meal_type: MealType,
    pub description: String,
    pub cost: f64,
    pub date: NaiveDate,
}
