use std::borrow::Cow;

use crate::models::Meal;

const CSV_HEADER: &str = "Date,Meal Type,Description,Cost";

/// Renders meals as CSV: one header row, then one row per meal in the
/// order given (callers pass them date-descending).
///
/// Costs keep the shortest round-trip rendering with at least one
/// fractional digit, so a stored 150 exports as `150.0`. Fields containing
/// a comma, quote, or newline are quoted with inner quotes doubled.
pub fn meals_csv(meals: &[Meal]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for meal in meals {
        out.push_str(&format!(
            "{},{},{},{}\n",
            meal.date.format("%Y-%m-%d"),
            meal.meal_type,
            csv_field(&meal.description),
            format_cost(meal.cost),
        ));
    }
    out
}

pub fn format_cost(cost: f64) -> String {
    format!("{:?}", cost)
}

/// Download filename for a user's own export.
pub fn export_filename(username: &str) -> String {
    format!("foodtrack_{}_meals.csv", username)
}

/// Download filename for the admin per-user export.
pub fn admin_export_filename(username: &str) -> String {
    format!("{}_meals.csv", username)
}

fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
