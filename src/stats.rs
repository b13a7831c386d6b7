use chrono::{Datelike, Duration, NaiveDate};

use crate::models::MealType;

/// Returns the Monday and Sunday of the ISO week containing `day`.
///
/// # Arguments
///
/// * `day` - Any calendar date.
///
/// # Returns
///
/// A `(start, end)` pair where `start` is the Monday of the week and
/// `end = start + 6 days`; `day` always falls inside the range.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    (start, start + Duration::days(6))
}

/// Computes which of the expected daily meals are still unlogged.
///
/// The reminder only applies to the current day: for any other `selected`
/// date the result is empty. Snack is optional and never reported missing.
pub fn missing_meal_types(
    selected: NaiveDate,
    today: NaiveDate,
    logged: &[MealType],
) -> Vec<MealType> {
    if selected != today {
        return Vec::new();
    }
    MealType::EXPECTED_DAILY
        .iter()
        .copied()
        .filter(|expected| !logged.contains(expected))
        .collect()
}

/// Rounds to two decimal places, the precision used for money figures.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Headline spend figures derived from per-day cost totals.
///
/// `labels`/`values` are parallel arrays feeding the spend chart; the
/// remaining fields summarise them for the report cards.
#[derive(Debug, Clone, Default)]
pub struct SpendSummary {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub total_spent: f64,
    pub avg_spent: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub max_day: Option<String>,
    pub min_day: Option<String>,
}

impl SpendSummary {
    /// Builds a summary from per-day totals ordered date-ascending.
    ///
    /// The average is rounded to two decimals; ties for the maximum or
    /// minimum day resolve to the earliest date. An empty input produces
    /// zero totals and absent max/min days rather than an error.
    pub fn from_daily_totals(totals: &[(NaiveDate, f64)]) -> Self {
        let labels: Vec<String> = totals
            .iter()
            .map(|(day, _)| day.format("%b %d").to_string())
            .collect();
        let values: Vec<f64> = totals.iter().map(|(_, total)| *total).collect();

        let total_spent: f64 = values.iter().sum();
        let avg_spent = if values.is_empty() {
            0.0
        } else {
            round2(total_spent / values.len() as f64)
        };

        if values.is_empty() {
            return Self {
                labels,
                values,
                total_spent,
                avg_spent,
                ..Self::default()
            };
        }

        let mut max_i = 0;
        let mut min_i = 0;
        for (i, value) in values.iter().enumerate().skip(1) {
            if *value > values[max_i] {
                max_i = i;
            }
            if *value < values[min_i] {
                min_i = i;
            }
        }

        Self {
            total_spent,
            avg_spent,
            max_value: values[max_i],
            min_value: values[min_i],
            max_day: Some(labels[max_i].clone()),
            min_day: Some(labels[min_i].clone()),
            labels,
            values,
        }
    }
}
