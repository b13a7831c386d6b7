use serde::Deserialize;
use super::meal::MealType;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    // Mirrors the registration form rules: username 3-50, valid email,
    // password 6-80 with matching confirmation.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.len() < 3 || self.username.len() > 50 {
            return Err("Username must be between 3 and 50 characters.".into());
        }
        if !is_plausible_email(&self.email) {
            return Err("Please enter a valid email address.".into());
        }
        if self.password.len() < 6 || self.password.len() > 80 {
            return Err("Password must be between 6 and 80 characters.".into());
        }
        if self.password != self.confirm_password {
            return Err("Passwords must match.".into());
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.len() > 100 {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct MealForm {
    pub meal_type: MealType,
    pub description: String,
    pub cost: f64,
}

impl MealForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("Description is required.".into());
        }
        if self.description.len() > 100 {
            return Err("Description must be at most 100 characters.".into());
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err("Cost must be a non-negative number.".into());
        }
        Ok(())
    }
}

// Flash parameters carried on redirects (?error=...&msg=...&level=...),
// read back by the page handlers that render them.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
    pub msg: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub week: Option<String>,
    pub date: Option<String>,
    pub error: Option<String>,
    pub msg: Option<String>,
    pub level: Option<String>,
}

impl DashboardQuery {
    pub fn week_mode(&self) -> bool {
        self.week.as_deref() == Some("1")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub view: Option<String>,
}
