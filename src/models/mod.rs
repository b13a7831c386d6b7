mod user;
mod forms;
mod meal;

pub use user::User;
pub use forms::{DashboardQuery, FlashQuery, LoginForm, MealForm, RegisterForm, ReportQuery};
pub use meal::{Meal, MealType};
