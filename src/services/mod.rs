pub mod auth;
mod store;

pub use store::{MealStore, UserSpend};
