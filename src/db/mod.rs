pub mod meal_log;

pub use meal_log::{remaining_kcal, MealLogStore};
