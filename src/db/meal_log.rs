//! SQLite-backed meal log.

use std::str::FromStr;

use chrono::Local;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::MealLog;

const CREATE_TABLE_SQL: &str = "\
    CREATE TABLE IF NOT EXISTS meal_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts TEXT NOT NULL,
        date TEXT NOT NULL,
        meal_type TEXT NOT NULL,
        name TEXT NOT NULL,
        kcal REAL NOT NULL
    )";

/// Store for consumed meals and daily calorie sums.
pub struct MealLogStore {
    pool: SqlitePool,
}

impl MealLogStore {
    /// Opens the database (creating it if missing) and ensures the schema.
    pub async fn open(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // a single connection keeps in-memory databases coherent
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_TABLE_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Records a consumed meal, returning its row id.
    pub async fn insert(&self, meal_type: &str, name: &str, kcal: f64) -> AppResult<i64> {
        let now = Local::now();
        let ts = now.format("%Y-%m-%dT%H:%M:%S").to_string();
        let date = now.format("%Y-%m-%d").to_string();

        let result = sqlx::query(
            "INSERT INTO meal_logs (ts, date, meal_type, name, kcal) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&ts)
        .bind(&date)
        .bind(meal_type)
        .bind(name)
        .bind(kcal)
        .execute(&self.pool)
        .await?;

        tracing::info!(meal_type, name, kcal, "meal logged");

        Ok(result.last_insert_rowid())
    }

    /// Total calories logged for one date (YYYY-MM-DD).
    pub async fn sum_for_date(&self, date: &str) -> AppResult<f64> {
        let row: (Option<f64>,) = sqlx::query_as("SELECT SUM(kcal) FROM meal_logs WHERE date = ?")
            .bind(date)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0.unwrap_or(0.0))
    }

    /// Total calories logged today.
    pub async fn sum_today(&self) -> AppResult<f64> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        self.sum_for_date(&today).await
    }

    /// Meals logged for one date, oldest first.
    pub async fn meals_for_date(&self, date: &str) -> AppResult<Vec<MealLog>> {
        let meals = sqlx::query_as::<_, MealLog>(
            "SELECT id, ts, date, meal_type, name, kcal FROM meal_logs WHERE date = ? ORDER BY id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(meals)
    }
}

/// Calories still available against a daily target, clamped at zero.
pub fn remaining_kcal(target_kcal: u32, consumed: f64) -> f64 {
    (f64::from(target_kcal) - consumed).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> MealLogStore {
        MealLogStore::open("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_then_sum_today() {
        let store = memory_store().await;
        store.insert("昼", "肉じゃが", 450.0).await.unwrap();
        store.insert("晩", "カレー", 700.0).await.unwrap();

        let consumed = store.sum_today().await.unwrap();
        assert_eq!(consumed, 1150.0);
    }

    #[tokio::test]
    async fn empty_log_sums_to_zero() {
        let store = memory_store().await;
        assert_eq!(store.sum_today().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn meals_for_date_preserves_insertion_order() {
        let store = memory_store().await;
        store.insert("朝", "トースト", 250.0).await.unwrap();
        store.insert("昼", "うどん", 400.0).await.unwrap();

        let today = Local::now().format("%Y-%m-%d").to_string();
        let meals = store.meals_for_date(&today).await.unwrap();

        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].name, "トースト");
        assert_eq!(meals[1].meal_type, "昼");
    }

    #[test]
    fn remaining_kcal_clamps_at_zero() {
        assert_eq!(remaining_kcal(1800, 500.0), 1300.0);
        assert_eq!(remaining_kcal(1800, 2500.0), 0.0);
    }
}
