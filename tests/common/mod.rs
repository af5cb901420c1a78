#![allow(dead_code)]

use sqlx::PgPool;
use taskboard::auth::RegisterRequest;
use taskboard::models::User;
use taskboard::services::UserService;
use uuid::Uuid;

/// Connects to the test database, running migrations first.
///
/// Store-backed tests are skipped (not failed) when `DATABASE_URL` is absent,
/// so the pure unit suite stays runnable anywhere.
pub async fn test_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping store-backed test");
        return None;
    };
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// A unique address per call so tests never collide on the email index.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn register_user(users: &UserService, email: &str) -> User {
    let input = RegisterRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
    };
    users
        .create(&input)
        .await
        .expect("Failed to register test user")
}
