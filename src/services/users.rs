//! User resource service.
//!
//! Reuses the generic [`Repository`] unmodified. The only user-specific
//! pieces are injected at construction: a pre-persist transform normalizing
//! the email, and field validators mirroring the store schema. Password
//! hashing is an explicit step of [`UserService::create`], not a store-layer
//! side effect.

use sqlx::PgPool;

use crate::auth::{hash_password, RegisterRequest};
use crate::db::{Document, Filter, PaginatedResult, Pagination, Repository, Value};
use crate::error::{AppError, PersistenceError};
use crate::models::User;

#[derive(Clone)]
pub struct UserService {
    repo: Repository<User>,
}

/// Emails are compared case-insensitively; store them folded so the unique
/// index does the rest.
fn normalize_email(doc: Document) -> Result<Document, PersistenceError> {
    let folded = match doc.get("email") {
        Some(Value::Text(email)) => Some(email.trim().to_lowercase()),
        _ => None,
    };
    match folded {
        Some(folded) => Ok(doc.set("email", folded)),
        None => Ok(doc),
    }
}

/// Store-schema validators for user writes, run by the repository on create
/// and update alike.
fn validate_user_fields(doc: &Document) -> Result<(), PersistenceError> {
    for field in ["first_name", "last_name"] {
        if let Some(Value::Text(name)) = doc.get(field) {
            if name.trim().is_empty() {
                return Err(PersistenceError::ConstraintViolation(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }
    }
    if let Some(Value::Text(email)) = doc.get("email") {
        if !email.contains('@') {
            return Err(PersistenceError::ConstraintViolation(
                "email must be a valid address".into(),
            ));
        }
    }
    Ok(())
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        let repo = Repository::new(pool)
            .with_pre_persist(normalize_email)
            .with_validator(validate_user_fields);
        UserService { repo }
    }

    /// Registers a new user. The password is hashed here, exactly once,
    /// before the record ever reaches the repository.
    pub async fn create(&self, input: &RegisterRequest) -> Result<User, AppError> {
        let password = hash_password(&input.password)?;
        let doc = Document::new()
            .set("first_name", input.first_name.as_str())
            .set("last_name", input.last_name.as_str())
            .set("email", input.email.as_str())
            .set("password", password);
        Ok(self.repo.create(doc).await?)
    }

    pub async fn find_one_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let filter = Filter::new().eq("email", email.trim().to_lowercase());
        Ok(self.repo.find_one(&filter).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Whether an account with this email already exists.
    pub async fn exists(&self, email: &str) -> Result<bool, AppError> {
        let filter = Filter::new().eq("email", email.trim().to_lowercase());
        Ok(self.repo.count_documents(&filter).await? > 0)
    }

    pub async fn find_all(
        &self,
        pagination: &Pagination,
    ) -> Result<PaginatedResult<User>, AppError> {
        Ok(self.repo.find(&Filter::new(), pagination).await?)
    }
}
