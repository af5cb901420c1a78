use crate::{
    auth::AuthenticatedUser, db::Pagination, error::AppError, services::UserService,
};
use actix_web::{get, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves a paginated list of users.
///
/// Password hashes never appear in the response.
#[get("")]
pub async fn get_users(
    users: web::Data<UserService>,
    pagination: web::Query<Pagination>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    pagination.validate()?;

    let result = users.find_all(&pagination).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Retrieves a single user by id. A malformed id yields `404`.
#[get("/{id}")]
pub async fn get_user(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    match users.find_by_id(&user_id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => Err(AppError::NotFound("User not found".into())),
    }
}
