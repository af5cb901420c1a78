use crate::{
    auth::{generate_token, verify_password, AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if email already exists
    if users.exists(&register_data.email).await? {
        return Err(AppError::BadRequest(
            "An account with this email already exists".into(),
        ));
    }

    // Create the user; the service hashes the password before persisting
    let user = users.create(&register_data).await?;

    // Generate token
    let token = generate_token(&user)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = users.find_one_by_email(&login_data.email).await?;

    match user {
        Some(user) => {
            // Verify password
            if verify_password(&login_data.password, &user.password)? {
                let token = generate_token(&user)?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    token,
                    user_id: user.id,
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}
