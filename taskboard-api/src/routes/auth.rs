/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user (201)
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - New access token from the refresh cookie
/// - `POST /api/auth/logout` - Clear auth cookies
/// - `GET  /api/auth/me` - Caller identity
///
/// Token delivery: the access token is returned in the body AND set as an
/// httpOnly `token` cookie (1h); the refresh token is only ever a cookie
/// (`refreshToken`, 7d). Both cookies are SameSite=Strict and Secure in
/// production.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{DataResponse, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Access token cookie name
const TOKEN_COOKIE: &str = "token";

/// Refresh token cookie name
const REFRESH_COOKIE: &str = "refreshToken";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register/login response: token in the body plus the user
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Always true
    pub success: bool,

    /// Access token (also set as the `token` cookie)
    pub token: String,

    /// Authenticated user
    pub user: User,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Always true
    pub success: bool,

    /// New access token
    pub token: String,
}

/// Builds an httpOnly auth cookie
fn auth_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Builds an expired cookie that clears the named auth cookie
fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Issues both tokens and attaches them to the jar
fn issue_tokens(
    state: &AppState,
    jar: CookieJar,
    user_id: Uuid,
) -> Result<(CookieJar, String), ApiError> {
    let access_claims = jwt::Claims::new(user_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user_id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    let secure = state.config.api.production;
    let jar = jar
        .add(auth_cookie(
            TOKEN_COOKIE,
            access_token.clone(),
            time::Duration::hours(1),
            secure,
        ))
        .add(auth_cookie(
            REFRESH_COOKIE,
            refresh_token,
            time::Duration::days(7),
            secure,
        ));

    Ok((jar, access_token))
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the email is already taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let (jar, token) = issue_tokens(&state, jar, user.id)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            token,
            user,
        }),
    ))
}

/// Login
///
/// A wrong email and a wrong password produce the same 401, so the
/// endpoint does not leak which accounts exist.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let (jar, token) = issue_tokens(&state, jar, user.id)?;

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            token,
            user,
        }),
    ))
}

/// Refresh the access token from the `refreshToken` cookie
///
/// The account is re-checked against the store so a refresh token cannot
/// outlive its user.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid, or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<RefreshResponse>)> {
    let refresh_token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Not authorized, no refresh token".to_string()))?;

    let claims = jwt::validate_refresh_token(&refresh_token, state.jwt_secret())?;

    User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    let access_claims = jwt::Claims::new(claims.sub, jwt::TokenType::Access);
    let token = jwt::create_token(&access_claims, state.jwt_secret())?;

    let jar = jar.add(auth_cookie(
        TOKEN_COOKIE,
        token.clone(),
        time::Duration::hours(1),
        state.config.api.production,
    ));

    Ok((
        jar,
        Json(RefreshResponse {
            success: true,
            token,
        }),
    ))
}

/// Logout: clear both auth cookies
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar
        .add(clear_cookie(TOKEN_COOKIE))
        .add(clear_cookie(REFRESH_COOKIE));

    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// Caller identity
///
/// # Errors
///
/// - `404 Not Found`: The authenticated account no longer exists
pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<DataResponse<User>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(DataResponse::new(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid_request()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "abc".to_string(),
            ..valid_request()
        };
        assert!(short_password.validate().is_err());

        let empty_name = RegisterRequest {
            name: String::new(),
            ..valid_request()
        };
        assert!(empty_name.validate().is_err());
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie(TOKEN_COOKIE, "abc".to_string(), time::Duration::hours(1), true);

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_cookie(REFRESH_COOKIE);
        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
