// handler/auth.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::*,
    error::{ErrorMessage, HttpError},
    models::usermodel::User,
    utils::{password, referral_code::generate_referral_code, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check-username/:username", get(check_username))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing_email = app_state
        .db_client
        .get_user(None, None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing_email.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::EmailExist.to_string()));
    }

    let existing_username = app_state
        .db_client
        .get_user(None, Some(&body.username), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing_username.is_some() {
        return Err(HttpError::bad_request(
            ErrorMessage::UsernameExist.to_string(),
        ));
    }

    // Resolve the referrer before creating anything; a bad code fails the
    // whole registration.
    let mut referrer: Option<User> = None;
    if let Some(ref code) = body.referral_code {
        let found = app_state.ledger_service.resolve_referrer(code).await?;
        if found.email == body.email {
            return Err(HttpError::bad_request("Cannot refer yourself"));
        }
        referrer = Some(found);
    }

    let hashed_password =
        password::hash(&body.password).map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = save_user_with_fresh_code(&app_state, &body, hashed_password, &referrer).await?;

    if let Some(ref referrer) = referrer {
        app_state
            .ledger_service
            .record_referral(referrer, &user)
            .await?;
    }

    if let Err(e) = app_state.notification_service.notify_welcome(&user).await {
        tracing::warn!("failed to deliver welcome notification: {}", e);
    }

    let filtered_user = FilterUserDto::filter_user(&user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: filtered_user,
        },
    }))
}

// Referral codes are random; a collision surfaces as a unique violation,
// in which case we draw again.
async fn save_user_with_fresh_code(
    app_state: &AppState,
    body: &RegisterUserDto,
    hashed_password: String,
    referrer: &Option<User>,
) -> Result<User, HttpError> {
    const MAX_ATTEMPTS: usize = 5;
    let referred_by = referrer.as_ref().map(|r| r.referral_code.clone());

    for _ in 0..MAX_ATTEMPTS {
        let code = generate_referral_code();
        let result = app_state
            .db_client
            .save_user(
                body.name.clone(),
                body.username.clone(),
                body.email.clone(),
                body.phone.clone(),
                body.state.clone(),
                hashed_password.clone(),
                code,
                referred_by.clone(),
            )
            .await;

        match result {
            Ok(user) => return Ok(user),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.message().contains("referral_code") =>
            {
                continue;
            }
            Err(e) => return Err(HttpError::server_error(e.to_string())),
        }
    }

    Err(HttpError::server_error(
        "Could not allocate a unique referral code",
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .db_client
        .get_user(None, Some(&body.username), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user =
        result.ok_or(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage * 60);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    });

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build session cookie"))?,
    );

    let mut response = response.into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .http_only(true)
        .build();

    let response = Json(Response {
        status: "success".to_string(),
        message: "Logged out successfully".to_string(),
    });

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build session cookie"))?,
    );

    let mut response = response.into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

pub async fn check_username(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let existing = app_state
        .db_client
        .get_user(None, Some(&username), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UsernameAvailabilityDto {
        available: existing.is_none(),
    }))
}
