use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::{error, info};

use crate::controllers::AuthUser;
use crate::errors::{CustomError, GameError};
use crate::models::user::*;
use crate::AppState;

fn sign_up_answer(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<SignUpResponse>) {
    (status, Json(SignUpResponse { success, message: message.to_string() }))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for registering. Answers {success, message} in both the good and the bad case
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn register(  State(state): State<AppState>,
                        payload: Result<Json<Credentials>, JsonRejection>,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("register request");

    let credentials = payload.map(|Json(c)| c).unwrap_or_default();
    let (Some(login), Some(password)) = (credentials.login, credentials.password) else {
        return Ok(sign_up_answer(StatusCode::BAD_REQUEST, false, "Login or password are required"));
    };

    match state.auth.register(&login, &password).await {
        Ok(_) => Ok(sign_up_answer(StatusCode::OK, true, "User registered successfully")),
        Err(GameError::Conflict(msg)) | Err(GameError::InvalidInput(msg)) => {
            info!("registration of {} refused: {}", login, msg);
            Ok(sign_up_answer(StatusCode::BAD_REQUEST, false, &msg))
        }
        Err(err) => Err(err.into()),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for logging in. If the password checks out we return an access and a refresh token
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn login( State(state): State<AppState>,
                    payload: Result<Json<Credentials>, JsonRejection>,
                    ) -> Result<impl IntoResponse, CustomError> {

    let credentials = payload.map(|Json(c)| c).unwrap_or_default();
    let (Some(login), Some(password)) = (credentials.login, credentials.password) else {
        return Err(CustomError::BadRequest("Login and password are required".to_string()));
    };

    info!("login request by user: {}", login);

    let tokens = state.auth.authenticate(&login, &password).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

fn refresh_token_of(payload: Result<Json<RefreshRequest>, JsonRejection>) -> Result<String, CustomError> {
    payload
        .ok()
        .and_then(|Json(request)| request.refresh_token)
        .ok_or_else(|| CustomError::BadRequest("Refresh token is required".to_string()))
}

// Handler for a new access token. The refresh token stays the same
pub async fn refresh_access(    State(state): State<AppState>,
                                payload: Result<Json<RefreshRequest>, JsonRejection>,
                                ) -> Result<impl IntoResponse, CustomError> {

    info!("refresh access request");

    let refresh_token = refresh_token_of(payload)?;
    let tokens = state.auth.refresh_access_token(&refresh_token).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

// Handler for a whole new token pair
pub async fn refresh(   State(state): State<AppState>,
                        payload: Result<Json<RefreshRequest>, JsonRejection>,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("refresh request");

    let refresh_token = refresh_token_of(payload)?;
    let tokens = state.auth.refresh_tokens(&refresh_token).await?;
    Ok((StatusCode::OK, Json(tokens)))
}

// Handler for looking up the logged in user
pub async fn me(    State(state): State<AppState>,
                    AuthUser(user_id): AuthUser,
                    ) -> Result<impl IntoResponse, CustomError> {

    info!("me request");

    match state.auth.find_user(user_id).await? {
        Some(user) => Ok((StatusCode::OK, Json(UserInfo::from(&user)))),
        None => {
            error!("Token for user {} that no longer exists", user_id);
            Err(CustomError::NotFound("User not found".to_string()))
        }
    }
}
