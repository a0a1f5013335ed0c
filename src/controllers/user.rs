use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::info;

use crate::controllers::{parse_id, AuthUser};
use crate::errors::CustomError;
use crate::models::user::UserInfo;
use crate::AppState;

///////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// Handler for looking up a user. Any logged in user may look up any other
///////////////////////////////////////////////////////////////////////////////////////////////////////////////////

pub async fn get_user(  Path(user_id): Path<String>,
                        State(state): State<AppState>,
                        AuthUser(_): AuthUser,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("get user request");

    let user_id = parse_id(&user_id, "user_id")?;
    match state.auth.find_user(user_id).await? {
        Some(user) => Ok((StatusCode::OK, Json(UserInfo::from(&user)))),
        None => Err(CustomError::NotFound("User not found".to_string())),
    }
}
