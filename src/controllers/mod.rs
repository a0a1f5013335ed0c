use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    headers::{authorization::Bearer, Authorization},
    http::request::Parts,
    TypedHeader,
};
use log::error;
use uuid::Uuid;

use crate::errors::CustomError;
use crate::AppState;

pub mod auth;
pub mod game;
pub mod user;

// Helper function to check if a bearer token is a valid access token (user is logged in).
// Returns the user id encoded in the token
pub fn check_access(state: &AppState, bearer: &Authorization<Bearer>) -> Result<Uuid, CustomError> {
    state.auth.authenticate_by_token(bearer.token()).map_err(|err| {
        error!("Access denied: {}", err);
        CustomError::from(err)
    })
}

/// The logged in user, taken from the `Authorization: Bearer` header.
/// A missing or invalid token rejects the request with 401.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CustomError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(bearer) = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                CustomError::Unauthorized("Authorization header must be in format: Bearer <token>".to_string())
            })?;

        let state = AppState::from_ref(state);
        check_access(&state, &bearer).map(AuthUser)
    }
}

// Ids arrive as path segments, reject anything that isn't a uuid
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, CustomError> {
    Uuid::parse_str(raw).map_err(|_| CustomError::BadRequest(format!("Invalid {what} format")))
}
