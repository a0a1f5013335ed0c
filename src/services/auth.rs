use log::{debug, info};
use pwhash::bcrypt::{self, BcryptSetup};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::GameError;
use crate::models::user::{AuthResponse, User};
use crate::services::jwt::{JwtProvider, TokenKind};
use crate::store::{StoreError, UserStore};

const TOKEN_TYPE: &str = "Bearer";

/// Registration, login and token refresh on top of a `UserStore`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtProvider,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtProvider, bcrypt_cost: u32) -> Self {
        Self { users, jwt, bcrypt_cost }
    }

    pub fn jwt(&self) -> &JwtProvider {
        &self.jwt
    }

    pub async fn register(&self, login: &str, password: &str) -> Result<User, GameError> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(GameError::InvalidInput("Login or password are required".to_string()));
        }
        if self.users.find_user_by_login(login).await?.is_some() {
            return Err(GameError::Conflict("Login already exists".to_string()));
        }

        let setup = BcryptSetup { cost: Some(self.bcrypt_cost), ..Default::default() };
        let password_hash = bcrypt::hash_with(setup, password)
            .map_err(|err| GameError::Hashing(format!("{err:?}")))?;

        let user = User { user_id: Uuid::new_v4(), login: login.to_string(), password_hash };
        match self.users.insert_user(&user).await {
            Ok(()) => {
                info!("registered user {} ({})", user.login, user.user_id);
                Ok(user)
            }
            // lost a race against a registration of the same login
            Err(StoreError::Duplicate(_)) => Err(GameError::Conflict("Login already exists".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn authenticate(&self, login: &str, password: &str) -> Result<AuthResponse, GameError> {
        let invalid = || GameError::Unauthorized("Invalid credentials".to_string());

        let user = self.users.find_user_by_login(login).await?.ok_or_else(invalid)?;

        //Check password hash is equal to stored password hash. if not, error out
        if !bcrypt::verify(password, &user.password_hash) {
            debug!("wrong password for {}", login);
            return Err(invalid());
        }

        self.token_pair(user.user_id, None)
    }

    /// New access token, same refresh token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<AuthResponse, GameError> {
        let user = self.refresh_owner(refresh_token).await?;
        self.token_pair(user.user_id, Some(refresh_token))
    }

    /// New access and refresh tokens.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthResponse, GameError> {
        let user = self.refresh_owner(refresh_token).await?;
        self.token_pair(user.user_id, None)
    }

    pub fn authenticate_by_token(&self, access_token: &str) -> Result<Uuid, GameError> {
        self.jwt.verify(access_token, TokenKind::Access)
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, GameError> {
        Ok(self.users.find_user_by_id(user_id).await?)
    }

    // The refresh token must be valid and its user must still exist
    async fn refresh_owner(&self, refresh_token: &str) -> Result<User, GameError> {
        let user_id = self.jwt.verify(refresh_token, TokenKind::Refresh)?;
        self.users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| GameError::Unauthorized("Invalid or expired refresh token".to_string()))
    }

    fn token_pair(&self, user_id: Uuid, keep_refresh: Option<&str>) -> Result<AuthResponse, GameError> {
        let access_token = self.jwt.issue(user_id, TokenKind::Access)?;
        let refresh_token = match keep_refresh {
            Some(token) => token.to_string(),
            None => self.jwt.issue(user_id, TokenKind::Refresh)?,
        };
        Ok(AuthResponse { token_type: TOKEN_TYPE.to_string(), access_token, refresh_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AuthService {
        let jwt = JwtProvider::new("test-secret", 900, 3600);
        AuthService::new(Arc::new(MemoryStore::new()), jwt, 4)
    }

    #[tokio::test]
    async fn register_then_login() {
        let auth = service();
        let user = auth.register("alice", "wonderland").await.unwrap();
        assert_ne!(user.password_hash, "wonderland");

        let tokens = auth.authenticate("alice", "wonderland").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(auth.authenticate_by_token(&tokens.access_token).unwrap(), user.user_id);
        assert!(auth.authenticate_by_token(&tokens.refresh_token).is_err());
    }

    #[tokio::test]
    async fn duplicate_login_conflicts() {
        let auth = service();
        auth.register("alice", "one").await.unwrap();
        assert!(matches!(auth.register("alice", "two").await, Err(GameError::Conflict(_))));
        assert!(matches!(auth.register("", "two").await, Err(GameError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let auth = service();
        auth.register("alice", "wonderland").await.unwrap();
        assert!(matches!(auth.authenticate("alice", "nope").await, Err(GameError::Unauthorized(_))));
        assert!(matches!(auth.authenticate("mallory", "x").await, Err(GameError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn refresh_flows() {
        let auth = service();
        let user = auth.register("alice", "wonderland").await.unwrap();
        let tokens = auth.authenticate("alice", "wonderland").await.unwrap();

        let renewed = auth.refresh_access_token(&tokens.refresh_token).await.unwrap();
        assert_eq!(renewed.refresh_token, tokens.refresh_token);
        assert_eq!(auth.authenticate_by_token(&renewed.access_token).unwrap(), user.user_id);

        let pair = auth.refresh_tokens(&tokens.refresh_token).await.unwrap();
        assert_eq!(auth.jwt().verify(&pair.refresh_token, TokenKind::Refresh).unwrap(), user.user_id);

        assert!(matches!(
            auth.refresh_tokens(&tokens.access_token).await,
            Err(GameError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn refresh_for_unknown_user_fails() {
        let auth = service();
        let ghost = auth.jwt().issue(Uuid::new_v4(), TokenKind::Refresh).unwrap();
        assert!(matches!(auth.refresh_access_token(&ghost).await, Err(GameError::Unauthorized(_))));
    }
}
