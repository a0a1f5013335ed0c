pub mod auth;
pub mod game;
pub mod jwt;

pub use auth::AuthService;
pub use game::GameService;
pub use jwt::{JwtProvider, TokenKind};
