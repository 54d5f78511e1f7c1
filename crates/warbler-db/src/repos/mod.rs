//! Repositories - one per aggregate

pub mod post;
pub mod refresh_token;
pub mod user;

pub use post::PostRepo;
pub use refresh_token::RefreshTokenRepo;
pub use user::UserRepo;
