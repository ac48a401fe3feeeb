use axum::Router;

use crate::state::AppState;

mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod service;

pub use dto::{LoginRequest, PublicUser, RegisterRequest, UpdateProfileRequest};
pub use service::AuthService;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
