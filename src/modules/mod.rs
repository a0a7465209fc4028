pub mod auth;
pub mod permissions;

pub use self::auth::model::LoginRequest;
