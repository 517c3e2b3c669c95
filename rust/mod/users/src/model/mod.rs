mod claims;
mod user;

pub use claims::{Claims, Identity};
pub use user::{CreateUser, LoginRequest, LoginResponse, Role, User};
pub(crate) use user::DEFAULT_STATUS;
