pub mod dto;
mod repos;
pub mod response;
mod router;
mod users;
pub mod validation;

pub use repos::repos_router;
pub use router::{AppState, MAX_UPLOAD_BYTES, create_router};
pub use users::users_router;
