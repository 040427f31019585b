mod models;
mod upload;

pub use models::*;
pub use upload::*;
