pub mod error;
pub mod generation;
pub mod handlers;
pub mod items;
pub mod middleware;
pub mod routes;
pub mod schedule;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
