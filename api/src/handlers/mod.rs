//! Request handling support shared by the routes

pub mod error;

pub use error::{json_error_handler, ApiError, ApiResult};
