pub mod client;
pub mod error;
pub mod submit;
pub mod token;

pub use client::ApiClient;
pub use error::{ApiError, AuthError};
pub use submit::SubmitResult;
