pub mod api;
pub mod error;
pub mod http;
pub mod sse;
pub mod types;

pub use api::{Backend, EventStream};
pub use error::BackendError;
pub use http::HttpBackend;
pub use types::*;
