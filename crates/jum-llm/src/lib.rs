mod http;
pub mod mock;
mod traits;

pub use http::HttpModelClient;
pub use mock::MockModelClient;
pub use traits::{CompletionOptions, ModelClient, ModelError};
