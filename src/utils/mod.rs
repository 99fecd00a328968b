pub mod retry;
pub mod serde_ext;

pub use retry::{retry_on_transient, IsTransient, RetryConfig};
pub use serde_ext::null_as_default;
