pub mod http;
pub mod logging;
pub mod serde_ext;
