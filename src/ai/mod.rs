//! Chat-completion upstream: generated software descriptions and comparisons.

mod analysis;
mod client;
pub mod prompts;

pub use client::AiClient;
pub use prompts::SoftwareBrief;
