pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod secrets;
pub mod server;
pub mod storage;
pub mod utils;

pub use error::CatalogError;
