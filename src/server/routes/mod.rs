pub mod ai;
pub mod comparison;
pub mod health;
pub mod software;
pub mod upload;
