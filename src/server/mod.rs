pub mod extract;
pub mod guards;
pub mod router;
pub mod routes;

pub use router::{AppState, catalog_router};
