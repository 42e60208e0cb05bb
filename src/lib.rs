// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod metrics;
pub mod scrape;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::scrape::types::PriceRecord;
pub use crate::scrape::{dispatch, run_once, scrape_commodity, Commodity, ScrapeDeps};
pub use crate::store::{InsertOutcome, PriceStore};
