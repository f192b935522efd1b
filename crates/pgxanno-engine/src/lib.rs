//! Deterministic resolution and validation of extracted pharmacogenomic candidates.
//!
//! Pipeline per candidate group: [`resolve_group`] → [`assemble`] → [`validate`].
//! [`BatchCoordinator`] drives it over a whole document.

pub mod assemble;
pub mod batch;
pub mod config;
pub mod resolve;
pub mod validate;

pub use assemble::{SequenceCounter, assemble};
pub use batch::{BatchCoordinator, BatchState};
pub use config::EngineConfig;
pub use resolve::resolve_group;
pub use validate::validate;
