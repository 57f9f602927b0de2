//! Core domain types and pure logic for the tallysync engine.
//!
//! Everything in this crate is side-effect free: match-key derivation,
//! the per-key group-by-sum aggregation, and the join between remote
//! records and aggregates. IO lives in the surrounding crates
//! (`sheet-grid-reader`, `records-api-client`).

mod aggregate;
mod match_key;
mod types;

pub use aggregate::{aggregate_rows, build_update_instructions, Aggregate};
pub use match_key::derive_match_key;
pub use types::{RemoteRecord, SheetRow, TargetConfig, UpdateInstruction};
