//! Store use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the inventory store contract.
//! - Keep HTTP layers decoupled from storage details.

pub mod asset_ops;
pub mod graph_ops;
pub mod inventory_store;

pub use graph_ops::MAX_TRACE_DEPTH;
pub use inventory_store::InventoryStore;
