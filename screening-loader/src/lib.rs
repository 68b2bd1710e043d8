//! Screening-list and ownership-graph loading
//!
//! Owns everything the engine deliberately does not: reading PEP/OFAC
//! lists and the ownership graph from CSV files, and a TTL-based cache
//! that publishes immutable snapshots so concurrently running evaluations
//! never observe a half-updated list.

pub mod cache;
pub mod error;
pub mod sources;

pub use cache::{ListCache, Snapshot};
pub use error::{LoaderError, Result};
pub use sources::{load_ofac_list, load_ownership_graph, load_pep_list};
