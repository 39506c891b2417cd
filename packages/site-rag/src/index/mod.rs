//! Vector index and its on-disk persistence.

pub mod flat;
pub mod store;

pub use flat::{squared_l2, FlatL2Index, Neighbor};
pub use store::{load_store, VectorStore, VectorStoreBuilder};
