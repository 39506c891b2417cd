//! Offline pipeline: content store to persisted vector store.

pub mod build;

pub use build::{build_index, BuildReport, IndexBuilder};
