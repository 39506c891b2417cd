//! Storage for crawled content.

pub mod content;

pub use content::ContentStore;
