//! Core trait abstractions for the site-rag library.
//!
//! These traits are the seams where applications plug in rendering,
//! downloading, text extraction, embedding and generation.

pub mod embedder;
pub mod extractor;
pub mod fetcher;
pub mod generator;
