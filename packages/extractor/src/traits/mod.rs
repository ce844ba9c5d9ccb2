//! Core trait abstractions for the extractor library.
//!
//! These are the seams where applications plug in LLM providers, storage and
//! page fetching.

pub mod backend;
pub mod fetcher;
pub mod store;
