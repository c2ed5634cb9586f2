// Precis: extractive summarization by clustering sentence embeddings.
//
// This is the library root. Each module corresponds to a stage of the
// summarization pipeline or a surface over it.

pub mod cluster;
pub mod config;
pub mod embed;
pub mod output;
pub mod segment;
pub mod summary;

#[cfg(feature = "web")]
pub mod web;
