//! Retrieval-augmented question answering over a fixed document corpus.
//!
//! This crate provides:
//! - PDF and CSV ingestion into provenance-tagged chunks
//! - A persisted cosine-similarity vector index with load-or-build caching
//! - A top-K retrieval-and-answer pipeline with source citations
//! - A service facade consumed by the HTTP and REPL front ends
//!
//! The embedding model and the language model are external collaborators
//! behind the [`EmbeddingProvider`] and [`AnswerModel`] traits; hosted
//! implementations for the Hugging Face Inference API and Mistral chat
//! completions are included.

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hf;
pub mod index;
pub mod llm;
pub mod loader;
pub mod mistral;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod store;

pub use chunking::TextSplitter;
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use document::{Chunk, Provenance, QueryResult, SearchHit, SourcePreview};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use hf::HfEmbeddingProvider;
pub use index::VectorIndex;
pub use llm::AnswerModel;
pub use mistral::MistralAnswerModel;
pub use pipeline::AnswerPipeline;
pub use service::{Health, InitReport, RagService};
pub use store::IndexStore;
