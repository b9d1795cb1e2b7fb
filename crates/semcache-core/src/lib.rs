//! # semcache
//!
//! The semantic-cache core: a chat-completion response cache keyed by
//! embedding-vector similarity instead of exact request bytes.
//!
//! ```text
//! Request → flatten → embed → query index → HIT (serve) | MISS (call upstream, tee, commit)
//! ```
//!
//! The HTTP surface, upstream client, and response synthesis live in the
//! `semcache-gateway` crate; this crate is everything about the cache
//! decision itself that's testable without an HTTP server.
//!
//! ## Feature flags
//!
//! | Feature | Purpose |
//! |---------|---------|
//! | `mock` | error-injecting test doubles, on top of the always-available in-memory backends |
//!
//! ## Modules
//!
//! - [`payload`] — prompt flattening
//! - [`embedding`] — `Embedder`
//! - [`vectordb`] — `VectorIndex`
//! - [`storage`] — `ContentStore`
//! - [`streaming`] — `StreamTee` + `ChunkParser`
//! - [`cache`] — `CacheDecision` + `BackgroundWriter`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod payload;
pub mod storage;
pub mod streaming;
pub mod vectordb;

pub use cache::{AdmissionPlan, BackgroundWriter, CacheDecision, CacheError, DecisionOutcome};
pub use embedding::{AnyEmbedder, Embedder, EmbeddingError, HashEmbedder, HttpEmbedder};
pub use payload::{flatten_prompt, Message, Role};
pub use storage::{AnyContentStore, ContentStore, InMemoryContentStore, StorageError};
pub use streaming::{extract_content, tee, CaptureOutcome, ParseError};
pub use vectordb::{
    AnyVectorIndex, InMemoryVectorIndex, QdrantVectorIndex, QueryResult, SearchMatch, VectorIndex,
    VectorIndexError, VectorPoint,
};

#[cfg(feature = "mock")]
pub use embedding::FailingEmbedder;
#[cfg(feature = "mock")]
pub use storage::FailingContentStore;
#[cfg(feature = "mock")]
pub use vectordb::FailingVectorIndex;
