//! LLM provider gateway: routes text generation to a hosted API, a
//! self-hosted model server or a deterministic mock, falls back to the mock
//! when a live backend fails, and memoizes answers behind content-derived
//! cache keys.

pub mod cache;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod operations;
pub mod providers;
pub mod router;
pub mod service;
pub mod state;

pub use config::{Args, Settings};
pub use models::{GenerationRequest, GenerationResult, Provenance, ProviderKind};
pub use router::ProviderRouter;
pub use service::{GenerationService, Generated, Operation};
