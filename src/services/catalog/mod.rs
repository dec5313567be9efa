//! Category resolution and resilient fetch against the recipe catalog.
//!
//! The flow runs leaves-first: the [`client::ResilientClient`] executes
//! single paced, retried HTTP calls; the [`taxonomy::TaxonomyCache`] keeps
//! a TTL-cached snapshot of the category tree; [`scorer`] ranks tree
//! entries against a keyword and genre hint, reconstructing full parent
//! paths via [`hierarchy`]; and the [`fetcher::RecipeFetcher`] drives
//! resolution, the primary ranking fetch, and the single fallback cascade.

pub mod client;
pub mod fetcher;
pub mod hierarchy;
pub mod scorer;
pub mod taxonomy;

pub use client::{
    ApiTransport, CatalogError, RawResponse, ReqwestTransport, ResilientClient, RetryPolicy,
    TransportError,
};
pub use fetcher::RecipeFetcher;
pub use taxonomy::TaxonomyCache;
