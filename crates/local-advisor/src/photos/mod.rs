//! Photo Search Integration
//!
//! Abstractions and implementations for image search providers.

mod mock;
mod unsplash;

pub use mock::MockImageSearch;
pub use unsplash::{Photo, PhotoUrls, SearchResponse, UnsplashClient, UnsplashConfig};

use async_trait::async_trait;

use crate::error::Result;

/// Image search client trait (Strategy pattern)
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Image URLs for a query, in the provider's ranking order
    async fn search(&self, query: &str) -> Result<Vec<String>>;

    /// Whether credentials are present
    fn is_configured(&self) -> bool {
        true
    }

    /// Provider name
    fn name(&self) -> &str;
}
