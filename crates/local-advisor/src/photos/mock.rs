//! Mock Image Search
//!
//! For testing and offline demos. Returns a fixed list of URLs.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::ImageSearch;
use crate::error::{AdvisorError, Result};

/// Image search returning static results
pub struct MockImageSearch {
    urls: Vec<String>,
    failure: Option<u16>,
    queries: Mutex<Vec<String>>,
}

impl Default for MockImageSearch {
    fn default() -> Self {
        Self::new([
            "https://images.unsplash.com/photo-dish-1",
            "https://images.unsplash.com/photo-dish-2",
            "https://images.unsplash.com/photo-dish-3",
        ])
    }
}

impl MockImageSearch {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            failure: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every search fails with this HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ImageSearch for MockImageSearch {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        match self.failure {
            Some(status) => Err(AdvisorError::Status {
                status,
                message: "mock failure".into(),
            }),
            None => Ok(self.urls.clone()),
        }
    }

    fn name(&self) -> &str {
        "MockImageSearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_search() {
        let search = MockImageSearch::new(["a.jpg", "b.jpg"]);
        assert_eq!(search.search("Pho").await.unwrap(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(search.queries(), vec!["Pho"]);
    }

    #[tokio::test]
    async fn test_failing_search() {
        let search = MockImageSearch::failing(503);
        let err = search.search("Pho").await.unwrap_err();
        assert!(matches!(err, AdvisorError::Status { status: 503, .. }));
    }
}
