//! Browse products use case.
//!
//! Fetches products from the backend and applies the client-side search
//! (text match, rating floor, price window, sort). Submitted queries are kept
//! in a short recent-search list held by a [`SearchHistoryStore`].
//!
//! History is best effort during a search: a store failure is logged and
//! the search still runs.

use crate::ports::marketplace_api::{ApiError, MarketplaceApi, ProductQuery};
use crate::ports::search_history::{
    InMemorySearchHistory, SearchHistoryError, SearchHistoryStore,
};
use farmstand_domain::{Product, ProductFilter, RecentSearches, Seller};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct BrowseProductsUseCase {
    api: Arc<dyn MarketplaceApi>,
    history: Arc<dyn SearchHistoryStore>,
}

impl BrowseProductsUseCase {
    pub fn new(api: Arc<dyn MarketplaceApi>) -> Self {
        Self {
            api,
            history: Arc::new(InMemorySearchHistory::new()),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn SearchHistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Fetch, filter and sort products.
    pub async fn search(
        &self,
        query: &ProductQuery,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, ApiError> {
        if let Some(text) = &filter.query
            && let Err(e) = self.update_history(|recent| recent.record(text))
        {
            warn!("Could not record recent search: {}", e);
        }

        let products = self.api.fetch_products(query).await?;
        let fetched = products.len();
        let results = filter.apply(products);
        info!(
            "Product search: {} of {} products match (sort: {})",
            results.len(),
            fetched,
            filter.sort_by.as_str()
        );
        Ok(results)
    }

    pub async fn sellers(&self) -> Result<Vec<Seller>, ApiError> {
        let sellers = self.api.fetch_sellers().await?;
        debug!("Fetched {} sellers", sellers.len());
        Ok(sellers)
    }

    /// Recent queries, newest first.
    pub fn recent_searches(&self) -> Result<Vec<String>, SearchHistoryError> {
        Ok(self.history.load()?.entries().to_vec())
    }

    pub fn forget_recent_search(&self, query: &str) -> Result<(), SearchHistoryError> {
        self.update_history(|recent| recent.remove(query.trim()))
    }

    pub fn clear_recent_searches(&self) -> Result<(), SearchHistoryError> {
        self.history.save(&RecentSearches::new())
    }

    fn update_history(
        &self,
        change: impl FnOnce(&mut RecentSearches),
    ) -> Result<(), SearchHistoryError> {
        let mut recent = self.history.load()?;
        change(&mut recent);
        self.history.save(&recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::marketplace_api::{AuthGrant, OutgoingMessage, PostAck};
    use async_trait::async_trait;
    use farmstand_domain::{
        ChatId, ChatSnapshot, ChatSummary, Price, SortBy, User, UserId,
    };
    use std::sync::Mutex;

    struct CatalogApi {
        products: Vec<Product>,
        last_query: Mutex<Option<ProductQuery>>,
    }

    #[async_trait]
    impl MarketplaceApi for CatalogApi {
        async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_chat(&self, chat_id: &ChatId) -> Result<ChatSnapshot, ApiError> {
            Err(ApiError::NotFound(chat_id.to_string()))
        }
        async fn create_or_get_chat(&self, user_id: &UserId) -> Result<ChatSnapshot, ApiError> {
            Err(ApiError::NotFound(user_id.to_string()))
        }
        async fn post_message(
            &self,
            _chat_id: &ChatId,
            _message: &OutgoingMessage,
        ) -> Result<PostAck, ApiError> {
            Ok(PostAck::default())
        }
        async fn fetch_sellers(&self) -> Result<Vec<Seller>, ApiError> {
            Ok(vec![Seller {
                id: UserId::new("farmer-9"),
                name: "Green Acres".to_string(),
                image: None,
                location: Some("Nashik".to_string()),
            }])
        }
        async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            Ok(self.products.clone())
        }
        async fn login(&self, _email: &str, _password: &str) -> Result<AuthGrant, ApiError> {
            Err(ApiError::Unauthorized)
        }
        async fn current_user(&self) -> Result<User, ApiError> {
            Err(ApiError::Unauthorized)
        }
        async fn logout(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn api() -> Arc<CatalogApi> {
        let p = |id: &str, name: &str, price: f64, rating: f64| {
            Product::new(id, name, Price::new(price).unwrap()).with_rating(rating)
        };
        Arc::new(CatalogApi {
            products: vec![
                p("1", "Tomatoes", 40.0, 4.2),
                p("2", "Potatoes", 20.0, 3.5),
                p("3", "Tomato Puree", 90.0, 4.9),
            ],
            last_query: Mutex::new(None),
        })
    }

    #[tokio::test]
    async fn test_search_filters_and_sorts() {
        let api = api();
        let use_case = BrowseProductsUseCase::new(api.clone());
        let filter = ProductFilter::new()
            .with_query("tomato")
            .with_sort(SortBy::Rating);

        let results = use_case
            .search(&ProductQuery::by_seller("farmer-9"), &filter)
            .await
            .unwrap();
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);

        let sent = api.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(sent.seller, Some(UserId::new("farmer-9")));
    }

    #[tokio::test]
    async fn test_queries_recorded_as_recent() {
        let use_case = BrowseProductsUseCase::new(api());
        for q in ["okra", "mango", "okra"] {
            let filter = ProductFilter::new().with_query(q);
            use_case
                .search(&ProductQuery::default(), &filter)
                .await
                .unwrap();
        }
        use_case
            .search(&ProductQuery::default(), &ProductFilter::new())
            .await
            .unwrap();

        assert_eq!(use_case.recent_searches().unwrap(), vec!["mango", "okra"]);
        use_case.forget_recent_search("mango").unwrap();
        assert_eq!(use_case.recent_searches().unwrap(), vec!["okra"]);
        use_case.clear_recent_searches().unwrap();
        assert!(use_case.recent_searches().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_outlives_use_case() {
        let history = Arc::new(InMemorySearchHistory::new());
        BrowseProductsUseCase::new(api())
            .with_history(history.clone())
            .search(&ProductQuery::default(), &ProductFilter::new().with_query("okra"))
            .await
            .unwrap();

        let later = BrowseProductsUseCase::new(api()).with_history(history);
        assert_eq!(later.recent_searches().unwrap(), vec!["okra"]);
    }

    struct BrokenHistory;

    impl SearchHistoryStore for BrokenHistory {
        fn load(&self) -> Result<RecentSearches, SearchHistoryError> {
            Err(SearchHistoryError::Corrupt("bad json".to_string()))
        }
        fn save(&self, _recent: &RecentSearches) -> Result<(), SearchHistoryError> {
            Err(SearchHistoryError::Corrupt("bad json".to_string()))
        }
    }

    #[tokio::test]
    async fn test_history_failure_does_not_block_search() {
        let use_case = BrowseProductsUseCase::new(api()).with_history(Arc::new(BrokenHistory));
        let results = use_case
            .search(&ProductQuery::default(), &ProductFilter::new().with_query("tomato"))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(use_case.recent_searches().is_err());
    }

    #[tokio::test]
    async fn test_sellers() {
        let use_case = BrowseProductsUseCase::new(api());
        let sellers = use_case.sellers().await.unwrap();
        assert_eq!(sellers[0].name, "Green Acres");
    }
}
