use crate::api::QuoteApi;
use crate::db::{NewQuote, QuoteStorage, QuoteView};
use crate::error::QuoterError;
use crate::service::picker::{QuoteSource, SourcePicker};
use crate::service::sanitize::{clean_content, clean_title};
use std::sync::Arc;
use tracing::{debug, info};

/// Serves random quotes from storage or the remote API.
#[derive(Clone)]
pub struct QuoteService {
    storage: QuoteStorage,
    api: QuoteApi,
    picker: Arc<dyn SourcePicker>,
    remote_category: String,
}

impl QuoteService {
    pub fn new(
        storage: QuoteStorage,
        api: QuoteApi,
        picker: Arc<dyn SourcePicker>,
        remote_category: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            api,
            picker,
            remote_category: remote_category.into(),
        }
    }

    pub fn storage(&self) -> &QuoteStorage {
        &self.storage
    }

    /// Flip the picker; an empty store always goes remote.
    pub async fn random_quote(&self) -> Result<QuoteView, QuoterError> {
        if self.picker.choose() == QuoteSource::Local {
            if let Some(view) = self.storage.random_quote().await? {
                debug!(quote_id = view.quote.id, "serving stored quote");
                return Ok(view);
            }
            debug!("no stored quotes; falling back to remote");
        }
        self.fetch_remote().await
    }

    /// Fetch one quote remotely and store it under the remote category.
    pub async fn fetch_remote(&self) -> Result<QuoteView, QuoterError> {
        let remote = self.api.fetch().await?;
        let author = clean_title(&remote.title);
        let text = clean_content(&remote.content);
        if author.is_empty() || text.is_empty() {
            return Err(QuoterError::EmptyRemoteResponse);
        }

        let (view, created) = self
            .storage
            .save_quote(&author, None, &self.remote_category, &text)
            .await?;
        info!(
            quote_id = view.quote.id,
            author = %view.author,
            created,
            "serving remote quote"
        );
        Ok(view)
    }

    /// Store a hand-written quote. Returns the view and whether it was new.
    pub async fn create_quote(&self, new: NewQuote) -> Result<(QuoteView, bool), QuoterError> {
        let text = new.quote.trim();
        let author = new.author.trim();
        let category = new.category.trim();
        if text.is_empty() {
            return Err(QuoterError::InvalidInput("quote must not be empty".into()));
        }
        if author.is_empty() {
            return Err(QuoterError::InvalidInput("author must not be empty".into()));
        }
        if category.is_empty() {
            return Err(QuoterError::InvalidInput("category must not be empty".into()));
        }

        self.storage
            .save_quote(author, new.birthdate, category, text)
            .await
    }

    pub async fn list_quotes(&self) -> Result<Vec<QuoteView>, QuoterError> {
        self.storage.list_quotes().await
    }

    pub async fn delete_author(&self, id: i64) -> Result<(), QuoterError> {
        if !self.storage.delete_author(id).await? {
            return Err(QuoterError::NotFound(format!("author {id}")));
        }
        info!(author_id = id, "author deleted");
        Ok(())
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), QuoterError> {
        if !self.storage.delete_category(id).await? {
            return Err(QuoterError::NotFound(format!("category {id}")));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use crate::service::picker::CoinFlip;

    /// Remote endpoint that refuses connections, so a remote attempt fails fast.
    fn unreachable_api() -> QuoteApi {
        let cfg = RemoteConfig {
            url: "http://127.0.0.1:9/quotes".parse().unwrap(),
            retries: 0,
            timeout_secs: 1,
            ..RemoteConfig::default()
        };
        QuoteApi::new(&cfg).unwrap()
    }

    async fn service(remote_probability: f64) -> QuoteService {
        let storage = QuoteStorage::connect("sqlite::memory:").await.unwrap();
        QuoteService::new(
            storage,
            unreachable_api(),
            Arc::new(CoinFlip::new(remote_probability)),
            "Design",
        )
    }

    #[tokio::test]
    async fn local_pick_serves_stored_quote() {
        let svc = service(0.0).await;
        let (saved, _) = svc
            .storage()
            .save_quote("Ada", None, "Computing", "Stored.")
            .await
            .unwrap();
        assert_eq!(svc.random_quote().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn empty_store_falls_back_to_remote() {
        let svc = service(0.0).await;
        let err = svc.random_quote().await.unwrap_err();
        assert!(matches!(err, QuoterError::Reqwest(ref e) if e.is_connect()), "{err:?}");
    }

    #[tokio::test]
    async fn create_quote_trims_and_validates() {
        let svc = service(0.0).await;
        let (view, created) = svc
            .create_quote(NewQuote {
                quote: "  Keep it simple. ".into(),
                author: " Anon ".into(),
                birthdate: None,
                category: "Advice".into(),
            })
            .await
            .unwrap();
        assert!(created);
        assert_eq!(view.quote.quote, "Keep it simple.");
        assert_eq!(view.author.name, "Anon");

        let err = svc
            .create_quote(NewQuote {
                quote: "x".into(),
                author: "   ".into(),
                birthdate: None,
                category: "Advice".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, QuoterError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn deleting_unknown_rows_is_not_found() {
        let svc = service(0.0).await;
        assert!(matches!(
            svc.delete_author(42).await,
            Err(QuoterError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_category(42).await,
            Err(QuoterError::NotFound(_))
        ));
    }
}
