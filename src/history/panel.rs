//! Sidebar model: the listed summaries, kept fresh from session notices

use super::bucket::{bucket, HistoryGroups};
use crate::model::ConversationSummary;
use crate::service::{ConversationService, ServiceError};
use crate::session::SessionNotice;
use chrono::{DateTime, TimeZone};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub struct HistoryPanel<S> {
    service: S,
    limit: u32,
    summaries: Vec<ConversationSummary>,
    loaded: bool,
    /// Shown instead of the listing while present
    search: Option<SearchResults>,
}

struct SearchResults {
    query: String,
    results: Vec<ConversationSummary>,
}

impl<S: ConversationService> HistoryPanel<S> {
    pub fn new(service: S, limit: u32) -> Self {
        Self {
            service,
            limit,
            summaries: Vec::new(),
            loaded: false,
            search: None,
        }
    }

    /// Reload the first page of history, and the active search if any.
    ///
    /// On failure the previously listed summaries stay in place.
    pub async fn refresh(&mut self) -> Result<&[ConversationSummary], ServiceError> {
        let summaries = match self.service.list_summaries(self.limit, 0).await {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!(error = %e, "History refresh failed");
                return Err(e);
            }
        };
        tracing::debug!(count = summaries.len(), "History refreshed");
        self.summaries = summaries;
        self.loaded = true;

        if let Some(query) = self.active_query().map(str::to_string) {
            self.run_search(query).await?;
        }
        Ok(&self.summaries)
    }

    /// Show only summaries matching `query`; a blank query goes back to the
    /// full listing.
    ///
    /// On failure the previous results (or listing) stay in place.
    pub async fn search(&mut self, query: &str) -> Result<&[ConversationSummary], ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            self.clear_search();
        } else {
            self.run_search(query.to_string()).await?;
        }
        Ok(self.visible())
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    pub fn active_query(&self) -> Option<&str> {
        self.search.as_ref().map(|s| s.query.as_str())
    }

    async fn run_search(&mut self, query: String) -> Result<(), ServiceError> {
        match self.service.search_summaries(&query).await {
            Ok(results) => {
                tracing::debug!(query = %query, matches = results.len(), "History searched");
                self.search = Some(SearchResults { query, results });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "History search failed");
                Err(e)
            }
        }
    }

    /// Whether at least one refresh has succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The listing, regardless of any active search
    pub fn summaries(&self) -> &[ConversationSummary] {
        &self.summaries
    }

    /// Search results while searching, otherwise the listing
    pub fn visible(&self) -> &[ConversationSummary] {
        match &self.search {
            Some(search) => &search.results,
            None => &self.summaries,
        }
    }

    pub fn groups<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> HistoryGroups<'_> {
        bucket(self.visible(), now)
    }

    /// Drain pending notices and refresh once if any asked for it.
    ///
    /// Returns whether a refresh was attempted. A lagged receiver counts as
    /// a change since notices were dropped.
    pub async fn sync(
        &mut self,
        notices: &mut broadcast::Receiver<SessionNotice>,
    ) -> Result<bool, ServiceError> {
        let mut stale = false;
        loop {
            match notices.try_recv() {
                Ok(SessionNotice::HistoryChanged) => stale = true,
                Ok(SessionNotice::BackgroundFailure { .. }) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "History notices lagged");
                    stale = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if stale {
            self.refresh().await?;
        }
        Ok(stale)
    }
}
