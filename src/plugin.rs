// Ninja info lookup: query text in, plain replies or forward batches out.

use std::path::PathBuf;

use futures::future::join_all;

use crate::avatar::AvatarCache;
use crate::config::Config;
use crate::error::Result;
use crate::event::MessageEvent;
use crate::feed::{FeedConfig, NinjaFeed};
use crate::format::{
    format_detail, not_found_message, resolve_avatar_url, DETAIL_ERROR, USAGE_HINT,
};
use crate::forward::{build_batch, ForwardNode, LookupResult};
use crate::metrics;
use crate::model::{EntityDetail, NameIndexEntry};
use crate::normalize::normalize_name;
use crate::resolver::Resolver;

/// What to send back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Plain(String),
    Forward(Vec<ForwardNode>),
}

pub struct NinjaInfoPlugin {
    resolver: Resolver,
    avatars: AvatarCache,
    asset_origin: String,
    batch_size: usize,
}

impl NinjaInfoPlugin {
    pub fn new(config: &Config) -> Result<Self> {
        let feed = NinjaFeed::new(FeedConfig::from(config))?;
        tracing::info!(
            "Ninja info plugin ready (feed {}, avatars in {})",
            config.feed_base_url,
            config.avatar_dir.display()
        );
        Ok(Self {
            resolver: Resolver::new(feed.clone()),
            avatars: AvatarCache::new(config.avatar_dir.clone(), feed),
            asset_origin: config.asset_origin.clone(),
            batch_size: config.batch_size.max(1),
        })
    }

    /// Answer a chat message carrying a ninja name.
    pub async fn handle(&self, event: &MessageEvent) -> Vec<Reply> {
        let query = event.query();
        tracing::info!("Parsed ninja name {query:?} from {:?}", event.message());
        self.lookup(event.self_id(), &query).await
    }

    /// Every match for `query`, rendered in forward batches.
    ///
    /// The index is fetched once; details within a batch are fetched concurrently
    /// and a failed detail only affects its own node.
    pub async fn lookup(&self, self_id: &str, query: &str) -> Vec<Reply> {
        let query = query.trim();
        if is_blank(query) {
            return vec![Reply::Plain(USAGE_HINT.to_string())];
        }

        let candidates = self.resolver.find_candidates(query).await;
        if candidates.is_empty() {
            tracing::warn!("No ninja found for {query:?}");
            metrics::LOOKUPS_TOTAL.with_label_values(&["not_found"]).inc();
            return vec![Reply::Plain(not_found_message(query))];
        }
        metrics::LOOKUPS_TOTAL.with_label_values(&["found"]).inc();

        let mut replies = Vec::new();
        for (i, chunk) in candidates.chunks(self.batch_size).enumerate() {
            let results = join_all(chunk.iter().map(|entry| self.render(entry))).await;
            replies.push(Reply::Forward(build_batch(
                self_id,
                &results,
                i,
                candidates.len(),
                self.batch_size,
            )));
        }
        replies
    }

    /// The single best match for `query` as one forward node.
    pub async fn describe(&self, self_id: &str, query: &str) -> Reply {
        let query = query.trim();
        if is_blank(query) {
            return Reply::Plain(USAGE_HINT.to_string());
        }
        let Some(id) = self.resolver.resolve_single_id(query).await else {
            metrics::LOOKUPS_TOTAL.with_label_values(&["not_found"]).inc();
            return Reply::Plain(not_found_message(query));
        };
        match self.resolver.fetch_detail(&id).await {
            Some(detail) => {
                metrics::LOOKUPS_TOTAL.with_label_values(&["found"]).inc();
                let result = LookupResult {
                    display_name: detail.display_name(),
                    text: Some(format_detail(&detail)),
                    avatar: self.cache_avatar(&detail).await,
                };
                Reply::Forward(vec![result.to_node(self_id)])
            }
            None => Reply::Plain(DETAIL_ERROR.to_string()),
        }
    }

    async fn render(&self, entry: &NameIndexEntry) -> LookupResult {
        let detail = self.resolver.fetch_detail(&entry.id).await;
        let (text, avatar) = match &detail {
            Some(detail) => (Some(format_detail(detail)), self.cache_avatar(detail).await),
            None => (None, None),
        };
        LookupResult {
            display_name: entry.display_name(),
            text,
            avatar,
        }
    }

    async fn cache_avatar(&self, detail: &EntityDetail) -> Option<PathBuf> {
        let url = resolve_avatar_url(detail.avatar_field(), &self.asset_origin)?;
        self.avatars.fetch(&url).await
    }
}

/// A query with no matchable characters would select every index entry.
fn is_blank(query: &str) -> bool {
    if !normalize_name(query).is_empty() {
        return false;
    }
    tracing::warn!("Empty ninja name {query:?}");
    metrics::LOOKUPS_TOTAL.with_label_values(&["empty_query"]).inc();
    true
}
