// Lookup resolver: fuzzy name matching against the index and detail retrieval.
//
// Fetch failures never cross this boundary. They are logged and collapse into an
// empty candidate list or a `None` detail.

use crate::feed::NinjaFeed;
use crate::metrics;
use crate::model::{EntityDetail, NameIndexEntry};
use crate::normalize::normalize_name;

/// Normalized name fields of one index entry.
struct MatchKeys {
    primary: String,
    secondary: String,
}

impl MatchKeys {
    fn of(entry: &NameIndexEntry) -> Self {
        Self {
            primary: normalize_name(&entry.primary_name),
            secondary: normalize_name(&entry.secondary_name),
        }
    }

    fn name_only_contains(&self, key: &str) -> bool {
        self.primary.contains(key) || self.secondary.contains(key)
    }

    fn combined_contains(&self, key: &str) -> bool {
        format!("{}{}", self.primary, self.secondary).contains(key)
    }
}

/// Entries whose primary name, secondary name, or their concatenation contains the
/// normalized query. Feed order is kept.
pub fn match_candidates(entries: &[NameIndexEntry], query: &str) -> Vec<NameIndexEntry> {
    let key = normalize_name(query);
    entries
        .iter()
        .filter(|entry| {
            let keys = MatchKeys::of(entry);
            keys.name_only_contains(&key) || keys.combined_contains(&key)
        })
        .cloned()
        .collect()
}

/// Pick one entry for a query.
///
/// A unique hit on primary or secondary name alone wins. Otherwise the first entry
/// in feed order whose concatenated names contain the query is taken.
pub fn select_single(entries: &[NameIndexEntry], query: &str) -> Option<NameIndexEntry> {
    let key = normalize_name(query);
    let keyed: Vec<(&NameIndexEntry, MatchKeys)> =
        entries.iter().map(|e| (e, MatchKeys::of(e))).collect();

    let mut name_hits = keyed.iter().filter(|(_, k)| k.name_only_contains(&key));
    if let (Some((entry, _)), None) = (name_hits.next(), name_hits.next()) {
        tracing::info!(
            "Unique name match: {} {} ID={}",
            entry.primary_name,
            entry.secondary_name,
            entry.id
        );
        return Some((*entry).clone());
    }

    let combined = keyed
        .iter()
        .find(|(_, k)| k.combined_contains(&key))
        .map(|(entry, _)| (*entry).clone());
    if let Some(entry) = &combined {
        tracing::info!(
            "Combined name match: {} {} ID={}",
            entry.primary_name,
            entry.secondary_name,
            entry.id
        );
    }
    combined
}

/// Resolves free-text queries against the remote feed.
#[derive(Debug, Clone)]
pub struct Resolver {
    feed: NinjaFeed,
}

impl Resolver {
    pub fn new(feed: NinjaFeed) -> Self {
        Self { feed }
    }

    /// All entries fuzzily matching `query`, or empty on any fetch failure.
    pub async fn find_candidates(&self, query: &str) -> Vec<NameIndexEntry> {
        match self.feed.fetch_index().await {
            Ok(entries) => {
                let found = match_candidates(&entries, query);
                tracing::info!("Query {query:?} matched {} ninja(s)", found.len());
                found
            }
            Err(e) => {
                tracing::error!("Ninja list lookup failed for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    /// The id of the single best match, or `None` when nothing matches.
    pub async fn resolve_single_id(&self, query: &str) -> Option<String> {
        let entries = match self.feed.fetch_index().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("Ninja list lookup failed for {query:?}: {e}");
                return None;
            }
        };
        let selected = select_single(&entries, query).map(|entry| entry.id);
        if selected.is_none() {
            tracing::warn!("No ninja found for {query:?}");
        }
        selected
    }

    /// Detail record for `id`, or `None` when it cannot be fetched or parsed.
    pub async fn fetch_detail(&self, id: &str) -> Option<EntityDetail> {
        match self.feed.fetch_detail(id).await {
            Ok(detail) => {
                tracing::info!("Detail assembled for {} (ID={id})", detail.name());
                Some(detail)
            }
            Err(e) => {
                tracing::error!("Ninja detail fetch failed for ID={id}: {e}");
                metrics::LOOKUPS_TOTAL.with_label_values(&["detail_failed"]).inc();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, primary: &str, secondary: &str) -> NameIndexEntry {
        NameIndexEntry::new(id, primary, secondary)
    }

    fn uzumaki_index() -> Vec<NameIndexEntry> {
        vec![
            entry("1001", "Uzumaki", "Hokage"),
            entry("1002", "Uzumaki", "Genin"),
            entry("2001", "Uchiha", "Avenger"),
        ]
    }

    fn ids(entries: &[NameIndexEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_candidates_preserve_feed_order() {
        let found = match_candidates(&uzumaki_index(), "uzumaki");
        assert_eq!(ids(&found), vec!["1001", "1002"]);
    }

    #[test]
    fn test_candidates_match_secondary_and_concatenation() {
        let index = uzumaki_index();
        assert_eq!(ids(&match_candidates(&index, "genin")), vec!["1002"]);
        // Spans the boundary between primary and secondary.
        assert_eq!(ids(&match_candidates(&index, "Uzumaki Hokage")), vec!["1001"]);
        assert_eq!(ids(&match_candidates(&index, "ＵＣＨＩＨＡ")), vec!["2001"]);
    }

    #[test]
    fn test_candidates_no_match() {
        assert!(match_candidates(&uzumaki_index(), "Hyuga").is_empty());
    }

    #[test]
    fn test_candidates_keep_duplicates() {
        let index = vec![entry("1", "鸣人", ""), entry("1", "鸣人", "")];
        assert_eq!(match_candidates(&index, "鸣人").len(), 2);
    }

    #[test]
    fn test_single_ambiguous_name_falls_back_to_first_combined() {
        let selected = select_single(&uzumaki_index(), "Uzumaki").unwrap();
        assert_eq!(selected.id, "1001");
    }

    #[test]
    fn test_single_unique_name_hit_wins_over_combined() {
        // Only 3002 holds "sasuke" in a single name field, while the combined
        // "sasu"+"ke" of 3001 comes first in the feed.
        let index = vec![
            entry("3001", "Sasu", "Ke"),
            entry("3002", "Sasuke", "Rinnegan"),
        ];
        assert_eq!(select_single(&index, "sasuke").unwrap().id, "3002");
    }

    #[test]
    fn test_single_zero_name_hits_falls_through() {
        let index = vec![
            entry("3001", "Ninja", "Ninja"),
            entry("1002", "Uzumaki", "Genin"),
        ];
        assert_eq!(select_single(&index, "jani").unwrap().id, "3001");
    }

    #[test]
    fn test_single_combined_only_match() {
        let selected = select_single(&uzumaki_index(), "uzumakigenin").unwrap();
        assert_eq!(selected.id, "1002");
    }

    #[test]
    fn test_single_not_found() {
        assert!(select_single(&uzumaki_index(), "Hyuga").is_none());
        assert!(select_single(&[], "Uzumaki").is_none());
    }
}
