use std::sync::{PoisonError, RwLock};
use textlens_schemas::AnalysisRecord;
use tracing::{debug, info};

/// Append-only, in-memory collection of analysis records.
///
/// Appends take the write lock and reads take the read lock, so an append is
/// never observed half-way through a scan. Records are never updated or
/// removed; the only way to release them is [`AnalysisStore::close`].
#[derive(Debug, Default)]
pub struct AnalysisStore {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        info!("Analysis store initialized");
        Self::default()
    }

    /// Add a record at the end of the store
    pub fn append(&self, record: AnalysisRecord) {
        let mut records = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!("Appending analysis {}", record.id);
        records.push(record);
    }

    /// All records in insertion order
    pub fn all(&self) -> Vec<AnalysisRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records whose topics or keywords contain `term`, compared
    /// case-insensitively. A missing or empty term returns every record.
    pub fn search_by_topic_or_keyword(&self, term: Option<&str>) -> Vec<AnalysisRecord> {
        let term = match term {
            Some(t) if !t.is_empty() => t,
            _ => return self.all(),
        };

        let records = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let results: Vec<AnalysisRecord> = records
            .iter()
            .filter(|r| r.metadata.mentions(term))
            .cloned()
            .collect();

        debug!("Search '{}' matched {} of {} records", term, results.len(), records.len());
        results
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tear the store down, handing back everything it held.
    pub fn close(self) -> Vec<AnalysisRecord> {
        let records = self
            .records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        info!("Analysis store closed with {} records", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use textlens_schemas::{generate_analysis_id, AnalysisMetadata, Sentiment};

    fn record(topics: &[&str], keywords: &[&str]) -> AnalysisRecord {
        AnalysisRecord {
            id: generate_analysis_id(),
            input_text: "text".to_string(),
            summary: "summary".to_string(),
            metadata: AnalysisMetadata {
                title: "Untitled Document".to_string(),
                topics: topics.iter().map(|s| s.to_string()).collect(),
                sentiment: Sentiment::Neutral,
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                confidence_score: 0.85,
            },
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_append_preserves_order_and_ids() {
        let store = AnalysisStore::new();
        let appended: Vec<AnalysisRecord> = (0..5)
            .map(|_| record(&["a", "llm", "prototype"], &["a"]))
            .collect();

        for r in &appended {
            store.append(r.clone());
        }

        let all = store.all();
        assert_eq!(all, appended);

        let ids: HashSet<_> = all.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_search_topic_case_insensitive() {
        let store = AnalysisStore::new();
        let target = record(&["llm", "prototype", "weather"], &["weather"]);
        store.append(target.clone());

        let results = store.search_by_topic_or_keyword(Some("LLM"));
        assert_eq!(results, vec![target]);
    }

    #[test]
    fn test_search_by_keyword() {
        let store = AnalysisStore::new();
        store.append(record(&["rust", "llm", "prototype"], &["rust", "memory", "safety"]));
        store.append(record(&["go", "llm", "prototype"], &["go", "garbage", "collector"]));

        let results = store.search_by_topic_or_keyword(Some("Safety"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.topics[0], "rust");

        assert!(store.search_by_topic_or_keyword(Some("python")).is_empty());
    }

    #[test]
    fn test_search_does_not_match_substrings() {
        let store = AnalysisStore::new();
        store.append(record(&["weather", "llm", "prototype"], &["weather"]));

        assert!(store.search_by_topic_or_keyword(Some("eat")).is_empty());
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let store = AnalysisStore::new();
        store.append(record(&["one", "llm", "prototype"], &["one"]));
        store.append(record(&["two", "llm", "prototype"], &["two"]));

        let all = store.all();
        assert_eq!(store.search_by_topic_or_keyword(None), all);
        assert_eq!(store.search_by_topic_or_keyword(Some("")), all);
    }

    #[test]
    fn test_close_returns_records() {
        let store = AnalysisStore::new();
        assert!(store.is_empty());
        store.append(record(&["x", "llm", "prototype"], &["x"]));
        assert_eq!(store.len(), 1);

        let records = store.close();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(AnalysisStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.append(record(&["t", "llm", "prototype"], &["t"]));
                        let _ = store.search_by_topic_or_keyword(Some("t"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 200);
    }
}
