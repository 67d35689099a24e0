//! Deterministic cache key generation
//!
//! Entity keys carry their tier as a prefix so several tiers can share one
//! backing server. Search keys hash the query text together with the filter
//! set, serialized as JSON with object keys sorted.

use crate::tier::CacheTier;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

const ENTITY_NAMESPACE: &str = "template";
const POPULAR_KEY: &str = "popular:templates";
const SEARCH_NAMESPACE: &str = "search:results:";

/// Key builder for every keyspace the cache writes
pub struct CacheKey;

impl CacheKey {
    /// `{tier}:template:{id}`
    pub fn entity(tier: CacheTier, entity_id: &str) -> String {
        format!("{}:{ENTITY_NAMESPACE}:{entity_id}", tier.as_str())
    }

    /// Key of the singleton popular-entities slot
    pub fn popular() -> &'static str {
        POPULAR_KEY
    }

    /// `search:results:{sha256}` over the query and canonical filters
    pub fn search(query: &str, filters: &HashMap<String, Value>) -> String {
        format!("{SEARCH_NAMESPACE}{}", Self::search_hash(query, filters))
    }

    /// Glob over the search namespace; `*` selects every search entry
    pub fn search_pattern(pattern: &str) -> String {
        format!("{SEARCH_NAMESPACE}{pattern}")
    }

    /// SHA-256 of the canonical JSON document `[query, {filters}]`
    fn search_hash(query: &str, filters: &HashMap<String, Value>) -> String {
        let filters: Map<String, Value> = filters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let document = Value::Array(vec![
            Value::String(query.to_string()),
            Value::Object(filters),
        ]);

        let mut hasher = Sha256::new();
        hasher.update(canonical_json(&document).as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Serialize with object keys sorted at every depth
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            let body: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| format!("{}:{v}", Value::String(k.clone())))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn filters(entries: &[(&str, Value)]) -> HashMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_entity_keys_are_tier_scoped() {
        assert_eq!(CacheKey::entity(CacheTier::Hot, "42"), "hot:template:42");
        assert_eq!(CacheKey::entity(CacheTier::Cold, "42"), "cold:template:42");
        assert_ne!(
            CacheKey::entity(CacheTier::Metadata, "42"),
            CacheKey::entity(CacheTier::Optimization, "42")
        );
    }

    #[test]
    fn test_search_key_ignores_filter_order() {
        let a = filters(&[("category", json!("reunion")), ("year", json!(2019))]);
        let b = filters(&[("year", json!(2019)), ("category", json!("reunion"))]);
        assert_eq!(CacheKey::search("gala", &a), CacheKey::search("gala", &b));
    }

    #[test]
    fn test_search_key_distinguishes_filters() {
        let a = filters(&[("year", json!(2019))]);
        let b = filters(&[("year", json!(2020))]);
        let c = filters(&[("year", json!(2019)), ("tenant", json!("west"))]);
        let ka = CacheKey::search("gala", &a);
        assert_ne!(ka, CacheKey::search("gala", &b));
        assert_ne!(ka, CacheKey::search("gala", &c));
        assert_ne!(ka, CacheKey::search("galas", &a));
    }

    #[test]
    fn test_separator_bytes_in_names_do_not_collide() {
        let packed = filters(&[("b\u{0}1\u{0}c", json!(2))]);
        let split = filters(&[("b", json!(1)), ("c", json!(2))]);
        assert_ne!(CacheKey::search("q", &packed), CacheKey::search("q", &split));

        let in_query = filters(&[("b", json!(1))]);
        assert_ne!(
            CacheKey::search("q\u{0}b", &HashMap::new()),
            CacheKey::search("q", &in_query)
        );
    }

    #[test]
    fn test_string_and_number_filters_differ() {
        let text = filters(&[("year", json!("2019"))]);
        let number = filters(&[("year", json!(2019))]);
        assert_ne!(CacheKey::search("gala", &text), CacheKey::search("gala", &number));
    }

    #[test]
    fn test_nested_objects_are_canonical() {
        let a = filters(&[("range", json!({"from": 1, "to": 9}))]);
        let b = filters(&[("range", json!({"to": 9, "from": 1}))]);
        assert_eq!(CacheKey::search("", &a), CacheKey::search("", &b));
    }

    #[test]
    fn test_search_keys_live_in_search_namespace() {
        let key = CacheKey::search("gala", &HashMap::new());
        assert!(key.starts_with("search:results:"));
        assert_eq!(key.len(), "search:results:".len() + 64);
        assert_eq!(CacheKey::search_pattern("*"), "search:results:*");
    }

    proptest! {
        #[test]
        fn prop_search_key_deterministic(
            query in ".{0,24}",
            entries in proptest::collection::hash_map("[a-z]{1,8}", any::<i64>(), 0..6),
        ) {
            let forward: HashMap<String, Value> =
                entries.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let mut reversed_pairs: Vec<_> = forward.clone().into_iter().collect();
            reversed_pairs.reverse();
            let reversed: HashMap<String, Value> = reversed_pairs.into_iter().collect();

            prop_assert_eq!(
                CacheKey::search(&query, &forward),
                CacheKey::search(&query, &reversed)
            );
        }
    }
}
