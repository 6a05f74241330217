//! Cache key derivation.
//!
//! Keys are derived from the logical operation name plus the request's path
//! and query parameters. The tuple is serialized into a canonical JSON form
//! (struct field order is fixed, `BTreeMap` keeps query parameters ordered)
//! and hashed with SHA-256, so two logically identical requests always map to
//! the same 64-character hex digest regardless of process or run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

// ============================================================================
// CACHE KEY
// ============================================================================

/// A derived cache key: a fixed-length hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// DERIVATION
// ============================================================================

/// The request identity that participates in key derivation.
#[derive(Serialize)]
struct RequestIdentity<'a> {
    path: &'a str,
    query_params: &'a BTreeMap<String, String>,
}

/// Identity of one cacheable operation: logical name plus request identity.
///
/// The logical name is an explicit parameter rather than anything derived
/// from runtime introspection, so wrapped handlers keep a stable identity.
#[derive(Debug, Clone, Copy)]
pub struct CacheOp<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub params: &'a BTreeMap<String, String>,
}

impl CacheOp<'_> {
    pub fn key(&self) -> CacheKey {
        derive(self.name, self.path, self.params)
    }
}

/// Derive the cache key for `(operation, path, params)`.
///
/// Pure and deterministic: identical logical inputs always produce
/// byte-identical output; any differing parameter value produces a different
/// key with cryptographically negligible collision probability.
pub fn derive(operation: &str, path: &str, params: &BTreeMap<String, String>) -> CacheKey {
    let identity = RequestIdentity {
        path,
        query_params: params,
    };
    let canonical = serde_json::to_string(&(operation, identity)).unwrap_or_default();

    let digest = Sha256::digest(canonical.as_bytes());
    CacheKey(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let query = params(&[("param", "value")]);

        let first = derive("test_func", "/test_path", &query);
        let second = derive("test_func", "/test_path", &query);

        assert_eq!(first, second);
    }

    #[test]
    fn test_known_digest_is_stable() {
        // Guards the canonical form against accidental reshaping: the digest
        // of ("test_func", {"path": "/test_path", "query_params": {"param":
        // "value"}}) must never change across releases.
        let key = derive("test_func", "/test_path", &params(&[("param", "value")]));

        assert_eq!(
            key.as_str(),
            "bf587141b994715f49d8a746c6724e0adb30c5c58a83ff38a7488a02d892222c"
        );
    }

    #[test]
    fn test_key_is_64_char_hex() {
        let key = derive("op", "/p", &BTreeMap::new());

        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_differing_inputs_produce_distinct_keys() {
        let base = derive("op", "/p", &params(&[("a", "1")]));

        assert_ne!(base, derive("other_op", "/p", &params(&[("a", "1")])));
        assert_ne!(base, derive("op", "/q", &params(&[("a", "1")])));
        assert_ne!(base, derive("op", "/p", &params(&[("a", "2")])));
        assert_ne!(base, derive("op", "/p", &params(&[("b", "1")])));
        assert_ne!(base, derive("op", "/p", &BTreeMap::new()));
    }

    #[test]
    fn test_param_insertion_order_is_irrelevant() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), "1".to_string());
        forward.insert("b".to_string(), "2".to_string());

        let mut reverse = BTreeMap::new();
        reverse.insert("b".to_string(), "2".to_string());
        reverse.insert("a".to_string(), "1".to_string());

        assert_eq!(derive("op", "/p", &forward), derive("op", "/p", &reverse));
    }

    #[test]
    fn test_cache_op_key_matches_derive() {
        let query = params(&[("since_date", "2023-06-01")]);
        let op = CacheOp {
            name: "get_repositories_since",
            path: "/repositories/popular",
            params: &query,
        };

        assert_eq!(
            op.key(),
            derive("get_repositories_since", "/repositories/popular", &query)
        );
    }
}
