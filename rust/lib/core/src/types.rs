use serde::{Deserialize, Serialize};

/// Upper bound on page size accepted from clients.
pub const MAX_LIMIT: usize = 500;

/// Parameters for list/query operations.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    /// Maximum number of results to return.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset for pagination.
    #[serde(default)]
    pub offset: usize,

    /// Free-text query matched against the record's display name.
    #[serde(default)]
    pub q: Option<String>,

    /// Restrict to active (true) or inactive (false) records.
    #[serde(default)]
    pub active: Option<bool>,
}

fn default_limit() -> usize {
    50
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            q: None,
            active: None,
        }
    }
}

impl ListParams {
    /// Page size capped at [`MAX_LIMIT`].
    pub fn page_limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}

/// Result wrapper for list operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Merge a JSON patch into a base value (RFC 7386 JSON Merge Patch).
///
/// `null` removes a key, objects merge recursively, anything else replaces.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    let Some(patch_obj) = patch.as_object() else {
        *base = patch.clone();
        return;
    };
    if !base.is_object() {
        *base = serde_json::Value::Object(serde_json::Map::new());
    }
    if let Some(base_obj) = base.as_object_mut() {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else {
                let entry = base_obj.entry(key.clone()).or_insert(serde_json::Value::Null);
                merge_patch(entry, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_now_rfc3339() {
        assert!(now_rfc3339().contains('T'));
    }

    #[test]
    fn test_page_limit_capped() {
        let params = ListParams {
            limit: 10_000,
            ..Default::default()
        };
        assert_eq!(params.page_limit(), MAX_LIMIT);
        assert_eq!(ListParams::default().page_limit(), 50);
    }

    #[test]
    fn test_merge_patch() {
        let mut base = serde_json::json!({"a": 1, "b": 2, "c": {"d": 3}});
        let patch = serde_json::json!({"b": null, "c": {"e": 4}, "f": 5});
        merge_patch(&mut base, &patch);
        assert_eq!(base, serde_json::json!({"a": 1, "c": {"d": 3, "e": 4}, "f": 5}));
    }

    #[test]
    fn test_merge_patch_replaces_scalars_and_arrays() {
        let mut base = serde_json::json!({"name": "old", "tags": [1, 2]});
        merge_patch(&mut base, &serde_json::json!({"name": "new", "tags": [3]}));
        assert_eq!(base, serde_json::json!({"name": "new", "tags": [3]}));
    }
}
