//! Canonical query parameters
//!
//! Every request the dashboard issues is described by a `QueryParams`
//! value. Blank values are dropped on insertion so that an unset field and
//! a field set to `""` produce exactly the same parameter set.

/// Ordered list of query string parameters with blank values omitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value for the same key.
    ///
    /// Values that are empty or whitespace-only are ignored and also clear
    /// a previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        self.pairs.retain(|(k, _)| *k != key);

        if value.trim().is_empty() {
            return;
        }

        self.pairs.push((key, value));
    }

    /// Insert an optional parameter; `None` behaves like a blank value
    pub fn insert_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        match value {
            Some(value) => self.insert(key, value),
            None => self.remove(&key.into()),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Get the value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Append every pair of another parameter set
    pub fn extend(&mut self, other: &QueryParams) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Iterate over the parameters in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parameters sorted by key, for comparisons that ignore insertion order
    pub fn sorted_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.pairs.clone();
        pairs.sort();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_omitted() {
        let mut params = QueryParams::new();
        params.insert("a", "");
        params.insert("b", "   ");
        params.insert("c", "x");

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("c"), Some("x"));
        assert!(!params.contains("a"));
    }

    #[test]
    fn test_blank_value_clears_previous() {
        let mut params = QueryParams::new().with("by", "sexo");
        params.insert("by", " ");
        assert!(params.is_empty());

        params.insert_opt("top", Some(10));
        params.insert_opt::<usize>("top", None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let params = QueryParams::new().with("limit", 10).with("limit", 20);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("limit"), Some("20"));
    }
}
