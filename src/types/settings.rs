use std::collections::BTreeMap;

use super::Value;

/// Per-rule configuration bag.
///
/// Settings are loosely typed: each rule kind interprets its own keys. The typed
/// accessors never fail; a missing or malformed entry yields the caller's default.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Settings {
    entries: BTreeMap<String, Value>,
}

impl Settings {
    /// Create an empty settings bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Insert a value (mutable reference version).
    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_owned(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// A list of strings. A plain string is split on `,`; empty tokens are dropped.
    #[must_use]
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_owned(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let s = Settings::new().set("forwardSteps", 5_i64);
        assert_eq!(s.get("forwardSteps"), Some(&Value::Int(5)));
        assert_eq!(s.get("missing"), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn overwrite_value() {
        let s = Settings::new().set("k", 1_i64).set("k", 2_i64);
        assert_eq!(s.get_int("k", 0), 2);
    }

    #[test]
    fn get_int_defaults_on_missing_or_malformed() {
        let s = Settings::new()
            .set("a", "7")
            .set("b", "seven")
            .set("c", true)
            .set("d", 4.0_f64);
        assert_eq!(s.get_int("a", 3), 7);
        assert_eq!(s.get_int("b", 3), 3);
        assert_eq!(s.get_int("c", 3), 3);
        assert_eq!(s.get_int("d", 3), 4);
        assert_eq!(s.get_int("missing", 3), 3);
    }

    #[test]
    fn get_bool_defaults_on_malformed() {
        let s = Settings::new().set("a", "TRUE").set("b", 1_i64);
        assert!(s.get_bool("a", false));
        assert!(s.get_bool("b", true));
        assert!(!s.get_bool("missing", false));
    }

    #[test]
    fn get_str() {
        let s = Settings::new().set("mode", "fail").set("n", 1_i64);
        assert_eq!(s.get_str("mode", "pass"), "fail");
        assert_eq!(s.get_str("n", "pass"), "pass");
    }

    #[test]
    fn string_list_from_list_and_csv() {
        let s = Settings::new()
            .set("list", vec!["A", " B ", ""])
            .set("csv", "X, Y,,Z")
            .set("mixed", vec![Value::from("P"), Value::Int(3)])
            .set("int", 9_i64);
        assert_eq!(s.get_string_list("list"), vec!["A", "B"]);
        assert_eq!(s.get_string_list("csv"), vec!["X", "Y", "Z"]);
        assert_eq!(s.get_string_list("mixed"), vec!["P", "3"]);
        assert!(s.get_string_list("int").is_empty());
        assert!(s.get_string_list("missing").is_empty());
    }

    #[test]
    fn collect_from_pairs() {
        let s: Settings = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
        assert_eq!(s.iter().count(), 2);
    }
}
