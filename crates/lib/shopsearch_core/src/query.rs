// @awa-component: QRY-ParameterSet
//
//! Ordered query parameter multimap and the field encodings that feed it.
//!
//! Four wire shapes exist for structured inputs:
//!
//! | Shape          | Example input                     | Emitted                               |
//! |----------------|-----------------------------------|---------------------------------------|
//! | plain          | `q: "shoes"`                      | `q=shoes`                             |
//! | dotted-multi   | `filters: {brand: [a, b]}`        | `filter.brand=a&filter.brand=b`       |
//! | csv            | `cart: [a, b]`                    | `cart=a,b`                            |
//! | repeated       | `includedFacets: [a, b]`          | `includedFacets=a&includedFacets=b`   |

use std::fmt;
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use url::form_urlencoded;

/// Ordered multimap of query keys to values. Insertion order is wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameterSet {
    entries: Vec<(String, String)>,
}

impl QueryParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single `key=value` entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Append `value` under `key` unless it is absent or blank.
    pub fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.push(key, v);
        }
    }

    /// Append one comma-joined entry. Blank items are dropped; nothing is
    /// emitted when no items remain.
    pub fn push_csv(&mut self, key: &str, values: &[String]) {
        let items: Vec<&str> = non_blank(values).collect();
        if !items.is_empty() {
            self.push(key, items.join(","));
        }
    }

    /// Append one entry per item, all under the same key. Items are sent
    /// exactly as given.
    pub fn push_repeated(&mut self, key: &str, values: &[String]) {
        for v in values {
            self.push(key, v.as_str());
        }
    }

    /// Force `key` to a single value. The first existing entry is overwritten
    /// in place and any later duplicates are removed; otherwise appended.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut idx = 0;
                self.entries.retain(|(k, _)| {
                    let keep = idx <= first || k != key;
                    idx += 1;
                    keep
                });
            }
            None => self.push(key, value),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.entries.iter().filter(|(k, _)| k == key).count()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in wire order, duplicates included.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as an `application/x-www-form-urlencoded` query string.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.entries.iter())
            .finish()
    }

    /// Borrow the raw pairs, e.g. for `reqwest::RequestBuilder::query`.
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl Serialize for QueryParameterSet {
    /// Serialized as a list of `[key, value]` pairs so duplicates survive.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Value of a filter entry: one value or several OR-ed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::One(v) => vec![v.as_str()],
            FilterValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::One(v.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(vs: Vec<&str>) -> Self {
        FilterValue::Many(vs.into_iter().map(str::to_string).collect())
    }
}

/// Sort direction for a `sort.<field>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Insertion-ordered field mapping (`filters`, `bgfilters`, `sort`).
///
/// Deserializes from a JSON object keeping the object's key order, which
/// is what makes compound sort deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<V>(Vec<(String, V)>);

impl<V> FieldMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for FieldMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<V: Serialize> Serialize for FieldMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for FieldMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for FieldMapVisitor<V> {
            type Value = FieldMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping field names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((field, value)) = map.next_entry::<String, V>()? {
                    entries.push((field, value));
                }
                Ok(FieldMap(entries))
            }
        }

        deserializer.deserialize_map(FieldMapVisitor(PhantomData))
    }
}

/// Emit `<prefix>.<field>=<value>` once per value; arrays repeat the key.
/// Values are sent verbatim, so the key count always equals the array length.
pub fn push_dotted_filters(set: &mut QueryParameterSet, prefix: &str, filters: &FieldMap<FilterValue>) {
    for (field, value) in filters.iter() {
        let key = format!("{prefix}.{field}");
        for v in value.values() {
            set.push(key.clone(), v);
        }
    }
}

/// Emit `sort.<field>=<direction>` per entry, primary key first.
pub fn push_sort(set: &mut QueryParameterSet, sort: &FieldMap<SortDirection>) {
    for (field, direction) in sort.iter() {
        set.push(format!("sort.{field}"), direction.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn csv_joins_into_one_entry() {
        let mut set = QueryParameterSet::new();
        set.push_csv("cart", &strings(&["sku-1", "sku-2", "sku-3"]));
        assert_eq!(set.count("cart"), 1);
        assert_eq!(set.get("cart"), Some("sku-1,sku-2,sku-3"));
    }

    #[test]
    fn csv_omits_empty_and_blank_arrays() {
        let mut set = QueryParameterSet::new();
        set.push_csv("cart", &[]);
        set.push_csv("lastViewed", &strings(&["", "  "]));
        assert!(set.is_empty());
    }

    #[test]
    fn repeated_emits_one_entry_per_item() {
        let mut set = QueryParameterSet::new();
        set.push_repeated("includedFacets", &strings(&["brand", "color"]));
        assert_eq!(set.get_all("includedFacets"), vec!["brand", "color"]);
    }

    #[test]
    fn repeated_keeps_blank_and_padded_items() {
        let mut set = QueryParameterSet::new();
        set.push_repeated("includedFacets", &strings(&["brand", "", " size "]));
        assert_eq!(set.get_all("includedFacets"), vec!["brand", "", " size "]);
    }

    #[test]
    fn set_overwrites_in_place_and_drops_duplicates() {
        let mut set = QueryParameterSet::new();
        set.push("siteId", "abc123");
        set.push("resultsPerPage", "24");
        set.push("q", "shoes");
        set.push("resultsPerPage", "48");
        set.set("resultsPerPage", "0");
        assert_eq!(set.keys(), vec!["siteId", "resultsPerPage", "q"]);
        assert_eq!(set.get_all("resultsPerPage"), vec!["0"]);
    }

    #[test]
    fn set_appends_when_missing() {
        let mut set = QueryParameterSet::new();
        set.push("siteId", "abc123");
        set.set("resultsPerPage", "0");
        assert_eq!(set.keys(), vec!["siteId", "resultsPerPage"]);
    }

    #[test]
    fn dotted_filters_repeat_keys_for_arrays() {
        let filters: FieldMap<FilterValue> = [
            ("brand", FilterValue::from(vec!["Nike", "Adidas"])),
            ("color", FilterValue::from("red")),
        ]
        .into_iter()
        .collect();
        let mut set = QueryParameterSet::new();
        push_dotted_filters(&mut set, "filter", &filters);
        assert_eq!(set.get_all("filter.brand"), vec!["Nike", "Adidas"]);
        assert_eq!(set.get_all("filter.color"), vec!["red"]);
        assert!(set.iter().all(|(_, v)| !v.contains(',')));
    }

    #[test]
    fn query_string_encodes_reserved_characters() {
        let mut set = QueryParameterSet::new();
        set.push("q", "red & blue shoes");
        set.push("filter.size", "10.5");
        assert_eq!(set.to_query_string(), "q=red+%26+blue+shoes&filter.size=10.5");
    }

    #[test]
    fn field_map_keeps_json_object_order() {
        let sort: FieldMap<SortDirection> =
            serde_json::from_str(r#"{"price": "asc", "ratings": "desc", "name": "asc"}"#)
                .expect("parse");
        let fields: Vec<&str> = sort.iter().map(|(k, _)| k).collect();
        assert_eq!(fields, vec!["price", "ratings", "name"]);
    }

    #[test]
    fn filter_value_accepts_string_or_array() {
        let filters: FieldMap<FilterValue> =
            serde_json::from_str(r#"{"brand": ["a", "b"], "color": "red"}"#).expect("parse");
        let values: Vec<Vec<&str>> = filters.iter().map(|(_, v)| v.values()).collect();
        assert_eq!(values, vec![vec!["a", "b"], vec!["red"]]);
    }

    #[test]
    fn sort_direction_rejects_unknown_values() {
        let parsed: Result<FieldMap<SortDirection>, _> =
            serde_json::from_str(r#"{"price": "up"}"#);
        assert!(parsed.is_err());
    }
}
