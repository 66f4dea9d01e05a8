use ::serde::{Deserialize, Deserializer, Serialize, Serializer};
use indexmap::IndexMap;

use super::SparseVector;

impl Serialize for SparseVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

/// Goes through `FromIterator`, so `{"x": 0.0}` comes back empty.
impl<'de> Deserialize<'de> for SparseVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = IndexMap::<String, f64>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_map() {
        let v: SparseVector = [("nlp", 0.5), ("vision", 0.25)].into_iter().collect();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"nlp":0.5,"vision":0.25}"#);
        let back: SparseVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn zero_weights_are_dropped_on_load() {
        let v: SparseVector = serde_json::from_str(r#"{"x":0.0,"y":0.5}"#).unwrap();
        assert_eq!(v.len(), 1);
        assert!(!v.contains("x"));
        assert_eq!(v.get("y"), 0.5);
    }
}
