use serde::{Deserialize, Deserializer};

/// Reads an explicit `null` the same as a missing field.
///
/// Pair with `#[serde(default)]` so both shapes land on `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Bag {
        #[serde(default, deserialize_with = "null_as_default")]
        things: Vec<u32>,
    }

    #[test]
    fn test_null_missing_and_present() {
        let null: Bag = serde_json::from_str(r#"{"things":null}"#).unwrap();
        let missing: Bag = serde_json::from_str("{}").unwrap();
        let present: Bag = serde_json::from_str(r#"{"things":[1,2]}"#).unwrap();

        assert!(null.things.is_empty());
        assert!(missing.things.is_empty());
        assert_eq!(present.things, vec![1, 2]);
    }

    #[test]
    fn test_wrong_type_still_fails() {
        assert!(serde_json::from_str::<Bag>(r#"{"things":"many"}"#).is_err());
    }
}
