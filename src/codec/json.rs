//! JSON codec using `serde_json`.

use crate::error::Result;

/// JSON codec for structured bodies.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to compact JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized (e.g. a map with non-string keys).
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode JSON bytes to a value, e.g. a request entity.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not valid JSON for type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn test_encode_struct_is_compact() {
        let user = User {
            id: 7,
            name: "ada".to_string(),
        };
        let encoded = JsonCodec::encode(&user).unwrap();
        assert_eq!(encoded, br#"{"id":7,"name":"ada"}"#);
    }

    #[test]
    fn test_encode_error_on_non_string_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        assert!(JsonCodec::encode(&map).is_err());
    }

    #[test]
    fn test_decode_error_on_invalid_data() {
        let result: Result<User> = JsonCodec::decode(b"{not json");
        assert!(result.is_err());
    }
}
