//! JSON codec backed by serde_json.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{Codec, CodecError, CodecResult};

/// Encodes values as self-describing JSON.
///
/// The pretty form puts one field per line, which keeps diffs of stored
/// records readable in the Git store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// compact JSON
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode<V: Serialize + ?Sized>(&self, value: &V) -> CodecResult<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        bytes.map_err(CodecError::encode)
    }

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<V> {
        serde_json::from_slice(bytes).map_err(CodecError::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Actor {
        name: String,
    }

    #[test]
    fn test_roundtrip_struct() {
        let codec = JsonCodec::new();
        let actor = Actor {
            name: "Steve Buscemi".to_string(),
        };

        let bytes = codec.encode(&actor).unwrap();
        let restored: Actor = codec.decode(&bytes).unwrap();
        assert_eq!(restored, actor);
    }

    #[test]
    fn test_roundtrip_pretty() {
        let codec = JsonCodec::pretty();
        let values = vec![1u32, 2, 3];

        let bytes = codec.encode(&values).unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains('\n'));

        let restored: Vec<u32> = codec.decode(&bytes).unwrap();
        assert_eq!(restored, values);
    }

    #[test]
    fn test_compact_format() {
        let bytes = JsonCodec::new()
            .encode(&Actor {
                name: "Willem Dafoe".to_string(),
            })
            .unwrap();
        assert_eq!(bytes, br#"{"name":"Willem Dafoe"}"#.to_vec());
    }

    #[test]
    fn test_decode_malformed() {
        let result: CodecResult<Actor> = JsonCodec::new().decode(b"not json");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decode_incompatible_type() {
        let result: CodecResult<Actor> = JsonCodec::new().decode(b"[1, 2, 3]");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_encode_non_string_map_key() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8, 2], 1u32);

        let result = JsonCodec::new().encode(&map);
        assert!(matches!(result, Err(CodecError::Encode(_))));
    }
}
