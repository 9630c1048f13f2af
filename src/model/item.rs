//! The generic item envelope.

use serde::{Deserialize, Serialize};

use crate::model::types::Identifier;

/// An identifier paired with an arbitrary payload value.
///
/// Callers build and own items. A repository only reads them: `update`
/// replaces the stored record wholesale with `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<V> {
    pub id: Identifier,
    pub value: V,
}

impl<V> Item<V> {
    pub fn new(id: Identifier, value: V) -> Self {
        Self { id, value }
    }

    /// replace the payload, keeping the identifier
    pub fn with_value(self, value: V) -> Self {
        Self { id: self.id, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_value_keeps_identifier() {
        let id = Identifier::new("Actor ID").unwrap();
        let item = Item::new(id.clone(), "Steve Buscemi");
        let replaced = item.with_value("Willem Dafoe");

        assert_eq!(replaced.id, id);
        assert_eq!(replaced.value, "Willem Dafoe");
    }

    #[test]
    fn test_item_json_shape() {
        let item = Item::new(Identifier::new("7").unwrap(), 42u32);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json, serde_json::json!({"id": "7", "value": 42}));
    }
}
