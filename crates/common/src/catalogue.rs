//! The ordered catalogue collection

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{CatalogueItem, ItemKind};

/// All catalogue items, in document order
#[derive(Debug, Clone)]
pub struct Catalogue {
    items: Vec<CatalogueItem>,
    index: HashMap<String, usize>,
    /// The document the items were parsed from, byte for byte
    document: Vec<u8>,
}

impl Catalogue {
    /// Build a catalogue, rejecting duplicate ids
    pub fn new(items: Vec<CatalogueItem>) -> Result<Self> {
        let document = serde_json::to_vec_pretty(&items)?;
        Self::indexed(items, document)
    }

    /// Parse the `catalog.json` document (a JSON array of items)
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let items: Vec<CatalogueItem> = serde_json::from_slice(bytes)?;
        Self::indexed(items, bytes.to_vec())
    }

    fn indexed(items: Vec<CatalogueItem>, document: Vec<u8>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), pos).is_some() {
                return Err(Error::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self {
            items,
            index,
            document,
        })
    }

    /// The source document, including keys the item model does not read
    pub fn document(&self) -> &[u8] {
        &self.document
    }

    pub fn items(&self) -> &[CatalogueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogueItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn count_kind(&self, kind: &ItemKind) -> usize {
        self.items
            .iter()
            .filter(|i| i.kind.as_ref() == Some(kind))
            .count()
    }

    pub fn datasets(&self) -> usize {
        self.count_kind(&ItemKind::Dataset)
    }

    pub fn models(&self) -> usize {
        self.count_kind(&ItemKind::Model)
    }

    /// Newest items by `date-added`; undated items sort last
    pub fn recently_added(&self, n: usize) -> Vec<&CatalogueItem> {
        let mut items: Vec<&CatalogueItem> = self.items.iter().collect();
        // stable sort keeps document order among ties
        items.sort_by(|a, b| match (a.date_added(), b.date_added()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        items.truncate(n);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> &'static str {
        r#"[
            { "id": "a", "type": "dataset", "name": "Alpha", "organization": { "name": "Org" }, "date-added": "2021-01-01" },
            { "id": "b", "type": "model", "name": "Beta", "organization": { "name": "Org" } },
            { "id": "c", "type": "dataset", "name": "Gamma", "organization": { "name": "Org" }, "date-added": "2023-05-02" },
            { "id": "d", "name": "Delta", "organization": { "name": "Org" }, "date-added": "2021-01-01" }
        ]"#
    }

    #[test]
    fn test_preserves_document_order() {
        let catalogue = Catalogue::from_json(doc().as_bytes()).unwrap();
        let ids: Vec<&str> = catalogue.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(catalogue.len(), 4);
    }

    #[test]
    fn test_lookup_by_id() {
        let catalogue = Catalogue::from_json(doc().as_bytes()).unwrap();
        assert_eq!(catalogue.get("c").map(|i| i.name.as_str()), Some("Gamma"));
        assert!(catalogue.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            { "id": "a", "name": "One", "organization": { "name": "Org" } },
            { "id": "a", "name": "Two", "organization": { "name": "Org" } }
        ]"#;
        let err = Catalogue::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_kind_counts() {
        let catalogue = Catalogue::from_json(doc().as_bytes()).unwrap();
        assert_eq!(catalogue.datasets(), 2);
        assert_eq!(catalogue.models(), 1);
    }

    #[test]
    fn test_recently_added_orders_by_date() {
        let catalogue = Catalogue::from_json(doc().as_bytes()).unwrap();
        let ids: Vec<&str> = catalogue
            .recently_added(10)
            .into_iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "d", "b"]);
        assert_eq!(catalogue.recently_added(1).len(), 1);
    }

    #[test]
    fn test_document_is_kept_verbatim() {
        let json = r#"[{"id":"a","name":"Alpha","organization":{"name":"Org"},"license":"CC-BY-4.0","tags":["poverty"],"score":1.50}]"#;
        let catalogue = Catalogue::from_json(json.as_bytes()).unwrap();
        assert_eq!(catalogue.document(), json.as_bytes());
    }

    #[test]
    fn test_built_catalogue_has_parseable_document() {
        let catalogue = Catalogue::from_json(doc().as_bytes()).unwrap();
        let built = Catalogue::new(catalogue.items().to_vec()).unwrap();
        let again = Catalogue::from_json(built.document()).unwrap();
        assert_eq!(again.items(), catalogue.items());
    }

    #[test]
    fn test_unrecognised_type_still_loads() {
        let json = r#"[
            { "id": "a", "type": "dataset", "name": "Alpha", "organization": { "name": "Org" } },
            { "id": "n", "type": "notebook", "name": "Notebook", "organization": { "name": "Org" } },
            { "id": "m", "type": "Model", "name": "Capitalised", "organization": { "name": "Org" } }
        ]"#;
        let catalogue = Catalogue::from_json(json.as_bytes()).unwrap();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.datasets(), 1);
        assert_eq!(catalogue.models(), 1);
        assert_eq!(
            catalogue.get("n").and_then(|i| i.kind.clone()),
            Some(ItemKind::Other("notebook".to_string()))
        );
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            Catalogue::from_json(b"{\"not\": \"an array\"}"),
            Err(Error::Json(_))
        ));
    }
}
