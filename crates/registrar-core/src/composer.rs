//! Merging validated entities into one flat mapping.

use crate::value::{Entity, Value};

/// Merges entities in order.
///
/// A key present in several entities takes the value of the last one; its
/// position is fixed by the first.
///
/// ```
/// use registrar_core::{compose, Entity};
///
/// let merged = compose([
///     Entity::new().with("a", 1).with("b", 2),
///     Entity::new().with("b", 3).with("c", 4),
/// ]);
/// assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
/// assert_eq!(merged.get_i64("b"), Some(3));
/// ```
#[must_use]
pub fn compose<I>(entities: I) -> Entity
where
    I: IntoIterator<Item = Entity>,
{
    let mut merged = Entity::new();
    for entity in entities {
        for (name, value) in entity {
            merged.insert(name, value);
        }
    }
    merged
}

/// Replaces each named nested-object field with that object's own fields.
///
/// Names that are absent or not objects are skipped. Other fields are kept
/// ahead of the flattened ones.
#[must_use]
pub fn flatten(entity: &Entity, nested: &[&str]) -> Entity {
    let top: Entity = entity
        .iter()
        .filter(|(name, value)| !(nested.contains(name) && value.as_object().is_some()))
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

    let parts = nested
        .iter()
        .filter_map(|name| entity.get(name).and_then(Value::as_object).cloned());

    compose(std::iter::once(top).chain(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_later_overrides_earlier() {
        let merged = compose([
            Entity::new().with("city", "Lima").with("age", 1),
            Entity::new().with("age", 2),
            Entity::new().with("age", 3),
        ]);
        assert_eq!(merged.get_i64("age"), Some(3));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(compose(Vec::<Entity>::new()).is_empty());
    }

    #[test]
    fn test_flatten() {
        let update = Entity::new()
            .with("person_id", 3)
            .with(
                "person",
                Entity::new().with("first_name", "Miguel").with("age", 25),
            )
            .with(
                "location",
                Entity::new().with("city", "Lima").with("country", "Peru"),
            );

        let flat = flatten(&update, &["person", "location"]);
        assert_eq!(
            flat.keys().collect::<Vec<_>>(),
            vec!["person_id", "first_name", "age", "city", "country"]
        );
    }

    #[test]
    fn test_flatten_skips_non_objects() {
        let entity = Entity::new().with("person", "scalar");
        let flat = flatten(&entity, &["person", "missing"]);
        assert_eq!(flat.get_str("person"), Some("scalar"));
        assert_eq!(flat.len(), 1);
    }

    fn entity_strategy() -> impl Strategy<Value = Entity> {
        proptest::collection::vec(("[a-e]", any::<i32>()), 0..6)
            .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }

    proptest! {
        #[test]
        fn composed_keys_come_from_sources(
            entities in proptest::collection::vec(entity_strategy(), 0..5)
        ) {
            let merged = compose(entities.clone());
            for key in merged.keys() {
                prop_assert!(entities.iter().any(|e| e.contains_key(key)));
            }
            for entity in &entities {
                for key in entity.keys() {
                    prop_assert!(merged.contains_key(key));
                }
            }
            if let Some(last) = entities.iter().rev().find(|e| !e.is_empty()) {
                for (key, value) in last.iter() {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
