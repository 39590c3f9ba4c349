//! Query, sort, and group primitives.
//!
//! Pure functions over the identity→entity map. They hold no state of
//! their own; the collection engine calls them to rebuild its ordered
//! view. Filtering and ordering use host-language closures - there is
//! no query DSL.

use crate::collection::UNGROUPED;
use crate::entity::{Entity, EntityId};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// All identities in data order (ascending identity, which equals
/// insertion order because identities are monotonic).
#[must_use]
pub fn all_ids(data: &BTreeMap<EntityId, Entity>) -> Vec<EntityId> {
    data.keys().copied().collect()
}

/// Identities of exactly the entities the predicate accepts, in data
/// order.
pub fn filter_ids(
    data: &BTreeMap<EntityId, Entity>,
    predicate: &dyn Fn(&Entity) -> bool,
) -> Vec<EntityId> {
    data.iter()
        .filter(|(_, entity)| predicate(entity))
        .map(|(&id, _)| id)
        .collect()
}

/// Orders identities by comparing the entities they resolve to.
///
/// Ties are left in implementation-defined order. Identities missing
/// from `data` compare equal; the engine's view never contains any.
pub fn sort_ids(
    data: &BTreeMap<EntityId, Entity>,
    ids: &mut [EntityId],
    comparator: &dyn Fn(&Entity, &Entity) -> Ordering,
) {
    ids.sort_by(|a, b| match (data.get(a), data.get(b)) {
        (Some(x), Some(y)) => comparator(x, y),
        _ => Ordering::Equal,
    });
}

/// Partitions all entities by the value at `field`.
///
/// Only scalar values usable directly as a mapping key (strings and
/// numbers) form real groups; entities missing the field or holding
/// any other value land in the reserved [`UNGROUPED`] bucket. The sum
/// of all group sizes always equals the number of entities.
#[must_use]
pub fn group_by<'a>(
    data: &'a BTreeMap<EntityId, Entity>,
    field: &str,
) -> BTreeMap<String, Vec<&'a Entity>> {
    let mut groups: BTreeMap<String, Vec<&Entity>> = BTreeMap::new();

    for entity in data.values() {
        let key = entity
            .get(field)
            .and_then(group_key)
            .unwrap_or_else(|| UNGROUPED.to_string());
        groups.entry(key).or_default().push(entity);
    }

    groups
}

/// Renders a field value as a group key.
///
/// Strings key by their content, numbers by their JSON text. Anything
/// else (booleans, null, arrays, objects) has no usable key.
#[must_use]
pub fn group_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_from(values: Vec<Value>) -> BTreeMap<EntityId, Entity> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let id = EntityId::new(i as u64 + 1);
                let mut entity = Entity::try_from(value).unwrap();
                entity.assign_id(id);
                (id, entity)
            })
            .collect()
    }

    #[test]
    fn all_ids_in_data_order() {
        let data = data_from(vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})]);
        assert_eq!(
            all_ids(&data),
            vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]
        );
    }

    #[test]
    fn filter_keeps_data_order() {
        let data = data_from(vec![
            json!({"n": 5}),
            json!({"n": 2}),
            json!({"n": 8}),
            json!({"n": 1}),
        ]);

        let ids = filter_ids(&data, &|e| {
            e.get("n").and_then(Value::as_i64).unwrap_or(0) >= 2
        });
        assert_eq!(
            ids,
            vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]
        );
    }

    #[test]
    fn sort_orders_adjacent_pairs() {
        let data = data_from(vec![json!({"n": 3}), json!({"n": 1}), json!({"n": 2})]);
        let mut ids = all_ids(&data);

        let by_n = |a: &Entity, b: &Entity| {
            let na = a.get("n").and_then(Value::as_i64).unwrap_or(0);
            let nb = b.get("n").and_then(Value::as_i64).unwrap_or(0);
            na.cmp(&nb)
        };
        sort_ids(&data, &mut ids, &by_n);

        assert_eq!(
            ids,
            vec![EntityId::new(2), EntityId::new(3), EntityId::new(1)]
        );
    }

    #[test]
    fn group_partitions_exactly() {
        let data = data_from(vec![
            json!({"kind": "a"}),
            json!({"kind": "b"}),
            json!({"kind": "a"}),
            json!({"other": 1}),
            json!({"kind": {"nested": true}}),
            json!({"kind": true}),
        ]);

        let groups = group_by(&data, "kind");
        assert_eq!(groups.get("a").map(Vec::len), Some(2));
        assert_eq!(groups.get("b").map(Vec::len), Some(1));
        assert_eq!(groups.get(UNGROUPED).map(Vec::len), Some(3));

        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn numbers_key_by_json_text() {
        assert_eq!(group_key(&json!(42)), Some("42".to_string()));
        assert_eq!(group_key(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(group_key(&json!("x")), Some("x".to_string()));
        assert_eq!(group_key(&json!(null)), None);
        assert_eq!(group_key(&json!([1])), None);
    }
}
