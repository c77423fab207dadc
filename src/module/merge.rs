//! Descriptor merge rules.
//!
//! - collections: concatenate, dropping entries already present (identity),
//!   first occurrence keeps its position
//! - objects: merged key by key, recursively
//! - scalars: the incoming value wins when it is set (not null, not an empty
//!   string, `true` for the `global` flag)

use serde_json::{Map, Value};
use std::sync::Arc;

use super::descriptor::{FeatureDescriptor, Provider};

/// Merge `incoming` into `acc`.
pub fn merge(mut acc: FeatureDescriptor, incoming: &FeatureDescriptor) -> FeatureDescriptor {
    union_by(&mut acc.imports, &incoming.imports, |a, b| a == b);
    union_by(&mut acc.providers, &incoming.providers, Provider::same);
    union_by(&mut acc.exports, &incoming.exports, Provider::same);
    union_by(&mut acc.commands, &incoming.commands, |a, b| Arc::ptr_eq(a, b));
    merge_map(&mut acc.options, &incoming.options);
    acc.global |= incoming.global;
    acc
}

/// Left fold of [`merge`] starting from an empty descriptor.
pub fn merge_all<'a, I>(descriptors: I) -> FeatureDescriptor
where
    I: IntoIterator<Item = &'a FeatureDescriptor>,
{
    descriptors
        .into_iter()
        .fold(FeatureDescriptor::new(), |acc, next| merge(acc, next))
}

fn union_by<T: Clone>(acc: &mut Vec<T>, incoming: &[T], same: impl Fn(&T, &T) -> bool) {
    for item in incoming {
        if !acc.iter().any(|existing| same(existing, item)) {
            acc.push(item.clone());
        }
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn merge_map(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        if is_unset(value) {
            continue;
        }
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Deep merge of two JSON values using the descriptor rules.
pub fn merge_value(target: &mut Value, incoming: &Value) {
    if is_unset(incoming) {
        return;
    }
    match (target, incoming) {
        (Value::Object(t), Value::Object(i)) => merge_map(t, i),
        (Value::Array(t), Value::Array(i)) => union_by(t, i, |a, b| a == b),
        (t, i) => *t = i.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::descriptor::FeatureId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn descriptor(imports: &[&'static str], providers: &[&Provider]) -> FeatureDescriptor {
        let mut d = FeatureDescriptor::new();
        for i in imports {
            d = d.import(*i);
        }
        for p in providers {
            d = d.provide((*p).clone());
        }
        d
    }

    #[test]
    fn test_duplicate_provider_is_kept_once() {
        let p = Provider::value("p", 1_u32);
        let a = descriptor(&[], &[&p, &p]);
        let merged = merge_all([&a]);
        assert_eq!(merged.providers.len(), 1);
        assert!(merged.providers[0].same(&p));
    }

    #[test]
    fn test_equal_values_with_distinct_identity_are_both_kept() {
        let p1 = Provider::value("p", 1_u32);
        let p2 = Provider::value("p", 1_u32);
        let merged = merge_all([&descriptor(&[], &[&p1]), &descriptor(&[], &[&p2])]);
        assert_eq!(merged.providers.len(), 2);
    }

    #[test]
    fn test_first_occurrence_order_is_preserved() {
        let a = descriptor(&["user", "rbac"], &[]);
        let b = descriptor(&["content", "user"], &[]);
        let merged = merge_all([&a, &b]);
        assert_eq!(
            merged.imports,
            vec![
                FeatureId::from("user"),
                FeatureId::from("rbac"),
                FeatureId::from("content")
            ]
        );
    }

    #[test]
    fn test_merge_is_associative() {
        let p = Provider::value("p", 1_u32);
        let q = Provider::value("q", 2_u32);
        let r = Provider::value("r", 3_u32);
        let a = descriptor(&["x"], &[&p, &q]).option("limits", json!({"page": 10, "tags": ["a"]}));
        let b = descriptor(&["y", "x"], &[&q, &r]).option("limits", json!({"tags": ["b", "a"]}));
        let c = descriptor(&["z"], &[&p])
            .option("limits", json!({"page": 20}))
            .global();

        let stepwise = merge(merge_all([&a, &b]), &c);
        let all_at_once = merge_all([&a, &b, &c]);
        let right_first = merge(a.clone(), &merge(b.clone(), &c));

        assert_eq!(stepwise, all_at_once);
        assert_eq!(stepwise, right_first);
        assert_eq!(
            stepwise.options["limits"],
            json!({"page": 20, "tags": ["a", "b"]})
        );
        assert!(stepwise.global);
    }

    #[test]
    fn test_unset_scalars_do_not_override() {
        let a = FeatureDescriptor::new().option("name", json!("content"));
        let b = FeatureDescriptor::new()
            .option("name", json!(""))
            .option("other", Value::Null);
        let merged = merge_all([&a, &b]);
        assert_eq!(merged.options["name"], json!("content"));
        assert!(!merged.options.contains_key("other"));
    }

    #[test]
    fn test_set_scalars_override() {
        let a = FeatureDescriptor::new().option("mode", json!({"type": "markdown"}));
        let b = FeatureDescriptor::new().option("mode", json!({"type": "html"}));
        let merged = merge_all([&a, &b]);
        assert_eq!(merged.options["mode"], json!({"type": "html"}));
    }

    #[test]
    fn test_global_flag_is_sticky() {
        let a = FeatureDescriptor::new().global();
        let b = FeatureDescriptor::new();
        assert!(merge_all([&a, &b]).global);
    }
}
