//! Property and scenario tests for the diff engine.

#[cfg(test)]
mod tests {
    use crate::diff::{diff, diff_all};
    use crate::fieldpath::{ExcludeFilter, Path, PathElement};
    use crate::patch::{apply_overlay, encode, merge_patch, EMPTY_PATCH};
    use crate::value::{from_json_str, Map, TypedMap, Value};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            (-3i64..3).prop_map(Value::Int),
            "[a-c]{0,2}".prop_map(Value::String),
        ]
    }

    /// Leaves that encode to something other than a JSON object.
    fn arb_plain_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            4 => arb_scalar(),
            1 => prop::collection::vec(arb_scalar(), 0..3).prop_map(Value::List),
        ]
    }

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            5 => arb_plain_leaf(),
            1 => prop::collection::btree_map("[a-c]", "[a-c]", 0..3)
                .prop_map(|m| Value::TypedMap(m.into_iter().collect::<TypedMap>())),
        ]
    }

    fn nested<S>(leaf: S) -> impl Strategy<Value = Value>
    where
        S: Strategy<Value = Value> + 'static,
    {
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Map(m.into_iter().collect::<Map>()))
        })
    }

    fn doc_of<S>(value: S) -> impl Strategy<Value = Map>
    where
        S: Strategy<Value = Value>,
    {
        prop::collection::btree_map("[a-d]", value, 0..5)
            .prop_map(|m| m.into_iter().collect::<Map>())
    }

    fn arb_doc() -> impl Strategy<Value = Map> {
        doc_of(nested(arb_leaf()))
    }

    /// Documents without typed maps. A typed map is replaced whole in the
    /// overlay but merged key by key when applied, so applying does not
    /// reproduce it exactly.
    fn arb_generic_doc() -> impl Strategy<Value = Map> {
        doc_of(nested(arb_plain_leaf()))
    }

    /// Counts leaves, treating empty objects as leaves.
    fn leaf_count(m: &Map) -> usize {
        m.iter()
            .map(|(_, v)| match v {
                Value::Map(nested) if !nested.is_empty() => leaf_count(nested),
                _ => 1,
            })
            .sum()
    }

    /// Every object path in the document, shallow ones first.
    fn object_paths(m: &Map, prefix: &Path, out: &mut Vec<Path>) {
        for (key, value) in m.iter() {
            let path = prefix.with(PathElement::field_name(key.clone()));
            out.push(path.clone());
            if let Value::Map(nested) = value {
                object_paths(nested, &path, out);
            }
        }
    }

    fn contains_path(m: &Map, path: &Path) -> bool {
        let mut current = m;
        let elements = path.as_slice();
        for (i, element) in elements.iter().enumerate() {
            let Some(key) = element.as_field_name() else {
                return false;
            };
            match current.get(key) {
                None => return false,
                Some(_) if i + 1 == elements.len() => return true,
                Some(Value::Map(nested)) => current = nested,
                Some(_) => return false,
            }
        }
        false
    }

    /// True if every key of `overlay` appears in `desired` with the same value,
    /// or with an object that contains it.
    fn is_sub_document(overlay: &Map, desired: &Map) -> bool {
        overlay.iter().all(|(key, value)| match (value, desired.get(key)) {
            (Value::Map(o), Some(Value::Map(d))) => is_sub_document(o, d),
            (v, Some(d)) => v == d,
            (_, None) => false,
        })
    }

    proptest! {
        #[test]
        fn prop_diff_with_itself_is_empty(a in arb_doc()) {
            let overlay = diff_all(&a, &a).unwrap();
            prop_assert!(overlay.is_empty());
            prop_assert_eq!(encode(&overlay).unwrap(), EMPTY_PATCH.to_vec());
        }

        #[test]
        fn prop_overlay_is_additive(a in arb_doc(), b in arb_doc()) {
            let overlay = diff_all(&a, &b).unwrap();
            prop_assert!(is_sub_document(&overlay, &b));
            for (key, _) in a.iter() {
                if !b.has(key) {
                    prop_assert!(!overlay.has(key));
                }
            }
        }

        #[test]
        fn prop_apply_converges(a in arb_generic_doc(), b in arb_generic_doc()) {
            let overlay = diff_all(&a, &b).unwrap();
            let applied = apply_overlay(&a, &overlay, &Value::Map(a.clone())).unwrap();
            let applied = applied.as_map().unwrap();

            prop_assert!(diff_all(applied, &b).unwrap().is_empty());
            for (key, value) in a.iter() {
                if !b.has(key) {
                    prop_assert_eq!(applied.get(key), Some(value));
                }
            }
        }

        #[test]
        fn prop_apply_matches_wire_application(a in arb_doc(), b in arb_doc()) {
            let overlay = diff_all(&a, &b).unwrap();
            let target = Value::Map(a.clone());
            let applied = apply_overlay(&a, &overlay, &target).unwrap();

            let bytes = encode(&overlay).unwrap();
            let wire = from_json_str(std::str::from_utf8(&bytes).unwrap()).unwrap();
            prop_assert_eq!(applied, merge_patch(&target, &wire));
        }

        #[test]
        fn prop_empty_overlay_leaves_document_alone(a in arb_doc(), b in arb_doc()) {
            let overlay = diff_all(&a, &b).unwrap();
            if overlay.is_empty() {
                let applied = apply_overlay(&a, &overlay, &Value::Map(a.clone())).unwrap();
                prop_assert_eq!(applied, Value::Map(a));
            }
        }

        #[test]
        fn prop_exclusion_shrinks_overlay(
            a in arb_doc(),
            b in arb_doc(),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut paths = Vec::new();
            object_paths(&b, &Path::new(), &mut paths);
            prop_assume!(!paths.is_empty());
            let excluded = paths[pick.index(paths.len())].clone();

            let full = diff_all(&a, &b).unwrap();
            let filter = ExcludeFilter::from_paths([&excluded]);
            let filtered = diff(&a, &b, &filter).unwrap();

            prop_assert!(leaf_count(&filtered) <= leaf_count(&full));
            prop_assert!(!contains_path(&filtered, &excluded));
        }

        #[test]
        fn prop_encoding_is_deterministic(a in arb_doc(), b in arb_doc()) {
            let first = encode(&diff_all(&a, &b).unwrap()).unwrap();
            let second = encode(&diff_all(&a, &b).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_reordered_list_is_replaced_whole() {
        let observed = Map::new().with("slice", Value::List(vec!["D".into(), "C".into(), "B".into()]));
        let desired = Map::new().with("slice", Value::List(vec!["A".into(), "B".into(), "C".into()]));
        assert_eq!(diff_all(&observed, &desired).unwrap(), desired);

        let reordered = Map::new().with("slice", Value::List(vec!["C".into(), "B".into(), "D".into()]));
        assert_eq!(
            diff_all(&observed, &reordered).unwrap(),
            reordered
        );
    }

    #[test]
    fn test_typed_map_is_replaced_whole() {
        let observed_map: TypedMap = [("A", "A-changed"), ("B", "B")].into_iter().collect();
        let desired_map: TypedMap = [("A", "A"), ("C", "C")].into_iter().collect();
        let observed = Map::new().with("map", observed_map);
        let desired = Map::new().with("map", desired_map.clone());

        let overlay = diff_all(&observed, &desired).unwrap();
        assert_eq!(overlay.get("map"), Some(&Value::TypedMap(desired_map)));
    }

    #[test]
    fn test_generic_object_merges_per_key() {
        let observed = Map::new().with("map", Map::new().with("A", "A-changed").with("B", "B"));
        let desired = Map::new().with("map", Map::new().with("A", "A").with("C", "C"));

        let overlay = diff_all(&observed, &desired).unwrap();
        assert_eq!(overlay, desired);
        assert!(!overlay.get("map").unwrap().as_map().unwrap().has("B"));
    }

    #[test]
    fn test_desired_without_opinion() {
        let observed = Map::new().with("spec", Map::new().with("A", "A"));
        assert!(diff_all(&observed, &Map::new()).unwrap().is_empty());
    }

    #[test]
    fn test_new_nested_path() {
        let desired = Map::new().with(
            "spec",
            Map::new().with("template", Map::new().with("spec", Map::new().with("A", "A"))),
        );
        assert_eq!(diff_all(&Map::new(), &desired).unwrap(), desired);
    }

    #[test]
    fn test_excluded_difference_is_ignored() {
        let observed = Map::new()
            .with("status", Map::new().with("ready", false))
            .with("spec", Map::new().with("A", "A"));
        let desired = Map::new()
            .with("status", Map::new().with("ready", true))
            .with("spec", Map::new().with("A", "B"));

        let filter = ExcludeFilter::parse(["status"]).unwrap();
        assert_eq!(
            diff(&observed, &desired, &filter).unwrap(),
            Map::new().with("spec", Map::new().with("A", "B"))
        );
    }
}
