use super::*;
use nodetype_common::NodeTypeDefinition;

fn name(s: &str) -> Name {
    Name::new(s)
}

fn names(list: &[&str]) -> Vec<Name> {
    list.iter().map(|s| name(s)).collect()
}

/// Aggregate of empty declarations, one per name.
fn aggregate(list: &[&str]) -> Arc<EffectiveNodeType> {
    let mut iter = list.iter();
    let first = iter.next().expect("at least one name");
    let mut ent = EffectiveNodeType::from_declaration(&NodeTypeDefinition::new(name(first)))
        .expect("valid declaration");
    for n in iter {
        let other = EffectiveNodeType::from_declaration(&NodeTypeDefinition::new(name(n)))
            .expect("valid declaration");
        ent = ent.merge(&other).expect("no conflict");
    }
    Arc::new(ent)
}

fn cache_with(sets: &[&[&str]]) -> EffectiveNodeTypeCache {
    let mut cache = EffectiveNodeTypeCache::new();
    for set in sets {
        cache.put_effective(aggregate(set));
    }
    cache
}

#[test]
fn test_put_get_round_trip() {
    let mut cache = EffectiveNodeTypeCache::new();
    let ent = aggregate(&["a", "b"]);
    let key = cache.key_for(&names(&["b", "a"]));

    cache.put(key.clone(), ent.clone());

    assert!(cache.contains(&key));
    let got = cache.get(&key).expect("cached");
    assert!(Arc::ptr_eq(&got, &ent));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_put_replaces_existing_entry() {
    let mut cache = EffectiveNodeTypeCache::new();
    let key = cache.key_for(&names(&["a"]));
    cache.put(key.clone(), aggregate(&["a"]));
    let replacement = aggregate(&["a"]);
    cache.put(key.clone(), replacement.clone());

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.keys().count(), 1);
    assert!(Arc::ptr_eq(&cache.get(&key).expect("cached"), &replacement));
}

#[test]
fn test_put_effective_uses_merged_types() {
    let mut cache = EffectiveNodeTypeCache::new();
    let key = cache.put_effective(aggregate(&["x", "y"]));
    assert_eq!(key, cache.key_for(&names(&["y", "x"])));
    assert!(cache.contains(&key));
}

#[test]
fn test_find_best_prefers_largest_subset() {
    let cache = cache_with(&[&["a"], &["a", "b"], &["a", "b", "c"]]);

    let request = cache.key_for(&names(&["a", "b", "c", "d"]));
    let best = cache.find_best(&request).expect("a subset is cached");
    assert_eq!(best, cache.key_for(&names(&["a", "b", "c"])));

    let request = cache.key_for(&names(&["a", "b", "d"]));
    assert_eq!(
        cache.find_best(&request),
        Some(cache.key_for(&names(&["a", "b"])))
    );

    let request = cache.key_for(&names(&["d"]));
    assert_eq!(cache.find_best(&request), None);
}

#[test]
fn test_find_best_returns_exact_hit() {
    let cache = cache_with(&[&["a"], &["a", "b"]]);
    let request = cache.key_for(&names(&["b", "a"]));
    assert_eq!(cache.find_best(&request), Some(request));
}

#[test]
fn test_find_best_on_empty_cache() {
    let cache = EffectiveNodeTypeCache::new();
    let request = cache.key_for(&names(&["a"]));
    assert_eq!(cache.find_best(&request), None);
}

#[test]
fn test_invalidate_evicts_every_aggregate_including_name() {
    let mut cache = cache_with(&[&["a"], &["a", "b"], &["b", "c"], &["c"]]);

    let evicted = cache.invalidate(&name("b"));

    assert_eq!(evicted, 2);
    assert_eq!(cache.len(), 2);
    assert!(cache.contains(&cache.key_for(&names(&["a"]))));
    assert!(cache.contains(&cache.key_for(&names(&["c"]))));
    assert!(!cache.contains(&cache.key_for(&names(&["a", "b"]))));
    assert_eq!(cache.keys().count(), 2);
    for key in cache.keys() {
        assert!(!key.includes(&name("b")));
    }
}

#[test]
fn test_invalidate_matches_inherited_types() {
    let mut cache = EffectiveNodeTypeCache::new();
    let base = aggregate(&["test:base"]);
    let child = EffectiveNodeType::from_declaration(&NodeTypeDefinition::new(name("test:child")))
        .expect("valid declaration")
        .merged(&base, crate::merge::MergeKind::Supertype)
        .expect("no conflict");
    // Cached under {test:child} only; the inherited type is not part of the key.
    let key = cache.put_effective(Arc::new(child));

    assert_eq!(cache.invalidate(&name("test:base")), 1);
    assert!(!cache.contains(&key));
}

#[test]
fn test_invalidate_unknown_name_is_noop() {
    let mut cache = cache_with(&[&["a"]]);
    assert_eq!(cache.invalidate(&name("zzz")), 0);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_remove() {
    let mut cache = cache_with(&[&["a"], &["b"]]);
    let key = cache.key_for(&names(&["a"]));

    assert!(cache.remove(&key).is_some());
    assert!(cache.remove(&key).is_none());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.keys().count(), 1);
}

#[test]
fn test_keys_in_index_order() {
    let cache = cache_with(&[&["a"], &["a", "b"], &["b"]]);
    let cardinalities: Vec<usize> = cache.keys().map(BitKey::len).collect();
    assert_eq!(cardinalities, vec![2, 1, 1]);
}

#[test]
fn test_clone_is_independent() {
    let mut original = cache_with(&[&["a"]]);
    let copy = original.clone();

    original.put_effective(aggregate(&["b"]));
    original.invalidate(&name("a"));

    assert_eq!(copy.len(), 1);
    assert!(copy.contains(&copy.key_for(&names(&["a"]))));
    assert!(copy.name_index().lookup(&name("b")).is_none());
}

#[test]
fn test_clear() {
    let mut cache = cache_with(&[&["a"], &["a", "b"]]);
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.keys().count(), 0);
    assert!(cache.name_index().is_empty());
}

#[test]
fn test_dump_lists_keys_with_bits() {
    let cache = cache_with(&[&["nt:base"], &["nt:base", "mix:title"]]);
    let dump = cache.dump_to_string();

    assert!(dump.starts_with("EffectiveNodeTypeCache (2 entries)"));
    assert!(dump.contains("w=2, 0=nt:base, 1=mix:title"), "{dump}");
    assert!(dump.contains("w=1, 0=nt:base"), "{dump}");
}
