use super::*;
use crate::name_index::NameIndex;

fn names(list: &[&str]) -> Vec<Name> {
    list.iter().map(|s| Name::new(*s)).collect()
}

fn key(index: &NameIndex, list: &[&str]) -> BitKey {
    index.key_for(&names(list))
}

#[test]
fn test_contains_is_reflexive() {
    let index = NameIndex::new();
    for set in [&["a"][..], &["a", "b"], &["a", "b", "c", "d"]] {
        let k = key(&index, set);
        assert!(k.contains(&k), "{k} must contain itself");
    }
}

#[test]
fn test_contains_is_monotonic() {
    let index = NameIndex::new();
    let a = key(&index, &["a"]);
    let ab = key(&index, &["a", "b"]);
    let abc = key(&index, &["a", "b", "c"]);
    let d = key(&index, &["d"]);

    assert!(abc.contains(&ab));
    assert!(abc.contains(&a));
    assert!(ab.contains(&a));
    assert!(!a.contains(&ab));
    assert!(!abc.contains(&d));
}

#[test]
fn test_subtract_is_set_difference() {
    let index = NameIndex::new();
    let abcd = key(&index, &["a", "b", "c", "d"]);
    let bd = key(&index, &["b", "d"]);

    let diff = abcd.subtract(&bd);
    assert_eq!(diff, key(&index, &["a", "c"]));
    assert_eq!(diff.names(), names(&["a", "c"]).as_slice());
    assert_eq!(diff.len(), 2);

    let empty = bd.subtract(&abcd);
    assert!(empty.is_empty());
    assert!(empty.names().is_empty());
}

#[test]
fn test_equality_ignores_trailing_zero_words() {
    let index = NameIndex::new();
    let early = key(&index, &["a"]);
    // Register enough names to make later keys allocate a second word.
    let many: Vec<String> = (0..80).map(|i| format!("n{i}")).collect();
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    key(&index, &many);
    let late = key(&index, &["a"]);

    assert_eq!(early, late);

    use std::collections::hash_map::DefaultHasher;
    let hash = |k: &BitKey| {
        let mut h = DefaultHasher::new();
        k.hash(&mut h);
        h.finish()
    };
    assert_eq!(hash(&early), hash(&late));
    assert_eq!(early.cmp(&late), Ordering::Equal);
}

#[test]
fn test_order_by_cardinality_then_bits() {
    let index = NameIndex::new();
    let a = key(&index, &["a"]); // bit 0
    let b = key(&index, &["b"]); // bit 1
    let ab = key(&index, &["a", "b"]);

    assert!(ab < a, "larger sets sort first");
    assert!(b < a, "higher bits sort first at equal cardinality");

    let mut sorted = vec![a.clone(), ab.clone(), b.clone()];
    sorted.sort();
    assert_eq!(sorted, vec![ab, b, a]);
}

#[test]
fn test_includes_and_bits() {
    let index = NameIndex::new();
    let k = key(&index, &["x", "y", "z"]);
    assert!(k.includes(&Name::new("y")));
    assert!(!k.includes(&Name::new("w")));
    assert_eq!(k.bits().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_display() {
    let index = NameIndex::new();
    let k = key(&index, &["nt:folder", "mix:title"]);
    assert_eq!(k.to_string(), "w=2, mix:title, nt:folder");
}
