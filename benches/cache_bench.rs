//! Effective node type cache benchmarks.
//!
//! Measures subset lookup on a populated cache and cold versus warm
//! resolution of aggregates through the resolver.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nodetype::solver::{
    DeclarationStore, EffectiveNodeType, EffectiveNodeTypeCache, NodeTypeResolver,
};
use nodetype::{Name, NodeTypeDefinition, PropertyType};
use std::sync::Arc;

fn name(s: &str) -> Name {
    Name::new(s)
}

/// `mixins` mixin types `mix:m<i>` plus primary types `nt:t<i>` inheriting from `nt:base`.
fn declarations(types: usize, mixins: usize) -> DeclarationStore {
    let store = DeclarationStore::new();
    store.register(
        NodeTypeDefinition::new(name("nt:base"))
            .with_property(name("jcr:primaryType"), PropertyType::Name),
    );
    for i in 0..types {
        store.register(
            NodeTypeDefinition::new(name(&format!("nt:t{i}")))
                .with_supertypes(vec![name("nt:base")])
                .with_property(name(&format!("t{i}:p")), PropertyType::String),
        );
    }
    for i in 0..mixins {
        store.register(
            NodeTypeDefinition::new(name(&format!("mix:m{i}")))
                .mixin()
                .with_property(name(&format!("m{i}:p")), PropertyType::Long),
        );
    }
    store
}

fn request(primary: usize, mixins: usize) -> Vec<Name> {
    let mut names = vec![name(&format!("nt:t{primary}"))];
    names.extend((0..mixins).map(|i| name(&format!("mix:m{i}"))));
    names
}

fn bench_find_best(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_best");

    for entries in [16usize, 128, 1024] {
        let mut cache = EffectiveNodeTypeCache::new();
        for i in 0..entries {
            let names: Vec<Name> = (0..=(i % 6))
                .map(|j| name(&format!("t{}", (i + j) % 64)))
                .collect();
            let mut iter = names.iter();
            let Some(first) = iter.next() else { continue };
            let mut ent =
                EffectiveNodeType::from_declaration(&NodeTypeDefinition::new(first.clone()))
                    .expect("valid declaration");
            for n in iter {
                let other =
                    EffectiveNodeType::from_declaration(&NodeTypeDefinition::new(n.clone()))
                        .expect("valid declaration");
                ent = ent.merge(&other).expect("no conflict");
            }
            cache.put_effective(Arc::new(ent));
        }
        let lookup: Vec<Name> = (0..12).map(|j| name(&format!("t{}", j * 5))).collect();
        let key = cache.key_for(&lookup);

        group.bench_with_input(BenchmarkId::from_parameter(entries), &key, |b, key| {
            b.iter(|| black_box(cache.find_best(black_box(key))))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for mixins in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("cold", mixins), &mixins, |b, &mixins| {
            b.iter(|| {
                let resolver = NodeTypeResolver::new(declarations(8, 8));
                black_box(resolver.resolve(&request(3, mixins)).expect("resolves"))
            })
        });

        let resolver = NodeTypeResolver::new(declarations(8, 8));
        let names = request(3, mixins);
        resolver.resolve(&names).expect("resolves");
        group.bench_with_input(BenchmarkId::new("warm", mixins), &names, |b, names| {
            b.iter(|| black_box(resolver.resolve(black_box(names)).expect("resolves")))
        });

        // Every primary type shares the cached mixin aggregate.
        group.bench_with_input(BenchmarkId::new("incremental", mixins), &mixins, |b, &mixins| {
            let resolver = NodeTypeResolver::new(declarations(8, 8));
            resolver.resolve(&request(0, mixins)[1..]).expect("resolves");
            b.iter(|| {
                for primary in 0..8 {
                    black_box(resolver.resolve(&request(primary, mixins)).expect("resolves"));
                }
                resolver.invalidate(&name("nt:base"));
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find_best, bench_resolve);
criterion_main!(benches);
