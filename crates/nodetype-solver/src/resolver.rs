//! Aggregate resolution on top of the effective node type cache.
//!
//! `NodeTypeResolver::resolve` turns a set of node type names into one
//! effective node type:
//!
//! 1. An exact cache hit is returned as is.
//! 2. Otherwise the largest cached subset of the remaining names is folded
//!    in, the intermediate aggregate cached, and its names subtracted, until
//!    nothing is left or no cached subset applies.
//! 3. Names without a cached subset are built from their declarations in
//!    ascending name order. A declaration's supertypes are resolved as one
//!    aggregate through the same procedure and merged in as supertypes.
//!
//! Every intermediate aggregate is cached under its merged types, and the
//! final result additionally under the requested key.
//!
//! Before anything is built, the supertype graph of the request is walked
//! from the declarations, so cycles and chains longer than
//! `MAX_SUPERTYPE_DEPTH` fail the same way whatever is already cached.
//!
//! Reads go through a shared lock and only take the exclusive lock on a
//! miss. Registry changes are reported through [`NodeTypeResolver::invalidate`].

use crate::bitkey::BitKey;
use crate::cache::EffectiveNodeTypeCache;
use crate::effective::EffectiveNodeType;
use crate::error::{ConstraintViolation, NodeTypeError};
use crate::merge::MergeKind;
use crate::provider::{DeclarationSource, ResolvingDefinitionProvider};
use crate::query_trace;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use nodetype_common::Name;
use nodetype_common::limits::MAX_SUPERTYPE_DEPTH;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

pub struct NodeTypeResolver<S> {
    source: S,
    cache: RwLock<EffectiveNodeTypeCache>,
}

impl<S: DeclarationSource> NodeTypeResolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_cache(source, EffectiveNodeTypeCache::new())
    }

    /// Start from an existing cache, e.g. a snapshot of another resolver.
    pub fn with_cache(source: S, cache: EffectiveNodeTypeCache) -> Self {
        Self {
            source,
            cache: RwLock::new(cache),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve the effective node type of a single node type.
    pub fn resolve_one(&self, name: &Name) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        self.resolve(std::slice::from_ref(name))
    }

    /// Resolve the effective node type of a primary type and its mixins.
    pub fn resolve_with_mixins(
        &self,
        primary: &Name,
        mixins: &[Name],
    ) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        let mut names = Vec::with_capacity(mixins.len() + 1);
        names.push(primary.clone());
        names.extend(mixins.iter().cloned());
        self.resolve(&names)
    }

    /// Resolve the effective node type of the aggregate of `names`.
    ///
    /// Order and duplicates in `names` do not matter.
    pub fn resolve(&self, names: &[Name]) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        let query_id = query_trace::enabled().then(query_trace::next_query_id);
        if let Some(id) = query_id {
            query_trace::resolve_start(id, "resolve", names.len());
        }

        let result = self.resolve_traced(names);

        if let Some(id) = query_id {
            match &result {
                Ok((ent, cache_hit)) => {
                    query_trace::resolve_end(id, "resolve", ent.all_types().len(), *cache_hit)
                }
                Err(err) => query_trace::resolve_failed(id, "resolve", err),
            }
        }
        result.map(|(ent, _)| ent)
    }

    fn resolve_traced(
        &self,
        names: &[Name],
    ) -> Result<(Arc<EffectiveNodeType>, bool), NodeTypeError> {
        if names.is_empty() {
            return Err(NodeTypeError::InvalidArgument(
                "at least one node type name is required".to_string(),
            ));
        }
        if names.iter().any(Name::is_empty) {
            return Err(NodeTypeError::InvalidArgument(
                "node type names must not be empty".to_string(),
            ));
        }

        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            let key = cache.key_for(names);
            if let Some(ent) = cache.get(&key) {
                trace!(key = %key, "NodeTypeResolver::resolve - hit");
                return Ok((ent, true));
            }
        }

        if let Some(unknown) = names.iter().find(|name| !self.source.is_registered(name)) {
            return Err(NodeTypeError::NoSuchNodeType(unknown.clone()));
        }
        self.check_inheritance(names)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeResolution);
        let ent = self.resolve_in(&mut cache, names, &mut guard)?;
        Ok((ent, false))
    }

    fn resolve_in(
        &self,
        cache: &mut EffectiveNodeTypeCache,
        names: &[Name],
        guard: &mut RecursionGuard<Name>,
    ) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        let key = cache.key_for(names);
        if let Some(ent) = cache.get(&key) {
            return Ok(ent);
        }
        debug!(key = %key, "NodeTypeResolver::resolve - miss");

        let mut result: Option<Arc<EffectiveNodeType>> = None;
        let mut remaining = key.clone();
        while !remaining.is_empty() {
            let best = cache
                .find_best(&remaining)
                .and_then(|best| cache.get(&best).map(|ent| (best, ent)));
            match best {
                Some((best, ent)) => {
                    trace!(
                        best = %best,
                        remaining = %remaining,
                        "NodeTypeResolver::resolve - subset"
                    );
                    result = Some(fold(cache, result, &ent)?);
                    remaining = remaining.subtract(&best);
                }
                None => {
                    for name in remaining.names().to_vec() {
                        // Building an earlier name may have cached a later one as a supertype.
                        let single = cache.key_for(std::slice::from_ref(&name));
                        let ent = match cache.get(&single) {
                            Some(ent) => ent,
                            None => self.build_declared(cache, &name, guard)?,
                        };
                        result = Some(fold(cache, result, &ent)?);
                    }
                    break;
                }
            }
        }

        let Some(result) = result else {
            return Err(NodeTypeError::InvalidArgument(
                "at least one node type name is required".to_string(),
            ));
        };
        cache.put(key, result.clone());
        cache.put_effective(result.clone());
        Ok(result)
    }

    /// Reject requests whose supertype graph is cyclic or too deep.
    ///
    /// Reads only the declarations. Requested names are checked in ascending
    /// order; a chain that is too deep is reported against the requested name.
    fn check_inheritance(&self, names: &[Name]) -> Result<(), NodeTypeError> {
        let mut requested: Vec<&Name> = names.iter().collect();
        requested.sort_unstable();
        requested.dedup();

        let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeResolution);
        let mut heights = FxHashMap::default();
        for name in requested {
            let height = self.chain_height(name, name, &mut heights, &mut guard)?;
            if height > MAX_SUPERTYPE_DEPTH {
                debug!(name = %name, height, "supertype chain too deep");
                return Err(ConstraintViolation::InheritanceTooDeep { name: name.clone() }.into());
            }
        }
        Ok(())
    }

    /// Number of declarations on the longest supertype chain starting at `name`.
    fn chain_height(
        &self,
        requested: &Name,
        name: &Name,
        heights: &mut FxHashMap<Name, u32>,
        guard: &mut RecursionGuard<Name>,
    ) -> Result<u32, NodeTypeError> {
        if let Some(&height) = heights.get(name) {
            return Ok(height);
        }
        match guard.enter(name.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                debug!(name = %name, "supertype cycle");
                return Err(ConstraintViolation::InheritanceCycle { name: name.clone() }.into());
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(name = %requested, depth = guard.depth(), "supertype chain too deep");
                return Err(ConstraintViolation::InheritanceTooDeep {
                    name: requested.clone(),
                }
                .into());
            }
        }

        let result = self.supertype_height(requested, name, heights, guard);
        guard.leave(name);
        let height = result? + 1;
        heights.insert(name.clone(), height);
        Ok(height)
    }

    fn supertype_height(
        &self,
        requested: &Name,
        name: &Name,
        heights: &mut FxHashMap<Name, u32>,
        guard: &mut RecursionGuard<Name>,
    ) -> Result<u32, NodeTypeError> {
        let decl = self
            .source
            .declaration(name)
            .ok_or_else(|| NodeTypeError::NoSuchNodeType(name.clone()))?;
        let mut height = 0;
        for supertype in &decl.supertypes {
            height = height.max(self.chain_height(requested, supertype, heights, guard)?);
        }
        Ok(height)
    }

    /// Build and cache the effective type of one declaration and its supertypes.
    ///
    /// The guard here only backs up `check_inheritance` against declarations
    /// replaced concurrently.
    fn build_declared(
        &self,
        cache: &mut EffectiveNodeTypeCache,
        name: &Name,
        guard: &mut RecursionGuard<Name>,
    ) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        match guard.enter(name.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                debug!(name = %name, "supertype cycle");
                return Err(ConstraintViolation::InheritanceCycle { name: name.clone() }.into());
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(name = %name, depth = guard.depth(), "supertype chain too deep");
                return Err(ConstraintViolation::InheritanceTooDeep { name: name.clone() }.into());
            }
        }

        let result = self.build_declared_inner(cache, name, guard);
        guard.leave(name);
        result
    }

    fn build_declared_inner(
        &self,
        cache: &mut EffectiveNodeTypeCache,
        name: &Name,
        guard: &mut RecursionGuard<Name>,
    ) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
        let decl = self
            .source
            .declaration(name)
            .ok_or_else(|| NodeTypeError::NoSuchNodeType(name.clone()))?;

        let mut ent = EffectiveNodeType::from_declaration(&decl)?;
        if !decl.supertypes.is_empty() {
            let base = self.resolve_in(cache, &decl.supertypes, guard)?;
            ent = ent.merged(&base, MergeKind::Supertype)?;
        }

        let ent = Arc::new(ent);
        cache.put_effective(ent.clone());
        Ok(ent)
    }

    /// Definition provider resolving explicit child node types through `self`.
    pub fn definition_provider(&self) -> ResolvingDefinitionProvider<'_, S> {
        ResolvingDefinitionProvider::new(self)
    }

    /// Evict every cached aggregate that includes `name`.
    ///
    /// Must be called after `name` is registered, re-registered or
    /// unregistered in the declaration source.
    pub fn invalidate(&self, name: &Name) -> usize {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .invalidate(name)
    }

    /// Drop all cached aggregates and bit assignments.
    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// An independent copy of the current cache.
    pub fn snapshot(&self) -> EffectiveNodeTypeCache {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Cached keys in index order.
    pub fn cached_keys(&self) -> Vec<BitKey> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dump(out)
    }
}

/// Merge `ent` into the running aggregate, caching the intermediate result.
fn fold(
    cache: &mut EffectiveNodeTypeCache,
    acc: Option<Arc<EffectiveNodeType>>,
    ent: &Arc<EffectiveNodeType>,
) -> Result<Arc<EffectiveNodeType>, NodeTypeError> {
    let Some(acc) = acc else {
        return Ok(ent.clone());
    };
    let merged = Arc::new(acc.merge(ent)?);
    cache.put_effective(merged.clone());
    Ok(merged)
}

impl<S> fmt::Debug for NodeTypeResolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
