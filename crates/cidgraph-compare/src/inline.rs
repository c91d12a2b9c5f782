//! Pointer inlining: collapse a linked graph into one self-contained value.
//!
//! Unlike materialization, comparison needs complete graphs, so any fetch
//! failure here is fatal. A pointer whose target is already in the root's
//! visited set resolves to the cycle marker `{ "/": <cid> }` instead of
//! recursing — that covers true cycles and, by design, repeated occurrences
//! of a shared target within one root.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use cidgraph_resolver::{ResolveResult, Resolver};
use cidgraph_types::{cycle_marker, link_reference, ContentRef};

/// Fully inline the graph rooted at `root`.
pub async fn resolve_inline(resolver: &Resolver, root: &ContentRef) -> ResolveResult<Value> {
    let mut visited = HashSet::new();
    visited.insert(root.clone());
    let value = resolver.fetch(root).await?;
    inline_value(resolver, value, &mut visited).await
}

fn inline_value<'a>(
    resolver: &'a Resolver,
    value: Value,
    visited: &'a mut HashSet<ContentRef>,
) -> Pin<Box<dyn Future<Output = ResolveResult<Value>> + Send + 'a>> {
    Box::pin(async move {
        if let Some(reference) = link_reference(&value) {
            if visited.contains(&reference) {
                return Ok(cycle_marker(&reference));
            }
            visited.insert(reference.clone());
            let target = resolver.fetch(&reference).await?;
            return inline_value(resolver, target, &mut *visited).await;
        }

        match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (key, entry) in map {
                    out.insert(key, inline_value(resolver, entry, &mut *visited).await?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for entry in items {
                    out.push(inline_value(resolver, entry, &mut *visited).await?);
                }
                Ok(Value::Array(out))
            }
            other => Ok(other),
        }
    })
}
