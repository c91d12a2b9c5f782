//! The recursive graph-to-files walker.
//!
//! One [`Materializer::reconstruct`] call owns its output directory: the
//! visited set and reference→path map are scoped to the run and never reused.
//! Resolution is depth-first and single-threaded — every fetch is awaited
//! before the next step — which keeps path assignment deterministic for a
//! given graph.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use serde_json::Value;
use tracing::{debug, warn};

use cidgraph_resolver::Resolver;
use cidgraph_types::{link_reference, path_link, ContentRef};

use crate::error::MaterializeResult;
use crate::labels::LabelTable;
use crate::MaterializeError;

/// Materializes content-addressed graphs into local file trees.
pub struct Materializer<'r> {
    resolver: &'r Resolver,
    labels: LabelTable,
}

/// How a node entered the traversal; decides its filename.
pub(crate) enum NodeRole {
    /// The root of a `reconstruct` run: named via label lookup, falling back
    /// to the reference itself.
    Root,
    /// A root with a caller-supplied name (transaction batches).
    Named(String),
    /// Discovered through a link field of its parent.
    Child { relationship: String, key: String },
}

/// Per-run traversal state. Never shared across runs.
#[derive(Default)]
pub(crate) struct RunState {
    /// Cycle guard: references already entered in this run.
    visited: HashSet<ContentRef>,
    /// Reference → relative output path, filled as nodes are written.
    paths: HashMap<ContentRef, String>,
    /// Filename → owning reference, for collision disambiguation.
    claimed: HashMap<String, ContentRef>,
}

impl RunState {
    /// Assign `stem.json` to `reference`, or a CID-suffixed variant if the
    /// name is already taken by a different reference. A reference keeps its
    /// first-assigned name for the remainder of the run.
    fn claim_filename(&mut self, stem: String, reference: &ContentRef) -> String {
        let candidate = format!("{stem}.json");
        let taken_by_other = self
            .claimed
            .get(&candidate)
            .is_some_and(|owner| owner != reference);
        let filename = if taken_by_other {
            format!("{stem}-{}.json", reference.short())
        } else {
            candidate
        };
        self.claimed.insert(filename.clone(), reference.clone());
        filename
    }
}

impl<'r> Materializer<'r> {
    pub fn new(resolver: &'r Resolver, labels: LabelTable) -> Self {
        Self { resolver, labels }
    }

    /// Materialize the graph rooted at `root` under `output_dir`.
    ///
    /// Creates `output_dir/<root-cid>/` and writes one JSON file per distinct
    /// reachable node, link fields rewritten to `{ "path": "./<file>" }`.
    /// A failed nested branch leaves a gap (missing file, unrewritten
    /// pointer); a failed root aborts the run and removes the directory.
    ///
    /// Returns the path of the run directory.
    pub async fn reconstruct(&self, root: &str, output_dir: &Path) -> MaterializeResult<PathBuf> {
        let root_ref = ContentRef::parse(root)?;
        let run_dir = output_dir.join(root_ref.as_str());
        fs::create_dir_all(&run_dir)?;

        let mut state = RunState::default();
        if let Err(e) = self
            .process_node(&mut state, &run_dir, root_ref.clone(), NodeRole::Root)
            .await
        {
            // Nothing useful was produced; do not leave a partial tree behind.
            let _ = fs::remove_dir_all(&run_dir);
            return Err(MaterializeError::RootUnavailable {
                reference: root_ref.to_string(),
                source: Box::new(e),
            });
        }
        debug!(root = root_ref.short(), dir = %run_dir.display(), "materialization complete");
        Ok(run_dir)
    }

    /// Fetch one node, descend into its link children, rewrite resolved
    /// pointers, and write it to `dir`.
    ///
    /// Child failures are pruned here with a warning; errors propagate only
    /// for the node itself, so the root call site can distinguish a dead root
    /// from a gappy tree.
    pub(crate) fn process_node<'s>(
        &'s self,
        state: &'s mut RunState,
        dir: &'s Path,
        reference: ContentRef,
        role: NodeRole,
    ) -> Pin<Box<dyn Future<Output = MaterializeResult<()>> + Send + 's>> {
        Box::pin(async move {
            // Cycle guard: a reference already entered in this run is never
            // re-fetched or re-descended.
            if !state.visited.insert(reference.clone()) {
                return Ok(());
            }

            let content = self.resolver.fetch(&reference).await?;
            let filename =
                state.claim_filename(self.stem_for(&role, &reference, &content), &reference);
            let stem = filename
                .strip_suffix(".json")
                .unwrap_or(&filename)
                .to_string();

            for (relationship, key, child) in discover_children(&content, &stem) {
                let child_role = NodeRole::Child {
                    relationship: relationship.clone(),
                    key: key.clone(),
                };
                if let Err(e) = self
                    .process_node(&mut *state, dir, child.clone(), child_role)
                    .await
                {
                    warn!(
                        reference = child.short(),
                        relationship = %relationship,
                        key = %key,
                        error = %e,
                        "pruning unresolvable branch"
                    );
                }
            }

            // Children first, then rewrite: only pointers whose targets were
            // actually written get a path. The node's own path is registered
            // after the rewrite, so a self-cycle stays in pointer form.
            let mut rewritten = content;
            rewrite_links(&mut rewritten, &state.paths);
            state.paths.insert(reference.clone(), format!("./{filename}"));

            let path = dir.join(&filename);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, serde_json::to_vec_pretty(&rewritten)?)?;
            debug!(reference = reference.short(), file = %filename, "materialized node");
            Ok(())
        })
    }

    fn stem_for(&self, role: &NodeRole, reference: &ContentRef, content: &Value) -> String {
        match role {
            NodeRole::Root => content
                .get("label")
                .and_then(Value::as_str)
                .and_then(|label| self.labels.lookup(label))
                .map(sanitize)
                .unwrap_or_else(|| reference.to_string()),
            NodeRole::Named(stem) => stem.clone(),
            NodeRole::Child { relationship, key } => {
                if key.is_empty() {
                    sanitize(relationship)
                } else {
                    format!("{}_{}", sanitize(relationship), sanitize(key))
                }
            }
        }
    }
}

/// Scan a node's content for link children, in deterministic order.
///
/// The `relationships` map is scanned first: each value may be a direct
/// pointer (empty key), a nested object of named pointers (key = subkey), or
/// an array of pointers / nested objects (key = index or subkey). Any other
/// top-level pointer field follows, using the node's own filename stem as the
/// relationship and the field name as the key.
fn discover_children(content: &Value, own_stem: &str) -> Vec<(String, String, ContentRef)> {
    let mut children = Vec::new();
    let Some(fields) = content.as_object() else {
        return children;
    };

    if let Some(rels) = fields.get("relationships").and_then(Value::as_object) {
        for (name, value) in rels {
            if let Some(child) = link_reference(value) {
                children.push((name.clone(), String::new(), child));
                continue;
            }
            match value {
                Value::Object(named) => {
                    for (subkey, entry) in named {
                        if let Some(child) = link_reference(entry) {
                            children.push((name.clone(), subkey.clone(), child));
                        }
                    }
                }
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        if let Some(child) = link_reference(item) {
                            children.push((name.clone(), index.to_string(), child));
                        } else if let Some(named) = item.as_object() {
                            for (subkey, entry) in named {
                                if let Some(child) = link_reference(entry) {
                                    children.push((name.clone(), subkey.clone(), child));
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    for (field, value) in fields {
        if field == "relationships" {
            continue;
        }
        if let Some(child) = link_reference(value) {
            children.push((own_stem.to_string(), field.clone(), child));
        }
    }

    children
}

/// Replace every link pointer whose target has an assigned path with
/// `{ "path": <relative-path> }`. Unresolved pointers are left untouched.
fn rewrite_links(value: &mut Value, paths: &HashMap<ContentRef, String>) {
    if let Some(reference) = link_reference(&*value) {
        if let Some(path) = paths.get(&reference) {
            *value = path_link(path);
        }
        return;
    }
    match value {
        Value::Object(map) => {
            for entry in map.values_mut() {
                rewrite_links(entry, paths);
            }
        }
        Value::Array(items) => {
            for entry in items.iter_mut() {
                rewrite_links(entry, paths);
            }
        }
        _ => {}
    }
}

/// Keep filename components filesystem-safe.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
