//! Batch materialization from already-decoded transaction items.
//!
//! Decoding the on-chain event log is an external collaborator's job; this
//! entry point takes the resulting `(group, item, reference)` triples and
//! materializes one subdirectory per group. Per-item failures are logged and
//! skipped so one bad submission cannot sink the batch.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cidgraph_types::ContentRef;

use crate::error::MaterializeResult;
use crate::materialize::{Materializer, NodeRole, RunState};

/// One decoded transaction entry: which data group it belongs to, the item
/// key within the group, and the content reference to fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub group_key: String,
    pub item_key: String,
    pub reference: String,
}

/// Convert a raw group key into a directory/filename stem: lowercased, with
/// every non-alphanumeric character mapped to `_`.
pub fn convert_group_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl<'r> Materializer<'r> {
    /// Materialize a batch of transaction items under `output_dir`.
    ///
    /// Items are grouped by `group_key` (deterministic order), one
    /// subdirectory per group; each item's root file is named after the
    /// converted group key, with the usual collision disambiguation when a
    /// group carries several items. Nested resolution matches
    /// [`Materializer::reconstruct`], scoped to the group's subdirectory.
    pub async fn reconstruct_from_transaction(
        &self,
        items: &[TransactionItem],
        output_dir: &Path,
    ) -> MaterializeResult<PathBuf> {
        let mut groups: BTreeMap<&str, Vec<&TransactionItem>> = BTreeMap::new();
        for item in items {
            groups.entry(&item.group_key).or_default().push(item);
        }

        for (group_key, group_items) in groups {
            let stem = convert_group_key(group_key);
            let group_dir = output_dir.join(&stem);
            fs::create_dir_all(&group_dir)?;

            // One traversal state per subdirectory: items within a group
            // share children, items across groups do not.
            let mut state = RunState::default();
            for item in group_items {
                let reference = match ContentRef::parse(&item.reference) {
                    Ok(reference) => reference,
                    Err(e) => {
                        warn!(
                            group = group_key,
                            item = %item.item_key,
                            error = %e,
                            "skipping item with invalid reference"
                        );
                        continue;
                    }
                };
                if let Err(e) = self
                    .process_node(
                        &mut state,
                        &group_dir,
                        reference.clone(),
                        NodeRole::Named(stem.clone()),
                    )
                    .await
                {
                    warn!(
                        group = group_key,
                        item = %item.item_key,
                        reference = reference.short(),
                        error = %e,
                        "skipping unresolvable item"
                    );
                }
            }
            debug!(group = group_key, dir = %group_dir.display(), "group materialized");
        }

        Ok(output_dir.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelTable;
    use cidgraph_resolver::{MemoryFetcher, Resolver};
    use serde_json::json;

    #[test]
    fn group_key_conversion() {
        assert_eq!(convert_group_key("County Records"), "county_records");
        assert_eq!(convert_group_key("  Deed/2024  "), "deed_2024");
        assert_eq!(convert_group_key("plain"), "plain");
    }

    #[tokio::test]
    async fn items_are_grouped_into_subdirectories() {
        let fetcher = MemoryFetcher::new();
        let deed = fetcher.insert_json(&json!({"kind": "deed"}));
        let survey = fetcher.insert_json(&json!({"kind": "survey"}));

        let items = vec![
            TransactionItem {
                group_key: "County Deeds".into(),
                item_key: "d1".into(),
                reference: deed.to_string(),
            },
            TransactionItem {
                group_key: "Surveys".into(),
                item_key: "s1".into(),
                reference: survey.to_string(),
            },
        ];

        let resolver = Resolver::new(fetcher);
        let materializer = Materializer::new(&resolver, LabelTable::new());
        let out = tempfile::tempdir().unwrap();
        materializer
            .reconstruct_from_transaction(&items, out.path())
            .await
            .unwrap();

        assert!(out.path().join("county_deeds/county_deeds.json").exists());
        assert!(out.path().join("surveys/surveys.json").exists());
    }

    #[tokio::test]
    async fn multiple_items_in_one_group_are_disambiguated() {
        let fetcher = MemoryFetcher::new();
        let first = fetcher.insert_json(&json!({"n": 1}));
        let second = fetcher.insert_json(&json!({"n": 2}));

        let items = vec![
            TransactionItem {
                group_key: "deeds".into(),
                item_key: "a".into(),
                reference: first.to_string(),
            },
            TransactionItem {
                group_key: "deeds".into(),
                item_key: "b".into(),
                reference: second.to_string(),
            },
        ];

        let resolver = Resolver::new(fetcher);
        let materializer = Materializer::new(&resolver, LabelTable::new());
        let out = tempfile::tempdir().unwrap();
        materializer
            .reconstruct_from_transaction(&items, out.path())
            .await
            .unwrap();

        let group_dir = out.path().join("deeds");
        assert!(group_dir.join("deeds.json").exists());
        let suffixed: Vec<_> = fs::read_dir(&group_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("deeds-"))
            .collect();
        assert_eq!(suffixed.len(), 1);
    }

    #[tokio::test]
    async fn bad_items_are_skipped_without_aborting() {
        let fetcher = MemoryFetcher::new();
        let good = fetcher.insert_json(&json!({"ok": true}));
        let missing = ContentRef::for_bytes(b"not uploaded");

        let items = vec![
            TransactionItem {
                group_key: "g".into(),
                item_key: "bad-ref".into(),
                reference: "garbage".into(),
            },
            TransactionItem {
                group_key: "g".into(),
                item_key: "unfetchable".into(),
                reference: missing.to_string(),
            },
            TransactionItem {
                group_key: "g".into(),
                item_key: "good".into(),
                reference: good.to_string(),
            },
        ];

        let resolver = Resolver::new(fetcher);
        let materializer = Materializer::new(&resolver, LabelTable::new());
        let out = tempfile::tempdir().unwrap();
        materializer
            .reconstruct_from_transaction(&items, out.path())
            .await
            .unwrap();

        // Only the good item produced a file.
        let names: Vec<_> = fs::read_dir(out.path().join("g"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["g.json".to_string()]);
    }
}
