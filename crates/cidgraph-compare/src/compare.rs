//! Multi-way comparison of independently-submitted root references.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use cidgraph_resolver::Resolver;
use cidgraph_types::ContentRef;

use crate::diff::{diff_values, format_value, Difference, SUMMARY_VALUE_LIMIT};
use crate::error::{CompareError, CompareResult};
use crate::inline::resolve_inline;

/// Summary reports at most this many differing paths.
const MAX_SUMMARY_PATHS: usize = 10;

/// Distinct values per path are listed inline up to this count, then sampled.
const MAX_INLINE_VALUES: usize = 4;

/// Opaque correlation labels for a comparison batch. Used only for the
/// summary header and tracing, never for resolution.
#[derive(Clone, Debug, Default)]
pub struct CompareContext {
    pub record_id: String,
    pub group: String,
}

impl CompareContext {
    pub fn new(record_id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            group: group.into(),
        }
    }
}

/// The structural diff of one unordered pair of roots.
#[derive(Clone, Debug)]
pub struct ComparisonResult {
    pub left: ContentRef,
    pub right: ContentRef,
    pub differences: Vec<Difference>,
}

impl ComparisonResult {
    pub fn difference_count(&self) -> usize {
        self.differences.len()
    }

    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty()
    }
}

/// The outcome of comparing N roots: every pairwise diff plus a ranked,
/// bounded textual summary.
#[derive(Clone, Debug)]
pub struct MultiComparisonResult {
    pub roots: Vec<ContentRef>,
    pub pairwise: Vec<ComparisonResult>,
    pub summary: String,
    pub total_differences: usize,
}

/// Resolve, inline and pairwise-diff `refs`.
///
/// Requires at least two references; raises before any fetch otherwise.
/// Comparison needs complete graphs, so any resolution failure aborts the
/// whole batch — partial graphs are never diffed. Produces exactly
/// `N×(N−1)/2` pairwise comparisons.
pub async fn compare_roots(
    resolver: &Resolver,
    refs: &[ContentRef],
    context: &CompareContext,
) -> CompareResult<MultiComparisonResult> {
    if refs.len() < 2 {
        return Err(CompareError::InsufficientInputs(refs.len()));
    }

    debug!(
        record = %context.record_id,
        group = %context.group,
        submissions = refs.len(),
        "comparing submissions"
    );

    let mut inlined = Vec::with_capacity(refs.len());
    for reference in refs {
        inlined.push(resolve_inline(resolver, reference).await?);
    }

    let mut pairwise = Vec::with_capacity(refs.len() * (refs.len() - 1) / 2);
    for i in 0..refs.len() {
        for j in (i + 1)..refs.len() {
            pairwise.push(ComparisonResult {
                left: refs[i].clone(),
                right: refs[j].clone(),
                differences: diff_values(&inlined[i], &inlined[j]),
            });
        }
    }

    let total_differences = pairwise.iter().map(ComparisonResult::difference_count).sum();
    let summary = build_summary(refs.len(), &pairwise, context);

    Ok(MultiComparisonResult {
        roots: refs.to_vec(),
        pairwise,
        summary,
        total_differences,
    })
}

#[derive(Default)]
struct PathStat {
    /// Number of pairwise comparisons in which this path differed.
    pairs: usize,
    /// Distinct rendered values observed at this path.
    values: BTreeSet<String>,
}

/// Aggregate all pairwise differences into a ranked, bounded report.
///
/// Paths are ranked by how many comparisons they affected; at most the top
/// ten are shown, each with its distinct value set (inline when small,
/// counted plus a three-value sample otherwise).
fn build_summary(
    root_count: usize,
    pairwise: &[ComparisonResult],
    context: &CompareContext,
) -> String {
    let total: usize = pairwise.iter().map(ComparisonResult::difference_count).sum();
    if total == 0 {
        return format!("All {root_count} submissions are identical");
    }

    // Within one pair every path appears at most once, so each difference
    // counts one affected comparison.
    let mut stats: BTreeMap<&str, PathStat> = BTreeMap::new();
    for comparison in pairwise {
        for difference in &comparison.differences {
            let stat = stats.entry(difference.path.as_str()).or_default();
            stat.pairs += 1;
            for value in [&difference.old, &difference.new].into_iter().flatten() {
                stat.values.insert(format_value(value, SUMMARY_VALUE_LIMIT));
            }
        }
    }

    let mut ranked: Vec<(&str, PathStat)> = stats.into_iter().collect();
    ranked.sort_by(|(path_a, a), (path_b, b)| b.pairs.cmp(&a.pairs).then(path_a.cmp(path_b)));

    let mut lines = Vec::new();
    lines.push(format!(
        "Comparison of {root_count} submissions for {} ({})",
        context.record_id, context.group
    ));
    lines.push(format!(
        "{total} differences across {} paths in {} pairwise comparisons",
        ranked.len(),
        pairwise.len()
    ));

    for (path, stat) in ranked.iter().take(MAX_SUMMARY_PATHS) {
        let values = if stat.values.len() <= MAX_INLINE_VALUES {
            stat.values.iter().cloned().collect::<Vec<_>>().join(" | ")
        } else {
            let sample = stat
                .values
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ");
            format!("{} distinct values, e.g. {}", stat.values.len(), sample)
        };
        lines.push(format!(
            "  {path}: differs in {} of {} comparisons ({values})",
            stat.pairs,
            pairwise.len()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cidgraph_resolver::MemoryFetcher;
    use serde_json::json;

    fn setup(values: &[serde_json::Value]) -> (Resolver, Vec<ContentRef>) {
        let fetcher = MemoryFetcher::new();
        let refs = values.iter().map(|v| fetcher.insert_json(v)).collect();
        (Resolver::new(fetcher), refs)
    }

    #[tokio::test]
    async fn fewer_than_two_refs_is_rejected_before_fetching() {
        let fetcher = std::sync::Arc::new(MemoryFetcher::new());
        let one = fetcher.insert_json(&json!({"a": 1}));
        let resolver = Resolver::new(fetcher.clone());

        match compare_roots(&resolver, &[one], &CompareContext::default()).await {
            Err(CompareError::InsufficientInputs(1)) => {}
            other => panic!("expected InsufficientInputs, got {:?}", other),
        }
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn pairwise_count_is_n_choose_two() {
        let (resolver, refs) = setup(&[json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
        let result = compare_roots(&resolver, &refs, &CompareContext::default())
            .await
            .unwrap();
        assert_eq!(result.pairwise.len(), 3);
        assert_eq!(result.roots.len(), 3);
    }

    #[tokio::test]
    async fn identical_submissions_summary() {
        // Three distinct references resolving to structurally identical
        // content (submitters pin independently, addresses may differ).
        let fetcher = MemoryFetcher::new();
        let bytes = serde_json::to_vec(&json!({"a": 1, "nested": {"b": [1, 2]}})).unwrap();
        let r1 = fetcher.insert_bytes(bytes.clone());
        let r2 = ContentRef::for_bytes(b"second submitter");
        fetcher.insert_at(r2.clone(), bytes.clone());
        let r3 = ContentRef::for_bytes(b"third submitter");
        fetcher.insert_at(r3.clone(), bytes);
        let resolver = Resolver::new(fetcher);

        let result = compare_roots(&resolver, &[r1, r2, r3], &CompareContext::default())
            .await
            .unwrap();
        assert_eq!(result.total_differences, 0);
        assert_eq!(result.summary, "All 3 submissions are identical");
        assert!(result.pairwise.iter().all(|p| !p.has_differences()));
    }

    #[tokio::test]
    async fn single_update_between_two_submissions() {
        let (resolver, refs) = setup(&[json!({"a": 1}), json!({"a": 2})]);
        let result = compare_roots(&resolver, &refs, &CompareContext::default())
            .await
            .unwrap();

        assert_eq!(result.total_differences, 1);
        assert_eq!(result.pairwise.len(), 1);
        let diff = &result.pairwise[0].differences[0];
        assert_eq!(diff.path, "a");
        assert_eq!(diff.kind, crate::diff::ChangeKind::Updated);
    }

    #[tokio::test]
    async fn differences_through_links_are_found() {
        let fetcher = MemoryFetcher::new();
        let owner1 = fetcher.insert_json(&json!({"name": "Jane"}));
        let owner2 = fetcher.insert_json(&json!({"name": "John"}));
        let r1 = fetcher.insert_json(&json!({"relationships": {"owner": {"/": owner1.as_str()}}}));
        let r2 = fetcher.insert_json(&json!({"relationships": {"owner": {"/": owner2.as_str()}}}));

        let resolver = Resolver::new(fetcher);
        let result = compare_roots(&resolver, &[r1, r2], &CompareContext::default())
            .await
            .unwrap();

        assert_eq!(result.total_differences, 1);
        assert_eq!(
            result.pairwise[0].differences[0].path,
            "relationships.owner.name"
        );
    }

    #[tokio::test]
    async fn unresolvable_submission_aborts_the_batch() {
        let fetcher = MemoryFetcher::new();
        let good = fetcher.insert_json(&json!({"a": 1}));
        let broken = fetcher.insert_json(&json!({
            "x": { "/": ContentRef::for_bytes(b"missing").as_str() }
        }));

        let resolver = Resolver::new(fetcher);
        match compare_roots(&resolver, &[good, broken], &CompareContext::default()).await {
            Err(CompareError::Resolve(_)) => {}
            other => panic!("expected Resolve error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn summary_ranks_paths_by_affected_comparisons() {
        // "hot" differs everywhere, "cold" only between the first pair.
        let (resolver, refs) = setup(&[
            json!({"hot": 1, "cold": "x"}),
            json!({"hot": 2, "cold": "y"}),
            json!({"hot": 3, "cold": "y"}),
        ]);
        let context = CompareContext::new("parcel-7", "county-records");
        let result = compare_roots(&resolver, &refs, &context).await.unwrap();

        let lines: Vec<&str> = result.summary.lines().collect();
        assert!(lines[0].contains("parcel-7"));
        assert!(lines[0].contains("county-records"));
        assert!(lines[1].contains("3 pairwise comparisons"));
        // hot affects 3 comparisons, cold only 2: hot is listed first.
        assert!(lines[2].trim_start().starts_with("hot:"));
        assert!(lines[2].contains("differs in 3 of 3"));
        assert!(lines[3].trim_start().starts_with("cold:"));
        assert!(lines[3].contains("differs in 2 of 3"));
        // cold's two distinct values are listed inline, quoted.
        assert!(lines[3].contains("\"x\" | \"y\""));
    }

    #[tokio::test]
    async fn summary_samples_large_value_sets() {
        let (resolver, refs) = setup(&[
            json!({"v": "a"}),
            json!({"v": "b"}),
            json!({"v": "c"}),
            json!({"v": "d"}),
            json!({"v": "e"}),
        ]);
        let result = compare_roots(&resolver, &refs, &CompareContext::default())
            .await
            .unwrap();

        assert_eq!(result.pairwise.len(), 10);
        assert!(result.summary.contains("5 distinct values, e.g."));
    }
}
