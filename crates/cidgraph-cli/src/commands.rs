use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use cidgraph_compare::{compare_roots, CompareContext};
use cidgraph_materialize::{LabelTable, Materializer, TransactionItem};
use cidgraph_resolver::{HttpGateway, Resolver};
use cidgraph_types::ContentRef;

use crate::cli::{Cli, Command, CompareArgs, MaterializeArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Materialize(args) => cmd_materialize(args).await,
        Command::Compare(args) => cmd_compare(args, cli.verbose).await,
    }
}

async fn cmd_materialize(args: MaterializeArgs) -> anyhow::Result<()> {
    let gateway = HttpGateway::new(&args.gateway)?;
    let resolver = Resolver::new(gateway);
    let labels = match &args.labels {
        Some(path) => load_labels(path)?,
        None => LabelTable::new(),
    };
    let materializer = Materializer::new(&resolver, labels);

    if let Some(path) = &args.transaction {
        let items = load_transaction(path)?;
        let dir = materializer
            .reconstruct_from_transaction(&items, &args.out)
            .await?;
        println!("Materialized {} transaction items into {}", items.len(), dir.display());
        return Ok(());
    }

    let Some(reference) = args.reference else {
        bail!("a root reference or --transaction file is required");
    };
    let dir = materializer.reconstruct(&reference, &args.out).await?;
    println!("Materialized {} into {}", reference, dir.display());
    Ok(())
}

async fn cmd_compare(args: CompareArgs, verbose: bool) -> anyhow::Result<()> {
    let mut refs = Vec::with_capacity(args.refs.len());
    for raw in &args.refs {
        refs.push(ContentRef::parse(raw).with_context(|| format!("bad reference {raw}"))?);
    }

    let gateway = HttpGateway::new(&args.gateway)?;
    let resolver = Resolver::new(gateway);
    let context = CompareContext::new(&args.record_id, &args.group);
    let result = compare_roots(&resolver, &refs, &context).await?;

    println!("{}", result.summary);
    if verbose {
        for pair in &result.pairwise {
            println!(
                "\n{} vs {}: {} differences",
                pair.left.short(),
                pair.right.short(),
                pair.difference_count()
            );
            for diff in &pair.differences {
                println!("  [{}] {}: {}", diff.kind, diff.path, diff.description);
            }
        }
    }
    Ok(())
}

/// Load a label manifest: a JSON object mapping label → canonical identifier.
fn load_labels(path: &Path) -> anyhow::Result<LabelTable> {
    let bytes = fs::read(path).with_context(|| format!("reading labels from {}", path.display()))?;
    let entries: HashMap<String, String> =
        serde_json::from_slice(&bytes).context("label manifest must be a JSON string map")?;
    Ok(entries.into_iter().collect())
}

fn load_transaction(path: &Path) -> anyhow::Result<Vec<TransactionItem>> {
    let bytes = fs::read(path)
        .with_context(|| format!("reading transaction items from {}", path.display()))?;
    let items: Vec<TransactionItem> =
        serde_json::from_slice(&bytes).context("transaction file must be a JSON item array")?;
    if items.is_empty() {
        bail!("transaction file contains no items");
    }
    Ok(items)
}
