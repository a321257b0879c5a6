//! Subcommand implementations.

use crate::config::{RunConfig, derive_reference};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use graphdelta_diff::{
    DiffError, DiffResult, GraphFlattener, IdentityIndexer, LogReporter, RecordingReporter,
    ReportEvent, Side, SnapshotError, SnapshotLoader, SnapshotMetadata, compare_graphs, publish,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Arguments of the `diff` subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DiffArgs {
    /// Snapshot of the version under test
    #[arg(short, long)]
    pub test: PathBuf,
    /// Snapshot of the reference version; derived from the test path when omitted
    #[arg(short, long)]
    pub reference: Option<PathBuf>,
    /// Label of the version under test
    #[arg(long)]
    pub test_label: Option<String>,
    /// Label of the reference version
    #[arg(long)]
    pub reference_label: Option<String>,
    /// JSON run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Comparison tolerance (accepted, not applied)
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Print the full report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Labels naming the two sides of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLabels {
    /// Label of the version under test
    pub test: String,
    /// Label of the reference version
    pub reference: String,
}

/// Machine-readable report
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    test_label: &'a str,
    reference_label: &'a str,
    passed: bool,
    message: String,
    events: &'a [ReportEvent],
    result: &'a DiffResult,
}

/// Diff two snapshots and report; returns whether the run passed
///
/// # Errors
///
/// Returns error if a snapshot is missing, unreadable or has no root
pub async fn diff(args: &DiffArgs) -> Result<bool> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path).await?,
        None => RunConfig::default(),
    };

    if let Some(tolerance) = ignored_tolerance(args, &config) {
        tracing::warn!(tolerance, "comparison tolerance is ignored; values compare exactly");
    }

    let reference_path = match &args.reference {
        Some(path) => path.clone(),
        None => derive_reference(&args.test.to_string_lossy())
            .map(PathBuf::from)
            .ok_or_else(|| {
                eyre!(
                    "cannot derive a reference snapshot from {}; pass --reference",
                    args.test.display()
                )
            })?,
    };

    let (test_bytes, reference_bytes) = tokio::try_join!(
        read_snapshot(Side::Test, &args.test),
        read_snapshot(Side::Reference, &reference_path),
    )?;

    let test_key = args.test.display().to_string();
    let reference_key = reference_path.display().to_string();
    let mut loader = SnapshotLoader::new();
    let test_meta = loader
        .load_as(test_key.as_str(), &test_bytes)
        .map_err(|e| DiffError::from_snapshot(Side::Test, test_key.as_str(), e))?;
    let reference_meta = loader
        .load_as(reference_key.as_str(), &reference_bytes)
        .map_err(|e| DiffError::from_snapshot(Side::Reference, reference_key.as_str(), e))?;

    let labels = resolve_labels(args, &config, &test_meta, &reference_meta);
    tracing::info!(test = %labels.test, reference = %labels.reference, "comparing snapshots");

    let test = loader
        .load_by_label(&test_key)
        .map_err(|e| DiffError::from_snapshot(Side::Test, test_key.as_str(), e))?;
    let reference = loader
        .load_by_label(&reference_key)
        .map_err(|e| DiffError::from_snapshot(Side::Reference, reference_key.as_str(), e))?;
    let result = compare_graphs(test, reference, &config.diff)?;

    if args.json {
        let (passed, report) = json_report(&labels, &result)?;
        println!("{}", report);
        Ok(passed)
    } else {
        let mut reporter = LogReporter::new(labels.reference);
        Ok(publish(&result, &mut reporter))
    }
}

/// Tolerance requested for the run; the flag wins over the config
fn ignored_tolerance(args: &DiffArgs, config: &RunConfig) -> Option<f64> {
    args.tolerance.or(config.tolerance)
}

/// Resolve both labels
///
/// Each label comes from its flag, then the config, then the snapshot
/// metadata. When the reference path was derived rather than given, the
/// reference label is derived from the test label before falling back to
/// metadata.
fn resolve_labels(
    args: &DiffArgs,
    config: &RunConfig,
    test_meta: &SnapshotMetadata,
    reference_meta: &SnapshotMetadata,
) -> RunLabels {
    let test = args
        .test_label
        .clone()
        .or_else(|| config.test_label.clone())
        .unwrap_or_else(|| test_meta.label.clone());
    let reference = args
        .reference_label
        .clone()
        .or_else(|| config.reference_label.clone())
        .or_else(|| {
            args.reference
                .is_none()
                .then(|| derive_reference(&test))
                .flatten()
        })
        .unwrap_or_else(|| reference_meta.label.clone());
    RunLabels { test, reference }
}

/// Publish a result into a pretty JSON document; returns the verdict too
fn json_report(labels: &RunLabels, result: &DiffResult) -> Result<(bool, String)> {
    let mut reporter = RecordingReporter::new();
    let passed = publish(result, &mut reporter);
    let report = JsonReport {
        test_label: &labels.test,
        reference_label: &labels.reference,
        passed,
        message: result.summary().message(&labels.reference),
        events: reporter.events(),
        result,
    };
    Ok((passed, serde_json::to_string_pretty(&report)?))
}

/// Print structural counts of one snapshot
///
/// # Errors
///
/// Returns error if the snapshot is unreadable or has no root
pub async fn inspect(path: &Path) -> Result<()> {
    let bytes = read_snapshot(Side::Test, path).await?;
    let key = path.display().to_string();

    let mut loader = SnapshotLoader::new();
    let metadata = loader
        .load_as(key.as_str(), &bytes)
        .map_err(|e| DiffError::from_snapshot(Side::Test, key.as_str(), e))?;
    let graph = loader
        .load_by_label(&key)
        .map_err(|e| DiffError::from_snapshot(Side::Test, key.as_str(), e))?;

    let flattened = GraphFlattener::new().flatten(graph)?;
    let index = IdentityIndexer::build(flattened.iter());

    println!("Snapshot: {} (version {})", metadata.label, metadata.version);
    println!("Stored objects: {}", graph.len());
    println!("Reachable objects: {}", flattened.count());
    println!("Application id buckets: {}", index.by_application_id().len());
    println!("Content id buckets: {}", index.by_content_id().len());
    println!("Dangling references: {}", flattened.dangling().len());
    println!("Content id mismatches: {}", graph.verify_content_ids().len());
    Ok(())
}

async fn read_snapshot(side: Side, path: &Path) -> Result<Vec<u8>, DiffError> {
    tokio::fs::read(path).await.map_err(|e| {
        let label = path.display().to_string();
        let err = if e.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::NotFound {
                label: label.clone(),
            }
        } else {
            SnapshotError::Io(e.to_string())
        };
        DiffError::from_snapshot(side, label, err)
    })
}
