//! Catalog update flow.
//!
//! Loads the persisted catalog, fetches the reference, rebuilds the catalog from the
//! extracted endpoints, diffs the two by digest, and writes the new catalog only if
//! the documentation drifted.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use jirest_shared::{Catalog, EndpointRecord, RawEndpoint, Result};
use jirest_source::DocumentSource;
use jirest_storage::CatalogStore;

use crate::{fingerprint, normalize};

// ---------------------------------------------------------------------------
// Update config, states & result
// ---------------------------------------------------------------------------

/// Configuration for [`update_catalog`].
#[derive(Debug, Clone, Default)]
pub struct UpdateConfig {
    /// Diff only; never write the store.
    pub dry_run: bool,
}

/// Where the update flow currently is.
///
/// `Idle → Fetching → Extracted → Diffed → {Persisted | Unchanged}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Fetching,
    Extracted,
    Diffed,
    Persisted,
    Unchanged,
}

impl UpdateState {
    /// Message shown while in this state.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Idle => "Loading API definition",
            Self::Fetching => "Fetching API reference",
            Self::Extracted => "Building latest catalog",
            Self::Diffed => "Comparing with stored catalog",
            Self::Persisted => "API definition stored",
            Self::Unchanged => "API information is up to date",
        }
    }
}

/// How a stored endpoint differs from the latest documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Present in both, digests differ.
    Modified,
    /// No longer documented.
    Removed,
}

/// What the run did with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Drift detected, new catalog written.
    Persisted,
    /// Nothing changed, nothing written.
    Unchanged,
    /// Drift detected, write skipped on request.
    DryRun,
}

/// Result of [`update_catalog`].
#[derive(Debug)]
pub struct UpdateReport {
    /// Endpoints in the latest catalog.
    pub endpoint_count: usize,
    /// Endpoints in the stored catalog before the run.
    pub previous_count: usize,
    /// Stored endpoints whose digest changed.
    pub modified: Vec<String>,
    /// Stored endpoints missing from the latest catalog.
    pub removed: Vec<String>,
    /// Endpoints documented now but not stored before.
    pub added: Vec<String>,
    pub outcome: UpdateOutcome,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress reporting callback trait.
pub trait ProgressReporter: Send + Sync {
    /// Called on every state transition.
    fn state(&self, state: UpdateState);
    /// Called once per stored endpoint that changed or disappeared.
    fn endpoint_changed(&self, name: &str, kind: ChangeKind);
    /// Called when the flow completes.
    fn done(&self, report: &UpdateReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn state(&self, _state: UpdateState) {}
    fn endpoint_changed(&self, _name: &str, _kind: ChangeKind) {}
    fn done(&self, _report: &UpdateReport) {}
}

// ---------------------------------------------------------------------------
// Building the latest catalog
// ---------------------------------------------------------------------------

/// Template the endpoint's command and fingerprint its documented content.
///
/// The digest is taken over the command as documented, not over the template stored
/// in the record.
pub fn build_record(raw: RawEndpoint) -> EndpointRecord {
    let digest = fingerprint::digest(&raw.name, &raw.description, &raw.params, &raw.command);
    let command = normalize::normalize(&raw.command, raw.http_method, &raw.params);

    EndpointRecord {
        name: raw.name,
        http_method: raw.http_method,
        path: raw.path,
        description: raw.description,
        params: raw.params,
        command,
        digest,
    }
}

/// Build a catalog from extracted endpoints. A repeated name keeps its first
/// position and the last record.
pub fn build_latest(endpoints: impl IntoIterator<Item = RawEndpoint>) -> Catalog {
    let mut catalog = Catalog::new();
    for raw in endpoints {
        if let Some(previous) = catalog.insert(build_record(raw)) {
            warn!(name = %previous.name, "endpoint documented twice, keeping the last one");
        }
    }
    catalog
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Differences between the stored and the latest catalog.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CatalogDiff {
    /// The catalogs hold a different number of endpoints.
    pub size_changed: bool,
    /// Stored endpoints whose digest changed.
    pub modified: Vec<String>,
    /// Stored endpoints missing from the latest catalog.
    pub removed: Vec<String>,
    /// Latest endpoints not in the stored catalog.
    pub added: Vec<String>,
}

impl CatalogDiff {
    /// Whether the stored catalog must be replaced.
    ///
    /// An added key with equal sizes always comes with a removed one, so the size
    /// check plus the stored-key walk covers the full symmetric difference.
    pub fn is_changed(&self) -> bool {
        self.size_changed || !self.modified.is_empty() || !self.removed.is_empty()
    }
}

/// Compare `current` (stored) against `latest` (freshly built), keyed by name.
pub fn diff_catalogs(current: &Catalog, latest: &Catalog) -> CatalogDiff {
    let mut diff = CatalogDiff {
        size_changed: current.len() != latest.len(),
        ..CatalogDiff::default()
    };

    for (name, record) in current.iter() {
        match latest.get(name) {
            Some(fresh) if fresh.digest == record.digest => {}
            Some(_) => diff.modified.push(name.to_string()),
            None => diff.removed.push(name.to_string()),
        }
    }

    diff.added = latest
        .names()
        .filter(|name| !current.contains(name))
        .map(String::from)
        .collect();

    diff
}

// ---------------------------------------------------------------------------
// Update pipeline
// ---------------------------------------------------------------------------

/// Run the update flow.
///
/// 1. Load the stored catalog (missing or malformed is fatal)
/// 2. Fetch the reference document (failure is fatal)
/// 3. Extract endpoints and build the latest catalog
/// 4. Diff by digest, reporting each changed or removed endpoint
/// 5. Replace the stored catalog if anything changed
#[instrument(skip_all, fields(source = %source.describe(), catalog = %store.path().display()))]
pub async fn update_catalog<S: DocumentSource>(
    source: &S,
    store: &CatalogStore,
    config: &UpdateConfig,
    progress: &dyn ProgressReporter,
) -> Result<UpdateReport> {
    let start = Instant::now();

    // --- Load current ---
    progress.state(UpdateState::Idle);
    let current = store.load()?;

    // --- Fetch ---
    progress.state(UpdateState::Fetching);
    let document = source.fetch().await?;

    // --- Extract & build latest ---
    let latest = build_latest(jirest_extractor::extract(&document));
    progress.state(UpdateState::Extracted);

    // --- Diff ---
    let diff = diff_catalogs(&current, &latest);
    progress.state(UpdateState::Diffed);

    for name in &diff.modified {
        info!(%name, "'{name}' API was updated");
        progress.endpoint_changed(name, ChangeKind::Modified);
    }
    for name in &diff.removed {
        info!(%name, "'{name}' API was removed");
        progress.endpoint_changed(name, ChangeKind::Removed);
    }

    // --- Persist ---
    let outcome = if !diff.is_changed() {
        info!("API information is up to date");
        progress.state(UpdateState::Unchanged);
        UpdateOutcome::Unchanged
    } else if config.dry_run {
        info!("dry run, stored catalog left untouched");
        UpdateOutcome::DryRun
    } else {
        store.save(&latest)?;
        progress.state(UpdateState::Persisted);
        UpdateOutcome::Persisted
    };

    let report = UpdateReport {
        endpoint_count: latest.len(),
        previous_count: current.len(),
        modified: diff.modified,
        removed: diff.removed,
        added: diff.added,
        outcome,
        elapsed: start.elapsed(),
    };

    info!(
        endpoints = report.endpoint_count,
        previous = report.previous_count,
        modified = report.modified.len(),
        removed = report.removed.len(),
        added = report.added.len(),
        outcome = ?report.outcome,
        elapsed_ms = report.elapsed.as_millis(),
        "update complete"
    );

    progress.done(&report);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
