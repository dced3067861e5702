//! Core orchestration for jirest: command templating, fingerprints, and the catalog
//! update flow.

pub mod fingerprint;
pub mod normalize;
pub mod update;

pub use fingerprint::digest;
pub use normalize::normalize;
pub use update::{
    CatalogDiff, ChangeKind, ProgressReporter, SilentProgress, UpdateConfig, UpdateOutcome,
    UpdateReport, UpdateState, build_latest, build_record, diff_catalogs, update_catalog,
};
