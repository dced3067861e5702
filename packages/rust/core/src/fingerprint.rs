//! Content fingerprints for catalog entries.

use jirest_shared::Param;
use sha2::{Digest, Sha256};

/// SHA-256 of `name`, `description`, each parameter name and the command, concatenated
/// in that order, as 64 lowercase hex characters.
///
/// Callers pass the command as documented, before templating, so the digest follows
/// the documentation rather than the template renderer.
pub fn digest(name: &str, description: &str, params: &[Param], command: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(description.as_bytes());
    for param in params {
        hasher.update(param.name.as_bytes());
    }
    hasher.update(command.as_bytes());
    format!("{:x}", hasher.finalize())
}
