//! Repository port for policy persistence.
//!
//! This module defines the trait boundary between training and the storage
//! of trained value tables.

use std::path::Path;

use crate::{Result, q_learning::SavedPolicy};

/// Port for persisting and loading trained policies.
///
/// # Examples
///
/// ```no_run
/// use qtictac::ports::PolicyRepository;
/// use qtictac::q_learning::SavedPolicy;
/// use std::path::Path;
///
/// fn save_policy<R: PolicyRepository>(
///     repo: &R,
///     policy: &SavedPolicy,
///     path: &Path,
/// ) -> qtictac::Result<()> {
///     repo.save(policy, path)
/// }
/// ```
pub trait PolicyRepository {
    /// Save a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, policy: &SavedPolicy, path: &Path) -> Result<()>;

    /// Load a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is stored at `path` or the stored bytes
    /// cannot be decoded.
    fn load(&self, path: &Path) -> Result<SavedPolicy>;
}
