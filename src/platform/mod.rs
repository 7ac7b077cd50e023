//! Owner and group name resolution.
//!
//! Exactly one resolver is selected per platform by [`default_resolver`].
//! Platforms without ownership semantics get [`UnsupportedIdentityResolver`],
//! which fails every call with [`IdentityError::Unsupported`].

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::SystemIdentityResolver;

use crate::error::IdentityError;
use crate::model::{Identity, MetadataRecord};

pub trait IdentityResolver: Send + Sync {
    /// Resolves the record's numeric owner and group into names.
    fn resolve(&self, record: &MetadataRecord) -> Result<Identity, IdentityError>;
}

/// Resolver for platforms that have no owner/group model.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedIdentityResolver;

impl IdentityResolver for UnsupportedIdentityResolver {
    fn resolve(&self, _record: &MetadataRecord) -> Result<Identity, IdentityError> {
        Err(IdentityError::Unsupported)
    }
}

/// Whether username and group name checks can be honoured on this platform.
pub const fn identity_supported() -> bool {
    cfg!(unix)
}

#[cfg(unix)]
pub fn default_resolver() -> Box<dyn IdentityResolver> {
    Box::new(SystemIdentityResolver)
}

#[cfg(not(unix))]
pub fn default_resolver() -> Box<dyn IdentityResolver> {
    Box::new(UnsupportedIdentityResolver)
}
