//! Van der Waals radius lookup for named atoms.

pub mod provider;

pub use provider::{RadiusLookupError, VdwRadiusProvider, VdwRadiusRecord};
