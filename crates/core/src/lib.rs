//! Folio domain core.
//!
//! Everything needed to keep a post's revision history and compare snapshots
//! lives here, with zero knowledge of HTTP or SQL:
//!
//! - [`word_diff`]: greedy, bounded-lookahead word diff over whitespace tokens.
//! - [`field_diff`]: typed field-by-field snapshot comparison and summaries.
//! - [`presenter`]: renderable change sets combining both of the above.
//! - [`history`]: the capped, per-post revision store over a pluggable backend.
//! - [`restore`]: restore-as-new-revision against the live post collaborator.
//! - [`memory`]: in-process backends for tests and database-less deployments.

pub mod diff;
pub mod error;
pub mod field_diff;
pub mod history;
pub mod locks;
pub mod memory;
pub mod presenter;
pub mod restore;
pub mod revision;
pub mod snapshot;
pub mod types;
pub mod word_diff;
