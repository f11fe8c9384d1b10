pub mod post_snapshot;
pub mod revision;
