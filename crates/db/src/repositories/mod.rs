pub mod post_snapshot_repo;
pub mod revision_repo;

pub use post_snapshot_repo::PostSnapshotRepo;
pub use revision_repo::RevisionRepo;
