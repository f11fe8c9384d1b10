use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The persistence collaborator failed. Callers may retry the whole operation.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The live post with this id does not exist.
    pub fn post_not_found(post_id: DbId) -> Self {
        Self::NotFound {
            entity: "Post",
            key: post_id.to_string(),
        }
    }

    /// No revision with this version is retained for the post.
    pub fn revision_not_found(post_id: DbId, version: i32) -> Self {
        Self::NotFound {
            entity: "Revision",
            key: format!("v{version} of post {post_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_not_found_names_post_and_version() {
        let err = CoreError::revision_not_found(7, 3);
        assert_eq!(err.to_string(), "Revision v3 of post 7 not found");
    }

    #[test]
    fn post_not_found_message() {
        assert_eq!(CoreError::post_not_found(12).to_string(), "Post 12 not found");
    }

    #[test]
    fn storage_message() {
        let err = CoreError::Storage("connection reset".into());
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }
}
