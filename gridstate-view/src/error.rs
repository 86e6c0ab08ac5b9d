//! Error types for the view controller.

use gridstate_core::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid page URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type ViewResult<T> = Result<T, ViewError>;
