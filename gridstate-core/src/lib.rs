//! gridstate core - view snapshot model, URL token codec and shared types.
//!
//! Everything here is synchronous and free of I/O. Storage lives in
//! `gridstate-storage`; the controller that ties a screen to both lives in
//! `gridstate-view`.

pub mod columns;
pub mod config;
pub mod error;
pub mod identity;
pub mod saved_view;
pub mod snapshot;
pub mod token;

pub use columns::{order_columns, ColumnDef};
pub use config::{GridStateConfig, LogConfig, StoreBackend, StoreConfig, UrlConfig};
pub use error::{ConfigError, GridResult, GridStateError, StoreError, StoreResult};
pub use identity::{ScopeKey, Timestamp, ViewId};
pub use saved_view::{NewSavedView, SavedView, SavedViewPatch};
pub use snapshot::{
    make_default, merge, sanitize, AllowedColumns, ColumnState, Density, Pagination, RawSnapshot,
    SortDirection, SortItem, ViewDefaults, ViewSnapshot, CURRENT_VERSION, DEFAULT_PAGE_SIZE,
    PAGE_SIZES,
};
pub use token::{TokenCodec, MAX_TOKEN_LEN};
