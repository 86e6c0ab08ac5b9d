//! gridstate view - binds a grid screen to its snapshot, the page URL and
//! the saved-view store.

pub mod controller;
pub mod error;
pub mod location;
pub mod screen;

pub use controller::{ApplyOutcome, InitialSource, ViewController};
pub use error::{ViewError, ViewResult};
pub use location::{ViewLocation, DEFAULT_TOKEN_PARAM};
pub use screen::ScreenSpec;
