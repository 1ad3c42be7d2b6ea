//! Shared value types: page geometry, print settings, errors.
//!
//! Nothing in here knows about symbols or rendering. The generator and the
//! layout engine both build on these types.

pub mod config;
pub mod error;
pub mod geometry;

pub use config::{ConfigError, PrintSettings};
pub use error::{DesignError, PrintError};
pub use geometry::{PageSize, Rect, Segment};
