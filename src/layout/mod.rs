//! Sheet layout, pagination and document output.
//!
//! ## Key Types
//!
//! - `SheetGeometry`: Grid and margins derived from page size and settings
//! - `PagePlan`: Where the items of one page go
//! - `SheetLayout`: The placement loop, driving a `PageSink`
//! - `PdfSink`: PDF document backend
//! - `PrintJob`: One print request, run inline or on a worker thread

pub mod border;
pub mod engine;
pub mod job;
pub mod overlay;
pub mod pdf;
pub mod sheet;
pub mod sink;
pub mod viewer;

pub use border::BorderAssets;
pub use engine::{LayoutReport, SheetLayout};
pub use job::{CancelToken, JobEvent, JobHandle, JobListener, JobOutcome, PrintJob};
pub use overlay::{cut_guides, registration_marks, Overlay, OverlayKind};
pub use pdf::PdfSink;
pub use sheet::{item_source, PagePlan, SheetGeometry};
pub use sink::PageSink;
pub use viewer::{SystemViewer, Viewer};
