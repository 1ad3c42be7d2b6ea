//! Print jobs.
//!
//! A `PrintJob` owns its cards and a copy of the settings taken when it was
//! created. It runs the layout engine into a PDF on the calling thread
//! ([`PrintJob::run`]) or on a dedicated worker ([`PrintJob::spawn`]).
//!
//! Progress is reported as [`JobEvent`]s through a synchronous
//! [`JobListener`] invoked on the job's thread; listeners must not block.
//! Cancellation is cooperative: the engine polls the [`CancelToken`] before
//! every item.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tracing::{info, warn};

use super::border::BorderAssets;
use super::engine::SheetLayout;
use super::pdf::PdfSink;
use super::viewer::{SystemViewer, Viewer};
use crate::cards::{Card, CardRenderer, CardVariant};
use crate::core::{PageSize, PrintError, PrintSettings};

/// Shared abort flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the job to stop before its next item.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Progress notifications, in the order a job emits them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum JobEvent {
    Started {
        cards: usize,
        items: usize,
        pages: usize,
    },
    /// One item drawn. `done` counts from 1 up to `total`.
    ItemPlaced {
        item: usize,
        page: usize,
        variant: CardVariant,
        done: usize,
        total: usize,
    },
    PageFinished {
        page: usize,
        items: usize,
    },
    Completed {
        path: PathBuf,
        pages: usize,
        opened: bool,
    },
    Aborted {
        pages: usize,
        items: usize,
    },
    /// `message` is the short classification, `detail` the full error.
    Failed {
        message: &'static str,
        detail: String,
    },
}

/// Receives job events on the job's thread.
pub trait JobListener {
    fn on_event(&mut self, event: JobEvent);
}

impl<F: FnMut(JobEvent)> JobListener for F {
    fn on_event(&mut self, event: JobEvent) {
        self(event);
    }
}

/// How a job ended when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum JobOutcome {
    Completed {
        path: PathBuf,
        pages: usize,
        items: usize,
        /// Whether the viewer accepted the file.
        opened: bool,
    },
    /// Stopped on request. The file is well-formed but incomplete.
    Aborted { pages: usize, items: usize },
}

impl JobOutcome {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// One request to lay out a card set into a PDF.
pub struct PrintJob {
    cards: Vec<Card>,
    settings: PrintSettings,
    destination: PathBuf,
    renderer: Arc<dyn CardRenderer>,
    viewer: Option<Box<dyn Viewer>>,
    page_size: PageSize,
    borders: Option<BorderAssets>,
}

impl PrintJob {
    /// Create a job writing to `destination`, opened with the system viewer
    /// on success.
    pub fn new(
        cards: Vec<Card>,
        settings: &PrintSettings,
        destination: impl Into<PathBuf>,
        renderer: Arc<dyn CardRenderer>,
    ) -> Self {
        Self {
            cards,
            settings: settings.clone(),
            destination: destination.into(),
            renderer,
            viewer: Some(Box::new(SystemViewer)),
            page_size: PageSize::A4,
            borders: None,
        }
    }

    #[must_use]
    pub fn with_viewer(mut self, viewer: impl Viewer + 'static) -> Self {
        self.viewer = Some(Box::new(viewer));
        self
    }

    /// Never open the finished file.
    #[must_use]
    pub fn without_viewer(mut self) -> Self {
        self.viewer = None;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_border_assets(mut self, borders: BorderAssets) -> Self {
        self.borders = Some(borders);
        self
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub fn settings(&self) -> &PrintSettings {
        &self.settings
    }

    /// Total items the job prints: every card twice.
    #[must_use]
    pub fn total_items(&self) -> usize {
        2 * self.cards.len()
    }

    /// Run the job on the current thread.
    ///
    /// Every failure is also reported to `listener` as `JobEvent::Failed`.
    pub fn run(
        &self,
        cancel: &CancelToken,
        listener: &mut dyn JobListener,
    ) -> Result<JobOutcome, PrintError> {
        let result = self.execute(cancel, listener);
        if let Err(e) = &result {
            warn!(destination = %self.destination.display(), error = %e, "print job failed");
            listener.on_event(JobEvent::Failed {
                message: e.user_message(),
                detail: e.to_string(),
            });
        }
        result
    }

    /// Run the job on a dedicated worker thread.
    pub fn spawn<L>(self, mut listener: L) -> Result<JobHandle, PrintError>
    where
        L: JobListener + Send + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name("print-job".into())
            .spawn(move || self.run(&token, &mut listener))
            .map_err(PrintError::render)?;
        Ok(JobHandle { cancel, handle })
    }

    fn execute(
        &self,
        cancel: &CancelToken,
        listener: &mut dyn JobListener,
    ) -> Result<JobOutcome, PrintError> {
        self.settings.validate()?;
        if self.cards.is_empty() {
            return Err(PrintError::EmptyCardSet);
        }

        let mut layout = SheetLayout::new(self.settings.clone(), self.page_size)?;
        if let Some(borders) = &self.borders {
            layout = layout.with_border_assets(borders.clone());
        }
        let mut sink = PdfSink::create(&self.destination, self.page_size)?;
        let report = layout.run(
            &self.cards,
            self.renderer.as_ref(),
            &mut sink,
            cancel,
            listener,
        )?;

        if report.aborted {
            info!(
                pages = report.pages,
                items = report.items_placed,
                "print job aborted"
            );
            listener.on_event(JobEvent::Aborted {
                pages: report.pages,
                items: report.items_placed,
            });
            return Ok(JobOutcome::Aborted {
                pages: report.pages,
                items: report.items_placed,
            });
        }

        let opened = match &self.viewer {
            Some(viewer) => match viewer.open(&self.destination) {
                Ok(()) => true,
                Err(e) => {
                    warn!(path = %self.destination.display(), error = %e, "could not open document");
                    false
                }
            },
            None => false,
        };

        info!(
            path = %self.destination.display(),
            pages = report.pages,
            items = report.items_placed,
            "print job completed"
        );
        listener.on_event(JobEvent::Completed {
            path: self.destination.clone(),
            pages: report.pages,
            opened,
        });
        Ok(JobOutcome::Completed {
            path: self.destination.clone(),
            pages: report.pages,
            items: report.items_placed,
            opened,
        })
    }
}

/// Handle to a job running on its own thread.
pub struct JobHandle {
    cancel: CancelToken,
    handle: JoinHandle<Result<JobOutcome, PrintError>>,
}

impl JobHandle {
    /// Ask the job to stop before its next item.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job to end.
    pub fn join(self) -> Result<JobOutcome, PrintError> {
        self.handle
            .join()
            .map_err(|_| PrintError::render("print job thread panicked"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_closure_listener() {
        let mut seen = Vec::new();
        {
            let mut listener = |e: JobEvent| seen.push(e);
            listener.on_event(JobEvent::PageFinished { page: 0, items: 3 });
        }
        assert_eq!(seen, vec![JobEvent::PageFinished { page: 0, items: 3 }]);
    }

    #[test]
    fn test_outcome_is_aborted() {
        assert!(JobOutcome::Aborted { pages: 1, items: 2 }.is_aborted());
        assert!(!JobOutcome::Completed {
            path: PathBuf::from("x.pdf"),
            pages: 1,
            items: 2,
            opened: false,
        }
        .is_aborted());
    }
}
