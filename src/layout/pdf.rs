//! Multi-page PDF output.
//!
//! Card rasters become image XObjects, drawn with a `cm` transform into their
//! cell. Rasters with transparency carry a soft mask. Border assets are
//! embedded once per shape and reused on every card. Overlays are vector
//! strokes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use rustc_hash::FxHashMap;
use tiny_skia::Pixmap;
use tracing::debug;

use super::overlay::Overlay;
use super::sink::PageSink;
use crate::cards::CardShape;
use crate::core::{PageSize, PrintError, Rect};

struct OpenPage {
    operations: Vec<Operation>,
    xobjects: Dictionary,
    next_image: usize,
}

impl OpenPage {
    fn new() -> Self {
        Self {
            operations: Vec::new(),
            xobjects: Dictionary::new(),
            next_image: 0,
        }
    }

    /// Register `image` on this page and draw it into `cell`.
    fn place(&mut self, image: ObjectId, cell: Rect, page_height: f32) {
        let name = format!("Im{}", self.next_image);
        self.next_image += 1;
        self.xobjects.set(name.as_bytes().to_vec(), image);

        let y = page_height - cell.bottom();
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    cell.width.into(),
                    0.into(),
                    0.into(),
                    cell.height.into(),
                    cell.x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
    }
}

/// `PageSink` writing a PDF file.
pub struct PdfSink {
    path: PathBuf,
    writer: Option<Box<dyn Write + Send>>,
    /// The file at `path` is ours and not yet complete.
    partial: bool,
    doc: Document,
    page_size: PageSize,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<OpenPage>,
    borders: FxHashMap<CardShape, ObjectId>,
}

impl PdfSink {
    /// Open `path` for writing.
    ///
    /// The file is created immediately so an unusable destination fails the
    /// job before anything is rendered.
    pub fn create(path: impl AsRef<Path>, page_size: PageSize) -> Result<Self, PrintError> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(PrintError::InvalidDestination {
                path,
                reason: "empty path".into(),
            });
        }
        if path.is_dir() {
            return Err(PrintError::InvalidDestination {
                path,
                reason: "is a directory".into(),
            });
        }
        let file = File::create(&path).map_err(|e| PrintError::destination(&path, e))?;
        Ok(Self::with_writer(path, BufWriter::new(file), page_size))
    }

    /// Sink writing to `writer`, with `path` as the partial file to remove
    /// on discard.
    fn with_writer(
        path: PathBuf,
        writer: impl Write + Send + 'static,
        page_size: PageSize,
    ) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            path,
            writer: Some(Box::new(writer)),
            partial: true,
            doc,
            page_size,
            pages_id,
            page_ids: Vec::new(),
            current: None,
            borders: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages closed so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&mut self) -> Result<&mut OpenPage, PrintError> {
        self.current
            .as_mut()
            .ok_or_else(|| PrintError::render("no open page"))
    }

    fn embed_image(&mut self, raster: &Pixmap) -> ObjectId {
        let (width, height) = (i64::from(raster.width()), i64::from(raster.height()));
        let pixels = raster.pixels();
        let mut rgb = Vec::with_capacity(pixels.len() * 3);
        let mut alpha = Vec::with_capacity(pixels.len());
        for pixel in pixels {
            let c = pixel.demultiply();
            rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
            alpha.push(c.alpha());
        }

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if alpha.iter().any(|a| *a != u8::MAX) {
            let mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                alpha,
            );
            let mask_id = self.doc.add_object(mask);
            dict.set("SMask", mask_id);
        }
        self.doc.add_object(Stream::new(dict, rgb))
    }
}

impl PageSink for PdfSink {
    fn begin_page(&mut self) -> Result<(), PrintError> {
        if self.current.is_some() {
            return Err(PrintError::render("previous page still open"));
        }
        self.current = Some(OpenPage::new());
        Ok(())
    }

    fn draw_card(&mut self, cell: Rect, raster: &Pixmap) -> Result<(), PrintError> {
        self.page()?;
        let image = self.embed_image(raster);
        let page_height = self.page_size.height;
        self.page()?.place(image, cell, page_height);
        Ok(())
    }

    fn draw_border(
        &mut self,
        cell: Rect,
        shape: CardShape,
        asset: &Pixmap,
    ) -> Result<(), PrintError> {
        self.page()?;
        let image = match self.borders.get(&shape) {
            Some(id) => *id,
            None => {
                let id = self.embed_image(asset);
                self.borders.insert(shape, id);
                id
            }
        };
        let page_height = self.page_size.height;
        self.page()?.place(image, cell, page_height);
        Ok(())
    }

    fn draw_overlay(&mut self, overlay: &Overlay) -> Result<(), PrintError> {
        let page_height = self.page_size.height;
        let page = self.page()?;
        if overlay.is_empty() {
            return Ok(());
        }

        let dash = match overlay.dash {
            Some(d) => vec![d.into(), d.into()],
            None => vec![],
        };
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![overlay.stroke_width.into()]),
            Operation::new("d", vec![Object::Array(dash), 0.into()]),
            Operation::new("RG", vec![0.into(), 0.into(), 0.into()]),
        ]);
        for s in &overlay.segments {
            page.operations.extend([
                Operation::new("m", vec![s.x1.into(), (page_height - s.y1).into()]),
                Operation::new("l", vec![s.x2.into(), (page_height - s.y2).into()]),
            ]);
        }
        page.operations.extend([Operation::new("S", vec![]), Operation::new("Q", vec![])]);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), PrintError> {
        let page = self
            .current
            .take()
            .ok_or_else(|| PrintError::render("no open page"))?;

        let content = Content {
            operations: page.operations,
        }
        .encode()
        .map_err(PrintError::render)?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                self.page_size.width.into(),
                self.page_size.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => page.xobjects,
            },
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PrintError> {
        if self.current.is_some() {
            self.end_page()?;
        }
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| PrintError::render("document already finished"))?;

        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        self.doc.save_to(&mut writer).map_err(PrintError::render)?;
        writer
            .flush()
            .map_err(|e| PrintError::destination(&self.path, e))?;
        self.partial = false;

        debug!(path = %self.path.display(), pages = self.page_ids.len(), "document written");
        Ok(())
    }

    fn discard(&mut self) {
        self.current = None;
        self.writer = None;
        if std::mem::take(&mut self.partial) {
            if let Err(e) = std::fs::remove_file(&self.path) {
                debug!(path = %self.path.display(), error = %e, "could not remove partial document");
            }
        }
    }
}
