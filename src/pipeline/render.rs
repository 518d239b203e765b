//! PDF rasterisation: the backend seam and its pdfium implementation.
//!
//! The pipeline never talks to pdfium directly. It sees a [`PdfBackend`]
//! that decodes bytes into a [`PageSource`], which in turn renders single
//! pages. [`PdfiumBackend`] is the production implementation; tests plug in
//! an in-memory fake.
//!
//! ## Why flatten after rendering?
//!
//! Renderers composite page content with transparency. JPEG has no alpha
//! channel, so a transparent pixel encoded as-is comes out black. pdfium is
//! asked to clear to the background colour, and [`flatten_onto`] then
//! composites whatever the backend returned onto that colour, so every
//! backend yields the configured background.

use crate::config::Rgb;
use crate::error::{Pdf2JpgError, RenderError};
use crate::output::DocumentMetadata;
use image::{DynamicImage, Rgb as RgbPixel, RgbImage};
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Opens documents from their bytes.
pub trait PdfBackend: Send + Sync {
    /// Decode `bytes` into a document whose pages can be rendered.
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, RenderError>;
}

/// A decoded document. Read-only: rendering never mutates it.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Render 1-indexed `page_num` at `scale` over `background`.
    fn render_page(
        &self,
        page_num: usize,
        scale: f32,
        background: Rgb,
    ) -> Result<DynamicImage, RenderError>;

    /// Document information. Backends without metadata report the page count only.
    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            page_count: self.page_count(),
            ..Default::default()
        }
    }
}

/// Pixel rectangle a page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Page size in points times `scale`, each axis rounded up, at least 1 px.
    pub fn new(width_pts: f32, height_pts: f32, scale: f32) -> Self {
        let px = |pts: f32| ((pts * scale).ceil().max(1.0)) as u32;
        Self {
            width: px(width_pts),
            height: px(height_pts),
        }
    }
}

/// Composite `image` onto an opaque `background`, dropping the alpha channel.
pub fn flatten_onto(image: &DynamicImage, background: Rgb) -> RgbImage {
    let rgba = image.to_rgba8();
    let bg = [background.r, background.g, background.b];
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |fg: u8, bg: u8| -> u8 {
            let a = a as u32;
            ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
        };
        RgbPixel([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
    })
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// Process-wide pdfium instance; pdfium must be initialised once.
static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// The pdfium-render backend.
#[derive(Clone, Copy)]
pub struct PdfiumBackend {
    pdfium: &'static Pdfium,
}

impl PdfiumBackend {
    /// Bind to the pdfium library, reusing an earlier binding.
    ///
    /// Search order:
    /// 1. `PDFIUM_LIB_PATH` (the library file or its directory)
    /// 2. next to the running executable
    /// 3. the working directory and `./lib`
    /// 4. the system library
    ///
    /// Concurrent first calls wait on a single binding attempt; only one
    /// `Pdfium` is ever constructed.
    pub fn bind() -> Result<Self, Pdf2JpgError> {
        let pdfium = PDFIUM.get_or_try_init(|| bind_library().map(Pdfium::new))?;
        Ok(Self { pdfium })
    }

    /// The bound pdfium instance, e.g. for building test documents.
    pub fn pdfium(&self) -> &'static Pdfium {
        self.pdfium
    }
}

fn bind_library() -> Result<Box<dyn PdfiumLibraryBindings>, Pdf2JpgError> {
    let mut last_err = None;
    for path in library_candidates() {
        if !path.exists() {
            continue;
        }
        match Pdfium::bind_to_library(&path) {
            Ok(bindings) => {
                info!("Bound pdfium from {}", path.display());
                return Ok(bindings);
            }
            Err(e) => {
                warn!("Could not bind pdfium at {}: {:?}", path.display(), e);
                last_err = Some(format!("{}: {:?}", path.display(), e));
            }
        }
    }

    Pdfium::bind_to_system_library()
        .inspect(|_| info!("Bound system pdfium library"))
        .map_err(|e| {
            let system = format!("system library: {e:?}");
            Pdf2JpgError::PdfiumBindingFailed(match last_err {
                Some(prev) => format!("{prev}; {system}"),
                None => system,
            })
        })
}

fn library_candidates() -> Vec<PathBuf> {
    let env_path = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    candidate_paths(env_path, exe_dir)
}

/// Library files to try, in order. A directory in `env_path` means the
/// platform library inside it.
fn candidate_paths(env_path: Option<PathBuf>, exe_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = env_path {
        if p.is_dir() {
            paths.push(Pdfium::pdfium_platform_library_name_at_path(&p));
        } else {
            paths.push(p);
        }
    }

    if let Some(exe_dir) = exe_dir {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }

    paths.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    paths.push(Pdfium::pdfium_platform_library_name_at_path("./lib/"));
    paths
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&'a str>,
    ) -> Result<Box<dyn PageSource + 'a>, RenderError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| RenderError::Decode(format!("{e:?}")))?;
        let page_count = document.pages().len() as usize;
        info!("PDF loaded: {} pages", page_count);
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(
        &self,
        page_num: usize,
        scale: f32,
        background: Rgb,
    ) -> Result<DynamicImage, RenderError> {
        let index = page_num
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| RenderError::PageUnavailable {
                page: page_num,
                detail: "page number out of range".into(),
            })?;

        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| RenderError::PageUnavailable {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let viewport = Viewport::new(page.width().value, page.height().value, scale);
        let render_config = PdfRenderConfig::new()
            .set_target_size(viewport.width as i32, viewport.height as i32)
            .set_clear_color(PdfColor::new(background.r, background.g, background.b, 255));

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::Render {
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}
