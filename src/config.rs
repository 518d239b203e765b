//! Configuration types for PDF-to-JPEG conversion.
//!
//! All conversion behaviour is controlled through [`ConversionOptions`],
//! built via its [`ConversionOptionsBuilder`]. A run takes a snapshot (clone)
//! of the options when it starts, so changing the session's options while a
//! run is in flight never affects that run.

use crate::error::Pdf2JpgError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest accepted rendering scale.
pub const MIN_SCALE: f32 = 0.75;
/// Largest accepted rendering scale.
pub const MAX_SCALE: f32 = 4.0;
/// Lowest accepted JPEG quality.
pub const MIN_QUALITY: f32 = 0.5;
/// Highest accepted JPEG quality.
pub const MAX_QUALITY: f32 = 1.0;

/// Options for one conversion run.
///
/// Built via [`ConversionOptions::builder()`] or using
/// [`ConversionOptions::default()`].
///
/// # Example
/// ```rust
/// use pdf2jpg::{ConversionOptions, Rgb};
///
/// let options = ConversionOptions::builder()
///     .scale(3.0)
///     .quality(0.85)
///     .pages("1-3, 5")
///     .background(Rgb::new(255, 255, 240))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Rendering magnification. Range: 0.75–4.0. Default: 2.0.
    ///
    /// A scale of 1.0 renders one pixel per PDF point (72 per inch), so the
    /// default 2.0 gives 144 DPI output. Higher is sharper and slower.
    pub scale: f32,

    /// JPEG encode quality in [0.5, 1.0]. Default: 0.92.
    pub quality: f32,

    /// Colour painted behind the page content. Default: white.
    ///
    /// JPEG has no alpha channel; transparent page regions take this colour.
    pub background: Rgb,

    /// Page range expression, e.g. `"1-3, 5, 8"`. Empty selects every page.
    pub pages: String,

    /// PDF user password for encrypted documents.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Receives per-page progress events.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            quality: 0.92,
            background: Rgb::WHITE,
            pages: String::new(),
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("scale", &self.scale)
            .field("quality", &self.quality)
            .field("background", &self.background)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionOptions {
    /// Create a new builder for `ConversionOptions`.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Whether switching from `self` to `other` changes what the first-page
    /// preview looks like (scale, quality or background).
    pub fn affects_preview(&self, other: &ConversionOptions) -> bool {
        self.scale != other.scale
            || self.quality != other.quality
            || self.background != other.background
    }

    pub(crate) fn validate(&self) -> Result<(), Pdf2JpgError> {
        if !self.scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&self.scale) {
            return Err(Pdf2JpgError::InvalidConfig(format!(
                "scale must be {MIN_SCALE}–{MAX_SCALE}, got {}",
                self.scale
            )));
        }
        if !self.quality.is_finite() || !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(Pdf2JpgError::InvalidConfig(format!(
                "quality must be {MIN_QUALITY}–{MAX_QUALITY}, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionOptions`].
#[derive(Debug)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    /// Out-of-range values are clamped; NaN is rejected by [`build`](Self::build).
    pub fn scale(mut self, scale: f32) -> Self {
        self.options.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self
    }

    /// Out-of-range values are clamped; NaN is rejected by [`build`](Self::build).
    pub fn quality(mut self, quality: f32) -> Self {
        self.options.quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);
        self
    }

    pub fn background(mut self, color: Rgb) -> Self {
        self.options.background = color;
        self
    }

    pub fn pages(mut self, spec: impl Into<String>) -> Self {
        self.options.pages = spec.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.options.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.options.progress_callback = Some(cb);
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<ConversionOptions, Pdf2JpgError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

// ── Colour ───────────────────────────────────────────────────────────────

/// An opaque RGB colour, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Pdf2JpgError;

    /// Accepts `#rrggbb`, `rrggbb` and the short `#rgb` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            Pdf2JpgError::InvalidConfig(format!("invalid colour '{s}', expected #rrggbb"))
        };
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc is shorthand for #aabbcc
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Rgb::new(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = Pdf2JpgError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}
