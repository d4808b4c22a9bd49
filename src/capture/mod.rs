//! Capture pipeline: visual tree in, encoded PNG artifact out.
//!
//! The pipeline is two stages. Layout flattens the tree into a display
//! list at authored CSS-pixel geometry; the painter rasterizes that list
//! at the requested device-pixel ratio. The encoded artifact carries its
//! device dimensions so callers never have to re-derive them.

pub mod display_list;
pub mod painter;

pub use display_list::{build_display_list, DisplayItem, DisplayList, Rect};
pub use painter::Painter;

use crate::card::VisualTree;
use crate::error::{CardError, CardResult};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Largest device-pixel edge we will rasterize when auto scale-down is
/// allowed; mirrors the usual canvas size ceiling
const MAX_DEVICE_EDGE: u32 = 16_384;

/// Knobs for one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    /// Re-fetch referenced resources instead of reusing cached copies.
    /// This renderer embeds everything it draws, so the flag is carried
    /// for call-site parity and recorded in the capture log.
    pub cache_bust: bool,
    /// Capture at full authored size even past the device edge ceiling
    pub skip_auto_scale: bool,
    /// Device pixels per CSS pixel
    pub pixel_ratio: f64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            cache_bust: true,
            skip_auto_scale: true,
            pixel_ratio: 2.0,
        }
    }
}

/// One finished capture: PNG bytes plus their device-pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureArtifact {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CaptureArtifact {
    pub fn len(&self) -> usize {
        self.png.len()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}

fn effective_ratio(width: f64, height: f64, options: &CaptureOptions) -> f64 {
    let ratio = options.pixel_ratio.max(0.0);
    if options.skip_auto_scale {
        return ratio;
    }
    let edge = width.max(height);
    if edge * ratio > MAX_DEVICE_EDGE as f64 {
        MAX_DEVICE_EDGE as f64 / edge
    } else {
        ratio
    }
}

/// Rasterize the card and encode it as a PNG.
///
/// A capture that would produce zero pixels or zero bytes fails with
/// [`CardError::CaptureEmpty`] instead of returning a blank artifact.
pub async fn capture(tree: &VisualTree, options: &CaptureOptions) -> CardResult<CaptureArtifact> {
    let list = build_display_list(tree);
    let ratio = effective_ratio(list.width, list.height, options);
    let width = (list.width * ratio).round() as u32;
    let height = (list.height * ratio).round() as u32;
    debug!(
        width,
        height,
        pixel_ratio = ratio,
        cache_bust = options.cache_bust,
        items = list.items.len(),
        "capturing card"
    );
    if width == 0 || height == 0 {
        return Err(CardError::CaptureEmpty { width, height });
    }

    // Rasterization is pure CPU work; keep it off the async workers
    let pixmap = tokio::task::spawn_blocking(move || Painter::new(ratio).paint(&list))
        .await
        .map_err(|_| CardError::CaptureFailed {
            reason: "raster task aborted".to_owned(),
        })??;

    // The artifact reports the raster target's dimensions, never the
    // pre-check estimate, so they always match the encoded PNG
    let (width, height) = (pixmap.width(), pixmap.height());

    // tiny-skia stores premultiplied alpha; PNG wants straight alpha
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let image =
        image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| CardError::CaptureFailed {
            reason: "raster buffer does not match its dimensions".to_owned(),
        })?;
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    if png.is_empty() {
        return Err(CardError::CaptureEmpty { width, height });
    }
    Ok(CaptureArtifact { png, width, height })
}
