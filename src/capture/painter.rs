//! Rasterizer: executes a display list into a device-pixel pixmap.
//!
//! All geometry is scaled once, up front, by the device-pixel ratio;
//! tiny-skia paths and shaders do the heavy lifting, with a small box
//! blur tower standing in for Gaussian blur on shadows and the glass
//! backdrop.

use crate::capture::display_list::{
    BackdropBlurItem, BoxShadowItem, DisplayItem, DisplayList, FillCircleItem, FillRectItem,
    FillRoundedRectItem, GlyphRunItem, LinearGradientItem, StrokeRoundedRectItem,
};
use crate::error::{CardError, CardResult};
use crate::style::{Color, Gradient};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, GradientStop, IntRect, LinearGradient, Paint, Path,
    PathBuilder, Pattern, Pixmap, PixmapPaint, Point, SpreadMode, Stroke, Transform,
};

/// Circle-to-cubic control distance for quarter arcs
const KAPPA: f32 = 0.552_284_8;

/// Three box passes of this diameter approximate a Gaussian of sigma
fn box_diameter(sigma: f32) -> usize {
    ((sigma * 1.88).round() as usize).max(1)
}

fn ts_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(
        color.r,
        color.g,
        color.b,
        (color.a * 255.0).round().clamp(0.0, 255.0) as u8,
    )
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(ts_color(color));
    paint.anti_alias = true;
    paint
}

/// Rounded-rect outline as cubic arcs; falls back to a plain rect when
/// the radius is zero
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.clamp(0.0, (w / 2.0).min(h / 2.0));
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(tiny_skia::Rect::from_xywh(
            x, y, w, h,
        )?));
    }

    let (x1, y1) = (x + w, y + h);
    let c = KAPPA * r;
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x1 - r, y);
    pb.cubic_to(x1 - r + c, y, x1, y + r - c, x1, y + r);
    pb.line_to(x1, y1 - r);
    pb.cubic_to(x1, y1 - r + c, x1 - r + c, y1, x1 - r, y1);
    pb.line_to(x + r, y1);
    pb.cubic_to(x + r - c, y1, x, y1 - r + c, x, y1 - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - c, x + r - c, y, x + r, y);
    pb.close();
    pb.finish()
}

/// CSS gradient line endpoints: through the box center at the given
/// angle (0 = up, clockwise), long enough to project onto every corner
fn gradient_line(x: f32, y: f32, w: f32, h: f32, angle_deg: f32) -> (Point, Point) {
    let theta = angle_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (cx, cy) = (x + w / 2.0, y + h / 2.0);
    let half_len = (w * sin.abs() + h * cos.abs()) / 2.0;
    let (dx, dy) = (sin * half_len, -cos * half_len);
    (
        Point::from_xy(cx - dx, cy - dy),
        Point::from_xy(cx + dx, cy + dy),
    )
}

/// One edge-clamped box pass over premultiplied RGBA, one axis
fn box_blur_pass(src: &[u8], dst: &mut [u8], w: usize, h: usize, radius: usize, horizontal: bool) {
    let (len, lanes) = if horizontal { (w, h) } else { (h, w) };
    let index = |lane: usize, i: usize| -> usize {
        if horizontal {
            (lane * w + i) * 4
        } else {
            (i * w + lane) * 4
        }
    };
    let window = (2 * radius + 1) as u32;

    for lane in 0..lanes {
        let mut sums = [0u32; 4];
        for i in 0..window as usize {
            let at = (i as isize - radius as isize).clamp(0, len as isize - 1) as usize;
            let p = index(lane, at);
            for c in 0..4 {
                sums[c] += src[p + c] as u32;
            }
        }
        for i in 0..len {
            let p = index(lane, i);
            for c in 0..4 {
                dst[p + c] = ((sums[c] + window / 2) / window) as u8;
            }
            let leaving = index(
                lane,
                (i as isize - radius as isize).clamp(0, len as isize - 1) as usize,
            );
            let entering = index(
                lane,
                (i as isize + radius as isize + 1).clamp(0, len as isize - 1) as usize,
            );
            for c in 0..4 {
                sums[c] += src[entering + c] as u32;
                sums[c] -= src[leaving + c] as u32;
            }
        }
    }
}

/// Approximate Gaussian blur: three box passes per axis
fn blur_rgba(data: &mut [u8], w: usize, h: usize, sigma: f32) {
    if sigma <= 0.0 || w == 0 || h == 0 {
        return;
    }
    let radius = (box_diameter(sigma) / 2).max(1);
    let mut temp = data.to_vec();
    for _ in 0..3 {
        box_blur_pass(data, &mut temp, w, h, radius, true);
        box_blur_pass(&temp, data, w, h, radius, false);
    }
}

/// Blit one font8x8 glyph, nearest-neighbor scaled to the cell box
fn draw_glyph(pixmap: &mut Pixmap, ch: char, x: f32, y: f32, cell_w: f32, cell_h: f32, color: Color) {
    let Some(bitmap) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
        return;
    };
    let (pw, ph) = (pixmap.width() as i32, pixmap.height() as i32);
    let x0 = x.round() as i32;
    let y0 = y.round() as i32;
    let x1 = (x + cell_w).round() as i32;
    let y1 = (y + cell_h).round() as i32;
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let (cw, chh) = (x1 - x0, y1 - y0);

    let alpha = color.a.clamp(0.0, 1.0);
    let src = [
        color.r as f32 / 255.0 * alpha,
        color.g as f32 / 255.0 * alpha,
        color.b as f32 / 255.0 * alpha,
        alpha,
    ];
    let inv = 1.0 - alpha;
    let stride = pixmap.width() as usize * 4;
    let data = pixmap.data_mut();

    for py in y0.max(0)..y1.min(ph) {
        let sy = ((py - y0) * 8 / chh).min(7) as usize;
        let bits = bitmap[sy];
        for px in x0.max(0)..x1.min(pw) {
            let sx = ((px - x0) * 8 / cw).min(7) as u32;
            if bits & (1 << sx) == 0 {
                continue;
            }
            let p = py as usize * stride + px as usize * 4;
            for c in 0..4 {
                let dst = data[p + c] as f32 / 255.0;
                data[p + c] = ((src[c] + dst * inv) * 255.0).round() as u8;
            }
        }
    }
}

/// Executes display lists at a fixed device-pixel ratio.
pub struct Painter {
    scale: f32,
}

impl Painter {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            scale: pixel_ratio as f32,
        }
    }

    fn d(&self, v: f64) -> f32 {
        v as f32 * self.scale
    }

    /// Rasterize the whole list into a freshly allocated pixmap.
    pub fn paint(&self, list: &DisplayList) -> CardResult<Pixmap> {
        let width = self.d(list.width).round() as u32;
        let height = self.d(list.height).round() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| CardError::CaptureFailed {
            reason: format!("cannot allocate a {width}x{height} raster target"),
        })?;

        for item in &list.items {
            match item {
                DisplayItem::FillRect(item) => self.fill_rect(&mut pixmap, item),
                DisplayItem::FillRoundedRect(item) => self.fill_rounded_rect(&mut pixmap, item),
                DisplayItem::StrokeRoundedRect(item) => self.stroke_rounded_rect(&mut pixmap, item),
                DisplayItem::LinearGradient(item) => self.fill_gradient(&mut pixmap, item),
                DisplayItem::BoxShadow(item) => self.box_shadow(&mut pixmap, item),
                DisplayItem::BackdropBlur(item) => self.backdrop_blur(&mut pixmap, item),
                DisplayItem::FillCircle(item) => self.fill_circle(&mut pixmap, item),
                DisplayItem::GlyphRun(item) => self.glyph_run(&mut pixmap, item),
            }
        }
        Ok(pixmap)
    }

    fn fill_rect(&self, pixmap: &mut Pixmap, item: &FillRectItem) {
        if !item.color.is_visible() {
            return;
        }
        if let Some(rect) = tiny_skia::Rect::from_xywh(
            self.d(item.rect.x),
            self.d(item.rect.y),
            self.d(item.rect.w),
            self.d(item.rect.h),
        ) {
            pixmap.fill_rect(rect, &solid_paint(item.color), Transform::identity(), None);
        }
    }

    fn fill_rounded_rect(&self, pixmap: &mut Pixmap, item: &FillRoundedRectItem) {
        if !item.color.is_visible() {
            return;
        }
        if let Some(path) = rounded_rect_path(
            self.d(item.rect.x),
            self.d(item.rect.y),
            self.d(item.rect.w),
            self.d(item.rect.h),
            self.d(item.radius),
        ) {
            pixmap.fill_path(
                &path,
                &solid_paint(item.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_rounded_rect(&self, pixmap: &mut Pixmap, item: &StrokeRoundedRectItem) {
        if !item.color.is_visible() || item.width <= 0.0 {
            return;
        }
        if let Some(path) = rounded_rect_path(
            self.d(item.rect.x),
            self.d(item.rect.y),
            self.d(item.rect.w),
            self.d(item.rect.h),
            self.d(item.radius),
        ) {
            let stroke = Stroke {
                width: self.d(item.width),
                ..Stroke::default()
            };
            pixmap.stroke_path(
                &path,
                &solid_paint(item.color),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_gradient(&self, pixmap: &mut Pixmap, item: &LinearGradientItem) {
        let Gradient {
            angle_deg,
            from,
            to,
        } = item.gradient;
        let (x, y, w, h) = (
            self.d(item.rect.x),
            self.d(item.rect.y),
            self.d(item.rect.w),
            self.d(item.rect.h),
        );
        let (start, end) = gradient_line(x, y, w, h, angle_deg as f32);
        let Some(shader) = LinearGradient::new(
            start,
            end,
            vec![
                GradientStop::new(0.0, ts_color(from)),
                GradientStop::new(1.0, ts_color(to)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let Some(path) = rounded_rect_path(x, y, w, h, self.d(item.radius)) else {
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn box_shadow(&self, pixmap: &mut Pixmap, item: &BoxShadowItem) {
        if !item.shadow.color.is_visible() {
            return;
        }
        // CSS box-shadow blur radius is two standard deviations
        let sigma = self.d(item.shadow.blur / 2.0);
        let margin = (sigma * 3.0).ceil().max(2.0) as i32;
        let w = self.d(item.rect.w).ceil() as i32 + 2 * margin;
        let h = self.d(item.rect.h).ceil() as i32 + 2 * margin;
        let Some(mut scratch) = Pixmap::new(w.max(1) as u32, h.max(1) as u32) else {
            return;
        };
        if let Some(path) = rounded_rect_path(
            margin as f32,
            margin as f32,
            self.d(item.rect.w),
            self.d(item.rect.h),
            self.d(item.radius),
        ) {
            scratch.fill_path(
                &path,
                &solid_paint(item.shadow.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        let (sw, sh) = (scratch.width() as usize, scratch.height() as usize);
        blur_rgba(scratch.data_mut(), sw, sh, sigma);

        let dest_x = (self.d(item.rect.x + item.shadow.offset.x)).round() as i32 - margin;
        let dest_y = (self.d(item.rect.y + item.shadow.offset.y)).round() as i32 - margin;

        // Outer shadows never paint inside the border box; knock the
        // caster's footprint out of the blurred mask before compositing
        if let Some(hole) = rounded_rect_path(
            self.d(item.rect.x) - dest_x as f32,
            self.d(item.rect.y) - dest_y as f32,
            self.d(item.rect.w),
            self.d(item.rect.h),
            self.d(item.radius),
        ) {
            let mut clear = Paint::default();
            clear.blend_mode = BlendMode::Clear;
            clear.anti_alias = true;
            scratch.fill_path(&hole, &clear, FillRule::Winding, Transform::identity(), None);
        }
        pixmap.draw_pixmap(
            dest_x,
            dest_y,
            scratch.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn backdrop_blur(&self, pixmap: &mut Pixmap, item: &BackdropBlurItem) {
        // CSS filter blur: the radius is one standard deviation
        let sigma = self.d(item.blur);
        let margin = (sigma * 3.0).ceil() as i32;
        let x0 = (self.d(item.rect.x) as i32 - margin).max(0);
        let y0 = (self.d(item.rect.y) as i32 - margin).max(0);
        let x1 = ((self.d(item.rect.x + item.rect.w)).ceil() as i32 + margin)
            .min(pixmap.width() as i32);
        let y1 = ((self.d(item.rect.y + item.rect.h)).ceil() as i32 + margin)
            .min(pixmap.height() as i32);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let Some(region) = IntRect::from_xywh(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32) else {
            return;
        };
        let Some(mut backdrop) = pixmap.clone_rect(region) else {
            return;
        };
        let (bw, bh) = (backdrop.width() as usize, backdrop.height() as usize);
        blur_rgba(backdrop.data_mut(), bw, bh, sigma);

        // Write the blurred backdrop back, clipped to the rounded window
        let Some(path) = rounded_rect_path(
            self.d(item.rect.x),
            self.d(item.rect.y),
            self.d(item.rect.w),
            self.d(item.rect.h),
            self.d(item.radius),
        ) else {
            return;
        };
        let shader = Pattern::new(
            backdrop.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Nearest,
            1.0,
            Transform::from_translate(x0 as f32, y0 as f32),
        );
        let mut paint = Paint::default();
        paint.shader = shader;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn fill_circle(&self, pixmap: &mut Pixmap, item: &FillCircleItem) {
        if let Some(path) =
            PathBuilder::from_circle(self.d(item.cx), self.d(item.cy), self.d(item.radius))
        {
            pixmap.fill_path(
                &path,
                &solid_paint(item.color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn glyph_run(&self, pixmap: &mut Pixmap, item: &GlyphRunItem) {
        for glyph in &item.glyphs {
            if glyph.ch == ' ' {
                continue;
            }
            draw_glyph(
                pixmap,
                glyph.ch,
                self.d(glyph.x),
                self.d(glyph.y),
                self.d(item.cell_w),
                self.d(item.cell_h),
                glyph.color,
            );
        }
    }
}
