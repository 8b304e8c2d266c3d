// File: crates/pullscope-render-skia/src/lib.rs
// Summary: Skia CPU raster surface implementing `RenderSurface`; draws scenes and encodes PNG.
// Notes:
// - Series and dots are clipped to the plot rectangle; overlays and labels are not.
// - Text uses the platform default typeface. Snapshot tests disable text because glyph
//   rasterization differs between hosts.

use std::io::Cursor;
use std::path::Path;

use pullscope_core::scene::{PathCmd, TextAlign};
use pullscope_core::{ChartError, ChartResult, RenderSurface, Rgba, Scene};
use skia_safe as skia;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SkiaError {
    #[error("failed to allocate a {width}x{height} raster surface")]
    SurfaceCreate { width: u32, height: u32 },

    #[error("surface has been released")]
    Released,

    #[error("failed to read back surface pixels")]
    ReadPixels,

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SkiaResult<T> = Result<T, SkiaError>;

/// Offscreen RGBA surface. One per mounted chart.
pub struct SkiaSurface {
    surface: Option<skia::Surface>,
    width: u32,
    height: u32,
    typeface: Option<skia::Typeface>,
    draw_text: bool,
    presented: u64,
}

impl SkiaSurface {
    pub fn new(width: u32, height: u32) -> SkiaResult<Self> {
        let surface = raster(width, height)?;
        let typeface = skia::FontMgr::default().legacy_make_typeface(None::<&str>, skia::FontStyle::default());
        if typeface.is_none() {
            warn!("no default typeface available; labels will not be drawn");
        }
        Ok(Self { surface: Some(surface), width, height, typeface, draw_text: true, presented: 0 })
    }

    /// Skip all text, for pixel-stable output across hosts.
    pub fn without_text(mut self) -> Self {
        self.draw_text = false;
        self
    }

    /// Reallocate at a new size. The next present draws into the new surface.
    pub fn resize(&mut self, width: u32, height: u32) -> SkiaResult<()> {
        if self.surface.is_none() {
            return Err(SkiaError::Released);
        }
        self.surface = Some(raster(width, height)?);
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Current pixels as unpremultiplied RGBA8, row-major.
    pub fn rgba8(&mut self) -> SkiaResult<Vec<u8>> {
        let (w, h) = (self.width, self.height);
        let surface = self.surface.as_mut().ok_or(SkiaError::Released)?;
        let info = skia::ImageInfo::new(
            (w as i32, h as i32),
            skia::ColorType::RGBA8888,
            skia::AlphaType::Unpremul,
            None,
        );
        let row_bytes = w as usize * 4;
        let mut pixels = vec![0u8; row_bytes * h as usize];
        if !surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            return Err(SkiaError::ReadPixels);
        }
        Ok(pixels)
    }

    pub fn encode_png(&mut self) -> SkiaResult<Vec<u8>> {
        let (w, h) = (self.width, self.height);
        let pixels = self.rgba8()?;
        let img = image::RgbaImage::from_raw(w, h, pixels).ok_or(SkiaError::ReadPixels)?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    pub fn write_png(&mut self, path: impl AsRef<Path>) -> SkiaResult<()> {
        let bytes = self.encode_png()?;
        if let Some(dir) = path.as_ref().parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), "wrote chart png");
        Ok(())
    }
}

impl RenderSurface for SkiaSurface {
    fn size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|_| (self.width, self.height))
    }

    fn present(&mut self, scene: &Scene) -> ChartResult<()> {
        let surface = self.surface.as_mut().ok_or_else(|| ChartError::Present(SkiaError::Released.to_string()))?;
        let font = if self.draw_text {
            self.typeface.clone().map(|tf| skia::Font::from_typeface(tf, 12.0))
        } else {
            None
        };
        draw_scene(surface.canvas(), scene, font);
        self.presented += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.surface.take().is_some() {
            debug!(presented = self.presented, "skia surface released");
        }
    }
}

fn raster(width: u32, height: u32) -> SkiaResult<skia::Surface> {
    skia::surfaces::raster_n32_premul((width as i32, height as i32))
        .ok_or(SkiaError::SurfaceCreate { width, height })
}

fn color(c: Rgba) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn stroke(c: Rgba, width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_color(color(c));
    paint
}

fn fill(c: Rgba) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(color(c));
    paint
}

/// Paint one frame. `font == None` skips labels.
pub fn draw_scene(canvas: &skia::Canvas, scene: &Scene, mut font: Option<skia::Font>) {
    canvas.clear(color(scene.background));

    for line in &scene.grid {
        canvas.draw_line(line.from, line.to, &stroke(line.color, line.width));
    }

    let plot = scene.plot;
    canvas.save();
    canvas.clip_rect(skia::Rect::from_ltrb(plot.left, plot.top, plot.right, plot.bottom), None, Some(true));
    for series in &scene.series {
        let mut path = skia::Path::new();
        for cmd in &series.cmds {
            match *cmd {
                PathCmd::MoveTo(x, y) => {
                    path.move_to((x, y));
                }
                PathCmd::LineTo(x, y) => {
                    path.line_to((x, y));
                }
                PathCmd::CubicTo { c1, c2, to } => {
                    path.cubic_to(c1, c2, to);
                }
            }
        }
        let mut paint = stroke(series.color, series.width);
        paint.set_stroke_join(skia::paint::Join::Round);
        canvas.draw_path(&path, &paint);
    }
    for dot in &scene.dots {
        canvas.draw_circle(dot.center, dot.radius, &fill(dot.color));
    }
    canvas.restore();

    for line in &scene.overlay {
        canvas.draw_line(line.from, line.to, &stroke(line.color, line.width));
    }
    for r in &scene.rects {
        canvas.draw_rect(skia::Rect::from_ltrb(r.left, r.top, r.right, r.bottom), &fill(r.color));
    }

    let Some(font) = font.as_mut() else { return };
    for label in &scene.labels {
        font.set_size(label.size);
        let paint = fill(label.color);
        let (advance, _) = font.measure_str(&label.text, Some(&paint));
        let x = match label.align {
            TextAlign::Left => label.at.0,
            TextAlign::Center => label.at.0 - advance * 0.5,
            TextAlign::Right => label.at.0 - advance,
        };
        canvas.draw_str(&label.text, (x, label.at.1), font, &paint);
    }
}
