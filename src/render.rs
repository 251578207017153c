//! Template image handling and layout export rendering
//!
//! The editor holds one decoded template per session: the raw RGBA pixels
//! for export rendering plus an iced handle for on-screen display. Exports
//! draw the markers onto a copy of the pixels with tiny-skia and encode
//! the result with the image crate.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use iced::widget::image::Handle;
use image::{Rgba, RgbaImage};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::error::LayoutError;
use crate::state::layout::Layout;

/// Marker disc radius on exported images, in pixels.
pub const MARKER_RADIUS: f32 = 5.0;
/// Vertical gap between a marker's center and its label, in pixels.
pub const LABEL_OFFSET: f32 = 10.0;
/// Label text height on exported images.
const LABEL_SCALE: f32 = 16.0;
/// Marker fill, matching the on-screen markers.
const MARKER_FILL: [u8; 4] = [255, 0, 0, 255];

/// A decoded keyboard template, held for the duration of a session.
#[derive(Debug)]
pub struct Template {
    path: PathBuf,
    pixels: RgbaImage,
    handle: Handle,
}

impl Template {
    /// Decode an image file into a session template.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let pixels = image::open(path)
            .map_err(|e| {
                LayoutError::MalformedData(format!("failed to decode {}: {e}", path.display()))
            })?
            .to_rgba8();
        let handle = Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone());
        Ok(Self {
            path: path.to_path_buf(),
            pixels,
            handle,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handle for drawing the template in the widget tree.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Whether a coordinate lies inside the template bounds.
    pub fn contains(&self, position: (f32, f32)) -> bool {
        position.0 >= 0.0
            && position.1 >= 0.0
            && position.0 < self.pixels.width() as f32
            && position.1 < self.pixels.height() as f32
    }

    /// Labels whose coordinates fall outside this template. Used to
    /// re-validate a layout that may have been authored against a
    /// different image.
    pub fn out_of_bounds<'a>(&self, layout: &'a Layout) -> Vec<&'a str> {
        layout
            .markers()
            .filter(|m| !self.contains(m.position))
            .map(|m| m.label.as_str())
            .collect()
    }

    /// Render the layout onto a copy of the template and encode it to
    /// `path`. The template pixels themselves are never touched.
    pub fn export_layout(&self, layout: &Layout, path: &Path) -> Result<(), LayoutError> {
        let rendered = render_layout(&self.pixels, layout);
        rendered.save(path).map_err(|e| {
            LayoutError::MalformedData(format!("failed to write {}: {e}", path.display()))
        })
    }
}

/// Draw filled marker discs and their labels onto a copy of `template`.
pub fn render_layout(template: &RgbaImage, layout: &Layout) -> RgbaImage {
    let mut img = template.clone();
    draw_markers(&mut img, layout);

    match label_font() {
        Some(font) => {
            for marker in layout.markers() {
                draw_label(&mut img, &font, &marker.label, marker.position);
            }
        }
        None => eprintln!("⚠️  No system font found, exporting markers without labels"),
    }

    img
}

/// Convert RgbaImage to Pixmap, apply a drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn draw_markers(img: &mut RgbaImage, layout: &Layout) {
    with_pixmap(img, |pixmap| {
        let [r, g, b, a] = MARKER_FILL;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        for marker in layout.markers() {
            let (x, y) = marker.position;
            let mut pb = PathBuilder::new();
            pb.push_circle(x, y, MARKER_RADIUS);
            let Some(path) = pb.finish() else {
                continue;
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    });
}

/// Locate a system sans-serif face for label rendering.
fn label_font() -> Option<FontVec> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
    })?
}

/// Rasterize `text` in black, centered above the marker position.
fn draw_label(img: &mut RgbaImage, font: &FontVec, text: &str, position: (f32, f32)) {
    let scale = PxScale::from(LABEL_SCALE);
    let scaled = font.as_scaled(scale);

    let width: f32 = text
        .chars()
        .map(|c| scaled.h_advance(scaled.glyph_id(c)))
        .sum();
    let mut caret = position.0 - width / 2.0;
    let baseline = position.1 - LABEL_OFFSET;

    let (img_w, img_h) = (img.width() as i32, img.height() as i32);
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            if px < 0 || py < 0 || px >= img_w || py >= img_h {
                return;
            }
            blend_ink(img.get_pixel_mut(px as u32, py as u32), coverage);
        });
    }
}

/// Source-over blend of black label ink at `coverage` onto one pixel.
fn blend_ink(pixel: &mut Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0);
    for channel in 0..3 {
        let base = pixel[channel] as f32;
        pixel[channel] = (base * (1.0 - alpha)) as u8;
    }
    let a = pixel[3] as f32;
    pixel[3] = (a + (255.0 - a) * alpha) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_template(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_render_paints_a_disc_at_each_marker() {
        let template = white_template(60, 60);
        let mut layout = Layout::new();
        layout.add("Q", (30.0, 40.0)).unwrap();

        let rendered = render_layout(&template, &layout);

        let center = rendered.get_pixel(30, 40);
        assert_eq!(center[0], 255);
        assert_eq!(center[1], 0);
        assert_eq!(center[2], 0);

        let corner = rendered.get_pixel(0, 59);
        assert_eq!(corner, &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_render_does_not_touch_the_template() {
        let template = white_template(20, 20);
        let mut layout = Layout::new();
        layout.add("A", (10.0, 10.0)).unwrap();

        let _ = render_layout(&template, &layout);

        assert_eq!(template.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_template_load_and_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.png");
        white_template(40, 30).save(&path).unwrap();

        let template = Template::load(&path).unwrap();
        assert_eq!((template.width(), template.height()), (40, 30));
        assert!(template.contains((0.0, 0.0)));
        assert!(template.contains((39.5, 29.5)));
        assert!(!template.contains((40.0, 0.0)));
        assert!(!template.contains((-1.0, 5.0)));
    }

    #[test]
    fn test_out_of_bounds_reports_stray_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.png");
        white_template(40, 30).save(&path).unwrap();
        let template = Template::load(&path).unwrap();

        let mut layout = Layout::new();
        layout.add("A", (10.0, 10.0)).unwrap();
        layout.add("B", (100.0, 10.0)).unwrap();

        assert_eq!(template.out_of_bounds(&layout), ["B"]);
    }

    #[test]
    fn test_load_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"plainly not a PNG").unwrap();

        let err = Template::load(&path).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_export_writes_a_decodable_image() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("template.png");
        white_template(50, 50).save(&template_path).unwrap();
        let template = Template::load(&template_path).unwrap();

        let mut layout = Layout::new();
        layout.add("Q", (25.0, 25.0)).unwrap();

        let out = dir.path().join("layout.png");
        template.export_layout(&layout, &out).unwrap();

        let reread = image::open(&out).unwrap().to_rgba8();
        let center = reread.get_pixel(25, 25);
        assert_eq!((center[0], center[1], center[2]), (255, 0, 0));
    }
}
