//! Side-by-side overlay renderer.
//!
//! The left half of the output is the original image; the right half is a
//! white canvas of the same size carrying a red box and the recognized text
//! for every span.

use std::path::Path;

use ab_glyph::FontVec;
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::ConfigError;
use crate::model::{ArtifactKind, OutputMode, TextSpan};
use crate::storage::{file_stem, ArtifactStorage};

use super::pdf::jpeg_page_pdf;
use super::{RenderError, RenderedArtifacts, Renderer};

const BBOX_COLOR: Rgb<u8> = Rgb([220, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const FALLBACK_FONTS: [&str; 3] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Drawing settings. Without a font only the boxes are drawn.
pub struct OverlayStyle {
    pub font: Option<FontVec>,
    pub font_scale: f32,
    pub bbox_thickness: i32,
    pub jpeg_quality: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 16.0,
            bbox_thickness: 1,
            jpeg_quality: 90,
        }
    }
}

impl OverlayStyle {
    /// Builds a style from config, loading the configured font or, when
    /// none is configured, the first readable system font.
    pub fn from_config(config: &RenderConfig) -> Result<Self, ConfigError> {
        let font = match &config.font_path {
            Some(path) => Some(load_font(Path::new(path))?),
            None => system_font(),
        };

        Ok(Self {
            font,
            font_scale: config.font_scale,
            bbox_thickness: config.bbox_thickness,
            jpeg_quality: config.jpeg_quality,
        })
    }
}

fn load_font(path: &Path) -> Result<FontVec, ConfigError> {
    let data = std::fs::read(path).map_err(|e| ConfigError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    FontVec::try_from_vec(data).map_err(|_| ConfigError::Font {
        path: path.to_path_buf(),
        reason: "not a valid TrueType/OpenType font".to_string(),
    })
}

fn system_font() -> Option<FontVec> {
    for path in FALLBACK_FONTS {
        if let Ok(font) = load_font(Path::new(path)) {
            info!("Loaded system font: {}", path);
            return Some(font);
        }
    }
    debug!("No system font found, span text will not be drawn");
    None
}

pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Composes the side-by-side visualization for `original`.
    pub fn compose(&self, original: &RgbImage, spans: &[TextSpan]) -> RgbImage {
        let (width, height) = original.dimensions();
        let mut canvas = RgbImage::new(width * 2, height);

        imageops::overlay(&mut canvas, original, 0, 0);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(width as i32, 0).of_size(width, height),
            BACKGROUND_COLOR,
        );

        for span in spans {
            self.draw_span(&mut canvas, span, width as i32);
        }
        canvas
    }

    fn draw_span(&self, canvas: &mut RgbImage, span: &TextSpan, x_offset: i32) {
        let (canvas_width, canvas_height) = (i64::from(canvas.width()), i64::from(canvas.height()));
        let Some((left, top, width, height)) = span_extent(span, x_offset) else {
            debug!("Skipping span with out-of-range box {:?}", span.bbox);
            return;
        };

        for t in 0..i64::from(self.style.bbox_thickness.max(1)) {
            let (x, y) = (left - t, top - t);
            let (w, h) = (width + 2 * t, height + 2 * t);
            if x < i64::from(x_offset) || y < 0 || x + w > canvas_width || y + h > canvas_height {
                continue;
            }
            if let Some(rect) = to_rect(x, y, w, h) {
                draw_hollow_rect_mut(canvas, rect, BBOX_COLOR);
            }
        }

        if let Some(font) = &self.style.font {
            let inside = left >= i64::from(x_offset)
                && left < canvas_width
                && (0..canvas_height).contains(&top);
            if !span.text.is_empty() && inside {
                if let (Ok(x), Ok(y)) = (i32::try_from(left), i32::try_from(top)) {
                    draw_text_mut(canvas, TEXT_COLOR, x, y, self.style.font_scale, font, &span.text);
                }
            }
        }
    }

    fn encode_jpeg(&self, image: &RgbImage) -> Result<Vec<u8>, RenderError> {
        let mut buffer = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, self.style.jpeg_quality);
        encoder
            .encode_image(image)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buffer)
    }
}

/// Canvas position and size of a span's box, or `None` when the box is
/// empty or its coordinates do not fit the drawing surface.
fn span_extent(span: &TextSpan, x_offset: i32) -> Option<(i64, i64, i64, i64)> {
    let [x1, y1, _, _] = span.bbox;
    let width = i64::from(u32::try_from(span.width()).ok()?);
    let height = i64::from(u32::try_from(span.height()).ok()?);
    if width == 0 || height == 0 {
        return None;
    }
    let left = i64::from(i32::try_from(x1).ok()?.checked_add(x_offset)?);
    let top = i64::from(i32::try_from(y1).ok()?);
    Some((left, top, width, height))
}

fn to_rect(x: i64, y: i64, w: i64, h: i64) -> Option<Rect> {
    Some(Rect::at(i32::try_from(x).ok()?, i32::try_from(y).ok()?)
        .of_size(u32::try_from(w).ok()?, u32::try_from(h).ok()?))
}

impl Renderer for OverlayRenderer {
    fn render(
        &self,
        source: &Path,
        spans: &[TextSpan],
        output_dir: &Path,
        mode: OutputMode,
    ) -> Result<RenderedArtifacts, RenderError> {
        let _span = tracing::info_span!("render.overlay", spans = spans.len()).entered();

        let original = image::open(source)
            .map_err(|e| RenderError::LoadImage {
                path: source.to_path_buf(),
                source: e,
            })?
            .to_rgb8();
        if original.width() == 0 || original.height() == 0 {
            return Err(RenderError::EmptyImage(source.to_path_buf()));
        }

        let composite = self.compose(&original, spans);
        let jpeg = self.encode_jpeg(&composite)?;
        let pdf = jpeg_page_pdf(&jpeg, composite.width(), composite.height())?;

        let storage = ArtifactStorage::new(output_dir);
        let stem = file_stem(source);
        let mut written = RenderedArtifacts::new();

        written.insert(
            ArtifactKind::Pdf,
            storage.write(&stem, ArtifactKind::Pdf, &pdf)?,
        );
        if mode.includes(ArtifactKind::Img) {
            written.insert(
                ArtifactKind::Img,
                storage.write(&stem, ArtifactKind::Img, &jpeg)?,
            );
        }

        debug!("Rendered {} artifact(s) for {}", written.len(), stem);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([40, 40, 40]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_compose_is_side_by_side() {
        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let original = RgbImage::from_pixel(60, 40, Rgb([40, 40, 40]));

        let composite = renderer.compose(&original, &[]);

        assert_eq!(composite.dimensions(), (120, 40));
        assert_eq!(composite.get_pixel(5, 5), &Rgb([40, 40, 40]));
        assert_eq!(composite.get_pixel(65, 5), &BACKGROUND_COLOR);
    }

    #[test]
    fn test_compose_draws_box_on_right_half() {
        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let original = RgbImage::from_pixel(60, 40, Rgb([40, 40, 40]));
        let span = TextSpan::new("x", 0.9, [10, 10, 30, 20]);

        let composite = renderer.compose(&original, &[span]);

        assert_eq!(composite.get_pixel(70, 10), &BBOX_COLOR);
        assert_eq!(composite.get_pixel(10, 10), &Rgb([40, 40, 40]));
    }

    #[test]
    fn test_out_of_range_boxes_are_skipped() {
        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let original = RgbImage::from_pixel(60, 40, Rgb([40, 40, 40]));
        let spans = [
            TextSpan::new("huge", 0.9, [-10, 0, i64::MAX, 5]),
            TextSpan::new("far", 0.9, [i64::MIN, i64::MIN, i64::MAX, i64::MAX]),
            TextSpan::new("offscreen", 0.9, [i64::from(i32::MAX) - 1, 0, i64::from(i32::MAX), 5]),
            TextSpan::new("ok", 0.9, [10, 10, 30, 20]),
        ];

        let composite = renderer.compose(&original, &spans);

        assert_eq!(composite.dimensions(), (120, 40));
        assert_eq!(composite.get_pixel(70, 10), &BBOX_COLOR);
        assert_eq!(composite.get_pixel(60, 0), &BACKGROUND_COLOR);
    }

    #[test]
    fn test_render_with_extreme_box_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_png(temp_dir.path(), "doc1.png", 32, 24);
        let spans = [TextSpan::new("huge", 0.9, [-10, 0, i64::MAX, 5])];

        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let written = renderer
            .render(&source, &spans, temp_dir.path(), OutputMode::Full)
            .unwrap();

        assert_eq!(written.len(), 2);
    }

    #[test]
    fn test_render_minimal_writes_only_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_png(temp_dir.path(), "doc1.png", 32, 24);
        let out = temp_dir.path().join("out");

        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let written = renderer
            .render(&source, &[], &out, OutputMode::Minimal)
            .unwrap();

        assert_eq!(written.keys().copied().collect::<Vec<_>>(), vec![ArtifactKind::Pdf]);
        assert!(written[&ArtifactKind::Pdf].ends_with("doc1_ocr.pdf"));
        assert!(written[&ArtifactKind::Pdf].exists());
        assert!(!out.join("doc1_ocr.jpg").exists());
    }

    #[test]
    fn test_render_full_writes_pdf_and_img() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_png(temp_dir.path(), "doc1.png", 32, 24);
        let out = temp_dir.path().join("out");
        let spans = [TextSpan::new("invoice", 0.97, [2, 2, 20, 10])];

        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let written = renderer
            .render(&source, &spans, &out, OutputMode::Full)
            .unwrap();

        assert_eq!(written.len(), 2);
        let jpg = image::open(&written[&ArtifactKind::Img]).unwrap();
        assert_eq!((jpg.width(), jpg.height()), (64, 24));
    }

    #[test]
    fn test_render_unreadable_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.png");
        std::fs::write(&source, b"nope").unwrap();

        let renderer = OverlayRenderer::new(OverlayStyle::default());
        let result = renderer.render(&source, &[], temp_dir.path(), OutputMode::Full);

        assert!(matches!(result, Err(RenderError::LoadImage { .. })));
    }

    #[test]
    fn test_missing_configured_font_is_config_error() {
        let config = RenderConfig {
            font_path: Some("/nonexistent/font.ttf".to_string()),
            ..RenderConfig::default()
        };
        assert!(matches!(
            OverlayStyle::from_config(&config),
            Err(ConfigError::Font { .. })
        ));
    }
}
