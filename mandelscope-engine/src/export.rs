//! PNG export with the view parameters embedded as tEXt chunks.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use mandelscope_core::ViewportModel;

use crate::buffer::RgbBuffer;
use crate::consumer::{Frame, GridConsumer};
use crate::error::EngineError;

const SOFTWARE: &str = "mandelscope";

/// View parameters written alongside the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub bounds: String,
    pub max_iterations: u32,
    pub radius_squared: f64,
    pub theme: String,
    pub magnification: f64,
    /// Set when the overlay was visible at export time.
    pub overlay: Option<String>,
}

impl ExportMetadata {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        let viewport: &ViewportModel = frame.viewport;
        Self {
            bounds: viewport.bounds().to_string(),
            max_iterations: viewport.max_iterations(),
            radius_squared: viewport.radius_squared(),
            theme: viewport.color_theme().identifier().to_string(),
            magnification: viewport.magnification(),
            overlay: frame.overlay_label(),
        }
    }

    fn description(&self) -> String {
        format!(
            "Mandelbrot - Bounds: {}, Iterations: {}, Magnification: {}x",
            self.bounds, self.max_iterations, self.magnification
        )
    }

    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("Mandelscope.Bounds".into(), self.bounds.clone()),
            (
                "Mandelscope.MaxIterations".into(),
                self.max_iterations.to_string(),
            ),
            (
                "Mandelscope.RadiusSquared".into(),
                format!("{:?}", self.radius_squared),
            ),
            ("Mandelscope.Theme".into(), self.theme.clone()),
            (
                "Mandelscope.Magnification".into(),
                format!("{:?}", self.magnification),
            ),
        ];
        if let Some(label) = &self.overlay {
            pairs.push(("Mandelscope.Overlay".into(), label.clone()));
        }
        pairs
    }
}

fn export_error(what: &str, e: impl std::fmt::Display) -> EngineError {
    EngineError::Export {
        reason: format!("{what}: {e}"),
    }
}

/// Write an RGB buffer as a PNG file with embedded view metadata.
pub fn export_png(
    buffer: &RgbBuffer,
    path: &Path,
    metadata: &ExportMetadata,
) -> crate::Result<()> {
    let file = File::create(path).map_err(|e| export_error("Failed to create file", e))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, buffer.width, buffer.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder
        .add_text_chunk("Software".to_string(), SOFTWARE.to_string())
        .map_err(|e| export_error("Failed to add text chunk", e))?;
    encoder
        .add_text_chunk("Description".to_string(), metadata.description())
        .map_err(|e| export_error("Failed to add text chunk", e))?;
    for (key, value) in metadata.pairs() {
        encoder
            .add_text_chunk(key.clone(), value)
            .map_err(|e| export_error(&format!("Failed to add text chunk '{key}'"), e))?;
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| export_error("Failed to write PNG header", e))?;
    png_writer
        .write_image_data(&buffer.pixels)
        .map_err(|e| export_error("Failed to write PNG image data", e))?;
    png_writer
        .finish()
        .map_err(|e| export_error("Failed to finish PNG", e))?;

    debug!(
        "Exported PNG {}x{} to {}",
        buffer.width,
        buffer.height,
        path.display()
    );
    Ok(())
}

/// Renders each presented frame to a PNG file.
#[derive(Debug, Clone)]
pub struct PngExporter {
    path: PathBuf,
}

impl PngExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridConsumer for PngExporter {
    fn present(&mut self, frame: &Frame<'_>) -> crate::Result<()> {
        let buffer = frame.colorize();
        export_png(&buffer, &self.path, &ExportMetadata::from_frame(frame))?;
        info!(path = %self.path.display(), "Image exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EscapeGrid;
    use mandelscope_core::ColorTheme;

    fn read_texts(path: &Path) -> Vec<(String, String)> {
        let decoder = png::Decoder::new(File::open(path).unwrap());
        let reader = decoder.read_info().unwrap();
        reader
            .info()
            .uncompressed_latin1_text
            .iter()
            .map(|t| (t.keyword.clone(), t.text.clone()))
            .collect()
    }

    #[test]
    fn exporter_writes_png_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.png");
        let grid = EscapeGrid::from_cells(2, 2, 10, vec![0, 5, 10, 10]).unwrap();
        let mut viewport = ViewportModel::default();
        viewport.set_color_theme(ColorTheme::Magenta);
        let frame = Frame {
            grid: &grid,
            viewport: &viewport,
            overlay_visible: true,
        };

        let mut exporter = PngExporter::new(&path);
        exporter.present(&frame).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut data = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut data).unwrap();
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert_eq!(&data[..info.buffer_size()], &frame.colorize().pixels[..]);

        let texts = read_texts(&path);
        assert!(texts.contains(&("Software".into(), "mandelscope".into())));
        assert!(texts.contains(&("Mandelscope.Theme".into(), "magenta".into())));
        assert!(texts.contains(&("Mandelscope.MaxIterations".into(), "10".into())));
        assert!(texts.contains(&(
            "Mandelscope.Overlay".into(),
            "Current magnification: 1x".into()
        )));
    }

    #[test]
    fn overlay_chunk_omitted_when_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        let grid = EscapeGrid::from_cells(1, 1, 4, vec![1]).unwrap();
        let viewport = ViewportModel::default();
        let frame = Frame {
            grid: &grid,
            viewport: &viewport,
            overlay_visible: false,
        };
        PngExporter::new(&path).present(&frame).unwrap();
        assert!(read_texts(&path)
            .iter()
            .all(|(k, _)| k != "Mandelscope.Overlay"));
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.png");
        let err = export_png(&RgbBuffer::new(1, 1), &path, &ExportMetadata {
            bounds: String::new(),
            max_iterations: 1,
            radius_squared: 4.0,
            theme: "red".into(),
            magnification: 1.0,
            overlay: None,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Export { .. }));
    }
}
