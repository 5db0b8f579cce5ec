use mandelscope_core::ViewportModel;

use crate::buffer::RgbBuffer;
use crate::grid::EscapeGrid;
use crate::palette::ColorMapper;

/// Everything a renderer needs to paint the current session.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub grid: &'a EscapeGrid,
    pub viewport: &'a ViewportModel,
    /// Whether the magnification overlay should be drawn.
    pub overlay_visible: bool,
}

impl Frame<'_> {
    pub fn mapper(&self) -> ColorMapper {
        ColorMapper::for_viewport(self.viewport)
    }

    pub fn colorize(&self) -> RgbBuffer {
        self.mapper().colorize(self.grid)
    }

    /// Overlay text, if the overlay is shown.
    pub fn overlay_label(&self) -> Option<String> {
        self.overlay_visible
            .then(|| self.viewport.magnification_label())
    }
}

/// Port implemented by whatever turns a frame into pixels on some surface.
///
/// The engine never draws; it hands frames to a consumer.
pub trait GridConsumer {
    fn present(&mut self, frame: &Frame<'_>) -> crate::Result<()>;
}
