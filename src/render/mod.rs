//! Skeleton rendering.
//!
//! [`render_hands`] draws a detection onto any [`Surface`]; the terminal uses
//! [`AsciiCanvas`].

mod canvas;

pub use canvas::{AsciiCanvas, CellColor};

use crate::landmarks::{DetectionResult, Landmark, HAND_CONNECTIONS};

/// How a connector or joint marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub color: CellColor,
    /// Stroke width in source pixels; cell-based surfaces draw one cell.
    pub line_width: u32,
    pub glyph: char,
}

/// Bone segments: green, 5px.
pub const CONNECTOR_STYLE: DrawStyle = DrawStyle {
    color: CellColor { r: 0, g: 255, b: 0 },
    line_width: 5,
    glyph: '*',
};

/// Joint markers: red, 1px.
pub const LANDMARK_STYLE: DrawStyle = DrawStyle {
    color: CellColor { r: 255, g: 0, b: 0 },
    line_width: 1,
    glyph: 'o',
};

/// Something landmarks can be drawn onto.
pub trait Surface {
    /// Match the surface to the source frame dimensions.
    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    fn draw_connector(&mut self, from: Landmark, to: Landmark, style: &DrawStyle);

    fn draw_landmark(&mut self, point: Landmark, style: &DrawStyle);
}

/// Clear the surface, then draw connectors and joints for every hand.
///
/// `None` (no detection yet) leaves the surface cleared.
pub fn render_hands(surface: &mut dyn Surface, result: Option<&DetectionResult>) {
    surface.clear();

    let Some(result) = result else {
        return;
    };

    for hand in &result.hands {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(from), Some(to)) = (hand.landmarks.get(a), hand.landmarks.get(b)) {
                surface.draw_connector(*from, *to, &CONNECTOR_STYLE);
            }
        }
        for point in &hand.landmarks {
            surface.draw_landmark(*point, &LANDMARK_STYLE);
        }
    }
}
