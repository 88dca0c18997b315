//! Page geometry calculations

/// Length in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length(pub f32);

impl Length {
    /// Create a length from points
    pub fn from_pt(pt: f32) -> Self {
        Length(pt)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f32) -> Self {
        Length(inches * 72.0)
    }

    /// Get the value in points
    pub fn pt(&self) -> f32 {
        self.0
    }
}

/// A page's MediaBox: lower-left origin plus size, all in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// US Letter size (8.5" × 11") at the origin
    pub fn letter() -> Self {
        Self::sized(Length::from_inches(8.5), Length::from_inches(11.0))
    }

    /// A box of the given size with its origin at (0, 0)
    pub fn sized(width: Length, height: Length) -> Self {
        Self {
            left: 0.0,
            bottom: 0.0,
            width: width.pt(),
            height: height.pt(),
        }
    }

    /// Build a box from the four numbers of a PDF rectangle `[x0 y0 x1 y1]`
    ///
    /// Corners may come in any order. Returns `None` for degenerate or
    /// non-finite rectangles.
    pub fn from_rect(rect: [f32; 4]) -> Option<Self> {
        if rect.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let [x0, y0, x1, y1] = rect;
        let width = (x1 - x0).abs();
        let height = (y1 - y0).abs();
        if width <= 0.0 || height <= 0.0 {
            return None;
        }

        Some(Self {
            left: x0.min(x1),
            bottom: y0.min(y1),
            width,
            height,
        })
    }

    /// Whether the box starts at the page-space origin
    pub fn is_at_origin(&self) -> bool {
        self.left == 0.0 && self.bottom == 0.0
    }
}

/// Distance of the page-number label from the bottom-right corner
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub right: Length,
    pub bottom: Length,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            right: Length::from_pt(40.0),
            bottom: Length::from_pt(20.0),
        }
    }
}

/// Calculate where a right-aligned label starts
///
/// Returns the (x, y) baseline origin in the box's own coordinate system,
/// where (0, 0) is the bottom-left corner of the box. The label may run off
/// the left edge when it is wider than the page; it is never wrapped.
pub fn right_aligned_origin(width: f32, text_width: f32, margins: &Margins) -> (f32, f32) {
    let x = width - margins.right.pt() - text_width;
    let y = margins.bottom.pt();
    (x, y)
}
