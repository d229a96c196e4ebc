//! Rectangles and frames in the three coordinate spaces used for placement
//!
//! - viewport-pixel: origin top-left, units are pixels of the rendering surface
//! - normalized: origin top-left, units are fractions of the page (0..1)
//! - document-point: origin bottom-left, units are PDF points

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which coordinate space a [`Rectangle`] is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSpace {
    ViewportPixel,
    Normalized,
    DocumentPoint,
}

impl fmt::Display for CoordinateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSpace::ViewportPixel => "viewport-pixel",
            CoordinateSpace::Normalized => "normalized",
            CoordinateSpace::DocumentPoint => "document-point",
        };
        f.write_str(name)
    }
}

/// An axis-aligned rectangle tagged with its coordinate space.
///
/// Values from different spaces are never compared directly; go through
/// the transforms in `shared_pdf::coords`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub space: CoordinateSpace,
}

impl Rectangle {
    pub fn new(space: CoordinateSpace, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space,
        }
    }

    /// Rectangle in viewport pixels (top-left origin)
    pub fn viewport(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(CoordinateSpace::ViewportPixel, x, y, width, height)
    }

    /// Rectangle in page fractions (top-left origin)
    pub fn normalized(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(CoordinateSpace::Normalized, x, y, width, height)
    }

    /// Rectangle in PDF points (bottom-left origin)
    pub fn document(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(CoordinateSpace::DocumentPoint, x, y, width, height)
    }

    pub fn is_in(&self, space: CoordinateSpace) -> bool {
        self.space == space
    }
}

/// Pixel size of the rendering surface when a placement was made
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportFrame {
    pub width: f64,
    pub height: f64,
}

impl ViewportFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Page size in points, read from the target page's MediaBox
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    pub fn a4() -> Self {
        Self::new(595.28, 841.89)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Result of contain-fitting an inner box into a container, in container units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainFit {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ContainFit {
    /// Container units per inner unit, for an inner box of the given width
    pub fn scale_for(&self, inner_width: f64) -> f64 {
        self.width / inner_width
    }
}

/// How a raster image was sized and centered inside a placement box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitResult {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl From<ContainFit> for FitResult {
    fn from(fit: ContainFit) -> Self {
        Self {
            width: fit.width,
            height: fit.height,
            offset_x: fit.offset_x,
            offset_y: fit.offset_y,
        }
    }
}
