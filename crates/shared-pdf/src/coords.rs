//! Coordinate transformation between viewport pixels and PDF page points
//!
//! The page is rendered into the viewport with a contain fit, so a viewport
//! rectangle is first made page-relative (normalized, top-left origin) and
//! then scaled into points with the Y axis flipped. The reverse recomputes
//! the same fit from the viewport and page it is given.

use crate::error::PlacementError;
use crate::geometry::compute_contain_fit;
use shared_types::{ContainFit, CoordinateSpace, PageGeometry, Rectangle, ViewportFrame};

/// Slack allowed on the `x + width <= 1` checks for accumulated rounding
const NORMALIZED_EPSILON: f64 = 1e-9;

/// Output of the forward transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementTransform {
    /// Placement in PDF points, bottom-left origin
    pub document_rect: Rectangle,
    /// Placement as page fractions, top-left origin
    pub normalized: Rectangle,
}

fn require_space(rect: &Rectangle, expected: CoordinateSpace) -> Result<(), PlacementError> {
    if !rect.is_in(expected) {
        return Err(PlacementError::CoordinateSpaceMismatch {
            expected,
            found: rect.space,
        });
    }
    Ok(())
}

/// Contain fit of the page inside the viewport plus pixels-per-point
fn page_in_viewport(
    viewport: &ViewportFrame,
    page: &PageGeometry,
) -> Result<(f64, ContainFit), PlacementError> {
    if !(page.width.is_finite() && page.height.is_finite() && page.width > 0.0 && page.height > 0.0)
    {
        return Err(PlacementError::InvalidGeometry(format!(
            "page dimensions must be positive, got {}x{}",
            page.width, page.height
        )));
    }
    let fit = compute_contain_fit(viewport.width, viewport.height, page.aspect_ratio())?;
    Ok((fit.scale_for(page.width), fit))
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_extent(value: f64, start: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0 - start)
    }
}

/// Map a normalized rectangle onto the page in points (flips Y)
pub fn normalized_to_document(normalized: &Rectangle, page: &PageGeometry) -> Rectangle {
    Rectangle::document(
        normalized.x * page.width,
        page.height - (normalized.y + normalized.height) * page.height,
        normalized.width * page.width,
        normalized.height * page.height,
    )
}

/// Map a rectangle in points back to page fractions (un-flips Y)
pub fn document_to_normalized(rect: &Rectangle, page: &PageGeometry) -> Rectangle {
    Rectangle::normalized(
        rect.x / page.width,
        (page.height - (rect.y + rect.height)) / page.height,
        rect.width / page.width,
        rect.height / page.height,
    )
}

/// Convert a viewport placement into page fractions and PDF points.
///
/// Components that fall outside the rendered page are clamped, never
/// rejected: x and y clamp to `[0, 1]`, width and height to what is left
/// of the page after x and y. Only non-positive viewport or page sizes fail.
pub fn transform_viewport_to_document(
    rect: &Rectangle,
    viewport: &ViewportFrame,
    page: &PageGeometry,
) -> Result<PlacementTransform, PlacementError> {
    require_space(rect, CoordinateSpace::ViewportPixel)?;
    let (scale, fit) = page_in_viewport(viewport, page)?;

    let raw_x = (rect.x - fit.offset_x) / scale / page.width;
    let raw_y = (rect.y - fit.offset_y) / scale / page.height;
    let raw_width = rect.width / scale / page.width;
    let raw_height = rect.height / scale / page.height;

    let x = clamp_unit(raw_x);
    let y = clamp_unit(raw_y);
    let normalized = Rectangle::normalized(
        x,
        y,
        clamp_extent(raw_width, x),
        clamp_extent(raw_height, y),
    );

    tracing::debug!(
        scale,
        offset_x = fit.offset_x,
        offset_y = fit.offset_y,
        ?normalized,
        "viewport placement normalized"
    );

    Ok(PlacementTransform {
        document_rect: normalized_to_document(&normalized, page),
        normalized,
    })
}

/// Convert a rectangle in PDF points back to viewport pixels.
///
/// Uses the fit of the viewport and page passed in, not the ones in effect
/// when the placement was made; only the point rectangle is authoritative.
pub fn transform_document_to_viewport(
    rect: &Rectangle,
    viewport: &ViewportFrame,
    page: &PageGeometry,
) -> Result<Rectangle, PlacementError> {
    require_space(rect, CoordinateSpace::DocumentPoint)?;
    let (scale, fit) = page_in_viewport(viewport, page)?;

    let normalized = document_to_normalized(rect, page);

    Ok(Rectangle::viewport(
        normalized.x * page.width * scale + fit.offset_x,
        normalized.y * page.height * scale + fit.offset_y,
        normalized.width * page.width * scale,
        normalized.height * page.height * scale,
    ))
}

/// Map a single viewport point to PDF points (no clamping)
pub fn viewport_point_to_document(
    x: f64,
    y: f64,
    viewport: &ViewportFrame,
    page: &PageGeometry,
) -> Result<(f64, f64), PlacementError> {
    let (scale, fit) = page_in_viewport(viewport, page)?;
    let pdf_x = (x - fit.offset_x) / scale;
    let pdf_y = page.height - (y - fit.offset_y) / scale;
    Ok((pdf_x, pdf_y))
}

/// Map a single PDF point to viewport pixels
pub fn document_point_to_viewport(
    pdf_x: f64,
    pdf_y: f64,
    viewport: &ViewportFrame,
    page: &PageGeometry,
) -> Result<(f64, f64), PlacementError> {
    let (scale, fit) = page_in_viewport(viewport, page)?;
    let x = pdf_x * scale + fit.offset_x;
    let y = (page.height - pdf_y) * scale + fit.offset_y;
    Ok((x, y))
}

/// True when `rect` is a usable normalized placement: inside the unit
/// square with a positive extent on both axes.
pub fn is_valid_normalized_coordinate(rect: &Rectangle) -> bool {
    if !rect.is_in(CoordinateSpace::Normalized) {
        return false;
    }
    let values = [rect.x, rect.y, rect.width, rect.height];
    if values.iter().any(|v| !v.is_finite()) {
        return false;
    }

    (0.0..=1.0).contains(&rect.x)
        && (0.0..=1.0).contains(&rect.y)
        && rect.width > 0.0
        && rect.width <= 1.0
        && rect.height > 0.0
        && rect.height <= 1.0
        && rect.x + rect.width <= 1.0 + NORMALIZED_EPSILON
        && rect.y + rect.height <= 1.0 + NORMALIZED_EPSILON
}
