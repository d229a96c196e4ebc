//! Contain-fit sizing shared by page-to-viewport mapping and image-to-box fitting

use crate::error::PlacementError;
use shared_types::{ContainFit, FitResult};

fn require_positive(name: &str, value: f64) -> Result<(), PlacementError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PlacementError::InvalidGeometry(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Scale an inner box of the given aspect ratio (width / height) to the
/// largest size that fits inside the container, centered on the free axis.
///
/// A wider-than-container inner box is bound by width and centered
/// vertically; otherwise it is bound by height and centered horizontally.
pub fn compute_contain_fit(
    container_width: f64,
    container_height: f64,
    inner_aspect_ratio: f64,
) -> Result<ContainFit, PlacementError> {
    require_positive("container width", container_width)?;
    require_positive("container height", container_height)?;
    require_positive("inner aspect ratio", inner_aspect_ratio)?;

    let container_aspect_ratio = container_width / container_height;

    let (width, height) = if inner_aspect_ratio > container_aspect_ratio {
        let height = (container_width / inner_aspect_ratio).min(container_height);
        (container_width, height)
    } else {
        let width = (container_height * inner_aspect_ratio).min(container_width);
        (width, container_height)
    };

    Ok(ContainFit {
        width,
        height,
        offset_x: ((container_width - width) / 2.0).max(0.0),
        offset_y: ((container_height - height) / 2.0).max(0.0),
    })
}

/// Size an image to fit a placement box without distortion
pub fn calculate_fit_dimensions(
    image_width: f64,
    image_height: f64,
    box_width: f64,
    box_height: f64,
) -> Result<FitResult, PlacementError> {
    require_positive("image width", image_width)?;
    require_positive("image height", image_height)?;

    compute_contain_fit(box_width, box_height, image_width / image_height).map(FitResult::from)
}
