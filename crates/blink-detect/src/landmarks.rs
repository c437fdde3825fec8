//! Eye landmark indices for the 468-point face mesh

use crate::ear::{EyePoint, EyePointSet, EYE_POINT_COUNT};
use crate::DetectError;

/// Left eye contour, ordered p1..p6 (corner, upper lid x2, corner, lower lid x2)
pub const LEFT_EYE_LANDMARKS: [usize; EYE_POINT_COUNT] = [362, 385, 387, 263, 373, 380];

/// Right eye contour, ordered p1..p6
pub const RIGHT_EYE_LANDMARKS: [usize; EYE_POINT_COUNT] = [33, 160, 158, 133, 153, 144];

/// Pick the six eye-contour points out of a full face mesh
pub fn extract_eye_points(
    mesh: &[EyePoint],
    indices: &[usize; EYE_POINT_COUNT],
) -> Result<EyePointSet, DetectError> {
    let mut points = [EyePoint::new(0.0, 0.0); EYE_POINT_COUNT];
    for (slot, &index) in points.iter_mut().zip(indices) {
        *slot = *mesh.get(index).ok_or(DetectError::MissingLandmark {
            index,
            len: mesh.len(),
        })?;
    }
    Ok(EyePointSet::new(points))
}

/// Left and right EAR straight from a face mesh
pub fn eye_ears_from_mesh(mesh: &[EyePoint]) -> Result<(f32, f32), DetectError> {
    let left = extract_eye_points(mesh, &LEFT_EYE_LANDMARKS)?.ear()?;
    let right = extract_eye_points(mesh, &RIGHT_EYE_LANDMARKS)?.ear()?;
    Ok((left, right))
}
