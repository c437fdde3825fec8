//! Eye Aspect Ratio (EAR)
//!
//! `EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)`
//!
//! p1/p4 are the eye corners, p2/p3 the upper lid and p6/p5 the lower lid.
//! An open eye sits around 0.25-0.35 and a closed one approaches zero.

use crate::DetectError;
use serde::{Deserialize, Serialize};

/// Number of contour points in an eye point set
pub const EYE_POINT_COUNT: usize = 6;

/// A 2-D or 3-D landmark coordinate.
///
/// Serialized as `[x, y]` or `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct EyePoint {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
}

impl EyePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Euclidean distance over the components both points carry
    pub fn distance(&self, other: &EyePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = match (self.z, other.z) {
            (Some(a), Some(b)) => a - b,
            _ => 0.0,
        };
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl TryFrom<Vec<f32>> for EyePoint {
    type Error = DetectError;

    fn try_from(coords: Vec<f32>) -> Result<Self, Self::Error> {
        match coords.as_slice() {
            [x, y] => Ok(Self::new(*x, *y)),
            [x, y, z] => Ok(Self::with_z(*x, *y, *z)),
            _ => Err(DetectError::InvalidInput(format!(
                "point must have 2 or 3 components, got {}",
                coords.len()
            ))),
        }
    }
}

impl From<EyePoint> for Vec<f32> {
    fn from(p: EyePoint) -> Self {
        match p.z {
            Some(z) => vec![p.x, p.y, z],
            None => vec![p.x, p.y],
        }
    }
}

/// Exactly six ordered eye-contour points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePointSet([EyePoint; EYE_POINT_COUNT]);

impl EyePointSet {
    pub fn new(points: [EyePoint; EYE_POINT_COUNT]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[EyePoint; EYE_POINT_COUNT] {
        &self.0
    }

    /// EAR for this eye
    pub fn ear(&self) -> Result<f32, DetectError> {
        eye_aspect_ratio(&self.0)
    }
}

impl TryFrom<&[EyePoint]> for EyePointSet {
    type Error = DetectError;

    fn try_from(points: &[EyePoint]) -> Result<Self, Self::Error> {
        let points: [EyePoint; EYE_POINT_COUNT] = points.try_into().map_err(|_| {
            DetectError::InvalidInput(format!(
                "eye landmarks must contain exactly {} points, got {}",
                EYE_POINT_COUNT,
                points.len()
            ))
        })?;
        Ok(Self(points))
    }
}

/// Compute the Eye Aspect Ratio of six ordered points.
///
/// Fails with [`DetectError::InvalidInput`] on a wrong point count, a zero
/// horizontal span, or non-finite coordinates; the result is always a finite,
/// non-negative number.
pub fn eye_aspect_ratio(points: &[EyePoint]) -> Result<f32, DetectError> {
    let [p1, p2, p3, p4, p5, p6] = points else {
        return Err(DetectError::InvalidInput(format!(
            "eye landmarks must contain exactly {} points, got {}",
            EYE_POINT_COUNT,
            points.len()
        )));
    };

    let vertical_1 = p2.distance(p6);
    let vertical_2 = p3.distance(p5);
    let horizontal = p1.distance(p4);

    if horizontal == 0.0 {
        return Err(DetectError::InvalidInput("zero horizontal eye span".into()));
    }

    let ear = (vertical_1 + vertical_2) / (2.0 * horizontal);
    if !ear.is_finite() {
        return Err(DetectError::InvalidInput(format!("non-finite EAR {}", ear)));
    }

    Ok(ear)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Eye 0.3 units wide with lids `opening` apart
    pub(crate) fn eye(opening: f32) -> [EyePoint; 6] {
        let half = opening / 2.0;
        [
            EyePoint::new(0.0, 0.0),
            EyePoint::new(0.1, half),
            EyePoint::new(0.2, half),
            EyePoint::new(0.3, 0.0),
            EyePoint::new(0.2, -half),
            EyePoint::new(0.1, -half),
        ]
    }

    #[test]
    fn test_open_eye_ratio() {
        // verticals are 0.09 each, horizontal 0.3
        let ear = eye_aspect_ratio(&eye(0.09)).unwrap();
        assert!((ear - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_closed_eye_ratio_is_zero() {
        let ear = eye_aspect_ratio(&eye(0.0)).unwrap();
        assert_eq!(ear, 0.0);
    }

    #[test]
    fn test_wrong_point_count() {
        let points = eye(0.09);
        assert!(matches!(
            eye_aspect_ratio(&points[..5]),
            Err(DetectError::InvalidInput(_))
        ));
        let mut seven = points.to_vec();
        seven.push(EyePoint::new(0.0, 0.0));
        assert!(eye_aspect_ratio(&seven).is_err());
    }

    #[test]
    fn test_zero_horizontal_span() {
        let mut points = eye(0.09);
        points[3] = points[0];
        assert!(matches!(
            eye_aspect_ratio(&points),
            Err(DetectError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let mut points = eye(0.09);
        points[1].y = f32::NAN;
        assert!(eye_aspect_ratio(&points).is_err());
    }

    #[test]
    fn test_depth_used_when_present() {
        let mut points = eye(0.0);
        points[1] = EyePoint::with_z(0.1, 0.0, 0.06);
        points[5] = EyePoint::with_z(0.1, 0.0, 0.0);
        let ear = eye_aspect_ratio(&points).unwrap();
        assert!((ear - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_point_set_conversion() {
        let points = eye(0.09);
        let set = EyePointSet::try_from(&points[..]).unwrap();
        assert_eq!(set.points(), &points);
        assert!(EyePointSet::try_from(&points[..4]).is_err());
    }

    #[test]
    fn test_point_from_components() {
        assert_eq!(EyePoint::try_from(vec![1.0, 2.0]).unwrap(), EyePoint::new(1.0, 2.0));
        assert_eq!(
            EyePoint::try_from(vec![1.0, 2.0, 3.0]).unwrap(),
            EyePoint::with_z(1.0, 2.0, 3.0)
        );
        assert!(EyePoint::try_from(vec![1.0]).is_err());
    }

    proptest! {
        #[test]
        fn ear_is_non_negative(
            coords in proptest::collection::vec((-1.0f32..1.0, -1.0f32..1.0), 6),
        ) {
            let points: Vec<EyePoint> = coords.iter().map(|&(x, y)| EyePoint::new(x, y)).collect();
            if let Ok(ear) = eye_aspect_ratio(&points) {
                prop_assert!(ear >= 0.0);
                prop_assert!(ear.is_finite());
            }
        }
    }
}
