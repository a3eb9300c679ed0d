//! Facial landmark geometry and ROI derivation.
//!
//! Works with the 68-point landmark layout: jaw 0-16, brows 17-26,
//! nose 27-35, eyes 36-47, mouth 48-67. The three sampling regions are
//! bounding boxes over fixed point subsets, padded outward; when no
//! landmarks are available the pipeline falls back to centred default
//! regions.

use serde::{Deserialize, Serialize};

use crate::regions::{Roi, RoiKind, RoiRect};

/// Number of points in the landmark layout.
pub const LANDMARK_COUNT: usize = 68;

/// Point subsets and padding for each region.
const FOREHEAD_POINTS: std::ops::RangeInclusive<usize> = 19..=24;
const FOREHEAD_PAD: f64 = 20.0;
const FOREHEAD_SHIFT_Y: i32 = -20;
const LEFT_CHEEK_JAW: std::ops::RangeInclusive<usize> = 1..=6;
const RIGHT_CHEEK_JAW: std::ops::RangeInclusive<usize> = 10..=15;
const NOSE_BASE: std::ops::RangeInclusive<usize> = 31..=35;
const CHEEK_PAD: f64 = 10.0;

/// A landmark position in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A full set of 68 facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    /// Wrap a landmark set, validating the point count.
    ///
    /// Returns `None` unless exactly [`LANDMARK_COUNT`] points are
    /// provided.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Option<Self> {
        (points.len() == LANDMARK_COUNT).then_some(Self { points })
    }

    /// All landmark points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn subset<'a>(
        &'a self,
        indices: impl Iterator<Item = usize> + 'a,
    ) -> impl Iterator<Item = (f64, f64)> + 'a {
        indices.map(move |i| (self.points[i].x, self.points[i].y))
    }
}

/// Derive the three sampling regions from a landmark set.
///
/// Regions whose point subsets collapse to nothing are omitted; the
/// sampler renormalises weights over whatever is present.
#[must_use]
pub fn landmark_regions(landmarks: &FaceLandmarks) -> Vec<Roi> {
    let mut rois = Vec::with_capacity(3);

    if let Some(rect) = RoiRect::bounding(landmarks.subset(FOREHEAD_POINTS), FOREHEAD_PAD) {
        rois.push(Roi::new(
            RoiKind::Forehead,
            rect.shifted(0, FOREHEAD_SHIFT_Y),
        ));
    }
    if let Some(rect) =
        RoiRect::bounding(landmarks.subset(LEFT_CHEEK_JAW.chain(NOSE_BASE)), CHEEK_PAD)
    {
        rois.push(Roi::new(RoiKind::LeftCheek, rect));
    }
    if let Some(rect) =
        RoiRect::bounding(landmarks.subset(RIGHT_CHEEK_JAW.chain(NOSE_BASE)), CHEEK_PAD)
    {
        rois.push(Roi::new(RoiKind::RightCheek, rect));
    }

    rois
}

/// Centred default regions for frames where no face was found.
///
/// Forehead: a third of the frame, centred horizontally in the upper
/// part; cheeks: symmetric patches a sixth of the frame below centre.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn default_regions(width: u32, height: u32) -> Vec<Roi> {
    let w = width / 3;
    let h = height / 3;
    let cheek_w = width / 6;
    let cheek_h = height / 6;
    let cheek_y = (height / 2 + height / 6) as i32;

    vec![
        Roi::new(
            RoiKind::Forehead,
            RoiRect::new((width / 3) as i32, (height / 12) as i32, w, h),
        ),
        Roi::new(
            RoiKind::LeftCheek,
            RoiRect::new((width / 6) as i32, cheek_y, cheek_w, cheek_h),
        ),
        Roi::new(
            RoiKind::RightCheek,
            RoiRect::new((width - width / 6 - cheek_w) as i32, cheek_y, cheek_w, cheek_h),
        ),
    ]
}
