//! Weighted ROI sampling: frame in, one scalar out.
//!
//! Each region contributes its mean green intensity over qualifying
//! pixels (opaque and brighter than the background threshold); the
//! per-frame sample is the weighted mean across regions that survive,
//! with weights renormalised over those actually present. Green
//! dominates because haemoglobin absorption is strongest there.

use serde::{Deserialize, Serialize};

use crate::port::PixelSource;
use crate::regions::{Roi, RoiKind, RoiRect};

/// Combining weights per region kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoiWeights {
    pub forehead: f64,
    pub left_cheek: f64,
    pub right_cheek: f64,
}

impl Default for RoiWeights {
    fn default() -> Self {
        Self {
            forehead: 0.6,
            left_cheek: 0.2,
            right_cheek: 0.2,
        }
    }
}

impl RoiWeights {
    /// Weight for one region kind.
    #[must_use]
    pub fn get(&self, kind: RoiKind) -> f64 {
        match kind {
            RoiKind::Forehead => self.forehead,
            RoiKind::LeftCheek => self.left_cheek,
            RoiKind::RightCheek => self.right_cheek,
        }
    }
}

/// Configuration for the ROI sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Minimum `R + G + B` for a pixel to qualify; excludes
    /// transparent and near-black background pixels that would dilute
    /// the mean.
    pub min_brightness: u16,
    /// Combining weights across regions.
    pub weights: RoiWeights,
    /// RGB chrominance signature, retained for pulse-vector variants;
    /// the current aggregation reads only the green channel.
    pub chroma_signature: [f64; 3],
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_brightness: 30,
            weights: RoiWeights::default(),
            chroma_signature: [0.77, 0.51, 0.34],
        }
    }
}

/// Mean channel intensities over one region.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMeans {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// Number of qualifying pixels.
    pub pixel_count: usize,
}

/// Reduces a frame plus region list to one scalar sample.
#[derive(Debug, Clone, Default)]
pub struct RoiSampler {
    config: SamplerConfig,
}

impl RoiSampler {
    /// Create a sampler from configuration.
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(SamplerConfig::default())
    }

    /// Sampler configuration.
    #[must_use]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Mean R/G/B over the qualifying pixels of one region.
    ///
    /// Returns `None` when the clamped region is empty or no pixel
    /// qualifies.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn channel_means(&self, src: &dyn PixelSource, rect: &RoiRect) -> Option<ChannelMeans> {
        let (xs, ys) = rect.clamped(src.width(), src.height())?;

        let mut sums = [0.0_f64; 3];
        let mut count = 0_usize;
        for y in ys {
            for x in xs.clone() {
                let [r, g, b, a] = src.rgba(x, y);
                if a == 0 {
                    continue;
                }
                let brightness = u16::from(r) + u16::from(g) + u16::from(b);
                if brightness <= self.config.min_brightness {
                    continue;
                }
                sums[0] += f64::from(r);
                sums[1] += f64::from(g);
                sums[2] += f64::from(b);
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(ChannelMeans {
            r: sums[0] / n,
            g: sums[1] / n,
            b: sums[2] / n,
            pixel_count: count,
        })
    }

    /// Weighted green-channel sample over all surviving regions.
    ///
    /// Returns `None` when no region yields qualifying pixels; the
    /// caller treats that tick as a skipped frame.
    #[must_use]
    pub fn sample(&self, src: &dyn PixelSource, rois: &[Roi]) -> Option<f64> {
        let mut weighted = 0.0;
        let mut weight_total = 0.0;

        for roi in rois {
            let Some(means) = self.channel_means(src, &roi.rect) else {
                continue;
            };
            let weight = self.config.weights.get(roi.kind);
            weighted += weight * means.g;
            weight_total += weight;
        }

        if weight_total <= 0.0 {
            return None;
        }
        let sample = weighted / weight_total;
        sample.is_finite().then_some(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::VideoFrame;
    use crate::regions::{Roi, RoiKind, RoiRect};

    fn rois_over(frame_w: u32) -> Vec<Roi> {
        // Three horizontal strips across the top of the frame
        let third = frame_w / 3;
        vec![
            Roi::new(RoiKind::Forehead, RoiRect::new(0, 0, third, 10)),
            Roi::new(RoiKind::LeftCheek, RoiRect::new(third as i32, 0, third, 10)),
            Roi::new(RoiKind::RightCheek, RoiRect::new((2 * third) as i32, 0, third, 10)),
        ]
    }

    #[test]
    fn uniform_frame_samples_its_green_level() {
        let frame = VideoFrame::solid(30, 30, [100, 150, 50, 255]);
        let sampler = RoiSampler::default_config();
        let sample = sampler.sample(&frame, &rois_over(30)).unwrap();
        assert!((sample - 150.0).abs() < 1e-9);
    }

    #[test]
    fn dark_frame_yields_no_sample() {
        // R+G+B == 30 is not above the threshold
        let frame = VideoFrame::solid(30, 30, [10, 10, 10, 255]);
        let sampler = RoiSampler::default_config();
        assert!(sampler.sample(&frame, &rois_over(30)).is_none());
    }

    #[test]
    fn transparent_pixels_do_not_qualify() {
        let frame = VideoFrame::solid(30, 30, [200, 200, 200, 0]);
        let sampler = RoiSampler::default_config();
        assert!(sampler.sample(&frame, &rois_over(30)).is_none());
    }

    #[test]
    fn background_pixels_do_not_dilute_the_mean() {
        // Half the region is near-black background, half is skin
        let mut frame = VideoFrame::solid(20, 10, [5, 5, 5, 255]);
        for y in 0..10 {
            for x in 0..10 {
                frame.put(x, y, [120, 140, 110, 255]);
            }
        }
        let sampler = RoiSampler::default_config();
        let roi = [Roi::new(RoiKind::Forehead, RoiRect::new(0, 0, 20, 10))];
        let sample = sampler.sample(&frame, &roi).unwrap();
        assert!((sample - 140.0).abs() < 1e-9);
    }

    #[test]
    fn weights_renormalise_over_surviving_regions() {
        // Forehead strip is dark, cheek strips differ in green
        let mut frame = VideoFrame::solid(30, 30, [0, 0, 0, 255]);
        for y in 0..10 {
            for x in 10..20 {
                frame.put(x, y, [50, 100, 50, 255]);
            }
            for x in 20..30 {
                frame.put(x, y, [50, 200, 50, 255]);
            }
        }
        let sampler = RoiSampler::default_config();
        let sample = sampler.sample(&frame, &rois_over(30)).unwrap();
        // Equal 0.2 weights renormalise to 0.5 each
        assert!((sample - 150.0).abs() < 1e-9);
    }

    #[test]
    fn region_outside_frame_is_dropped() {
        let frame = VideoFrame::solid(30, 30, [100, 150, 50, 255]);
        let sampler = RoiSampler::default_config();
        let rois = [
            Roi::new(RoiKind::Forehead, RoiRect::new(-100, -100, 10, 10)),
            Roi::new(RoiKind::LeftCheek, RoiRect::new(0, 0, 10, 10)),
        ];
        let sample = sampler.sample(&frame, &rois).unwrap();
        assert!((sample - 150.0).abs() < 1e-9);
    }

    #[test]
    fn no_regions_means_no_sample() {
        let frame = VideoFrame::solid(30, 30, [100, 150, 50, 255]);
        let sampler = RoiSampler::default_config();
        assert!(sampler.sample(&frame, &[]).is_none());
    }

    #[test]
    fn channel_means_reports_all_channels() {
        let frame = VideoFrame::solid(8, 8, [40, 80, 120, 255]);
        let sampler = RoiSampler::default_config();
        let means = sampler
            .channel_means(&frame, &RoiRect::new(0, 0, 8, 8))
            .unwrap();
        assert!((means.r - 40.0).abs() < 1e-9);
        assert!((means.g - 80.0).abs() < 1e-9);
        assert!((means.b - 120.0).abs() < 1e-9);
        assert_eq!(means.pixel_count, 64);
    }

    #[test]
    fn default_chroma_signature_is_retained() {
        let config = SamplerConfig::default();
        assert_eq!(config.chroma_signature, [0.77, 0.51, 0.34]);
    }
}
