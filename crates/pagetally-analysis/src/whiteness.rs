// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel sampler: estimates whether a rasterized page is visually blank by
// inspecting a bounded, uniformly strided subset of its pixels.

use pagetally_core::types::RawImage;

/// A channel value above this counts toward "white".
const WHITE_LEVEL: u8 = 240;

/// Bounded-cost whiteness estimator.
#[derive(Debug, Clone, Copy)]
pub struct PixelSampler {
    /// Target number of sampled pixels.
    budget: usize,
    /// Fraction of white samples above which the image is treated as blank.
    threshold: f64,
}

impl PixelSampler {
    pub fn new(budget: usize, threshold: f64) -> Self {
        Self {
            budget: budget.max(1),
            threshold,
        }
    }

    /// Distance between sampled pixels for an image of `pixel_count` pixels.
    pub fn stride(&self, pixel_count: usize) -> usize {
        (pixel_count / self.budget).max(1)
    }

    /// Fraction of sampled pixels whose three channels all exceed 240.
    /// An image with no pixels has a fraction of zero.
    pub fn white_fraction(&self, image: &RawImage) -> f64 {
        let rgb;
        let image = if image.channels == 3 {
            image
        } else {
            rgb = image.to_rgb();
            &rgb
        };

        let stride = self.stride(image.pixel_count());
        let (sampled, white) = image
            .samples
            .chunks_exact(3)
            .step_by(stride)
            .fold((0usize, 0usize), |(sampled, white), px| {
                let is_white = px.iter().all(|&channel| channel > WHITE_LEVEL);
                (sampled + 1, white + usize::from(is_white))
            });

        if sampled == 0 {
            0.0
        } else {
            white as f64 / sampled as f64
        }
    }

    /// True iff the sampled white fraction is strictly above the threshold.
    pub fn is_likely_blank(&self, image: &RawImage) -> bool {
        self.white_fraction(image) > self.threshold
    }
}
