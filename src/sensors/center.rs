// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line-center estimation from a binarized frame.

use crate::config::{CenteringStrategy, ScanConfig};
use crate::sensors::line_scanner::{Pixel, PixelBuffer};

/// Detected line boundaries. `center` is always inside the usable width.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineEdge {
    pub start: usize,
    pub end: usize,
    pub center: usize,
}

pub struct CenterEstimator {
    strategy: CenteringStrategy,
    usable_width: usize,
}

impl CenterEstimator {
    pub fn new(cfg: &ScanConfig) -> Self {
        Self {
            strategy: cfg.centering,
            usable_width: cfg.usable_width,
        }
    }

    #[inline]
    pub fn strategy(&self) -> CenteringStrategy {
        self.strategy
    }

    /// Locate the line in `frame`, or `None` if it is not visible.
    pub fn estimate(&self, frame: &PixelBuffer) -> Option<LineEdge> {
        match self.strategy {
            CenteringStrategy::FirstEdgePair => self.first_edge_pair(frame),
            CenteringStrategy::WeightedAverage => self.weighted_average(frame),
        }
    }

    /// Midpoint of the first background→line→background run. Later runs are ignored.
    ///
    /// `start` is the first line pixel and `end` the first background pixel after it.
    fn first_edge_pair(&self, frame: &PixelBuffer) -> Option<LineEdge> {
        let pixels = frame.as_slice();
        let last = self.usable_width.min(pixels.len());
        if last < 2 {
            return None;
        }

        let mut start = None;
        for i in 0..last - 1 {
            let (here, next) = (pixels[i], pixels[i + 1]);
            match start {
                None if here == Pixel::Background && next == Pixel::Line => start = Some(i + 1),
                Some(s) if here == Pixel::Line && next == Pixel::Background => {
                    let end = i + 1;
                    return Some(LineEdge {
                        start: s,
                        end,
                        center: s + (end - s) / 2,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// Mean index of every line pixel in the usable width.
    fn weighted_average(&self, frame: &PixelBuffer) -> Option<LineEdge> {
        let pixels = frame.as_slice();
        let last = self.usable_width.min(pixels.len());

        let mut sum = 0usize;
        let mut count = 0usize;
        let mut first = None;
        let mut end = 0;
        for (i, &p) in pixels[..last].iter().enumerate() {
            if p == Pixel::Line {
                sum += i;
                count += 1;
                first.get_or_insert(i);
                end = i + 1;
            }
        }

        let start = first?;
        Some(LineEdge {
            start,
            end,
            center: sum / count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_runs(runs: &[(usize, usize)]) -> PixelBuffer {
        let mut pixels = [Pixel::Background; 130];
        for &(s, e) in runs {
            for p in &mut pixels[s..e] {
                *p = Pixel::Line;
            }
        }
        PixelBuffer::from_pixels(&pixels)
    }

    fn estimator(strategy: CenteringStrategy) -> CenterEstimator {
        CenterEstimator::new(&ScanConfig::default().with_centering(strategy))
    }

    #[test]
    fn single_run_reports_midpoint() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        let edge = est.estimate(&frame_with_runs(&[(30, 40)])).unwrap();

        assert_eq!(edge.start, 30);
        assert_eq!(edge.end, 40);
        assert_eq!(edge.center, 35);
    }

    #[test]
    fn empty_frame_is_not_found() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        assert_eq!(est.estimate(&frame_with_runs(&[])), None);
    }

    #[test]
    fn run_touching_the_left_edge_has_no_rising_edge() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        assert_eq!(est.estimate(&frame_with_runs(&[(0, 10)])), None);
    }

    #[test]
    fn run_without_falling_edge_is_not_found() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        assert_eq!(est.estimate(&frame_with_runs(&[(100, 130)])), None);
    }

    #[test]
    fn only_first_run_is_used() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        let edge = est.estimate(&frame_with_runs(&[(10, 20), (80, 90)])).unwrap();
        assert_eq!((edge.start, edge.end, edge.center), (10, 20, 15));
    }

    #[test]
    fn odd_width_run_truncates_toward_start() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        for (s, e) in [(5, 6), (5, 8), (60, 69), (100, 127)] {
            let edge = est.estimate(&frame_with_runs(&[(s, e)])).unwrap();
            assert_eq!(edge.center, s + (e - s) / 2);
        }
    }

    #[test]
    fn pixels_past_usable_width_are_ignored() {
        let est = estimator(CenteringStrategy::FirstEdgePair);
        assert_eq!(est.estimate(&frame_with_runs(&[(127, 129)])), None);
    }

    #[test]
    fn weighted_average_uses_all_line_pixels() {
        let est = estimator(CenteringStrategy::WeightedAverage);
        let edge = est.estimate(&frame_with_runs(&[(10, 20), (80, 90)])).unwrap();

        // (10..20).sum() + (80..90).sum() = 145 + 845 = 990, over 20 pixels.
        assert_eq!(edge.center, 49);
        assert_eq!(edge.start, 10);
        assert_eq!(edge.end, 90);
    }

    #[test]
    fn weighted_average_empty_is_not_found() {
        let est = estimator(CenteringStrategy::WeightedAverage);
        assert_eq!(est.estimate(&frame_with_runs(&[])), None);
    }
}
