//! N-dimensional histograms (1D and 2D in practice).

use tracing::debug;

use crate::histogram::{BinSpec, HistogramError};

/// Accumulates points of a fixed dimensionality.
#[derive(Debug, Clone)]
pub struct Histogram {
    ndim: usize,
    /// Row-major points, `ndim` values each.
    data: Vec<f64>,
}

impl Histogram {
    pub fn new(ndim: usize) -> Self {
        Self {
            ndim,
            data: Vec::new(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn len(&self) -> usize {
        if self.ndim == 0 { 0 } else { self.data.len() / self.ndim }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn add(&mut self, point: &[f64]) -> Result<(), HistogramError> {
        if point.len() != self.ndim {
            return Err(HistogramError::DimensionMismatch {
                expected: self.ndim,
                found: point.len(),
            });
        }
        self.data.extend_from_slice(point);
        Ok(())
    }

    /// Bin the accumulated points, one [`BinSpec`] per dimension.
    ///
    /// Each axis is split into `nbins` equal widths in masked space between
    /// the masked extremes of the data. Points whose masked value is not
    /// finite (e.g. non-positive values on a log axis) are dropped.
    pub fn bin(&self, specs: &[BinSpec]) -> Result<BinnedHistogram, HistogramError> {
        if self.ndim == 0 {
            return Err(HistogramError::NoData);
        }
        if specs.len() != self.ndim {
            return Err(HistogramError::StyleCount {
                expected: self.ndim,
                found: specs.len(),
            });
        }
        if let Some(dim) = specs.iter().position(|spec| spec.nbins == 0) {
            return Err(HistogramError::ZeroBins { dim });
        }

        let masked: Vec<Vec<f64>> = self
            .data
            .chunks(self.ndim)
            .map(|point| {
                point
                    .iter()
                    .zip(specs)
                    .map(|(x, spec)| spec.style.mask(*x))
                    .collect::<Vec<_>>()
            })
            .filter(|point| point.iter().all(|u| u.is_finite()))
            .collect();

        let dropped = self.len() - masked.len();
        if masked.is_empty() {
            return Err(HistogramError::NoData);
        }

        let mut axes = Vec::with_capacity(self.ndim);
        for (dim, spec) in specs.iter().enumerate() {
            let (lo, hi) = masked
                .iter()
                .map(|point| point[dim])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), u| {
                    (lo.min(u), hi.max(u))
                });
            if lo == hi && spec.nbins != 1 {
                return Err(HistogramError::DegenerateRange { dim });
            }
            axes.push(Axis::new(*spec, lo, hi));
        }

        let total: usize = axes.iter().map(|axis| axis.spec.nbins).product();
        let mut counts = vec![0usize; total];
        for point in &masked {
            let flat = axes
                .iter()
                .zip(point)
                .fold(0, |flat, (axis, u)| flat * axis.spec.nbins + axis.index(*u));
            counts[flat] += 1;
        }

        debug!(
            points = masked.len(),
            dropped,
            bins = total,
            "binned histogram"
        );

        Ok(BinnedHistogram {
            axes,
            counts,
            samples: masked.len(),
            dropped,
        })
    }
}

#[derive(Debug, Clone)]
struct Axis {
    spec: BinSpec,
    lower: f64,
    width: f64,
    centers: Vec<f64>,
}

impl Axis {
    fn new(spec: BinSpec, lower: f64, upper: f64) -> Self {
        let width = if upper > lower {
            (upper - lower) / spec.nbins as f64
        } else {
            1.0
        };
        let lower = if upper > lower { lower } else { lower - 0.5 };
        let centers = (0..spec.nbins)
            .map(|j| {
                let lo = spec.style.unmask(lower + j as f64 * width);
                let hi = spec.style.unmask(lower + (j + 1) as f64 * width);
                0.5 * (lo + hi)
            })
            .collect();
        Self {
            spec,
            lower,
            width,
            centers,
        }
    }

    /// The maximum lands in the last bin.
    fn index(&self, u: f64) -> usize {
        let raw = ((u - self.lower) / self.width).floor();
        (raw.max(0.0) as usize).min(self.spec.nbins - 1)
    }
}

/// Binned densities.
///
/// A bin's density is its fraction of the binned points divided by the bin
/// volume in masked space, then transformed back to the original variables
/// with `dmask_dx` evaluated at the bin center.
#[derive(Debug, Clone)]
pub struct BinnedHistogram {
    axes: Vec<Axis>,
    counts: Vec<usize>,
    samples: usize,
    dropped: usize,
}

impl BinnedHistogram {
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Points that made it into a bin.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Points whose masked value was not finite.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn centers(&self, dim: usize) -> &[f64] {
        &self.axes[dim].centers
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// `(bin centers, density)` for every bin, last dimension fastest.
    pub fn rows(&self) -> Vec<(Vec<f64>, f64)> {
        let volume: f64 = self.axes.iter().map(|axis| axis.width).product();
        let norm = self.samples as f64 * volume;

        self.counts
            .iter()
            .enumerate()
            .map(|(flat, count)| {
                let mut rest = flat;
                let mut coords = vec![0.0; self.axes.len()];
                let mut jacobian = 1.0;
                for (dim, axis) in self.axes.iter().enumerate().rev() {
                    let j = rest % axis.spec.nbins;
                    rest /= axis.spec.nbins;
                    coords[dim] = axis.centers[j];
                    jacobian *= axis.spec.style.dmask_dx(axis.centers[j]);
                }
                (coords, *count as f64 / norm * jacobian)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Uniform};

    use super::*;
    use crate::histogram::BinStyle;

    #[test]
    fn zero_dimensional_histogram_cannot_be_binned() {
        let mut hist = Histogram::new(0);
        hist.add(&[]).unwrap();
        assert_eq!(hist.len(), 0);
        assert!(matches!(hist.bin(&[]), Err(HistogramError::NoData)));
    }

    #[test]
    fn rejects_wrong_dimensionality() {
        let mut hist = Histogram::new(2);
        assert!(hist.add(&[1.0, 2.0]).is_ok());
        assert_eq!(
            hist.add(&[1.0]).unwrap_err(),
            HistogramError::DimensionMismatch { expected: 2, found: 1 }
        );
        assert!(matches!(
            hist.bin(&[BinSpec::linear(4)]),
            Err(HistogramError::StyleCount { .. })
        ));
    }

    #[test]
    fn linear_bins_count_every_point() {
        let mut hist = Histogram::new(1);
        for x in [0.0, 0.1, 0.5, 0.9, 1.0] {
            hist.add(&[x]).unwrap();
        }
        let binned = hist.bin(&[BinSpec::linear(2)]).unwrap();
        assert_eq!(binned.counts(), &[2, 3]);
        assert_relative_eq!(binned.centers(0)[0], 0.25);
        assert_relative_eq!(binned.centers(0)[1], 0.75);

        // Densities integrate to one over the data range.
        let integral: f64 = binned.rows().iter().map(|(_, d)| d * 0.5).sum();
        assert_relative_eq!(integral, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_samples_give_flat_density() {
        let mut rng = StdRng::seed_from_u64(21);
        let dist = Uniform::new(2.0, 4.0);
        let mut hist = Histogram::new(1);
        for _ in 0..100_000 {
            hist.add(&[dist.sample(&mut rng)]).unwrap();
        }
        let binned = hist.bin(&[BinSpec::linear(10)]).unwrap();
        for (_, density) in binned.rows() {
            assert_relative_eq!(density, 0.5, max_relative = 0.05);
        }
    }

    #[test]
    fn log_axis_drops_non_positive_values() {
        let mut hist = Histogram::new(1);
        for x in [-1.0, 0.0, 0.01, 0.1, 1.0] {
            hist.add(&[x]).unwrap();
        }
        let binned = hist
            .bin(&[BinSpec::new(2, BinStyle::log(10.0).unwrap())])
            .unwrap();
        assert_eq!(binned.dropped(), 2);
        assert_eq!(binned.samples(), 3);
        assert_eq!(binned.counts(), &[1, 2]);

        // Bin edges at 0.01, 0.1, 1; centers are the unmasked midpoints.
        assert_relative_eq!(binned.centers(0)[0], 0.055, epsilon = 1e-12);
        assert_relative_eq!(binned.centers(0)[1], 0.55, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_range_needs_a_single_bin() {
        let mut hist = Histogram::new(1);
        hist.add(&[3.0]).unwrap();
        hist.add(&[3.0]).unwrap();
        assert_eq!(
            hist.bin(&[BinSpec::linear(5)]).unwrap_err(),
            HistogramError::DegenerateRange { dim: 0 }
        );
        let binned = hist.bin(&[BinSpec::linear(1)]).unwrap();
        assert_eq!(binned.counts(), &[2]);
    }

    #[test]
    fn two_dimensional_bins_are_row_major() {
        let mut hist = Histogram::new(2);
        hist.add(&[0.0, 0.0]).unwrap();
        hist.add(&[0.0, 1.0]).unwrap();
        hist.add(&[1.0, 1.0]).unwrap();
        hist.add(&[1.0, 1.0]).unwrap();
        let binned = hist.bin(&[BinSpec::linear(2), BinSpec::linear(2)]).unwrap();
        assert_eq!(binned.counts(), &[1, 1, 0, 2]);

        let rows = binned.rows();
        assert_eq!(rows[1].0, vec![0.25, 0.75]);
        assert_relative_eq!(rows[3].1, 2.0 / (4.0 * 0.25));
    }

    #[test]
    fn empty_histogram_cannot_be_binned() {
        let hist = Histogram::new(1);
        assert_eq!(hist.bin(&[BinSpec::linear(3)]).unwrap_err(), HistogramError::NoData);
    }
}
