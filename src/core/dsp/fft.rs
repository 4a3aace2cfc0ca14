//! Two-dimensional FFT over pixel planes

use num_complex::Complex;
use rustfft::FftPlanner;

/// Centred magnitude spectrum of a 2-D plane
#[derive(Debug, Clone)]
pub struct Spectrum2d {
    width: usize,
    height: usize,
    /// Row-major, fft-shifted so DC sits at (height/2, width/2)
    magnitudes: Vec<f32>,
}

impl Spectrum2d {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn magnitude(&self, x: usize, y: usize) -> f32 {
        self.magnitudes[y * self.width + x]
    }

    pub fn mean(&self) -> f64 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        self.magnitudes.iter().map(|&m| m as f64).sum::<f64>() / self.magnitudes.len() as f64
    }

    /// Mean magnitude over a `size`×`size` window around DC, clipped to the plane
    pub fn center_mean(&self, size: usize) -> f64 {
        let half = size / 2;
        let (cx, cy) = (self.width / 2, self.height / 2);
        let (x0, x1) = (cx.saturating_sub(half), (cx + half).min(self.width));
        let (y0, y1) = (cy.saturating_sub(half), (cy + half).min(self.height));

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for y in y0..y1 {
            for x in x0..x1 {
                sum += self.magnitude(x, y) as f64;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Ratio of central (low-frequency) energy to the overall mean.
    ///
    /// `None` when the spectrum carries no energy at all.
    pub fn low_frequency_ratio(&self, window: usize) -> Option<f64> {
        let overall = self.mean();
        if overall <= f64::EPSILON {
            return None;
        }
        Some(self.center_mean(window) / overall)
    }
}

/// 2-D FFT computed as row transforms followed by column transforms
pub struct FftProcessor2d {
    planner: FftPlanner<f32>,
}

impl Default for FftProcessor2d {
    fn default() -> Self {
        Self::new()
    }
}

impl FftProcessor2d {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Compute the fft-shifted magnitude spectrum of a row-major plane
    pub fn magnitude_spectrum(&mut self, plane: &[f32], width: usize, height: usize) -> Spectrum2d {
        if width == 0 || height == 0 || plane.len() != width * height {
            return Spectrum2d {
                width: 0,
                height: 0,
                magnitudes: Vec::new(),
            };
        }

        let mut rows: Vec<Complex<f32>> = plane.iter().map(|&p| Complex::new(p, 0.0)).collect();

        // Each row is one chunk of `width`
        self.planner.plan_fft_forward(width).process(&mut rows);

        let mut columns = transpose(&rows, width, height);
        self.planner.plan_fft_forward(height).process(&mut columns);
        let spectrum = transpose(&columns, height, width);

        let mut magnitudes = vec![0.0f32; width * height];
        for y in 0..height {
            for x in 0..width {
                let shifted_y = (y + height / 2) % height;
                let shifted_x = (x + width / 2) % width;
                magnitudes[shifted_y * width + shifted_x] = spectrum[y * width + x].norm();
            }
        }

        Spectrum2d {
            width,
            height,
            magnitudes,
        }
    }
}

/// Transpose a row-major `width`×`height` buffer into `height`×`width`
fn transpose(data: &[Complex<f32>], width: usize, height: usize) -> Vec<Complex<f32>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}
