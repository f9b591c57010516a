//! Per-pixel image filters: Gaussian blur and grayscale conversion.

use crate::raster::Image;

pub const BLUR_KERNEL_SIZE: usize = 5;
pub const BLUR_SIGMA: f64 = 1.0;

/// Normalized 5x5 Gaussian kernel, indexed `[ky][kx]`.
pub fn gaussian_kernel() -> [[f64; BLUR_KERNEL_SIZE]; BLUR_KERNEL_SIZE] {
    let half = (BLUR_KERNEL_SIZE / 2) as i32;
    let mut kernel = [[0.0; BLUR_KERNEL_SIZE]; BLUR_KERNEL_SIZE];
    let mut sum = 0.0;

    for (i, row) in kernel.iter_mut().enumerate() {
        for (j, w) in row.iter_mut().enumerate() {
            let x = i as i32 - half;
            let y = j as i32 - half;
            *w = (-((x * x + y * y) as f64) / (2.0 * BLUR_SIGMA * BLUR_SIGMA)).exp();
            sum += *w;
        }
    }

    for w in kernel.iter_mut().flatten() {
        *w /= sum;
    }
    kernel
}

/// Blur `input` into `output` with the fixed Gaussian kernel.
///
/// Taps falling outside the image are dropped and the remaining weights are
/// NOT renormalized, so border pixels come out darker than the interior.
/// Every strategy relies on this exact behaviour to produce identical bytes.
pub fn gaussian_blur(input: &Image, output: &mut Image) {
    debug_assert!(input.same_dimensions(output));

    let kernel = gaussian_kernel();
    let half = (BLUR_KERNEL_SIZE / 2) as i64;
    let width = input.width() as i64;
    let height = input.height() as i64;
    let src = input.data();

    output.clear();

    for y in 0..height {
        for x in 0..width {
            let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
            for (ky, row) in kernel.iter().enumerate() {
                let ny = y + ky as i64 - half;
                if ny < 0 || ny >= height {
                    continue;
                }
                for (kx, &w) in row.iter().enumerate() {
                    let nx = x + kx as i64 - half;
                    if nx < 0 || nx >= width {
                        continue;
                    }
                    let idx = 3 * (ny * width + nx) as usize;
                    r += src[idx] as f64 * w;
                    g += src[idx + 1] as f64 * w;
                    b += src[idx + 2] as f64 * w;
                }
            }
            output.set_pixel(x as usize, y as usize, [r as u8, g as u8, b as u8]);
        }
    }
}

/// Convert `input` to luma, writing the gray value into all three channels
/// of `output`.
pub fn grayscale(input: &Image, output: &mut Image) {
    debug_assert!(input.same_dimensions(output));

    for (src, dst) in input.data().chunks_exact(3).zip(output.data_mut().chunks_exact_mut(3)) {
        let gray = (0.299 * src[0] as f64 + 0.587 * src[1] as f64 + 0.114 * src[2] as f64) as u8;
        dst.fill(gray);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sums_to_one() {
        let sum: f64 = gaussian_kernel().iter().flatten().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn kernel_is_symmetric_and_peaks_at_centre() {
        let k = gaussian_kernel();
        assert_eq!(k[0][1], k[1][0]);
        assert_eq!(k[4][4], k[0][0]);
        let max = k.iter().flatten().cloned().fold(f64::MIN, f64::max);
        assert_eq!(max, k[2][2]);
    }

    #[test]
    fn uniform_interior_is_preserved_and_border_darkens() {
        let mut input = Image::new(9, 9).unwrap();
        input.data_mut().fill(200);
        let mut output = Image::new(9, 9).unwrap();
        gaussian_blur(&input, &mut output);

        // Interior pixel sees the full kernel; float rounding may land a hair under.
        let centre = output.pixel(4, 4)[0];
        assert!(centre == 199 || centre == 200, "centre = {centre}");
        // Corner only sees a quarter-ish of the kernel, without renormalization.
        assert!(output.pixel(0, 0)[0] < 150);
        assert!(output.pixel(0, 0)[0] < output.pixel(0, 4)[0]);
    }

    #[test]
    fn black_stays_black() {
        let input = Image::new(6, 4).unwrap();
        let mut output = Image::new(6, 4).unwrap();
        output.data_mut().fill(17);
        gaussian_blur(&input, &mut output);
        assert!(output.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn grayscale_weights() {
        let mut input = Image::new(3, 1).unwrap();
        input.set_pixel(0, 0, [255, 0, 0]);
        input.set_pixel(1, 0, [0, 255, 0]);
        input.set_pixel(2, 0, [0, 0, 255]);
        let mut output = Image::new(3, 1).unwrap();
        grayscale(&input, &mut output);

        assert_eq!(output.pixel(0, 0), [76, 76, 76]);
        assert_eq!(output.pixel(1, 0), [149, 149, 149]);
        assert_eq!(output.pixel(2, 0), [29, 29, 29]);
    }
}
