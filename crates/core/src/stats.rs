use serde::Serialize;

use crate::raster::Image;

/// Summary statistics of a grayscale image's first channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImageStats {
    pub min: u8,
    pub max: u8,
    pub mode: u8,
    pub mean: f64,
    pub median: f64,
}

/// Compute statistics over the gray channel (channel 0) of `img`.
///
/// The mode is the intensity with the strictly largest count, so ties keep
/// the lowest intensity. The median averages the order statistics at ranks
/// `N/2 - 1` and `N/2`, located through the cumulative histogram.
pub fn compute_stats(img: &Image) -> ImageStats {
    let mut histogram = [0u64; 256];
    let mut sum = 0.0;
    let mut min = u8::MAX;
    let mut max = u8::MIN;

    for px in img.data().chunks_exact(3) {
        let gray = px[0];
        sum += gray as f64;
        histogram[gray as usize] += 1;
        min = min.min(gray);
        max = max.max(gray);
    }

    let total = img.pixel_count() as i64;
    let mid1 = total / 2 - 1;
    let mid2 = total / 2;

    let mut mode = 0u8;
    let mut max_count = 0u64;
    let mut cumulative: i64 = 0;
    let mut median1: Option<usize> = None;
    let mut median2: Option<usize> = None;

    for (intensity, &count) in histogram.iter().enumerate() {
        if count > max_count {
            max_count = count;
            mode = intensity as u8;
        }

        cumulative += count as i64;
        if median1.is_none() && cumulative > mid1 {
            median1 = Some(intensity);
        }
        if median2.is_none() && cumulative > mid2 {
            median2 = Some(intensity);
        }
    }

    let median = match (median1, median2) {
        (Some(a), Some(b)) => (a + b) as f64 / 2.0,
        _ => 0.0,
    };

    ImageStats {
        min,
        max,
        mode,
        mean: sum / total as f64,
        median,
    }
}
