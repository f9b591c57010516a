//! Rasterizes a body snapshot into an RGB image.

use crate::body::Body;
use crate::raster::Image;

/// World-space box mapped onto the pixel grid.
pub const X_MIN: f64 = -60.0;
pub const X_MAX: f64 = 80.0;
pub const Y_MIN: f64 = -30.0;
pub const Y_MAX: f64 = 30.0;

/// Draw every body as a filled disc in its colour.
///
/// The image is cleared first. Later bodies overwrite earlier ones where
/// discs overlap, and pixels outside the image are clipped.
pub fn render(bodies: &[Body], img: &mut Image) {
    img.clear();

    let width = img.width() as i64;
    let height = img.height() as i64;

    for body in bodies {
        let cx = ((body.x - X_MIN) / (X_MAX - X_MIN) * width as f64) as i64;
        let cy = ((body.y - Y_MIN) / (Y_MAX - Y_MIN) * height as f64) as i64;
        let r = (body.radius * body.radius_scale / (X_MAX - X_MIN) * width as f64) as i64;
        let r_squared = r * r;

        // Clamp the scan window to the image so huge discs stay cheap.
        let x_lo = (cx - r).max(0);
        let x_hi = (cx + r).min(width - 1);
        let y_lo = (cy - r).max(0);
        let y_hi = (cy + r).min(height - 1);

        for ny in y_lo..=y_hi {
            let dy = ny - cy;
            for nx in x_lo..=x_hi {
                let dx = nx - cx;
                if dx * dx + dy * dy <= r_squared {
                    img.set_pixel(nx as usize, ny as usize, body.color);
                }
            }
        }
    }
}
