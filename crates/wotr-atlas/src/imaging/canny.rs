//! Canny edge detection.

use image::{GrayImage, Luma};

/// Low hysteresis threshold used for symbol matching.
pub const CANNY_LOW: f32 = 50.0;
/// High hysteresis threshold used for symbol matching.
pub const CANNY_HIGH: f32 = 150.0;

// tan(22.5°) and tan(67.5°)
const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Edge map of `image`: 255 on edges, 0 elsewhere.
///
/// 3x3 Sobel gradients with replicated borders, L1 magnitude, non-maximum
/// suppression along the quantised gradient direction and 8-connected
/// hysteresis between `low` and `high`.
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    let (wu, hu) = (w as usize, h as usize);
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    let px = |x: i64, y: i64| -> f32 {
        let x = x.clamp(0, i64::from(w) - 1) as u32;
        let y = y.clamp(0, i64::from(h) - 1) as u32;
        f32::from(image.get_pixel(x, y).0[0])
    };

    let mut gx = vec![0f32; wu * hu];
    let mut gy = vec![0f32; wu * hu];
    let mut mag = vec![0f32; wu * hu];
    for y in 0..hu {
        for x in 0..wu {
            let (xi, yi) = (x as i64, y as i64);
            let dx = (px(xi + 1, yi - 1) + 2.0 * px(xi + 1, yi) + px(xi + 1, yi + 1))
                - (px(xi - 1, yi - 1) + 2.0 * px(xi - 1, yi) + px(xi - 1, yi + 1));
            let dy = (px(xi - 1, yi + 1) + 2.0 * px(xi, yi + 1) + px(xi + 1, yi + 1))
                - (px(xi - 1, yi - 1) + 2.0 * px(xi, yi - 1) + px(xi + 1, yi - 1));
            let i = y * wu + x;
            gx[i] = dx;
            gy[i] = dy;
            mag[i] = dx.abs() + dy.abs();
        }
    }

    // 0 = suppressed, 1 = weak, 2 = strong
    let mut class = vec![0u8; wu * hu];
    let mut stack = Vec::new();
    for y in 1..hu - 1 {
        for x in 1..wu - 1 {
            let i = y * wu + x;
            let m = mag[i];
            if m <= low {
                continue;
            }
            let (ax, ay) = (gx[i].abs(), gy[i].abs());
            let (a, b) = if ay <= ax * TAN_22_5 {
                (mag[i - 1], mag[i + 1])
            } else if ay >= ax * TAN_67_5 {
                (mag[i - wu], mag[i + wu])
            } else if (gx[i] > 0.0) == (gy[i] > 0.0) {
                (mag[i - wu - 1], mag[i + wu + 1])
            } else {
                (mag[i - wu + 1], mag[i + wu - 1])
            };
            if m > a && m >= b {
                if m > high {
                    class[i] = 2;
                    stack.push(i);
                } else {
                    class[i] = 1;
                }
            }
        }
    }

    while let Some(i) = stack.pop() {
        out.put_pixel((i % wu) as u32, (i / wu) as u32, Luma([255]));
        let (x, y) = ((i % wu) as i64, (i / wu) as i64);
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if nx < 0 || ny < 0 || nx >= wu as i64 || ny >= hu as i64 {
                    continue;
                }
                let j = ny as usize * wu + nx as usize;
                if class[j] == 1 {
                    class[j] = 2;
                    stack.push(j);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::is_blank;

    fn square(size: u32, inner: std::ops::Range<u32>) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if inner.contains(&x) && inner.contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(16, 16, Luma([90]));
        assert!(is_blank(&canny(&img, CANNY_LOW, CANNY_HIGH)));
    }

    #[test]
    fn test_square_outline_detected() {
        let img = square(20, 5..15);
        let edges = canny(&img, CANNY_LOW, CANNY_HIGH);
        assert!(!is_blank(&edges));

        // edges hug the square boundary, interior and far background stay empty
        assert_eq!(edges.get_pixel(10, 10).0[0], 0);
        assert_eq!(edges.get_pixel(1, 1).0[0], 0);
        let on_left_edge = (4..=5).any(|x| edges.get_pixel(x, 10).0[0] == 255);
        assert!(on_left_edge);
    }

    #[test]
    fn test_tiny_image_is_blank() {
        let img = GrayImage::from_pixel(2, 2, Luma([255]));
        assert!(is_blank(&canny(&img, CANNY_LOW, CANNY_HIGH)));
    }
}
