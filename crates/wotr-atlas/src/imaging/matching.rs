//! Normalised cross-correlation template matching.

use image::GrayImage;

/// Summed-area tables of pixel values and squared pixel values.
struct Integral {
    width: usize,
    sum: Vec<f64>,
    sq: Vec<f64>,
}

impl Integral {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0f64; stride * (h + 1)];
        let mut sq = vec![0f64; stride * (h + 1)];
        let raw = image.as_raw();
        for y in 0..h {
            let mut row_sum = 0f64;
            let mut row_sq = 0f64;
            for x in 0..w {
                let v = f64::from(raw[y * w + x]);
                row_sum += v;
                row_sq += v * v;
                let i = (y + 1) * stride + x + 1;
                sum[i] = sum[i - stride] + row_sum;
                sq[i] = sq[i - stride] + row_sq;
            }
        }
        Self {
            width: stride,
            sum,
            sq,
        }
    }

    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let s = self.width;
        let at = |t: &[f64], xx: usize, yy: usize| t[yy * s + xx];
        let rect =
            |t: &[f64]| at(t, x + w, y + h) - at(t, x, y + h) - at(t, x + w, y) + at(t, x, y);
        (rect(&self.sum), rect(&self.sq))
    }
}

/// Best correlation coefficient of `template` over every placement inside `image`.
///
/// Both the template and each image window are mean subtracted, so scores are
/// in `[-1, 1]` and insensitive to brightness offsets. Placements where either
/// side has no variance score 0. Returns `None` when the template does not fit.
pub fn match_template_max(image: &GrayImage, template: &GrayImage) -> Option<f32> {
    let (iw, ih) = (image.width() as usize, image.height() as usize);
    let (tw, th) = (template.width() as usize, template.height() as usize);
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return None;
    }

    let n = (tw * th) as f64;
    let t_raw = template.as_raw();
    let t_mean = t_raw.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let t_centered: Vec<f64> = t_raw.iter().map(|&v| f64::from(v) - t_mean).collect();
    let t_norm2: f64 = t_centered.iter().map(|v| v * v).sum();

    if t_norm2 <= f64::EPSILON {
        return Some(0.0);
    }

    let integral = Integral::new(image);
    let i_raw = image.as_raw();
    let mut best = f64::NEG_INFINITY;

    for y in 0..=(ih - th) {
        for x in 0..=(iw - tw) {
            let (sum, sq) = integral.window(x, y, tw, th);
            let var = sq - sum * sum / n;
            let score = if var <= f64::EPSILON {
                0.0
            } else {
                // sum(T' * I') == sum(T' * I) because T' sums to zero
                let mut dot = 0f64;
                for ty in 0..th {
                    let irow = (y + ty) * iw + x;
                    let trow = ty * tw;
                    for tx in 0..tw {
                        dot += t_centered[trow + tx] * f64::from(i_raw[irow + tx]);
                    }
                }
                (dot / (t_norm2 * var).sqrt()).clamp(-1.0, 1.0)
            };
            if score > best {
                best = score;
            }
        }
    }

    Some(best as f32)
}
