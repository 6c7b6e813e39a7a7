//! Output geometry for resize requests.
//!
//! Pure functions; nothing here touches the operation log or the network.

use imgbatch_core::ImageSize;

/// Source rectangle and destination size for one resize.
///
/// `src_*` address the current image; `dst_*` is the size the result will have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDimensions {
    pub dst_x: u32,
    pub dst_y: u32,
    pub src_x: u32,
    pub src_y: u32,
    pub dst_w: u32,
    pub dst_h: u32,
    pub src_w: u32,
    pub src_h: u32,
}

impl ResizeDimensions {
    pub fn destination(&self) -> ImageSize {
        ImageSize::new(self.dst_w, self.dst_h)
    }
}

/// Resolve the geometry for resizing `current` towards the requested bounds.
///
/// A zero target side counts as absent. Returns `None` when there is no
/// solution: the current size is empty, both targets are absent, or the result
/// would not be smaller than the original on either axis while neither
/// requested side matches the current one.
pub fn resolve(
    current: ImageSize,
    target_w: Option<u32>,
    target_h: Option<u32>,
    crop: bool,
) -> Option<ResizeDimensions> {
    let (orig_w, orig_h) = (current.width, current.height);
    if orig_w == 0 || orig_h == 0 {
        return None;
    }

    let dest_w = target_w.unwrap_or(0);
    let dest_h = target_h.unwrap_or(0);
    if dest_w == 0 && dest_h == 0 {
        return None;
    }

    let (new_w, new_h, src_x, src_y, src_w, src_h) = if crop {
        let aspect_ratio = orig_w as f64 / orig_h as f64;
        let mut new_w = dest_w.min(orig_w);
        let mut new_h = dest_h.min(orig_h);

        if new_w == 0 {
            new_w = (new_h as f64 * aspect_ratio).round() as u32;
        }
        if new_h == 0 {
            new_h = (new_w as f64 / aspect_ratio).round() as u32;
        }
        if new_w == 0 || new_h == 0 {
            return None;
        }

        let size_ratio = f64::max(new_w as f64 / orig_w as f64, new_h as f64 / orig_h as f64);
        let crop_w = (new_w as f64 / size_ratio).round() as u32;
        let crop_h = (new_h as f64 / size_ratio).round() as u32;

        // Center the crop box
        let s_x = ((orig_w as f64 - crop_w as f64) / 2.0).floor().max(0.0) as u32;
        let s_y = ((orig_h as f64 - crop_h as f64) / 2.0).floor().max(0.0) as u32;

        (new_w, new_h, s_x, s_y, crop_w, crop_h)
    } else {
        let (new_w, new_h) = constrain_dimensions(orig_w, orig_h, dest_w, dest_h);
        (new_w, new_h, 0, 0, orig_w, orig_h)
    };

    if new_w >= orig_w && new_h >= orig_h && dest_w != orig_w && dest_h != orig_h {
        return None;
    }

    Some(ResizeDimensions {
        dst_x: 0,
        dst_y: 0,
        src_x,
        src_y,
        dst_w: new_w,
        dst_h: new_h,
        src_w,
        src_h,
    })
}

/// Scale `current_w x current_h` down to fit inside `max_w x max_h`, keeping the aspect ratio.
///
/// A zero bound means unbounded on that axis. Never scales up.
pub fn constrain_dimensions(current_w: u32, current_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if max_w == 0 && max_h == 0 {
        return (current_w, current_h);
    }

    let mut width_ratio = 1.0_f64;
    let mut height_ratio = 1.0_f64;
    let mut did_width = false;
    let mut did_height = false;

    if max_w > 0 && current_w > 0 && current_w > max_w {
        width_ratio = max_w as f64 / current_w as f64;
        did_width = true;
    }

    if max_h > 0 && current_h > 0 && current_h > max_h {
        height_ratio = max_h as f64 / current_h as f64;
        did_height = true;
    }

    let smaller_ratio = width_ratio.min(height_ratio);
    let larger_ratio = width_ratio.max(height_ratio);

    let ratio = if (current_w as f64 * larger_ratio).round() as u32 > max_w
        || (current_h as f64 * larger_ratio).round() as u32 > max_h
    {
        smaller_ratio
    } else {
        larger_ratio
    };

    let mut w = ((current_w as f64 * ratio).round() as u32).max(1);
    let mut h = ((current_h as f64 * ratio).round() as u32).max(1);

    // Rounding can land one pixel short of the bound
    if did_width && w + 1 == max_w {
        w = max_w;
    }
    if did_height && h + 1 == max_h {
        h = max_h;
    }

    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> ImageSize {
        ImageSize::new(w, h)
    }

    #[test]
    fn test_fit_preserves_aspect_ratio() {
        let dims = resolve(size(400, 300), Some(100), Some(100), false).unwrap();
        assert_eq!(dims.destination(), size(100, 75));
        assert_eq!((dims.src_x, dims.src_y, dims.src_w, dims.src_h), (0, 0, 400, 300));
    }

    #[test]
    fn test_fit_with_single_side() {
        let dims = resolve(size(1024, 768), Some(300), None, false).unwrap();
        assert_eq!(dims.destination(), size(300, 225));

        let dims = resolve(size(1024, 768), None, Some(300), false).unwrap();
        assert_eq!(dims.destination(), size(400, 300));
    }

    #[test]
    fn test_crop_centers_source_rectangle() {
        let dims = resolve(size(400, 300), Some(100), Some(100), true).unwrap();
        assert_eq!(
            dims,
            ResizeDimensions {
                dst_x: 0,
                dst_y: 0,
                src_x: 50,
                src_y: 0,
                dst_w: 100,
                dst_h: 100,
                src_w: 300,
                src_h: 300,
            }
        );
    }

    #[test]
    fn test_crop_derives_missing_side() {
        let dims = resolve(size(400, 200), Some(100), None, true).unwrap();
        assert_eq!(dims.destination(), size(100, 50));
        assert_eq!((dims.src_w, dims.src_h), (400, 200));
    }

    #[test]
    fn test_crop_clamps_target_to_current() {
        // Wider than the image: width clamps to 400, height crops
        let dims = resolve(size(400, 300), Some(800), Some(150), true).unwrap();
        assert_eq!(dims.destination(), size(400, 150));
        assert_eq!((dims.src_x, dims.src_y, dims.src_w, dims.src_h), (0, 75, 400, 150));
    }

    #[test]
    fn test_refuses_upscale() {
        assert_eq!(resolve(size(100, 80), Some(200), Some(200), false), None);
        assert_eq!(resolve(size(100, 80), Some(200), Some(200), true), None);
    }

    #[test]
    fn test_matching_side_is_not_an_upscale() {
        let dims = resolve(size(100, 80), Some(100), Some(200), false).unwrap();
        assert_eq!(dims.destination(), size(100, 80));
    }

    #[test]
    fn test_no_solution_for_empty_inputs() {
        assert_eq!(resolve(size(0, 80), Some(10), Some(10), false), None);
        assert_eq!(resolve(size(100, 80), None, None, false), None);
        assert_eq!(resolve(size(100, 80), Some(0), Some(0), true), None);
    }

    #[test]
    fn test_constrain_unbounded_and_within_bounds() {
        assert_eq!(constrain_dimensions(640, 480, 0, 0), (640, 480));
        assert_eq!(constrain_dimensions(640, 480, 1000, 1000), (640, 480));
    }

    #[test]
    fn test_constrain_uses_smaller_ratio() {
        assert_eq!(constrain_dimensions(465, 700, 177, 177), (118, 177));
        assert_eq!(constrain_dimensions(3000, 4000, 2600, 2600), (1950, 2600));
    }

    #[test]
    fn test_constrain_snaps_off_by_one() {
        assert_eq!(constrain_dimensions(695, 700, 177, 177), (177, 177));
    }

    #[test]
    fn test_constrain_minimum_one_pixel() {
        assert_eq!(constrain_dimensions(10000, 10, 100, 0), (100, 1));
    }
}
