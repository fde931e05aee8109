use image::{GrayImage, Luma, Rgb, RgbImage};

use super::layout::WHITE;

/// Builds a single-channel mask of `width` x `height` holding a filled
/// rounded rectangle: 255 inside, 0 outside.
///
/// Coverage is tested at pixel centers. The radius is clamped to half of the
/// shorter side.
pub fn rounded_rect_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    let radius = radius.min(width / 2).min(height / 2);
    GrayImage::from_fn(width, height, |x, y| {
        if rounded_rect_contains(x, y, width, height, radius) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn rounded_rect_contains(x: u32, y: u32, width: u32, height: u32, radius: u32) -> bool {
    if radius == 0 {
        return true;
    }

    let r = radius as f32;
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;

    let cx = if px < r {
        r
    } else if px > (width - radius) as f32 {
        (width - radius) as f32
    } else {
        return true;
    };
    let cy = if py < r {
        r
    } else if py > (height - radius) as f32 {
        (height - radius) as f32
    } else {
        return true;
    };

    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy <= r * r
}

/// Blends `image` over an opaque white background using `mask` as the
/// per-pixel weight. The result has no transparency: mask 0 yields pure
/// white, mask 255 yields the source pixel.
pub fn flatten_onto_white(image: &RgbImage, mask: &GrayImage) -> RgbImage {
    debug_assert_eq!(image.dimensions(), mask.dimensions());

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let alpha = mask.get_pixel(x, y).0[0] as u32;
        if alpha == 255 {
            return *image.get_pixel(x, y);
        }
        if alpha == 0 {
            return WHITE;
        }

        let src = image.get_pixel(x, y).0;
        let inv = 255 - alpha;
        let blend = |c: u8| ((c as u32 * alpha + 255 * inv + 127) / 255) as u8;
        Rgb([blend(src[0]), blend(src[1]), blend(src[2])])
    })
}

/// Applies a rounded-rectangle mask of the given radius and flattens the
/// result onto white.
pub fn apply_rounded_corners(image: &RgbImage, radius: u32) -> RgbImage {
    let mask = rounded_rect_mask(image.width(), image.height(), radius);
    flatten_onto_white(image, &mask)
}
