//! Pure raster layout: arranges already-decoded images on a white canvas.

use image::{
    imageops::{self, FilterType},
    Rgb, RgbImage,
};
use serde::{Deserialize, Serialize};

use super::mask::apply_rounded_corners;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Maximum number of cells in a grid composite
pub const GRID_CAPACITY: usize = 4;

/// Largest RGB canvas a composite may allocate, matching `image`'s default
/// decoder allocation limit
pub const MAX_CANVAS_BYTES: u64 = 512 * 1024 * 1024;

const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Composite arrangement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub cell_width: u32,
    pub cell_height: u32,
    pub padding: u32,
    pub corner_radius: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            cell_width: 600,
            cell_height: 600,
            padding: 20,
            corner_radius: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalOptions {
    pub width: u32,
    pub padding: u32,
    pub corner_radius: u32,
}

impl Default for VerticalOptions {
    fn default() -> Self {
        Self {
            width: 600,
            padding: 20,
            corner_radius: 20,
        }
    }
}

/// Columns and rows for a grid holding `count` images.
///
/// Three images use a 2x2 grid and leave the last cell empty.
pub fn grid_dimensions(count: usize) -> (u32, u32) {
    match count {
        0 | 1 => (1, 1),
        2 => (2, 1),
        _ => (2, 2),
    }
}

/// Canvas size of a grid composite of `count` images
pub fn grid_canvas_size(count: usize, options: &GridOptions) -> (u32, u32) {
    let (cols, rows) = grid_dimensions(count.min(GRID_CAPACITY));
    (
        cols * options.cell_width + (cols + 1) * options.padding,
        rows * options.cell_height + (rows + 1) * options.padding,
    )
}

/// Size of an image after shrinking it to fit inside `max_width` x `max_height`
/// with its aspect ratio preserved. Images that already fit are left as is.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (fitted_width, fitted_height)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Composite dimensions overflow")]
    Overflow,

    #[error("Composite canvas {width}x{height} exceeds the {limit} byte limit")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },
}

/// Height of an image scaled to `target_width`, truncated like integer division.
///
/// Returns `None` when the scaled height does not fit in a `u32`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> Option<u32> {
    let scaled = (target_width as u64 * height as u64) / width.max(1) as u64;
    u32::try_from(scaled).ok().map(|h| h.max(1))
}

/// Renders up to four images row-major into a grid of padded, corner-masked cells.
pub fn render_grid(images: &[RgbImage], options: &GridOptions) -> RgbImage {
    let images = &images[..images.len().min(GRID_CAPACITY)];
    let (cols, _) = grid_dimensions(images.len());
    let (canvas_width, canvas_height) = grid_canvas_size(images.len(), options);
    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, WHITE);

    for (idx, image) in images.iter().enumerate() {
        let cell = render_cell(image, options);
        let col = idx as u32 % cols;
        let row = idx as u32 / cols;
        let x = options.padding + col * (options.cell_width + options.padding);
        let y = options.padding + row * (options.cell_height + options.padding);
        imageops::replace(&mut canvas, &cell, x as i64, y as i64);
    }

    canvas
}

fn render_cell(image: &RgbImage, options: &GridOptions) -> RgbImage {
    let inner_width = options.cell_width.saturating_sub(options.padding * 2).max(1);
    let inner_height = options.cell_height.saturating_sub(options.padding * 2).max(1);
    let (width, height) = fit_within(image.width(), image.height(), inner_width, inner_height);

    let mut cell = RgbImage::from_pixel(options.cell_width, options.cell_height, WHITE);
    let x = (options.cell_width - width) / 2;
    let y = (options.cell_height - height) / 2;

    if (width, height) == image.dimensions() {
        imageops::replace(&mut cell, image, x as i64, y as i64);
    } else {
        let resized = imageops::resize(image, width, height, RESAMPLE_FILTER);
        imageops::replace(&mut cell, &resized, x as i64, y as i64);
    }

    apply_rounded_corners(&cell, options.corner_radius)
}

/// Canvas size of a vertical composite for images of the given dimensions.
///
/// Fails before anything is allocated when the size overflows or the RGB
/// canvas would exceed [`MAX_CANVAS_BYTES`].
pub fn vertical_canvas_size(
    dimensions: &[(u32, u32)],
    options: &VerticalOptions,
) -> Result<(u32, u32), LayoutError> {
    let tile_width = options
        .padding
        .checked_mul(2)
        .and_then(|p| p.checked_add(options.width))
        .ok_or(LayoutError::Overflow)?;
    // Each tile carries padding above and below the image plus the gap after it
    let per_tile = options.padding.checked_mul(3).ok_or(LayoutError::Overflow)?;

    let mut height = options.padding;
    for &(w, h) in dimensions {
        height = scaled_height(w, h, options.width)
            .and_then(|scaled| scaled.checked_add(per_tile))
            .and_then(|tile| height.checked_add(tile))
            .ok_or(LayoutError::Overflow)?;
    }

    if tile_width as u64 * height as u64 * 3 > MAX_CANVAS_BYTES {
        return Err(LayoutError::CanvasTooLarge {
            width: tile_width,
            height,
            limit: MAX_CANVAS_BYTES,
        });
    }

    Ok((tile_width, height))
}

/// Scales every image to a fixed width and stacks the padded, corner-masked
/// tiles top to bottom in input order.
pub fn render_vertical(
    images: &[RgbImage],
    options: &VerticalOptions,
) -> Result<RgbImage, LayoutError> {
    let dimensions: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
    let (canvas_width, canvas_height) = vertical_canvas_size(&dimensions, options)?;
    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, WHITE);

    let mut y = options.padding;
    for image in images {
        // Bounded by the canvas height checked above
        let height = scaled_height(image.width(), image.height(), options.width)
            .ok_or(LayoutError::Overflow)?;
        let resized = imageops::resize(image, options.width, height, RESAMPLE_FILTER);

        let mut tile = RgbImage::from_pixel(canvas_width, height + options.padding * 2, WHITE);
        imageops::replace(
            &mut tile,
            &resized,
            options.padding as i64,
            options.padding as i64,
        );
        let tile = apply_rounded_corners(&tile, options.corner_radius);

        imageops::replace(&mut canvas, &tile, 0, y as i64);
        y += tile.height() + options.padding;
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgb<u8> = Rgb([10, 20, 200]);

    fn solid(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
        RgbImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(grid_dimensions(1), (1, 1));
        assert_eq!(grid_dimensions(2), (2, 1));
        assert_eq!(grid_dimensions(3), (2, 2));
        assert_eq!(grid_dimensions(4), (2, 2));
    }

    #[test]
    fn test_grid_canvas_size() {
        let options = GridOptions::default();
        assert_eq!(grid_canvas_size(1, &options), (640, 640));
        assert_eq!(grid_canvas_size(2, &options), (1260, 640));
        assert_eq!(grid_canvas_size(3, &options), (1260, 1260));
        assert_eq!(grid_canvas_size(4, &options), (1260, 1260));
        assert_eq!(grid_canvas_size(7, &options), (1260, 1260));
    }

    #[test]
    fn test_fit_within_shrinks_preserving_aspect() {
        assert_eq!(fit_within(1120, 560, 560, 560), (560, 280));
        assert_eq!(fit_within(300, 1200, 560, 560), (140, 560));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(100, 50, 560, 560), (100, 50));
    }

    #[test]
    fn test_scaled_height_truncates() {
        assert_eq!(scaled_height(800, 1000, 600), Some(750));
        assert_eq!(scaled_height(700, 1000, 600), Some(857));
        assert_eq!(scaled_height(10_000, 1, 600), Some(1));
    }

    #[test]
    fn test_scaled_height_rejects_u32_overflow() {
        assert_eq!(scaled_height(1, 8_000_000, 600), None);
    }

    #[test]
    fn test_vertical_canvas_size_rejects_overflowing_sum() {
        let result = vertical_canvas_size(
            &[(1, 4_000_000), (1, 4_000_000)],
            &VerticalOptions::default(),
        );
        assert_eq!(result, Err(LayoutError::Overflow));
    }

    #[test]
    fn test_vertical_canvas_size_rejects_oversized_canvas() {
        let result = vertical_canvas_size(&[(1, 20_000)], &VerticalOptions::default());
        assert_eq!(
            result,
            Err(LayoutError::CanvasTooLarge {
                width: 640,
                height: 12_000_080,
                limit: MAX_CANVAS_BYTES,
            })
        );
    }

    #[test]
    fn test_render_vertical_rejects_tall_narrow_image() {
        let images = vec![solid(1, 20_000, BLUE)];
        let result = render_vertical(&images, &VerticalOptions::default());
        assert!(matches!(result, Err(LayoutError::CanvasTooLarge { .. })));
    }

    #[test]
    fn test_render_grid_two_images_size() {
        let images = vec![solid(800, 800, BLUE), solid(300, 500, BLUE)];
        let canvas = render_grid(&images, &GridOptions::default());
        assert_eq!(canvas.dimensions(), (1260, 640));
    }

    #[test]
    fn test_render_grid_three_images_leaves_last_cell_white() {
        let images = vec![solid(600, 600, BLUE); 3];
        let canvas = render_grid(&images, &GridOptions::default());
        assert_eq!(canvas.dimensions(), (1260, 1260));
        // Center of the fourth cell
        assert_eq!(*canvas.get_pixel(20 + 600 + 20 + 300, 20 + 600 + 20 + 300), WHITE);
        // Center of the third cell holds the image
        assert_eq!(*canvas.get_pixel(20 + 300, 20 + 600 + 20 + 300), BLUE);
    }

    #[test]
    fn test_render_grid_truncates_to_capacity() {
        let images = vec![solid(50, 50, BLUE); 6];
        let canvas = render_grid(&images, &GridOptions::default());
        assert_eq!(canvas.dimensions(), (1260, 1260));
    }

    #[test]
    fn test_render_grid_places_row_major() {
        let red = Rgb([220, 0, 0]);
        let images = vec![solid(560, 560, BLUE), solid(560, 560, red)];
        let canvas = render_grid(&images, &GridOptions::default());
        assert_eq!(*canvas.get_pixel(20 + 300, 320), BLUE);
        assert_eq!(*canvas.get_pixel(640 + 300, 320), red);
    }

    #[test]
    fn test_render_grid_is_centered_and_padded() {
        let canvas = render_grid(&[solid(560, 560, BLUE)], &GridOptions::default());
        // Canvas padding and the cell's own inner padding stay white
        assert_eq!(*canvas.get_pixel(10, 320), WHITE);
        assert_eq!(*canvas.get_pixel(30, 320), WHITE);
        assert_eq!(*canvas.get_pixel(45, 320), BLUE);
        assert_eq!(*canvas.get_pixel(320, 320), BLUE);
    }

    #[test]
    fn test_render_grid_dimensions_are_stable() {
        let images = vec![solid(123, 456, BLUE), solid(789, 12, BLUE)];
        let first = render_grid(&images, &GridOptions::default());
        let second = render_grid(&images, &GridOptions::default());
        assert_eq!(first.dimensions(), second.dimensions());
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_vertical_size() {
        let images = vec![solid(800, 1000, BLUE), solid(600, 300, BLUE)];
        let canvas = render_vertical(&images, &VerticalOptions::default()).unwrap();
        // 20 + (750 + 40 + 20) + (300 + 40 + 20)
        assert_eq!(canvas.dimensions(), (640, 1190));
        assert_eq!(
            vertical_canvas_size(&[(800, 1000), (600, 300)], &VerticalOptions::default()),
            Ok((640, 1190))
        );
    }

    #[test]
    fn test_render_vertical_stacks_in_order() {
        let red = Rgb([220, 0, 0]);
        let images = vec![solid(600, 100, BLUE), solid(600, 100, red)];
        let canvas = render_vertical(&images, &VerticalOptions::default()).unwrap();
        // First tile starts at y=20, image at y=40..140
        assert_eq!(*canvas.get_pixel(320, 90), BLUE);
        // Second tile starts at y=20+140+20=180, image at y=200..300
        assert_eq!(*canvas.get_pixel(320, 250), red);
        assert_eq!(*canvas.get_pixel(0, 20), WHITE);
    }
}
