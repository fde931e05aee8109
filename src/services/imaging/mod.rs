//! Composite image pipeline: fetch remote photos, lay them out, publish the result.

pub mod composite;
pub mod fetcher;
pub mod layout;
pub mod mask;

pub use composite::{encode_jpeg, CompositeError, CompositeService, JPEG_QUALITY};
pub use fetcher::{decode_rgb, decode_upload, FetchError, HttpImageFetcher, ImageFetcher};
pub use layout::{
    grid_canvas_size, render_grid, render_vertical, GridOptions, Layout, LayoutError,
    VerticalOptions, GRID_CAPACITY,
};
