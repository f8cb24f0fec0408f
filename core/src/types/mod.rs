//! Core type definitions for mask editing and area measurement
//!
//! This module provides the fundamental types used throughout the mammarea library:
//! - [`PixelSpacing`]: Physical size of a pixel step, validated positive
//! - [`Laterality`], [`ViewPosition`], [`MammogramView`]: Projection labelling
//! - [`RawImage`], [`RasterImage`], [`MaskRaster`]: Decoded, displayable and mask rasters
//! - [`Size`], [`Dims`], [`ViewportPoint`], [`ImagePoint`]: Display and image geometry
//! - [`BrushMode`], [`MaskValue`]: What a stamp writes
//! - [`BatchConfig`], [`BrushConfig`]: Typed configuration with builders

mod config;
mod enums;
mod geometry;
mod pixel_spacing;
mod raster;
mod view;

pub use config::{BatchConfig, BrushConfig};
pub use enums::{BrushMode, Laterality, MaskValue, ViewPosition};
pub use geometry::{Dims, ImagePoint, Size, ViewportPoint};
pub use pixel_spacing::PixelSpacing;
pub use raster::{MaskRaster, RasterImage, RawImage};
pub use view::MammogramView;
