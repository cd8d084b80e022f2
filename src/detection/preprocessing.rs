// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the detection model

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Target square input size for the detection model
pub const DETECT_INPUT_SIZE: u32 = 640;

/// Gray value used to pad the letterboxed image
const PAD_VALUE: u8 = 114;

/// Geometry of a letterboxed image, used to map model-space coordinates back
/// to source-image pixel space.
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    /// Scale applied to the source image
    pub scale: f32,
    /// Horizontal padding in model-space pixels
    pub pad_x: f32,
    /// Vertical padding in model-space pixels
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a model-space point back to source-image coordinates.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Preprocess an image for detection inference
///
/// Steps:
/// 1. Resize with aspect ratio preservation to `target_size`
/// 2. Pad to square with gray background
/// 3. Scale pixel values to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (resized, letterbox) = letterbox_resize(image, target_size);
    let rgb = resized.to_rgb8();

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for y in 0..size {
        for x in 0..size {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            for c in 0..3 {
                tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    (tensor, letterbox)
}

/// Resize with aspect ratio preservation and center-pad to a square
fn letterbox_resize(image: &DynamicImage, target_size: u32) -> (DynamicImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        let blank = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
        return (
            DynamicImage::ImageRgb8(blank),
            Letterbox {
                scale: 1.0,
                pad_x: 0.0,
                pad_y: 0.0,
            },
        );
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);

    let new_w = ((orig_w as f32 * scale).round() as u32).max(1);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(1);

    let resized = image.resize_exact(new_w, new_h, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    let mut output = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    for y in 0..new_h {
        for x in 0..new_w {
            output.put_pixel(x + offset_x, y + offset_y, *rgb.get_pixel(x, y));
        }
    }

    (
        DynamicImage::ImageRgb8(output),
        Letterbox {
            scale,
            pad_x: offset_x as f32,
            pad_y: offset_y as f32,
        },
    )
}
