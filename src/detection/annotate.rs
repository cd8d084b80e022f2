// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection overlay rendering

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::DetectedRegion;

/// Border thickness in pixels
const BOX_THICKNESS: i32 = 2;

/// Height of the filled label tab above each box
const LABEL_TAB_HEIGHT: u32 = 6;

/// Box colors cycled by class id
const BOX_COLORS: [[u8; 3]; 8] = [
    [230, 57, 70],
    [29, 53, 87],
    [42, 157, 143],
    [233, 196, 106],
    [244, 162, 97],
    [38, 70, 83],
    [106, 76, 147],
    [58, 134, 255],
];

fn color_for_class(class_id: usize) -> Rgb<u8> {
    Rgb(BOX_COLORS[class_id % BOX_COLORS.len()])
}

/// Draw detection boxes onto a copy of the source image.
///
/// Regions are clamped to the image bounds; regions that collapse to nothing
/// after clamping are skipped.
pub fn draw_regions(image: &DynamicImage, regions: &[DetectedRegion]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);

    for region in regions {
        let x1 = (region.x1.floor() as i32).clamp(0, w - 1);
        let y1 = (region.y1.floor() as i32).clamp(0, h - 1);
        let x2 = (region.x2.ceil() as i32).clamp(0, w - 1);
        let y2 = (region.y2.ceil() as i32).clamp(0, h - 1);

        if x1 >= x2 || y1 >= y2 {
            continue;
        }

        let color = color_for_class(region.class_id);

        for inset in 0..BOX_THICKNESS {
            let bw = (x2 - x1 + 1 - 2 * inset).max(1) as u32;
            let bh = (y2 - y1 + 1 - 2 * inset).max(1) as u32;
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(x1 + inset, y1 + inset).of_size(bw, bh),
                color,
            );
        }

        // Small filled tab above the box marking where a label would anchor
        let tab_y = (y1 - LABEL_TAB_HEIGHT as i32).max(0);
        let tab_w = ((x2 - x1) as u32 / 3).max(4).min((w - x1) as u32);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(x1, tab_y).of_size(tab_w, LABEL_TAB_HEIGHT),
            color,
        );
    }

    canvas
}
