use crate::classify::engine::FeatureCounter;
use crate::config::FrameConfig;
use crate::model::{BBox, Feature, FeatureType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Find rectangular feature control frames in a rendered page.
///
/// The page is thresholded (dark ink becomes foreground), outermost contours are
/// traced, and every contour whose bounding box has frame-like proportions and
/// which simplifies to a quadrilateral becomes a GD&T feature. Pixel boxes are
/// scaled into page units by `page_size / image_size`.
pub fn detect_frames(
    image: &DynamicImage,
    page_width: f32,
    page_height: f32,
    page_num: usize,
    config: &FrameConfig,
    counter: &mut FeatureCounter,
) -> Vec<Feature> {
    let mask = binarize(&image.to_luma8(), config.threshold);
    let (img_w, img_h) = mask.dimensions();
    if img_w == 0 || img_h == 0 {
        return Vec::new();
    }
    let scale_x = page_width / img_w as f32;
    let scale_y = page_height / img_h as f32;

    let mut frames = Vec::new();
    for contour in find_contours::<i32>(&mask) {
        if contour.parent.is_some() || contour.border_type != BorderType::Outer {
            continue;
        }
        let Some((x, y, w, h)) = bounding_rect(&contour.points) else {
            continue;
        };
        let plausible = w > config.min_width
            && w < config.max_width
            && h > config.min_height
            && h < config.max_height;
        if !plausible || !is_quadrilateral(&contour.points, config.epsilon_ratio) {
            continue;
        }

        let location = BBox::new(
            x as f32 * scale_x,
            y as f32 * scale_y,
            (x + w as i32) as f32 * scale_x,
            (y + h as i32) as f32 * scale_y,
        );
        let id = counter.next_id();
        log::debug!("page {}: frame {} at {:?}", page_num, id, location);
        frames.push(Feature {
            id: Some(id),
            feature_type: FeatureType::Gdt,
            sub_type: None,
            value: "Frame".into(),
            description: None,
            location,
            page_num,
            tolerance: None,
        });
    }

    frames
}

/// Inverse binary threshold: pixels at or below `threshold` become 255.
fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(gray.width(), gray.height());
    for (x, y, p) in gray.enumerate_pixels() {
        if p[0] <= threshold {
            mask.put_pixel(x, y, Luma([255]));
        }
    }
    mask
}

/// Inclusive pixel bounding box as (x, y, width, height).
fn bounding_rect(points: &[Point<i32>]) -> Option<(i32, i32, u32, u32)> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;
    Some((
        min_x,
        min_y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Contour simplifies to four corners.
///
/// The closed contour is split at the point farthest from its start and both
/// halves are simplified as open chains, so that neither end of the trace
/// survives as a spurious vertex.
fn is_quadrilateral(points: &[Point<i32>], epsilon_ratio: f64) -> bool {
    if points.len() < 4 {
        return false;
    }
    let epsilon = epsilon_ratio * arc_length(points, true);
    if !(epsilon > 0.0) {
        return false;
    }

    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let dx = i64::from(p.x - start.x);
            let dy = i64::from(p.y - start.y);
            dx * dx + dy * dy
        })
        .map_or(0, |(i, _)| i);
    if far == 0 {
        return false;
    }

    let outward = approximate_polygon_dp(&points[..=far], epsilon, false);
    let mut back_chain = points[far..].to_vec();
    back_chain.push(start);
    let back = approximate_polygon_dp(&back_chain, epsilon, false);

    // Both chains share their two end points.
    outward.len() + back.len() - 2 == 4
}
