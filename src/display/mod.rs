use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::coords::ViewportScale;
use crate::geometry::ImageSize;

/// Resized image plus the placement and scale needed to map pointer motion
/// back into image pixels.
#[derive(Debug, Clone)]
pub struct FittedImage {
    pub image: RgbaImage,
    pub scale_x: f64,
    pub scale_y: f64,
    pub origin_x: i32,
    pub origin_y: i32,
}

impl FittedImage {
    pub fn viewport_scale(&self) -> ViewportScale {
        ViewportScale {
            x: self.scale_x,
            y: self.scale_y,
        }
    }

    pub fn displayed_size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }
}

/// Size of `image` scaled to fill the viewport on its limiting axis.
/// `None` for an empty viewport or image.
pub fn fitted_size(
    image: ImageSize,
    viewport_width: i32,
    viewport_height: i32,
) -> Option<ImageSize> {
    if viewport_width <= 0 || viewport_height <= 0 || image.width == 0 || image.height == 0 {
        return None;
    }
    let viewport_w = f64::from(viewport_width);
    let viewport_h = f64::from(viewport_height);
    let image_ratio = f64::from(image.width) / f64::from(image.height);
    let viewport_ratio = viewport_w / viewport_h;

    let (width, height) = if image_ratio > viewport_ratio {
        (viewport_w, (viewport_w / image_ratio).floor())
    } else {
        ((viewport_h * image_ratio).floor(), viewport_h)
    };
    Some(ImageSize::new(width.max(1.0) as u32, height.max(1.0) as u32))
}

pub fn fit_to_viewport(
    image: &DynamicImage,
    viewport_width: i32,
    viewport_height: i32,
) -> Option<FittedImage> {
    let source = ImageSize::of(image);
    let fitted = fitted_size(source, viewport_width, viewport_height)?;
    let resized = image
        .resize_exact(fitted.width, fitted.height, FilterType::Lanczos3)
        .to_rgba8();

    let fitted_width = i32::try_from(fitted.width).unwrap_or(viewport_width);
    let fitted_height = i32::try_from(fitted.height).unwrap_or(viewport_height);
    Some(FittedImage {
        image: resized,
        scale_x: f64::from(source.width) / f64::from(fitted.width),
        scale_y: f64::from(source.height) / f64::from(fitted.height),
        origin_x: (viewport_width - fitted_width).div_euclid(2),
        origin_y: (viewport_height - fitted_height).div_euclid(2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, Rgb([90, 60, 30])))
    }

    #[test]
    fn wide_image_is_pillarboxed_vertically() {
        let fitted = fit_to_viewport(&solid(1000, 500), 400, 400).expect("fitted");
        assert_eq!(fitted.displayed_size(), ImageSize::new(400, 200));
        assert_eq!((fitted.origin_x, fitted.origin_y), (0, 100));
        assert_eq!(fitted.scale_x, 2.5);
        assert_eq!(fitted.scale_y, 2.5);
    }

    #[test]
    fn tall_image_is_letterboxed_horizontally() {
        let fitted = fit_to_viewport(&solid(300, 600), 500, 300).expect("fitted");
        assert_eq!(fitted.displayed_size(), ImageSize::new(150, 300));
        assert_eq!((fitted.origin_x, fitted.origin_y), (175, 0));
        assert_eq!(fitted.viewport_scale(), ViewportScale { x: 2.0, y: 2.0 });
    }

    #[test]
    fn small_images_are_scaled_up_to_fill() {
        let fitted = fit_to_viewport(&solid(50, 50), 200, 100).expect("fitted");
        assert_eq!(fitted.displayed_size(), ImageSize::new(100, 100));
        assert_eq!(fitted.scale_x, 0.5);
        assert_eq!(fitted.origin_x, 50);
    }

    #[test]
    fn empty_viewport_is_a_no_op() {
        assert!(fit_to_viewport(&solid(10, 10), 0, 100).is_none());
        assert!(fit_to_viewport(&solid(10, 10), 100, -4).is_none());
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        let size = fitted_size(ImageSize::new(10_000, 1), 100, 100).expect("size");
        assert_eq!(size, ImageSize::new(100, 1));
    }
}
