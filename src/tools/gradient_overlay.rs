//! 上下對稱的黑色漸層遮罩
//!
//! 條碼產生器與獨立的漸層工具共用同一份計算。遮罩先以
//! 1 像素寬、影像高度的灰階欄位計算，再拉伸到整張影像寬度，
//! 最後把全黑影像以 "over" 合成到原圖上。

use crate::config::GradientSettings;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// 計算第 y 列的不透明度
///
/// 上半部以 y 為距離，下半部以 height - y 為距離，
/// alpha = round(initial_opacity × 255 × (1 − gradient × pos / height))，負值歸零。
#[must_use]
pub fn row_alpha(y: u32, height: u32, settings: &GradientSettings) -> u8 {
    if height == 0 {
        return 0;
    }
    let h = f64::from(height);
    let pos = if f64::from(y) < h / 2.0 {
        f64::from(y)
    } else {
        h - f64::from(y)
    };

    let alpha = (settings.initial_opacity * 255.0 * (1.0 - settings.gradient * pos / h)).round();
    alpha.clamp(0.0, 255.0) as u8
}

/// 建立 1 x height 的遮罩欄位
#[must_use]
pub fn build_alpha_column(height: u32, settings: &GradientSettings) -> GrayImage {
    GrayImage::from_fn(1, height, |_, y| Luma([row_alpha(y, height, settings)]))
}

/// 將遮罩欄位拉伸到指定寬度
///
/// 高度不變，只在水平方向複製，因此用 Nearest 不會產生色階斷層。
#[must_use]
pub fn stretch_alpha_column(column: &GrayImage, width: u32) -> GrayImage {
    imageops::resize(column, width, column.height(), FilterType::Nearest)
}

/// 在影像上套用黑色漸層，回傳新的 RGBA 影像
#[must_use]
pub fn apply_black_gradient(image: &DynamicImage, settings: &GradientSettings) -> RgbaImage {
    let base = image.to_rgba8();
    let (width, height) = base.dimensions();
    if width == 0 || height == 0 {
        return base;
    }

    let mask = stretch_alpha_column(&build_alpha_column(height, settings), width);

    let mut output = base;
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let overlay_alpha = mask.get_pixel(x, y)[0];
        *pixel = composite_black_over(*pixel, overlay_alpha);
    }
    output
}

/// 以 "over" 合成一個不透明度為 `alpha` 的黑色像素到 `base` 上
fn composite_black_over(base: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    if alpha == 0 {
        return base;
    }

    let fg_a = f64::from(alpha) / 255.0;
    let bg_a = f64::from(base[3]) / 255.0;
    let out_a = fg_a + bg_a * (1.0 - fg_a);

    // 黑色前景的色彩分量為 0，只剩背景貢獻
    let scale = bg_a * (1.0 - fg_a) / out_a;
    let channel = |c: u8| (f64::from(c) * scale).round().clamp(0.0, 255.0) as u8;

    Rgba([
        channel(base[0]),
        channel(base[1]),
        channel(base[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn settings(gradient: f64, initial_opacity: f64) -> GradientSettings {
        GradientSettings::new(gradient, initial_opacity).unwrap()
    }

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 20 % 256) as u8, (y * 30 % 256) as u8, 200])
        }))
    }

    #[test]
    fn test_row_alpha_symmetric() {
        let s = settings(1.0, 1.0);
        let height = 10;
        // y=1 與 y=9 的距離都是 1
        assert_eq!(row_alpha(1, height, &s), row_alpha(9, height, &s));
        assert_eq!(row_alpha(0, height, &s), 255);
        // y=5: pos = 5, 255 * (1 - 0.5) = 127.5 -> 128
        assert_eq!(row_alpha(5, height, &s), 128);
    }

    #[test]
    fn test_zero_gradient_is_uniform_veil() {
        let s = settings(0.0, 1.0);
        for y in 0..9 {
            assert_eq!(row_alpha(y, 9, &s), 255);
        }

        let s = settings(0.0, 0.5);
        for y in 0..9 {
            assert_eq!(row_alpha(y, 9, &s), 128);
        }
    }

    #[test]
    fn test_steep_gradient_dissipates_before_center() {
        let s = settings(2.0, 1.0);
        let height = 20;
        for y in 0..height {
            let pos = if y < height / 2 { y } else { height - y };
            if pos * 2 >= height {
                assert_eq!(row_alpha(y, height, &s), 0, "row {y}");
            }
        }

        let s = settings(4.0, 1.0);
        assert_eq!(row_alpha(10, 40, &s), 0);
        assert_eq!(row_alpha(20, 40, &s), 0);
    }

    #[test]
    fn test_stretched_mask_matches_column() {
        let s = settings(3.0, 0.9);
        let column = build_alpha_column(27, &s);
        let mask = stretch_alpha_column(&column, 48);
        assert_eq!(mask.dimensions(), (48, 27));
        for y in 0..27 {
            let expected = column.get_pixel(0, y)[0];
            for x in 0..48 {
                assert_eq!(mask.get_pixel(x, y)[0], expected);
            }
        }
    }

    #[test]
    fn test_transparent_overlay_is_noop_and_idempotent() {
        let input = sample_image(16, 9);
        let s = settings(0.0, 0.0);

        let once = apply_black_gradient(&input, &s);
        let twice = apply_black_gradient(&DynamicImage::ImageRgba8(once.clone()), &s);

        assert_eq!(once, input.to_rgba8());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_full_opacity_zero_gradient_is_black() {
        let input = sample_image(8, 6);
        let output = apply_black_gradient(&input, &settings(0.0, 1.0));
        for pixel in output.pixels() {
            assert_eq!(*pixel, Rgba([0, 0, 0, 255]));
        }
    }

    #[test]
    fn test_edges_darker_than_center() {
        let input = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 20, image::Rgb([200, 200, 200])));
        let output = apply_black_gradient(&input, &settings(1.0, 1.0));

        let top = output.get_pixel(0, 0)[0];
        let center = output.get_pixel(0, 10)[0];
        let bottom = output.get_pixel(0, 19)[0];
        assert_eq!(top, 0);
        assert!(center > bottom);
        assert!(bottom < 200);
        assert_eq!(output.get_pixel(3, 10)[3], 255);
    }

    #[test]
    fn test_composite_respects_base_alpha() {
        // 半透明背景上覆蓋半透明黑色
        let out = composite_black_over(Rgba([200, 100, 50, 128]), 128);
        let fg_a = 128.0 / 255.0;
        let bg_a = 128.0 / 255.0;
        let expected_a = ((fg_a + bg_a * (1.0 - fg_a)) * 255.0_f64).round() as u8;
        assert_eq!(out[3], expected_a);
        assert!(out[0] < 200 && out[1] < 100 && out[2] < 50);
    }
}
