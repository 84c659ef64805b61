use super::frame_stream::ColorSample;
use crate::config::ColumnOrigin;
use crate::error::{BarcodeError, Result};
use image::{Rgb, RgbImage};

/// 條碼高度：寬度 × 9 / 16 無條件捨去，至少 1 像素
#[must_use]
pub fn barcode_height(width: u32) -> u32 {
    ((u64::from(width) * 9 / 16) as u32).max(1)
}

/// 把平均色序列畫成條碼，每個樣本一條 1 像素寬的直線
///
/// `ColumnOrigin::Legacy` 從 x=1 開始畫：第 0 欄保持黑色，
/// 最後一個樣本落在畫布外不會出現。
pub fn assemble_barcode(samples: &[ColorSample], origin: ColumnOrigin) -> Result<RgbImage> {
    if samples.is_empty() {
        return Err(BarcodeError::EmptySampleSet);
    }

    let width = u32::try_from(samples.len()).map_err(|_| BarcodeError::InvalidDimensions {
        width: u32::MAX,
        height: 0,
    })?;
    let height = barcode_height(width);
    let first_column = origin.first_column();

    let mut image = RgbImage::new(width, height);
    for (x, column) in (first_column..width).zip(samples) {
        let color = Rgb::from(*column);
        for y in 0..height {
            image.put_pixel(x, y, color);
        }
    }

    Ok(image)
}
