//! 條碼流程的錯誤型別
//!
//! 致命錯誤一律以 [`BarcodeError`] 回傳；壞掉的影格不是錯誤，
//! 而是 `FrameRead::Anomaly`，由串流計數後繼續。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("輸入檔案不存在: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("輸出檔案已存在: {}", .0.display())]
    OutputAlreadyExists(PathBuf),

    #[error("找不到視訊串流: {}", .0.display())]
    NoVideoStream(PathBuf),

    #[error("無法判斷影格數量: {}", .0.display())]
    FrameCountUndeterminable(PathBuf),

    #[error("無法取得影片尺寸: {}", .0.display())]
    MissingDimensions(PathBuf),

    #[error("ffprobe 執行失敗 ({}): {reason}", .path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("無法啟動解碼程式 {program}: {source}")]
    DecoderSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("讀取解碼輸出失敗: {0}")]
    DecoderIo(#[from] io::Error),

    #[error("影格尺寸無效: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("漸層參數無效: gradient={gradient}, initial_opacity={initial_opacity}")]
    InvalidGradient { gradient: f64, initial_opacity: f64 },

    #[error("沒有任何成功取樣的影格，無法產生條碼")]
    EmptySampleSet,

    #[error("操作已中斷")]
    Cancelled,

    #[error("影像處理失敗: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BarcodeError>;
