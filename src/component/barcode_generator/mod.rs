//! 影片條碼產生元件
//!
//! 五階段流程：
//! A. 取得影片資訊（ffprobe）
//! B. 計算取樣間隔
//! C. ffmpeg 只輸出取樣影格的 rgb24 原始資料
//! D. 逐格計算平均色
//! E. 畫成條碼（可選擇套用漸層）並存檔

mod barcode_assembler;
mod ffmpeg_command;
mod frame_stream;
mod main;
mod sample_scheduler;

pub use barcode_assembler::{assemble_barcode, barcode_height};
pub use ffmpeg_command::DecodeCommand;
pub use frame_stream::{
    ColorSample, FrameAnomaly, FrameRead, FrameSource, FrameStream, PipeSource, average_color,
};
pub use main::{BarcodeGenerator, BarcodeReport, build_barcode_image, collect_samples, save_png};
pub use sample_scheduler::SamplePlan;
