//! 命令列參數

use crate::config::{ColumnOrigin, GradientSettings, RunConfig, ToolPaths, UserSettings};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "movie_barcode",
    version,
    about = "把影片轉成電影條碼：每一欄是一個取樣影格的平均色"
)]
pub struct Cli {
    /// 顯示除錯日誌
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 由影片產生條碼影像
    Barcode(BarcodeArgs),
    /// 在既有影像上套用上下對稱的黑色漸層
    Gradient(GradientArgs),
}

#[derive(Debug, Args)]
pub struct BarcodeArgs {
    /// 輸入影片
    pub input: PathBuf,

    /// 輸出 PNG（預設為輸入檔名換成 .png）
    pub output: Option<PathBuf>,

    /// 要求的條碼寬度（實際寬度會依影格數略有不同）
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// 起始時間 hh:mm:ss[.ff]
    #[arg(long, default_value = crate::config::DEFAULT_START_TIME)]
    pub start: String,

    /// ffmpeg 解碼執行緒數
    #[arg(long)]
    pub threads: Option<u32>,

    /// 套用漸層（使用設定檔或預設參數）
    #[arg(long)]
    pub shade: bool,

    /// 漸層斜率，指定時會自動套用漸層
    #[arg(long)]
    pub gradient: Option<f64>,

    /// 漸層起始不透明度，指定時會自動套用漸層
    #[arg(long)]
    pub initial_opacity: Option<f64>,

    /// 從 x=0 開始畫，不保留第一欄空白
    #[arg(long)]
    pub align_left: bool,

    /// ffmpeg 執行檔路徑
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe 執行檔路徑
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,
}

impl BarcodeArgs {
    /// 合併命令列參數與設定檔，產生不可變的執行設定
    pub fn into_run_config(self, settings: &UserSettings) -> Result<RunConfig> {
        let defaults = settings.tool_paths();
        let tools = ToolPaths {
            ffmpeg: self.ffmpeg.unwrap_or(defaults.ffmpeg),
            ffprobe: self.ffprobe.unwrap_or(defaults.ffprobe),
        };

        let shade = self.shade || self.gradient.is_some() || self.initial_opacity.is_some();
        let gradient = if shade {
            Some(GradientSettings::new(
                self.gradient.unwrap_or(settings.gradient),
                self.initial_opacity.unwrap_or(settings.initial_opacity),
            )?)
        } else {
            None
        };

        let column_origin = if self.align_left {
            ColumnOrigin::Zero
        } else {
            ColumnOrigin::Legacy
        };

        let mut config = RunConfig::new(self.input)
            .with_requested_width(self.width.unwrap_or(settings.output_width))
            .with_start_time(self.start)
            .with_decoder_threads(self.threads.unwrap_or(settings.decoder_threads))
            .with_tools(tools)
            .with_gradient(gradient)
            .with_column_origin(column_origin);

        if let Some(output) = self.output {
            config = config.with_output_path(output);
        }

        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct GradientArgs {
    /// 輸入影像
    pub input: PathBuf,

    /// 輸出影像（預設為輸入檔旁的 gradient/ 資料夾）
    pub output: Option<PathBuf>,

    /// 漸層斜率（預設 3.0）
    #[arg(long)]
    pub gradient: Option<f64>,

    /// 漸層起始不透明度（預設 1.0）
    #[arg(long)]
    pub initial_opacity: Option<f64>,
}

impl GradientArgs {
    pub fn settings(&self, settings: &UserSettings) -> Result<GradientSettings> {
        Ok(GradientSettings::new(
            self.gradient.unwrap_or(settings.gradient),
            self.initial_opacity.unwrap_or(settings.initial_opacity),
        )?)
    }
}
