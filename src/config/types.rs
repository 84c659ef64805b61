use crate::error::{BarcodeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_WIDTH: u32 = 5000;
pub const DEFAULT_DECODER_THREADS: u32 = 4;
pub const DEFAULT_START_TIME: &str = "00:00:00";
pub const DEFAULT_GRADIENT: f64 = 3.0;
pub const DEFAULT_INITIAL_OPACITY: f64 = 1.0;

/// 外部工具路徑（預設從 PATH 搜尋）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// 漸層遮罩參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientSettings {
    /// 漸層斜率，需 >= 0；0 代表整張均勻覆蓋
    pub gradient: f64,
    /// 邊緣的起始不透明度，介於 0 到 1
    pub initial_opacity: f64,
}

impl GradientSettings {
    pub fn new(gradient: f64, initial_opacity: f64) -> Result<Self> {
        let valid = gradient.is_finite()
            && gradient >= 0.0
            && (0.0..=1.0).contains(&initial_opacity);
        if !valid {
            return Err(BarcodeError::InvalidGradient {
                gradient,
                initial_opacity,
            });
        }
        Ok(Self {
            gradient,
            initial_opacity,
        })
    }
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            gradient: DEFAULT_GRADIENT,
            initial_opacity: DEFAULT_INITIAL_OPACITY,
        }
    }
}

/// 條碼第一條線的起始 x 座標
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnOrigin {
    /// 從 x=1 開始畫，第 0 欄留黑、最後一個樣本落在畫布外
    #[default]
    Legacy,
    /// 從 x=0 開始畫，每個樣本都有一欄
    Zero,
}

impl ColumnOrigin {
    #[must_use]
    pub const fn first_column(self) -> u32 {
        match self {
            Self::Legacy => 1,
            Self::Zero => 0,
        }
    }
}

/// 單次條碼產生的完整設定，建立後不再變動
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub requested_width: u32,
    /// 傳給 ffmpeg -ss 的起始時間（hh:mm:ss[.ff]）
    pub start_time: String,
    pub decoder_threads: u32,
    pub tools: ToolPaths,
    pub gradient: Option<GradientSettings>,
    pub column_origin: ColumnOrigin,
}

impl RunConfig {
    /// 以預設值建立設定，輸出路徑為輸入檔名換成 .png
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        let input_path = input_path.into();
        let output_path = input_path.with_extension("png");
        Self {
            input_path,
            output_path,
            requested_width: DEFAULT_OUTPUT_WIDTH,
            start_time: DEFAULT_START_TIME.to_string(),
            decoder_threads: DEFAULT_DECODER_THREADS,
            tools: ToolPaths::default(),
            gradient: None,
            column_origin: ColumnOrigin::default(),
        }
    }

    #[must_use]
    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    #[must_use]
    pub fn with_requested_width(mut self, width: u32) -> Self {
        self.requested_width = width.max(1);
        self
    }

    #[must_use]
    pub fn with_start_time(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = start_time.into();
        self
    }

    #[must_use]
    pub fn with_decoder_threads(mut self, threads: u32) -> Self {
        self.decoder_threads = threads;
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_gradient(mut self, gradient: Option<GradientSettings>) -> Self {
        self.gradient = gradient;
        self
    }

    #[must_use]
    pub fn with_column_origin(mut self, origin: ColumnOrigin) -> Self {
        self.column_origin = origin;
        self
    }
}

/// settings.json 內容，所有欄位皆可省略
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserSettings {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub output_width: u32,
    pub decoder_threads: u32,
    pub gradient: f64,
    pub initial_opacity: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            output_width: DEFAULT_OUTPUT_WIDTH,
            decoder_threads: DEFAULT_DECODER_THREADS,
            gradient: DEFAULT_GRADIENT,
            initial_opacity: DEFAULT_INITIAL_OPACITY,
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn tool_paths(&self) -> ToolPaths {
        let defaults = ToolPaths::default();
        ToolPaths {
            ffmpeg: self.ffmpeg_path.clone().unwrap_or(defaults.ffmpeg),
            ffprobe: self.ffprobe_path.clone().unwrap_or(defaults.ffprobe),
        }
    }
}
