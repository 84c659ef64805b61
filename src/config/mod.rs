pub mod load;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    ColumnOrigin, DEFAULT_DECODER_THREADS, DEFAULT_GRADIENT, DEFAULT_INITIAL_OPACITY,
    DEFAULT_OUTPUT_WIDTH, DEFAULT_START_TIME, GradientSettings, RunConfig, ToolPaths,
    UserSettings,
};
