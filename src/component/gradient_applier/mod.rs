//! 單張影像漸層元件
//!
//! 與條碼產生器共用 `tools::gradient_overlay` 的遮罩計算

mod main;

pub use main::{DEFAULT_OUTPUT_DIR, GradientApplier, default_output_path};
