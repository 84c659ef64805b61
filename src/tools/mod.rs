mod ffprobe_info;
mod gradient_overlay;
mod path_validator;

pub use ffprobe_info::{VideoMetadata, parse_probe_output, probe_video_metadata};
pub use gradient_overlay::{
    apply_black_gradient, build_alpha_column, row_alpha, stretch_alpha_column,
};
pub use path_validator::{
    ensure_parent_directory, validate_input_exists, validate_output_available,
};
