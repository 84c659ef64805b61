use crate::error::{BarcodeError, Result};
use std::path::Path;

pub fn validate_input_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BarcodeError::InputNotFound(path.to_path_buf()));
    }
    Ok(())
}

pub fn validate_output_available(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(BarcodeError::OutputAlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

/// 確保輸出檔案的上層資料夾存在
pub fn ensure_parent_directory(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}
