use crate::error::{BarcodeError, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 影片的影格數與尺寸，由 ffprobe 取得一次後不再變動
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub total_frames: u64,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得第一個視訊串流的影格數與尺寸
pub fn probe_video_metadata(ffprobe: &Path, path: &Path) -> Result<VideoMetadata> {
    let mut command = Command::new(ffprobe);
    command
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path);

    debug!("ffprobe 命令: {command:?}");

    let output = command.output().map_err(|e| BarcodeError::ProbeFailed {
        path: path.to_path_buf(),
        reason: format!("無法執行 {}: {e}", ffprobe.display()),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BarcodeError::ProbeFailed {
            path: path.to_path_buf(),
            reason: format!("{} {}", output.status, stderr.trim()),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout, path)
}

/// 解析 ffprobe 的 JSON 輸出
///
/// 影格數優先使用 `nb_frames`（需 > 0），否則以 duration × 幀率推算。
pub fn parse_probe_output(json: &str, path: &Path) -> Result<VideoMetadata> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| BarcodeError::ProbeFailed {
            path: path.to_path_buf(),
            reason: format!("無法解析 ffprobe 輸出: {e}"),
        })?;

    let stream = probe
        .streams
        .as_ref()
        .and_then(|streams| streams.first())
        .ok_or_else(|| BarcodeError::NoVideoStream(path.to_path_buf()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(BarcodeError::MissingDimensions(path.to_path_buf())),
    };

    let total_frames = direct_frame_count(stream)
        .or_else(|| {
            let estimated = estimate_frame_count(probe.format.as_ref(), stream)?;
            warn!("從影片長度推算影格數: {estimated}");
            Some(estimated)
        })
        .filter(|&frames| frames > 0)
        .ok_or_else(|| BarcodeError::FrameCountUndeterminable(path.to_path_buf()))?;

    Ok(VideoMetadata {
        total_frames,
        width,
        height,
    })
}

fn direct_frame_count(stream: &StreamInfo) -> Option<u64> {
    stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
}

/// 影片長度（優先從 format，其次從 stream）乘以幀率後無條件捨去
fn estimate_frame_count(format: Option<&FormatInfo>, stream: &StreamInfo) -> Option<u64> {
    let duration = format
        .and_then(|f| f.duration.as_deref())
        .or(stream.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)?;

    let frame_rate = stream.r_frame_rate.as_deref().and_then(parse_frame_rate)?;

    Some((duration * frame_rate).floor() as u64)
}

/// 解析幀率字串（例如 "30/1"、"30000/1001" 或 "29.97"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.trim().parse().ok()?;
        let den: f64 = den_str.trim().parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.trim().parse().ok()
}
