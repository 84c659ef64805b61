use super::barcode_assembler::assemble_barcode;
use super::ffmpeg_command::DecodeCommand;
use super::frame_stream::{ColorSample, FrameSource, FrameStream};
use super::sample_scheduler::SamplePlan;
use crate::config::{ColumnOrigin, GradientSettings, RunConfig};
use crate::error::{BarcodeError, Result as BarcodeResult};
use crate::tools::{
    VideoMetadata, apply_black_gradient, ensure_parent_directory, probe_video_metadata,
    validate_input_exists, validate_output_available,
};
use anyhow::{Context, Result};
use console::style;
use image::{DynamicImage, ImageError, ImageFormat};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 條碼產生結果
#[derive(Debug, Clone)]
pub struct BarcodeReport {
    pub metadata: VideoMetadata,
    pub plan: SamplePlan,
    pub requested_width: u32,
    pub samples_drawn: usize,
    pub anomalies: usize,
    pub output_path: PathBuf,
    pub dimensions: (u32, u32),
    pub elapsed: Duration,
}

/// 影片條碼產生器
///
/// 流程：
/// A. 取得影片資訊（ffprobe）
/// B. 計算取樣間隔
/// C. 啟動 ffmpeg，只輸出取樣的影格
/// D. 逐格計算平均色
/// E. 畫成條碼，選擇性套用漸層後存檔
pub struct BarcodeGenerator {
    config: RunConfig,
    shutdown_signal: Arc<AtomicBool>,
}

impl BarcodeGenerator {
    pub const fn new(config: RunConfig, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<BarcodeReport> {
        println!("{}", style("=== 影片條碼產生 ===").cyan().bold());

        let started = Instant::now();
        let input = &self.config.input_path;
        let output = &self.config.output_path;

        validate_input_exists(input)?;
        validate_output_available(output)?;

        println!("  輸入: {}", input.display());
        println!("  輸出: {}", output.display());

        // Stage A: 取得影片資訊
        let metadata = probe_video_metadata(&self.config.tools.ffprobe, input)
            .with_context(|| format!("無法讀取影片資訊: {}", input.display()))?;
        println!(
            "  {} 影片資訊: {}x{}, {} 個影格",
            style("A").dim(),
            metadata.width,
            metadata.height,
            metadata.total_frames
        );

        // Stage B: 計算取樣間隔
        let plan = SamplePlan::new(metadata.total_frames, self.config.requested_width);
        println!(
            "  {} 取樣間隔 {}，要求寬度 {}px，實際寬度 {}px",
            style("B").dim(),
            plan.step,
            self.config.requested_width,
            plan.sample_count
        );
        info!(
            "取樣間隔: {}, 要求寬度: {}px, 實際寬度: {}px",
            plan.step, self.config.requested_width, plan.sample_count
        );
        let deviation = plan.width_deviation(self.config.requested_width);
        if deviation != 0 {
            info!("實際寬度與要求寬度相差 {deviation}px");
        }

        // Stage C + D: 解碼並計算平均色
        println!("  {} 讀取影格...", style("C").dim());
        let (samples, anomalies) = self.sample_colors(&metadata, &plan)?;
        println!(
            "  {} 取得 {} 個樣本，跳過 {} 個",
            style("D").dim(),
            samples.len(),
            anomalies
        );

        // Stage E: 畫出條碼並存檔
        let image = build_barcode_image(
            &samples,
            self.config.column_origin,
            self.config.gradient.as_ref(),
        )?;
        println!(
            "  {} 產生條碼 {}x{}",
            style("E").dim(),
            image.width(),
            image.height()
        );
        save_png(&image, output)?;

        let report = BarcodeReport {
            metadata,
            plan,
            requested_width: self.config.requested_width,
            samples_drawn: samples.len(),
            anomalies,
            output_path: output.clone(),
            dimensions: (image.width(), image.height()),
            elapsed: started.elapsed(),
        };

        info!(
            "條碼已建立: {} ({:.1}s)",
            output.display(),
            report.elapsed.as_secs_f64()
        );
        self.print_summary(&report);

        Ok(report)
    }

    fn sample_colors(
        &self,
        metadata: &VideoMetadata,
        plan: &SamplePlan,
    ) -> Result<(Vec<ColorSample>, usize)> {
        let decode = DecodeCommand::new(&self.config, plan.step);
        let mut command = decode.build_command();
        debug!("ffmpeg 命令: {command:?}");

        let mut child = command.spawn().map_err(|source| BarcodeError::DecoderSpawn {
            program: decode.program().display().to_string(),
            source,
        })?;

        let Some(stdout) = child.stdout.take() else {
            stop_decoder(&mut child);
            anyhow::bail!("無法取得 ffmpeg 輸出");
        };

        let mut stream = match FrameStream::from_reader(
            stdout,
            metadata.width,
            metadata.height,
            Arc::clone(&self.shutdown_signal),
        ) {
            Ok(stream) => stream,
            Err(e) => {
                stop_decoder(&mut child);
                return Err(e.into());
            }
        };

        let progress = sampling_progress_bar(plan.sample_count);
        let samples = match collect_samples(&mut stream, &progress) {
            Ok(samples) => samples,
            Err(e) => {
                stop_decoder(&mut child);
                return Err(e.into());
            }
        };

        let status = child.wait().context("無法等待 ffmpeg 結束")?;

        // Ctrl-C 也會送到 ffmpeg，它可能先關閉輸出讓串流看起來正常結束
        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷信號，不寫入輸出檔案");
            return Err(BarcodeError::Cancelled.into());
        }

        if !status.success() {
            warn!("ffmpeg 結束狀態異常: {status}");
        }

        let anomalies = stream.anomaly_count();
        if anomalies > 0 {
            warn!("共跳過 {anomalies} 個不完整的影格");
        }

        Ok((samples, anomalies))
    }

    fn print_summary(&self, report: &BarcodeReport) {
        println!();
        println!("{}", style("=== 條碼產生摘要 ===").cyan().bold());
        println!("  影格總數: {}", report.metadata.total_frames);
        println!("  取樣間隔: {}", report.plan.step);
        println!(
            "  條碼尺寸: {}x{}",
            report.dimensions.0, report.dimensions.1
        );
        println!("  樣本數: {}", style(report.samples_drawn).green());

        if report.anomalies > 0 {
            println!("  跳過影格: {}", style(report.anomalies).yellow());
        }

        println!("  耗時: {:.1}s", report.elapsed.as_secs_f64());
        println!(
            "  {} {}",
            style("✓").green(),
            report.output_path.display()
        );
    }
}

/// 讀完整個影格串流，回傳依時間順序排列的平均色
///
/// 取消時回傳 `BarcodeError::Cancelled`，不會回傳部分結果。
pub fn collect_samples<S: FrameSource>(
    stream: &mut FrameStream<S>,
    progress: &ProgressBar,
) -> BarcodeResult<Vec<ColorSample>> {
    let expected = progress.length().unwrap_or(0);
    let mut samples = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));

    for sample in stream.by_ref() {
        match sample {
            Ok(sample) => {
                samples.push(sample);
                progress.inc(1);
            }
            Err(BarcodeError::Cancelled) => {
                progress.abandon_with_message("操作已中斷");
                warn!("收到中斷信號，停止讀取影格");
                return Err(BarcodeError::Cancelled);
            }
            Err(e) => {
                progress.abandon_with_message("讀取失敗");
                return Err(e);
            }
        }
    }

    progress.finish_with_message(format!("{} 個樣本", samples.len()));
    Ok(samples)
}

/// 由平均色序列產生最終影像，有漸層設定時輸出 RGBA
pub fn build_barcode_image(
    samples: &[ColorSample],
    origin: ColumnOrigin,
    gradient: Option<&GradientSettings>,
) -> BarcodeResult<DynamicImage> {
    let barcode = DynamicImage::ImageRgb8(assemble_barcode(samples, origin)?);

    Ok(match gradient {
        Some(settings) => {
            debug!(
                "套用漸層: gradient={}, initial_opacity={}",
                settings.gradient, settings.initial_opacity
            );
            DynamicImage::ImageRgba8(apply_black_gradient(&barcode, settings))
        }
        None => barcode,
    })
}

/// 以 PNG 格式存檔（不論副檔名）
pub fn save_png(image: &DynamicImage, path: &Path) -> BarcodeResult<()> {
    ensure_parent_directory(path).map_err(ImageError::IoError)?;
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

fn sampling_progress_bar(expected_samples: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(expected_samples);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message("計算平均色中...");
    progress_bar
}

fn stop_decoder(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_collect_samples_counts_progress() {
        let data: Vec<u8> = (0..6_u8).flat_map(|i| [i, i, i].repeat(4)).collect();
        let mut stream =
            FrameStream::from_reader(Cursor::new(data), 2, 2, Arc::new(AtomicBool::new(false)))
                .unwrap();
        let progress = ProgressBar::hidden();
        progress.set_length(6);

        let samples = collect_samples(&mut stream, &progress).unwrap();
        assert_eq!(samples.len(), 6);
        assert_eq!(progress.position(), 6);
    }

    #[test]
    fn test_collect_samples_cancelled_returns_no_output() {
        let data = vec![0_u8; 12 * 3];
        let mut stream =
            FrameStream::from_reader(Cursor::new(data), 2, 2, Arc::new(AtomicBool::new(true)))
                .unwrap();
        let result = collect_samples(&mut stream, &ProgressBar::hidden());
        assert!(matches!(result, Err(BarcodeError::Cancelled)));
    }

    #[test]
    fn test_build_barcode_image_with_gradient_is_rgba() {
        let samples = vec![ColorSample::new(100, 150, 200); 32];
        let plain = build_barcode_image(&samples, ColumnOrigin::Zero, None).unwrap();
        assert!(matches!(plain, DynamicImage::ImageRgb8(_)));

        let settings = GradientSettings::new(3.0, 1.0).unwrap();
        let shaded = build_barcode_image(&samples, ColumnOrigin::Zero, Some(&settings)).unwrap();
        let DynamicImage::ImageRgba8(rgba) = shaded else {
            panic!("expected RGBA output");
        };
        assert_eq!(rgba.dimensions(), (32, 18));
        // 第一列完全變黑，中間保留原色
        assert_eq!(rgba.get_pixel(5, 0).0, [0, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(5, 9).0, [100, 150, 200, 255]);
    }

    #[test]
    fn test_save_png_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("barcode.png");
        let samples = vec![ColorSample::new(1, 2, 3); 4];
        let image = build_barcode_image(&samples, ColumnOrigin::Legacy, None).unwrap();

        save_png(&image, &path).unwrap();
        let reopened = image::open(&path).unwrap();
        assert_eq!(reopened.width(), 4);
        assert_eq!(reopened.height(), 2);
    }
}
