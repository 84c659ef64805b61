use crate::component::barcode_generator::save_png;
use crate::config::GradientSettings;
use crate::error::BarcodeError;
use crate::tools::{apply_black_gradient, validate_input_exists, validate_output_available};
use anyhow::{Context, Result};
use console::style;
use image::DynamicImage;
use log::info;
use std::path::{Path, PathBuf};

/// 未指定輸出時，結果放在輸入檔旁的這個資料夾
pub const DEFAULT_OUTPUT_DIR: &str = "gradient";

/// 單張影像的漸層工具
pub struct GradientApplier {
    input_path: PathBuf,
    output_path: PathBuf,
    settings: GradientSettings,
}

impl GradientApplier {
    #[must_use]
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: Option<PathBuf>,
        settings: GradientSettings,
    ) -> Self {
        let input_path = input_path.into();
        let output_path = output_path.unwrap_or_else(|| default_output_path(&input_path));
        Self {
            input_path,
            output_path,
            settings,
        }
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn run(&self) -> Result<PathBuf> {
        println!("{}", style("=== 影像漸層 ===").cyan().bold());

        validate_input_exists(&self.input_path)?;
        validate_output_available(&self.output_path)?;

        let image = image::open(&self.input_path)
            .map_err(BarcodeError::from)
            .with_context(|| format!("無法開啟影像: {}", self.input_path.display()))?;

        let shaded = DynamicImage::ImageRgba8(apply_black_gradient(&image, &self.settings));
        save_png(&shaded, &self.output_path)
            .with_context(|| format!("無法儲存影像: {}", self.output_path.display()))?;

        info!(
            "漸層已套用: {} -> {} (gradient={}, initial_opacity={})",
            self.input_path.display(),
            self.output_path.display(),
            self.settings.gradient,
            self.settings.initial_opacity
        );
        println!(
            "  {} {}",
            style("✓").green(),
            self.output_path.display()
        );

        Ok(self.output_path.clone())
    }
}

/// `<輸入檔所在資料夾>/gradient/<輸入檔名>`
#[must_use]
pub fn default_output_path(input_path: &Path) -> PathBuf {
    let parent = input_path.parent().unwrap_or(Path::new(""));
    let file_name = input_path
        .file_name()
        .map_or_else(|| "output.png".into(), ToOwned::to_owned);
    parent.join(DEFAULT_OUTPUT_DIR).join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/images/barcode.png")),
            PathBuf::from("/images/gradient/barcode.png")
        );
        assert_eq!(
            default_output_path(Path::new("barcode.png")),
            PathBuf::from("gradient/barcode.png")
        );
    }

    #[test]
    fn test_run_writes_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("barcode.png");
        RgbImage::from_pixel(16, 9, Rgb([120, 60, 30]))
            .save(&input)
            .unwrap();

        let applier = GradientApplier::new(&input, None, GradientSettings::default());
        let output = applier.run().unwrap();

        assert_eq!(output, dir.path().join("gradient").join("barcode.png"));
        let result = image::open(&output).unwrap().to_rgba8();
        assert_eq!(result.dimensions(), (16, 9));
        assert_eq!(result.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_run_fails_when_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        RgbImage::new(4, 4).save(&input).unwrap();
        std::fs::write(&output, b"taken").unwrap();

        let applier = GradientApplier::new(&input, Some(output.clone()), GradientSettings::default());
        let err = applier.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BarcodeError>(),
            Some(BarcodeError::OutputAlreadyExists(_))
        ));
        assert_eq!(std::fs::read(&output).unwrap(), b"taken");
    }

    #[test]
    fn test_run_fails_when_input_missing() {
        let dir = tempfile::tempdir().unwrap();
        let applier = GradientApplier::new(
            dir.path().join("missing.png"),
            None,
            GradientSettings::default(),
        );
        let err = applier.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BarcodeError>(),
            Some(BarcodeError::InputNotFound(_))
        ));
    }
}
