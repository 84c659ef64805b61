use crate::config::RunConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 解碼命令：只輸出每 `step` 個影格中的一張，以 rgb24 原始像素寫到 stdout
pub struct DecodeCommand {
    program: PathBuf,
    source_path: PathBuf,
    start_time: String,
    threads: u32,
    step: u64,
}

impl DecodeCommand {
    #[must_use]
    pub fn new(config: &RunConfig, step: u64) -> Self {
        Self {
            program: config.tools.ffmpeg.clone(),
            source_path: config.input_path.clone(),
            start_time: config.start_time.clone(),
            threads: config.decoder_threads,
            step: step.max(1),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// select 選出第 n 個影格（n 為 step 的倍數），setpts 讓輸出時間戳連續
    #[must_use]
    pub fn select_filter(&self) -> String {
        format!(
            "select=not(mod(n\\,{})),setpts=N/(FRAME_RATE*TB)",
            self.step
        )
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-threads", &self.threads.to_string(),
            "-ss", &self.start_time,
        ]);
        cmd.arg("-i").arg(&self.source_path);
        cmd.args([
            "-an", "-sn", "-dn",
            "-filter:v", &self.select_filter(),
            "-f", "image2pipe",
            "-pix_fmt", "rgb24",
            "-vcodec", "rawvideo",
            "-",
        ]);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        cmd
    }
}
