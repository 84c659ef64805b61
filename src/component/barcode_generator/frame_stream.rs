//! 逐格讀取解碼器輸出並計算平均色
//!
//! 解碼器已經只輸出要取樣的影格，這裡每次讀取剛好一個
//! `width × height × 3` 的 rgb24 影格，算出平均色後就丟棄，
//! 記憶體用量只有一個影格的緩衝區。

use crate::error::{BarcodeError, Result};
use image::{ImageBuffer, Rgb};
use log::{debug, warn};
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 一個影格的平均色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorSample {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<ColorSample> for Rgb<u8> {
    fn from(sample: ColorSample) -> Self {
        Self([sample.r, sample.g, sample.b])
    }
}

/// 影格資料來源
pub trait FrameSource {
    /// 將下一個影格讀入 `buf`，回傳實際讀到的位元組數
    ///
    /// 回傳 0 代表沒有更多資料；少於 `buf.len()` 代表這一格不完整。
    fn read_frame(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// 從管線（例如 ffmpeg 的 stdout）讀取，持續讀到填滿緩衝區或遇到 EOF
pub struct PipeSource<R> {
    reader: R,
}

impl<R: Read> PipeSource<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> FrameSource for PipeSource<R> {
    fn read_frame(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// 無法組成完整影格的資料段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAnomaly {
    /// 第幾次讀取（從 0 起算）
    pub read_index: u64,
    pub bytes_read: usize,
    pub bytes_expected: usize,
}

/// 單次讀取的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRead {
    Sample(ColorSample),
    Anomaly(FrameAnomaly),
    EndOfStream,
    Cancelled,
}

pub struct FrameStream<S> {
    source: S,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    shutdown_signal: Arc<AtomicBool>,
    reads: u64,
    samples: u64,
    anomalies: Vec<FrameAnomaly>,
    finished: bool,
}

impl<R: Read> FrameStream<PipeSource<R>> {
    pub fn from_reader(
        reader: R,
        width: u32,
        height: u32,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        Self::new(PipeSource::new(reader), width, height, shutdown_signal)
    }
}

impl<S: FrameSource> FrameStream<S> {
    pub fn new(
        source: S,
        width: u32,
        height: u32,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BarcodeError::InvalidDimensions { width, height });
        }

        let frame_size = width as usize * height as usize * 3;
        debug!("影格大小: {width}x{height}, {frame_size} bytes");

        Ok(Self {
            source,
            width,
            height,
            buffer: vec![0; frame_size],
            shutdown_signal,
            reads: 0,
            samples: 0,
            anomalies: Vec::new(),
            finished: false,
        })
    }

    /// 讀取下一個影格
    ///
    /// 讀到 0 位元組時結束；不完整的影格回報為 `Anomaly` 並可繼續讀取。
    /// 讀取錯誤是致命的，之後串流視為已結束。
    pub fn next_read(&mut self) -> Result<FrameRead> {
        if self.finished {
            return Ok(FrameRead::EndOfStream);
        }

        if self.shutdown_signal.load(Ordering::SeqCst) {
            self.finished = true;
            return Ok(FrameRead::Cancelled);
        }

        let bytes_read = match self.source.read_frame(&mut self.buffer) {
            Ok(n) => n,
            Err(e) => {
                self.finished = true;
                return Err(BarcodeError::DecoderIo(e));
            }
        };

        if bytes_read == 0 {
            self.finished = true;
            return Ok(FrameRead::EndOfStream);
        }

        let read_index = self.reads;
        self.reads += 1;

        match average_color(&self.buffer[..bytes_read], self.width, self.height) {
            Some(sample) => {
                self.samples += 1;
                Ok(FrameRead::Sample(sample))
            }
            None => {
                let anomaly = FrameAnomaly {
                    read_index,
                    bytes_read,
                    bytes_expected: self.buffer.len(),
                };
                self.anomalies.push(anomaly);
                Ok(FrameRead::Anomaly(anomaly))
            }
        }
    }

    #[must_use]
    pub fn samples_read(&self) -> u64 {
        self.samples
    }

    #[must_use]
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }

    #[must_use]
    pub fn anomalies(&self) -> &[FrameAnomaly] {
        &self.anomalies
    }
}

impl<S: FrameSource> Iterator for FrameStream<S> {
    type Item = Result<ColorSample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_read() {
                Ok(FrameRead::Sample(sample)) => return Some(Ok(sample)),
                Ok(FrameRead::Anomaly(anomaly)) => {
                    warn!(
                        "跳過不完整的影格 #{}: 讀到 {} / {} bytes",
                        anomaly.read_index, anomaly.bytes_read, anomaly.bytes_expected
                    );
                }
                Ok(FrameRead::EndOfStream) => return None,
                Ok(FrameRead::Cancelled) => return Some(Err(BarcodeError::Cancelled)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// 計算 rgb24 影格每個通道的平均值（整數除法，無條件捨去）
///
/// 資料長度不等於 `width × height × 3` 時回傳 `None`。
#[must_use]
pub fn average_color(raw: &[u8], width: u32, height: u32) -> Option<ColorSample> {
    let pixel_count = u64::from(width) * u64::from(height);
    if pixel_count == 0 || raw.len() as u64 != pixel_count * 3 {
        return None;
    }

    let frame = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(width, height, raw)?;
    let (r, g, b) = frame.pixels().fold((0_u64, 0_u64, 0_u64), |mut total, pixel| {
        total.0 += u64::from(pixel[0]);
        total.1 += u64::from(pixel[1]);
        total.2 += u64::from(pixel[2]);
        total
    });

    Some(ColorSample::new(
        (r / pixel_count) as u8,
        (g / pixel_count) as u8,
        (b / pixel_count) as u8,
    ))
}
