use std::time::Instant;

use image::DynamicImage;
use slipscan_core::ReceiptRecord;
use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError, PageSegMode};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("No text could be extracted from image")]
    NoText,
}

/// Orchestrates: decode → normalize → OCR → blank check → extract.
///
/// Holds no per-request state, so one instance can serve concurrent scans.
pub struct ScanPipeline<R: OcrBackend> {
    recognizer: R,
}

impl<R: OcrBackend> ScanPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Scan an encoded image (JPEG / PNG / WEBP / …).
    pub fn scan_bytes(&self, data: &[u8]) -> Result<ReceiptRecord, ScanError> {
        let img = preprocess::decode(data)?;
        self.scan_image(img)
    }

    /// Scan an already decoded image.
    pub fn scan_image(&self, img: DynamicImage) -> Result<ReceiptRecord, ScanError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(ScanError::EmptyImage);
        }

        let started = Instant::now();
        let normalized = preprocess::normalize(img);
        tracing::debug!(
            width = normalized.width(),
            height = normalized.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "image normalized"
        );

        let text = self
            .recognizer
            .recognize(&normalized, PageSegMode::SingleBlock)?;
        tracing::debug!(chars = text.len(), "text recognized");

        if text.trim().is_empty() {
            return Err(ScanError::NoText);
        }

        Ok(Extractor::extract(&text))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{MockRecognizer, UnavailableRecognizer};
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
    use slipscan_core::{BetType, Sportsbook};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn scan_bytes_produces_record() {
        let pipeline = ScanPipeline::new(MockRecognizer::new(
            "FanDuel\nChiefs at Broncos\nRisk $25\nMoneyline -120\nTicket #FD99\n9/8/2024",
        ));
        let r = pipeline.scan_bytes(&tiny_png()).unwrap();
        assert_eq!(r.sportsbook, Some(Sportsbook::FanDuel));
        assert_eq!(r.teams.as_slice(), ["Chiefs", "Broncos"]);
        assert_eq!(r.amount, Some(25.0));
        assert_eq!(r.odds.as_deref(), Some("-120"));
        assert_eq!(r.bet_type, Some(BetType::Moneyline));
        assert_eq!(r.ticket_number.as_deref(), Some("FD99"));
        assert_eq!(r.date.as_deref(), Some("9/8/2024"));
    }

    #[test]
    fn scan_keeps_recognized_text_verbatim() {
        let text = "  Barstool\n$5 \n";
        let pipeline = ScanPipeline::new(MockRecognizer::new(text));
        let r = pipeline.scan_bytes(&tiny_png()).unwrap();
        assert_eq!(r.raw_text(), text);
    }

    #[test]
    fn scan_color_image() {
        let img: RgbImage = ImageBuffer::from_fn(8, 8, |x, _| Rgb([x as u8 * 30, 90, 10]));
        let pipeline = ScanPipeline::new(MockRecognizer::new("Caesars"));
        let r = pipeline.scan_image(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(r.sportsbook, Some(Sportsbook::Caesars));
    }

    #[test]
    fn empty_text_is_no_text() {
        let pipeline = ScanPipeline::new(MockRecognizer::new(""));
        let err = pipeline.scan_bytes(&tiny_png()).unwrap_err();
        assert!(matches!(err, ScanError::NoText));
    }

    #[test]
    fn whitespace_text_is_no_text() {
        let pipeline = ScanPipeline::new(MockRecognizer::new(" \n\t\n "));
        let err = pipeline.scan_bytes(&tiny_png()).unwrap_err();
        assert!(matches!(err, ScanError::NoText));
    }

    #[test]
    fn undecodable_bytes_fail_preprocess() {
        let pipeline = ScanPipeline::new(MockRecognizer::new("DraftKings"));
        let err = pipeline.scan_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, ScanError::Preprocess(PreprocessError::Decode(_))));
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let pipeline = ScanPipeline::new(MockRecognizer::new("DraftKings"));
        let err = pipeline
            .scan_image(DynamicImage::ImageLuma8(GrayImage::new(0, 0)))
            .unwrap_err();
        assert!(matches!(err, ScanError::EmptyImage));
    }

    #[test]
    fn engine_failure_surfaces_as_ocr_error() {
        let pipeline = ScanPipeline::new(UnavailableRecognizer);
        let err = pipeline.scan_bytes(&tiny_png()).unwrap_err();
        assert!(matches!(err, ScanError::Ocr(OcrError::NotAvailable)));
    }

    #[test]
    fn pipeline_is_shareable_across_threads() {
        let pipeline = std::sync::Arc::new(ScanPipeline::new(MockRecognizer::new("WynnBET $1")));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = pipeline.clone();
                std::thread::spawn(move || p.scan_bytes(&tiny_png()).unwrap())
            })
            .collect();
        for h in handles {
            let r = h.join().unwrap();
            assert_eq!(r.sportsbook, Some(Sportsbook::WynnBet));
            assert_eq!(r.amount, Some(1.0));
        }
    }
}
