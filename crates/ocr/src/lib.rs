pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;

pub use extract::{Extractor, BASELINE_CONFIDENCE};
pub use pipeline::{ScanError, ScanPipeline};
pub use preprocess::{decode, encode_png, normalize, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, PageSegMode, UnavailableRecognizer};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
