use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use leptess::LepTess;

use super::{RawRecognition, RecognitionEngine, RecognitionError};

/// Environment variable overriding the tessdata directory.
pub const TESSDATA_ENV: &str = "OCR_BATCH_TESSDATA";

/// Tesseract word rows carry level 5 in TSV output.
const WORD_LEVEL: u32 = 5;

/// Recognition engine backed by Tesseract through `leptess`.
///
/// The Tesseract API is initialized lazily on the first `predict` call and
/// then reused for every following image handled by this engine. A failed
/// initialization is remembered and reported for every later image.
pub struct TesseractEngine {
    languages: String,
    data_path: Option<PathBuf>,
    api: RefCell<ApiState>,
}

enum ApiState {
    Uninitialized,
    Ready(LepTess),
    Failed(String),
}

impl TesseractEngine {
    pub fn new(languages: &[String], data_path: Option<PathBuf>) -> Self {
        let languages = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self {
            languages,
            data_path,
            api: RefCell::new(ApiState::Uninitialized),
        }
    }

    /// Builds an engine whose tessdata directory may be overridden by
    /// `OCR_BATCH_TESSDATA`.
    pub fn from_env(languages: &[String], data_path: Option<PathBuf>) -> Self {
        let data_path = std::env::var_os(TESSDATA_ENV)
            .map(PathBuf::from)
            .or(data_path);
        Self::new(languages, data_path)
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    fn init_api(&self) -> Result<LepTess, String> {
        let _span = tracing::info_span!("recognition.init", languages = %self.languages).entered();
        let data_path = match &self.data_path {
            Some(p) => Some(
                p.to_str()
                    .ok_or_else(|| format!("Non UTF-8 tessdata path: {}", p.display()))?,
            ),
            None => None,
        };

        LepTess::new(data_path, &self.languages)
            .map_err(|e| format!("Failed to initialize Tesseract: {}", e))
    }
}

impl RecognitionEngine for TesseractEngine {
    fn predict(&self, image_path: &Path) -> Result<Vec<RawRecognition>, RecognitionError> {
        let _span = tracing::info_span!("recognition.tesseract").entered();

        let image_data = std::fs::read(image_path).map_err(|e| RecognitionError::ReadImage {
            path: image_path.to_path_buf(),
            source: e,
        })?;

        // Normalize to PNG in memory so leptonica sees one well-supported format.
        let img = image::load_from_memory(&image_data)
            .map_err(|e| RecognitionError::Engine(format!("Failed to load image: {}", e)))?;
        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| RecognitionError::Engine(format!("Failed to convert image: {}", e)))?;

        let mut state = self.api.borrow_mut();
        if matches!(*state, ApiState::Uninitialized) {
            *state = match self.init_api() {
                Ok(api) => ApiState::Ready(api),
                Err(reason) => {
                    tracing::warn!("{}", reason);
                    ApiState::Failed(reason)
                }
            };
        }
        let api = match &mut *state {
            ApiState::Ready(api) => api,
            ApiState::Failed(reason) => return Err(RecognitionError::Init(reason.clone())),
            ApiState::Uninitialized => {
                return Err(RecognitionError::Init(
                    "Tesseract API unavailable".to_string(),
                ))
            }
        };

        api.set_image_from_mem(&png_data)
            .map_err(|e| RecognitionError::Engine(format!("Failed to set image for OCR: {}", e)))?;

        let tsv = api
            .get_tsv_text(0)
            .map_err(|e| RecognitionError::Engine(format!("OCR failed: {}", e)))?;

        Ok(vec![parse_tsv(&tsv)])
    }
}

struct LineAccumulator {
    key: (u32, u32, u32),
    words: Vec<String>,
    confidences: Vec<f64>,
    bbox: [i64; 4],
}

impl LineAccumulator {
    fn finish(self, out: &mut RawRecognition) {
        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            self.confidences.iter().sum::<f64>() / self.confidences.len() as f64 / 100.0
        };
        out.rec_texts.push(self.words.join(" "));
        out.rec_scores.push(confidence);
        out.rec_boxes.push(self.bbox);
    }
}

/// Groups Tesseract TSV word rows into text lines.
///
/// Each line gets the space-joined words, the mean word confidence scaled to
/// `[0, 1]` and the union of the word boxes as `(x1, y1, x2, y2)`. Header
/// and non-word rows are ignored.
pub fn parse_tsv(tsv: &str) -> RawRecognition {
    let mut out = RawRecognition::default();
    let mut current: Option<LineAccumulator> = None;

    for line in tsv.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }
        let Ok(level) = fields[0].parse::<u32>() else {
            continue;
        };
        if level != WORD_LEVEL {
            continue;
        }

        let text = fields[11].trim();
        let conf = fields[10].parse::<f64>().unwrap_or(-1.0);
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let nums: Vec<i64> = fields[2..10]
            .iter()
            .map(|f| f.parse::<i64>().unwrap_or(0))
            .collect();
        let key = (nums[0] as u32, nums[1] as u32, nums[2] as u32);
        let (left, top, width, height) = (nums[4], nums[5], nums[6], nums[7]);
        let word_box = [left, top, left + width, top + height];

        match current.as_mut() {
            Some(acc) if acc.key == key => {
                acc.words.push(text.to_string());
                acc.confidences.push(conf);
                acc.bbox = [
                    acc.bbox[0].min(word_box[0]),
                    acc.bbox[1].min(word_box[1]),
                    acc.bbox[2].max(word_box[2]),
                    acc.bbox[3].max(word_box[3]),
                ];
            }
            _ => {
                if let Some(done) = current.take() {
                    done.finish(&mut out);
                }
                current = Some(LineAccumulator {
                    key,
                    words: vec![text.to_string()],
                    confidences: vec![conf],
                    bbox: word_box,
                });
            }
        }
    }

    if let Some(done) = current {
        done.finish(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t200\t100\t-1\t
4\t1\t1\t1\t1\t0\t10\t10\t80\t20\t-1\t
5\t1\t1\t1\t1\t1\t10\t10\t40\t20\t96\tInvoice
5\t1\t1\t1\t1\t2\t55\t12\t35\t18\t90\t#42
5\t1\t1\t1\t2\t1\t10\t40\t30\t15\t80\tTotal
5\t1\t1\t1\t2\t2\t45\t40\t10\t15\t-1\t
";

    #[test]
    fn test_engine_joins_languages() {
        let engine = TesseractEngine::new(&["eng".to_string(), "deu".to_string()], None);
        assert_eq!(engine.languages(), "eng+deu");
    }

    #[test]
    fn test_engine_default_language() {
        let engine = TesseractEngine::new(&[], Some(PathBuf::from("/models")));
        assert_eq!(engine.languages(), "eng");
        assert_eq!(engine.data_path(), Some(Path::new("/models")));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let engine = TesseractEngine::new(&[], None);
        let result = engine.predict(Path::new("/nonexistent/image.png"));

        match result {
            Err(RecognitionError::ReadImage { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/image.png"));
            }
            other => panic!("Expected ReadImage error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_image_data_is_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let engine = TesseractEngine::new(&[], None);
        match engine.predict(&path) {
            Err(RecognitionError::Engine(msg)) => assert!(msg.contains("Failed to load image")),
            other => panic!("Expected Engine error, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_initialization_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let engine = TesseractEngine::new(&[], None);
        *engine.api.borrow_mut() = ApiState::Failed("missing eng.traineddata".to_string());

        for _ in 0..2 {
            match engine.predict(&path) {
                Err(RecognitionError::Init(msg)) => assert_eq!(msg, "missing eng.traineddata"),
                other => panic!("Expected Init error, got {:?}", other),
            }
        }
        assert!(matches!(*engine.api.borrow(), ApiState::Failed(_)));
    }

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let raw = parse_tsv(SAMPLE);

        assert!(raw.is_well_formed());
        assert_eq!(raw.rec_texts, vec!["Invoice #42", "Total"]);
        assert_eq!(raw.rec_boxes, vec![[10, 10, 90, 30], [10, 40, 40, 55]]);
        assert!((raw.rec_scores[0] - 0.93).abs() < 1e-9);
        assert!((raw.rec_scores[1] - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_parse_tsv_empty_input() {
        let raw = parse_tsv("");
        assert!(raw.rec_texts.is_empty());
        assert!(raw.is_well_formed());
    }
}
