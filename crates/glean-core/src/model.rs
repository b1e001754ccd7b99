use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rectangle in page points with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        BBox {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Every coordinate rounded to one decimal place.
    pub fn rounded(&self) -> BBox {
        BBox {
            x0: round1(self.x0),
            top: round1(self.top),
            x1: round1(self.x1),
            bottom: round1(self.bottom),
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x0, self.top, self.x1, self.bottom)
    }
}

/// Round to one decimal place, half-to-even on the exact binary value.
///
/// `0.15` is stored as `0.14999999...` and rounds to `0.1`; `0.25` is exact
/// and rounds to `0.2`. Non-finite or out-of-range values are returned as-is.
pub fn round1(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// A word as reported by the text layout backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// Everything the extractor needs to know about one page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
    /// Page text split into lines, in reading order.
    pub lines: Vec<String>,
    /// Words of the whole page, in reading order.
    pub words: Vec<Word>,
    /// Image placements, in content stream order.
    pub images: Vec<BBox>,
}

impl PageLayout {
    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// 0-indexed page number.
    pub page: usize,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public URL path of the saved PNG.
    pub src: String,
    /// 0-indexed page number.
    pub page: usize,
    pub bbox: BBox,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub texts: Vec<TextLine>,
    pub images: Vec<ImageRef>,
}

/// Text of one page, lines joined with `\n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

impl ExtractedData {
    /// Regroup text lines into one entry per run of lines on the same page.
    pub fn texts_by_page(&self) -> Vec<PageText> {
        let mut grouped: Vec<PageText> = Vec::new();
        for line in &self.texts {
            match grouped.last_mut() {
                Some(last) if last.page == line.page => {
                    last.text.push('\n');
                    last.text.push_str(&line.text);
                }
                _ => grouped.push(PageText {
                    page: line.page,
                    text: line.text.clone(),
                }),
            }
        }
        grouped
    }
}

/// The document printed on stdout. `data` and `error` are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn ok(data: ExtractedData) -> Self {
        ExtractionResult {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ExtractionResult {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
