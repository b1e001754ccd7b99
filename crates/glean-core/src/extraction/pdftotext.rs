use crate::error::GleanError;
use crate::extraction::run_tool;
use crate::model::{BBox, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

/// Text layout of one page as reported by `pdftotext -bbox-layout`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPage {
    pub lines: Vec<String>,
    pub words: Vec<Word>,
}

/// Run `pdftotext -bbox-layout` on `pdf_path` and parse its XHTML output.
pub fn extract_text_pages(pdf_path: &Path) -> Result<Vec<TextPage>, GleanError> {
    let stdout = run_tool(
        "pdftotext",
        &[
            "-bbox-layout".into(),
            "-enc".into(),
            "UTF-8".into(),
            pdf_path.into(),
            "-".into(),
        ],
    )?;
    let xml = String::from_utf8_lossy(&stdout);
    parse_bbox_layout(&xml)
}

/// Parse the `<page>/<flow>/<block>/<line>/<word>` tree.
///
/// A page's lines are its `<line>` elements with their words joined by a
/// single space; its words are every `<word>` of the page in document order.
pub fn parse_bbox_layout(xml: &str) -> Result<Vec<TextPage>, GleanError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut page: Option<TextPage> = None;
    let mut line_words: Vec<String> = Vec::new();
    let mut word: Option<(BBox, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => match tag.name().as_ref() {
                b"page" => page = Some(TextPage::default()),
                b"line" => line_words.clear(),
                b"word" => word = Some((word_bbox(&tag)?, String::new())),
                _ => {}
            },
            Event::Empty(tag) if tag.name().as_ref() == b"page" => {
                pages.push(TextPage::default());
            }
            Event::Text(text) => {
                if let Some((_, buf)) = word.as_mut() {
                    buf.push_str(&text.unescape()?);
                }
            }
            Event::End(tag) => match tag.name().as_ref() {
                b"word" => {
                    if let (Some((bbox, text)), Some(current)) = (word.take(), page.as_mut()) {
                        let text = text.trim();
                        if !text.is_empty() {
                            line_words.push(text.to_string());
                            current.words.push(Word {
                                text: text.to_string(),
                                bbox,
                            });
                        }
                    }
                }
                b"line" => {
                    if let Some(current) = page.as_mut() {
                        if !line_words.is_empty() {
                            current.lines.push(line_words.join(" "));
                        }
                    }
                    line_words.clear();
                }
                b"page" => {
                    if let Some(done) = page.take() {
                        pages.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn word_bbox(tag: &BytesStart<'_>) -> Result<BBox, GleanError> {
    Ok(BBox::new(
        required_f64(tag, b"xMin")?,
        required_f64(tag, b"yMin")?,
        required_f64(tag, b"xMax")?,
        required_f64(tag, b"yMax")?,
    ))
}

fn required_f64(tag: &BytesStart<'_>, name: &[u8]) -> Result<f64, GleanError> {
    attr_f64(tag, name)?.ok_or_else(|| {
        GleanError::Extraction(format!(
            "<word> without {} attribute",
            String::from_utf8_lossy(name)
        ))
    })
}

fn attr_f64(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<f64>, GleanError> {
    for attr in tag.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() != name {
            continue;
        }
        let value = attr.unescape_value()?;
        return value.trim().parse::<f64>().map(Some).map_err(|e| {
            GleanError::Extraction(format!(
                "invalid {} value '{}': {}",
                String::from_utf8_lossy(name),
                value,
                e
            ))
        });
    }
    Ok(None)
}
