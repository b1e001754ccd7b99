use crate::model::{BBox, PageLayout, TextLine, Word};

/// Words whose text occurs somewhere inside `line`, in their original order.
///
/// This is plain substring containment, not token alignment: a short word
/// such as "a" matches any line containing that letter.
pub fn matching_words<'a>(line: &str, words: &'a [Word]) -> Vec<&'a Word> {
    words
        .iter()
        .filter(|w| line.contains(w.text.as_str()))
        .collect()
}

/// Bounding box of a line: top-left of the first matching word to the
/// bottom-right of the last one, rounded to one decimal.
pub fn line_bbox(line: &str, words: &[Word]) -> Option<BBox> {
    let matched = matching_words(line, words);
    let first = matched.first()?;
    let last = matched.last()?;
    Some(BBox::new(first.bbox.x0, first.bbox.top, last.bbox.x1, last.bbox.bottom).rounded())
}

/// Text lines of one page. Lines no word matches are dropped.
pub fn page_text_lines(page_index: usize, page: &PageLayout) -> Vec<TextLine> {
    page.lines
        .iter()
        .filter_map(|line| {
            line_bbox(line, &page.words).map(|bbox| TextLine {
                text: line.clone(),
                page: page_index,
                bbox,
            })
        })
        .collect()
}
