//! Image placement discovery.
//!
//! Interprets page content streams just far enough to know where images are
//! drawn: the graphics state stack (`q`/`Q`), matrix concatenation (`cm`),
//! XObject invocation (`Do`, descending into forms) and inline images (`BI`).
//! Everything else in the stream is ignored.

use crate::error::GleanError;
use crate::model::BBox;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::path::Path;

/// Nested forms deeper than this are not entered.
const MAX_FORM_DEPTH: usize = 8;

/// Page size and image placements, in top-left page coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageImages {
    pub width: f64,
    pub height: f64,
    pub images: Vec<BBox>,
}

/// Affine transform `[a b c d e f]` as used by the `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `self` applied first, then `outer`.
    fn then(&self, outer: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = outer.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() != 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, operand) in m.iter_mut().zip(operands) {
            *slot = number(operand)?;
        }
        Some(Matrix(m))
    }
}

/// Placement in PDF user space: `(min_x, min_y, max_x, max_y)`.
type Placement = (f64, f64, f64, f64);

/// The unit square mapped through `ctm`.
fn unit_square(ctm: &Matrix) -> Placement {
    let corners = [
        ctm.apply(0.0, 0.0),
        ctm.apply(1.0, 0.0),
        ctm.apply(0.0, 1.0),
        ctm.apply(1.0, 1.0),
    ];
    corners.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    )
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, GleanError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up a page attribute, following `/Parent` for inherited keys.
///
/// A `/Parent` chain that revisits a node is an error.
fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, GleanError> {
    let mut visited = HashSet::new();
    let mut current = page_id;
    loop {
        if !visited.insert(current) {
            return Err(GleanError::Extraction(format!(
                "cyclic /Parent chain at object {} {}",
                current.0, current.1
            )));
        }
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }
        match dict.get(b"Parent") {
            Ok(parent) => current = parent.as_reference()?,
            Err(_) => return Ok(None),
        }
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> Result<Placement, GleanError> {
    let array = inherited(doc, page_id, b"MediaBox")?
        .ok_or_else(|| GleanError::Extraction("MediaBox not found on page or ancestors".into()))?
        .as_array()?;
    let values = array
        .iter()
        .map(|o| resolve(doc, o).ok().and_then(number))
        .collect::<Option<Vec<f64>>>();
    match values.as_deref() {
        Some([x0, y0, x1, y1]) => Ok((x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1))),
        _ => Err(GleanError::Extraction(format!(
            "MediaBox is not four numbers: {array:?}"
        ))),
    }
}

fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, GleanError> {
    if stream.dict.get(b"Filter").is_ok() {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

fn subtype_is(dict: &Dictionary, name: &[u8]) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == name)
}

/// Load a PDF from disk and report the images of every page.
pub fn scan_file(pdf_path: &Path) -> Result<Vec<PageImages>, GleanError> {
    let doc = Document::load(pdf_path)?;
    scan_document(&doc)
}

/// Report the images of every page of an already loaded document.
pub fn scan_document(doc: &Document) -> Result<Vec<PageImages>, GleanError> {
    doc.get_pages()
        .values()
        .map(|&page_id| scan_page(doc, page_id))
        .collect()
}

fn scan_page(doc: &Document, page_id: ObjectId) -> Result<PageImages, GleanError> {
    let (mx0, my0, mx1, my1) = media_box(doc, page_id)?;
    let resources = match inherited(doc, page_id, b"Resources")? {
        Some(obj) => Some(obj.as_dict()?),
        None => None,
    };
    let content = doc.get_page_content(page_id)?;

    let mut placements = Vec::new();
    walk(doc, &content, resources, Matrix::IDENTITY, 0, &mut placements)?;

    let images = placements
        .into_iter()
        .map(|(x0, y0, x1, y1)| BBox::new(x0 - mx0, my1 - y1, x1 - mx0, my1 - y0))
        .collect();

    Ok(PageImages {
        width: mx1 - mx0,
        height: my1 - my0,
        images,
    })
}

fn walk(
    doc: &Document,
    content: &[u8],
    resources: Option<&Dictionary>,
    base: Matrix,
    depth: usize,
    placements: &mut Vec<Placement>,
) -> Result<(), GleanError> {
    let content = Content::decode(content)?;
    let mut ctm = base;
    let mut saved: Vec<Matrix> = Vec::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => {
                if let Some(previous) = saved.pop() {
                    ctm = previous;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(&op.operands) {
                    ctm = m.then(&ctm);
                }
            }
            "BI" => placements.push(unit_square(&ctm)),
            "Do" => {
                let Some(Object::Name(name)) = op.operands.first() else {
                    continue;
                };
                let Some(xobject) = lookup_xobject(doc, resources, name)? else {
                    tracing::debug!(name = %String::from_utf8_lossy(name), "XObject not in resources");
                    continue;
                };
                if subtype_is(&xobject.dict, b"Image") {
                    placements.push(unit_square(&ctm));
                } else if subtype_is(&xobject.dict, b"Form") {
                    if depth >= MAX_FORM_DEPTH {
                        tracing::debug!(depth, "form nesting too deep, not descending");
                        continue;
                    }
                    let form_matrix = match xobject.dict.get(b"Matrix") {
                        Ok(obj) => Matrix::from_operands(resolve(doc, obj)?.as_array()?)
                            .unwrap_or(Matrix::IDENTITY),
                        Err(_) => Matrix::IDENTITY,
                    };
                    let form_resources = match xobject.dict.get(b"Resources") {
                        Ok(obj) => Some(resolve(doc, obj)?.as_dict()?),
                        Err(_) => resources,
                    };
                    let form_content = stream_bytes(xobject)?;
                    walk(
                        doc,
                        &form_content,
                        form_resources,
                        form_matrix.then(&ctm),
                        depth + 1,
                        placements,
                    )?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn lookup_xobject<'a>(
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
    name: &[u8],
) -> Result<Option<&'a Stream>, GleanError> {
    let Some(resources) = resources else {
        return Ok(None);
    };
    let Ok(xobjects) = resources.get(b"XObject") else {
        return Ok(None);
    };
    let xobjects = resolve(doc, xobjects)?.as_dict()?;
    let Ok(entry) = xobjects.get(name) else {
        return Ok(None);
    };
    Ok(Some(resolve(doc, entry)?.as_stream()?))
}
