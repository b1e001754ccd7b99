use crate::model::BBox;

/// Reasons a proposed crop box is rejected before anything is rendered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CropError {
    #[error("Bounding box {0} has negative width or height")]
    Negative(BBox),

    #[error("Bounding box {0} has an area of zero")]
    ZeroArea(BBox),

    #[error("Bounding box {0} is entirely outside parent page bounding box {1}")]
    Outside(BBox, BBox),

    #[error("Bounding box {0} is not fully within parent page bounding box {1}")]
    NotWithin(BBox, BBox),
}

/// Pixel rectangle of a crop at a given resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn area(bbox: &BBox) -> Result<f64, CropError> {
    if bbox.width() < 0.0 || bbox.height() < 0.0 {
        return Err(CropError::Negative(*bbox));
    }
    Ok(bbox.width() * bbox.height())
}

fn overlap(a: &BBox, b: &BBox) -> Option<BBox> {
    let x0 = a.x0.max(b.x0);
    let top = a.top.max(b.top);
    let x1 = a.x1.min(b.x1);
    let bottom = a.bottom.min(b.bottom);
    if x0 < x1 && top < bottom {
        Some(BBox::new(x0, top, x1, bottom))
    } else {
        None
    }
}

/// Accept `bbox` only if it is a non-degenerate box fully inside `page`.
pub fn validate(bbox: &BBox, page: &BBox) -> Result<(), CropError> {
    let bbox_area = area(bbox)?;
    if bbox_area == 0.0 {
        return Err(CropError::ZeroArea(*bbox));
    }
    let shared = overlap(bbox, page).ok_or(CropError::Outside(*bbox, *page))?;
    if area(&shared)? < bbox_area {
        return Err(CropError::NotWithin(*bbox, *page));
    }
    Ok(())
}

/// Convert a validated crop box in points to pixels at `dpi`.
pub fn pixel_window(bbox: &BBox, dpi: u32) -> PixelWindow {
    let scale = f64::from(dpi) / 72.0;
    let px = |v: f64| (v * scale).round().max(0.0) as u32;
    PixelWindow {
        x: px(bbox.x0),
        y: px(bbox.top),
        width: px(bbox.width()).max(1),
        height: px(bbox.height()).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> BBox {
        BBox::new(0.0, 0.0, 612.0, 792.0)
    }

    #[test]
    fn test_validate_accepts_inner_box() {
        assert!(validate(&BBox::new(72.0, 72.0, 144.0, 200.0), &page()).is_ok());
        assert!(validate(&page(), &page()).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_box() {
        let err = validate(&BBox::new(200.0, 10.0, 100.0, 50.0), &page()).unwrap_err();
        assert!(matches!(err, CropError::Negative(_)));
        assert!(err.to_string().contains("negative width or height"));
    }

    #[test]
    fn test_validate_rejects_zero_area() {
        let err = validate(&BBox::new(10.0, 10.0, 10.0, 50.0), &page()).unwrap_err();
        assert!(matches!(err, CropError::ZeroArea(_)));
    }

    #[test]
    fn test_validate_rejects_outside_and_overhanging() {
        let outside = validate(&BBox::new(700.0, 10.0, 800.0, 50.0), &page()).unwrap_err();
        assert!(matches!(outside, CropError::Outside(_, _)));

        let overhang = validate(&BBox::new(600.0, 10.0, 612.1, 50.0), &page()).unwrap_err();
        assert!(matches!(overhang, CropError::NotWithin(_, _)));
    }

    #[test]
    fn test_pixel_window_at_150_dpi() {
        let window = pixel_window(&BBox::new(72.0, 144.0, 216.0, 180.0), 150);
        assert_eq!(
            window,
            PixelWindow {
                x: 150,
                y: 300,
                width: 300,
                height: 75,
            }
        );
    }

    #[test]
    fn test_pixel_window_never_empty() {
        let window = pixel_window(&BBox::new(10.0, 10.0, 10.1, 10.1), 150);
        assert_eq!(window.width, 1);
        assert_eq!(window.height, 1);
    }
}
