use lopdf::Document as LopdfDocument;

/// Strings drawn with `Tj` on a page, in drawing order.
pub fn page_strings(doc: &LopdfDocument, page_number: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return Vec::new();
    };
    let Ok(content) = doc.get_and_decode_page_content(page_id) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|operand| operand.as_str().ok())
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .collect()
}

/// Number of filled-and-stroked rectangles on a page, one per table cell.
pub fn cell_count(doc: &LopdfDocument, page_number: u32) -> usize {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return 0;
    };
    doc.get_and_decode_page_content(page_id)
        .map(|content| content.operations.iter().filter(|op| op.operator == "re").count())
        .unwrap_or(0)
}

/// Cell rectangles on a page as `(x, y, width, height)` in PDF coordinates.
pub fn cell_rects(doc: &LopdfDocument, page_number: u32) -> Vec<(f32, f32, f32, f32)> {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return Vec::new();
    };
    let Ok(content) = doc.get_and_decode_page_content(page_id) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "re" && op.operands.len() == 4)
        .filter_map(|op| {
            let v = |i: usize| op.operands[i].as_float().ok();
            Some((v(0)?, v(1)?, v(2)?, v(3)?))
        })
        .collect()
}

/// Fill colours used for cell backgrounds on a page, as 0-255 triples.
pub fn fill_colors(doc: &LopdfDocument, page_number: u32) -> Vec<(u8, u8, u8)> {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return Vec::new();
    };
    let Ok(content) = doc.get_and_decode_page_content(page_id) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "rg" && op.operands.len() == 3)
        .filter_map(|op| {
            let channel = |i: usize| op.operands[i].as_float().ok().map(|v| (v * 255.0).round() as u8);
            Some((channel(0)?, channel(1)?, channel(2)?))
        })
        .collect()
}

/// Get page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = *doc.get_pages().get(&page_num)?;
    let page_dict = doc.get_dictionary(page_id).ok()?;
    let arr = page_dict.get(b"MediaBox").ok()?.as_array().ok()?;
    if arr.len() < 4 {
        return None;
    }
    let width = arr[2].as_float().ok()? - arr[0].as_float().ok()?;
    let height = arr[3].as_float().ok()? - arr[1].as_float().ok()?;
    Some((width, height))
}

// ============================================================================
// Fluent Assertion Macros
// ============================================================================

/// Assert that a page draws a specific string
#[macro_export]
macro_rules! assert_page_draws_text {
    ($pdf:expr, $page:expr, $text:expr) => {
        let strings = $crate::common::pdf_assertions::page_strings(&$pdf.doc, $page);
        assert!(
            strings.iter().any(|s| s == $text),
            "Page {} should draw '{}', but drew:\n{:?}",
            $page,
            $text,
            strings
        );
    };
}

/// Assert that a page does NOT draw a specific string
#[macro_export]
macro_rules! assert_page_not_draws_text {
    ($pdf:expr, $page:expr, $text:expr) => {
        let strings = $crate::common::pdf_assertions::page_strings(&$pdf.doc, $page);
        assert!(
            !strings.iter().any(|s| s == $text),
            "Page {} should NOT draw '{}', but it was found in:\n{:?}",
            $page,
            $text,
            strings
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert page dimensions within tolerance
#[macro_export]
macro_rules! assert_pdf_page_size {
    ($pdf:expr, $page:expr, $width:expr, $height:expr) => {
        let dims = $crate::common::pdf_assertions::get_page_dimensions(&$pdf.doc, $page);
        assert!(dims.is_some(), "Could not get dimensions for page {}", $page);
        let (w, h) = dims.unwrap();
        assert!(
            (w - $width).abs() < 1.0,
            "Page {} width expected ~{}, got {}",
            $page,
            $width,
            w
        );
        assert!(
            (h - $height).abs() < 1.0,
            "Page {} height expected ~{}, got {}",
            $page,
            $height,
            h
        );
    };
}
