//! Page-number overlay generation using lopdf
//!
//! Each overlay is a throwaway single-page document, sized like the page it
//! will be stamped on, holding nothing but one right-aligned label.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::error::Result;
use crate::layout::{right_aligned_origin, Margins};
use crate::pdf::fonts::{encode_win_ansi, helvetica_encoded_width, HELVETICA};

/// Default label template; `{num}` is replaced with the page number
pub const PAGE_NUMBER_FORMAT: &str = "Página {num}";

/// Placeholder substituted in the label template
pub const NUMBER_PLACEHOLDER: &str = "{num}";

/// Resource name of the overlay font
///
/// Merged into the target page's own Font resources, so it must not clash
/// with producer names such as `F1` or `TT0`.
pub const OVERLAY_FONT: &str = "MergeNumberedHelv";

/// Options for the page-number label
#[derive(Debug, Clone)]
pub struct NumberingOptions {
    /// Label template containing `{num}`
    pub label_format: String,
    /// Font size in points
    pub font_size: f32,
    /// Offsets from the bottom-right corner of the page
    pub margins: Margins,
}

impl Default for NumberingOptions {
    fn default() -> Self {
        Self {
            label_format: PAGE_NUMBER_FORMAT.to_string(),
            font_size: 9.0,
            margins: Margins::default(),
        }
    }
}

impl NumberingOptions {
    /// Render the label for a 1-based page number
    pub fn label(&self, number: usize) -> String {
        self.label_format
            .replace(NUMBER_PLACEHOLDER, &number.to_string())
    }
}

/// Create an in-memory single-page PDF containing only the page-number label
///
/// The page is `width` × `height` points with its origin at (0, 0). The label
/// is set in Helvetica with WinAnsiEncoding, right-aligned so that it ends
/// `margins.right` from the right edge, with its baseline `margins.bottom`
/// above the bottom edge.
///
/// # Example
///
/// ```
/// use merge_numbered::pdf::{create_page_number_overlay, NumberingOptions};
///
/// let options = NumberingOptions::default();
/// let overlay = create_page_number_overlay(612.0, 792.0, &options.label(1), &options)
///     .expect("overlay");
/// assert_eq!(overlay.get_pages().len(), 1);
/// ```
pub fn create_page_number_overlay(
    width: f32,
    height: f32,
    text: &str,
    options: &NumberingOptions,
) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => HELVETICA,
        "Encoding" => "WinAnsiEncoding",
    });

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            OVERLAY_FONT => font_id,
        },
    });

    let content = label_content(width, text, options);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width),
            Object::Real(height),
        ],
        "Resources" => resources_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Build the content stream operators that draw the label
fn label_content(width: f32, text: &str, options: &NumberingOptions) -> Content {
    let encoded = encode_win_ansi(text);
    let text_width = helvetica_encoded_width(&encoded, options.font_size);
    let (x, y) = right_aligned_origin(width, text_width, &options.margins);

    Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Integer(0)]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(OVERLAY_FONT.as_bytes().to_vec()),
                    Object::Real(options.font_size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encoded, StringFormat::Hexadecimal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fonts::helvetica_text_width;

    fn first_page_dict(doc: &Document) -> &lopdf::Dictionary {
        let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
        doc.get_dictionary(page_id).expect("page dictionary")
    }

    fn label_operation(doc: &Document, op: &str) -> Operation {
        let (_, page_id) = doc.get_pages().into_iter().next().expect("one page");
        let content = Content::decode(&doc.get_page_content(page_id).expect("content"))
            .expect("decodes");
        content
            .operations
            .into_iter()
            .find(|o| o.operator == op)
            .expect("operator present")
    }

    #[test]
    fn test_label_formatting() {
        let options = NumberingOptions::default();
        assert_eq!(options.label(1), "Página 1");
        assert_eq!(options.label(120), "Página 120");

        let custom = NumberingOptions {
            label_format: "{num} / doc".to_string(),
            ..Default::default()
        };
        assert_eq!(custom.label(7), "7 / doc");
    }

    #[test]
    fn test_overlay_is_single_page_of_requested_size() {
        let options = NumberingOptions::default();
        let doc = create_page_number_overlay(595.0, 842.0, "Página 3", &options).unwrap();

        assert_eq!(doc.get_pages().len(), 1);
        let media_box = first_page_dict(&doc).get(b"MediaBox").unwrap().as_array().unwrap();
        let values: Vec<f32> = media_box.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![0.0, 0.0, 595.0, 842.0]);
    }

    #[test]
    fn test_overlay_draws_encoded_label() {
        let options = NumberingOptions::default();
        let doc = create_page_number_overlay(612.0, 792.0, "Página 42", &options).unwrap();

        let tj = label_operation(&doc, "Tj");
        match &tj.operands[0] {
            Object::String(bytes, _) => assert_eq!(bytes, &encode_win_ansi("Página 42")),
            other => panic!("unexpected operand {:?}", other),
        }

        let tf = label_operation(&doc, "Tf");
        assert!(matches!(&tf.operands[0], Object::Name(n) if n == OVERLAY_FONT.as_bytes()));
        assert_eq!(tf.operands[1].as_float().unwrap(), 9.0);
    }

    #[test]
    fn test_overlay_label_is_right_aligned() {
        let options = NumberingOptions::default();
        let text = "Página 1000";
        let doc = create_page_number_overlay(612.0, 792.0, text, &options).unwrap();

        let td = label_operation(&doc, "Td");
        let x = td.operands[0].as_float().unwrap();
        let y = td.operands[1].as_float().unwrap();
        let right_edge = x + helvetica_text_width(text, options.font_size);

        assert!((right_edge - (612.0 - 40.0)).abs() < 0.01);
        assert_eq!(y, 20.0);
    }

    #[test]
    fn test_overlay_font_resource() {
        let options = NumberingOptions::default();
        let doc = create_page_number_overlay(612.0, 792.0, "x", &options).unwrap();

        let resources_id = first_page_dict(&doc)
            .get(b"Resources")
            .and_then(Object::as_reference)
            .unwrap();
        let fonts = doc
            .get_dictionary(resources_id)
            .unwrap()
            .get(b"Font")
            .and_then(Object::as_dict)
            .unwrap();
        let font_id = fonts
            .get(OVERLAY_FONT.as_bytes())
            .and_then(Object::as_reference)
            .unwrap();
        let font = doc.get_dictionary(font_id).unwrap();

        assert!(matches!(font.get(b"BaseFont").unwrap(), Object::Name(n) if n == b"Helvetica"));
        assert!(matches!(font.get(b"Encoding").unwrap(), Object::Name(n) if n == b"WinAnsiEncoding"));
    }
}
