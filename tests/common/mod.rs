//! Shared helpers for the integration tests
//!
//! Fixtures are generated with lopdf at test time, so no binary PDFs need
//! to live in the repository.

#![allow(dead_code)]

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

/// Write a PDF with one page per entry of `markers`, each `width` × `height`
/// points, whose body text is the marker string.
pub fn write_pdf(path: &Path, markers: &[&str], width: f32, height: f32) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for marker in markers {
        let body = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET\n", marker);
        let content_id = doc.add_object(Stream::new(dictionary! {}, body.into_bytes()));
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
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    doc.save(path).expect("Failed to write fixture PDF");
}

/// Write a Letter-sized PDF with one page per marker
pub fn write_letter_pdf(path: &Path, markers: &[&str]) {
    write_pdf(path, markers, 612.0, 792.0);
}

/// All `Tj` string operands drawn on each page of the PDF at `path`, in page order
pub fn page_strings(path: &Path) -> Vec<Vec<Vec<u8>>> {
    let doc = Document::load(path).expect("Failed to load output PDF");

    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let bytes = doc.get_page_content(page_id).expect("page content");
            Content::decode(&bytes)
                .expect("content decodes")
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, _)) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

/// Position (`Td` operands) of the last text drawn on each page
pub fn label_positions(path: &Path) -> Vec<(f32, f32)> {
    let doc = Document::load(path).expect("Failed to load output PDF");

    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let bytes = doc.get_page_content(page_id).expect("page content");
            let td = Content::decode(&bytes)
                .expect("content decodes")
                .operations
                .into_iter()
                .filter(|op| op.operator == "Td")
                .last()
                .expect("label Td");
            (
                td.operands[0].as_float().expect("x"),
                td.operands[1].as_float().expect("y"),
            )
        })
        .collect()
}
