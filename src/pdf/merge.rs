//! PDF merging with page-number stamping using lopdf

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::layout::PageBox;
use crate::pdf::overlay::{create_page_number_overlay, NumberingOptions};

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page-tree depth when walking `Parent` links
const MAX_TREE_DEPTH: usize = 64;

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
    /// How each page is labelled
    pub numbering: NumberingOptions,
}

/// Pages contributed by one input file
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub pages: usize,
}

/// Outcome of a merge run
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Input files in merge order
    pub files: Vec<FileSummary>,
    /// Pages written, which is also the last page number used
    pub total_pages: usize,
    /// Where the merged PDF was saved
    pub output_path: PathBuf,
}

/// Merge PDF files into one document, stamping a running page number on every page
///
/// Pages are taken file by file in the order of `input_paths`, and within a
/// file in page-tree order. The counter starts at 1 and is never reset, so
/// page `k` of the output carries `options.numbering.label(k)`. The
/// original page content stays underneath; the label is drawn on top.
///
/// Any file that fails to load aborts the whole merge and nothing is written.
///
/// # Example
///
/// ```no_run
/// use merge_numbered::pdf::{merge_numbered, MergeOptions, NumberingOptions};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("a.pdf"),
///         PathBuf::from("b.pdf"),
///     ],
///     output_path: PathBuf::from("merged_numbered.pdf"),
///     numbering: NumberingOptions::default(),
/// };
///
/// let report = merge_numbered(&options).expect("Failed to merge");
/// println!("{} pages", report.total_pages);
/// ```
pub fn merge_numbered(options: &MergeOptions) -> Result<MergeReport> {
    if options.input_paths.is_empty() {
        return Err(Error::General("No input files provided".to_string()));
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut files = Vec::with_capacity(options.input_paths.len());
    let mut page_number = 1;

    for path in &options.input_paths {
        info!("Processing: {}", display_name(path));

        let mut doc = Document::load(path)?;

        // Move this document's ids above everything collected so far
        doc.renumber_objects_with(max_id);

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            inherit_page_attributes(&mut doc, page_id)?;

            let page_box = page_box(&doc, page_id);
            let label = options.numbering.label(page_number);
            let overlay = create_page_number_overlay(
                page_box.width,
                page_box.height,
                &label,
                &options.numbering,
            )?;
            stamp_page(&mut doc, page_id, &page_box, &overlay)?;

            debug!(page = page_number, ?page_box, "stamped \"{}\"", label);
            page_number += 1;
        }

        if pages.is_empty() {
            debug!("{} has no pages", path.display());
        }

        // Stamping adds objects, so read max_id only after the page loop
        max_id = doc.max_id + 1;

        files.push(FileSummary {
            path: path.clone(),
            pages: pages.len(),
        });
        page_ids.extend(pages);
        objects.extend(doc.objects);
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);

    // new_object_id() must hand out ids above everything just inserted
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        merged_doc
            .get_dictionary_mut(page_id)?
            .set("Parent", Object::Reference(pages_id));
    }

    // Drop the source catalogs, page trees and overlay scaffolding
    let pruned = merged_doc.prune_objects();
    debug!("pruned {} unreachable objects", pruned.len());

    merged_doc.compress();
    merged_doc.save(&options.output_path)?;

    Ok(MergeReport {
        files,
        total_pages: page_ids.len(),
        output_path: options.output_path.clone(),
    })
}

/// Read a page's MediaBox, falling back to US Letter if it cannot be read
pub fn page_box(doc: &Document, page_id: ObjectId) -> PageBox {
    read_page_box(doc, page_id).unwrap_or_else(|e| {
        debug!("unreadable MediaBox on {:?} ({}), using Letter", page_id, e);
        PageBox::letter()
    })
}

fn read_page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let page = doc.get_dictionary(page_id)?;

    let media_box = match page.get(b"MediaBox") {
        Ok(value) => value.clone(),
        Err(_) => find_inherited(doc, page, b"MediaBox")
            .ok_or_else(|| Error::General("page has no MediaBox".to_string()))?,
    };

    let rect = resolve(doc, &media_box)?.as_array()?;
    if rect.len() != 4 {
        return Err(Error::General(format!(
            "MediaBox has {} entries, expected 4",
            rect.len()
        )));
    }

    let mut values = [0.0f32; 4];
    for (slot, value) in values.iter_mut().zip(rect) {
        *slot = resolve(doc, value)?.as_float()?;
    }

    PageBox::from_rect(values)
        .ok_or_else(|| Error::General(format!("degenerate MediaBox {:?}", values)))
}

/// Copy inheritable attributes from ancestor Pages nodes onto the page itself
///
/// The merged document gets a brand new page tree, so anything a page only
/// had through its old parents would otherwise be lost.
fn inherit_page_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let inherited: Vec<(&[u8], Object)> = {
        let page = doc.get_dictionary(page_id)?;
        INHERITABLE_KEYS
            .iter()
            .filter(|key| !page.has(key))
            .filter_map(|key| find_inherited(doc, page, key).map(|value| (*key, value)))
            .collect()
    };

    if !inherited.is_empty() {
        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }

    Ok(())
}

/// Look `key` up on the ancestors of `page`, nearest first
fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// Follow one level of indirection
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Resolve an object to an owned dictionary, if it is (or points at) one
fn resolve_dictionary(doc: &Document, object: &Object) -> Option<Dictionary> {
    match resolve(doc, object) {
        Ok(Object::Dictionary(dict)) => Some(dict.clone()),
        _ => None,
    }
}

/// Stamp an overlay page on top of a page of `doc`
///
/// The overlay's objects are copied into `doc` under fresh ids. The page's
/// original content is wrapped in `q`/`Q` so its graphics state cannot leak
/// into the overlay, and the overlay is shifted to the page box origin.
pub fn stamp_page(
    doc: &mut Document,
    page_id: ObjectId,
    page_box: &PageBox,
    overlay: &Document,
) -> Result<()> {
    let overlay_page_id = overlay
        .get_pages()
        .into_values()
        .next()
        .ok_or_else(|| Error::General("overlay has no pages".to_string()))?;

    let id_map = import_objects(doc, overlay);
    let (overlay_contents, overlay_resources) =
        overlay_content_and_resources(overlay, overlay_page_id, &id_map)?;

    let open_id = add_operations(doc, vec![Operation::new("q", vec![])])?;

    let mut switch = vec![Operation::new("Q", vec![]), Operation::new("q", vec![])];
    if !page_box.is_at_origin() {
        switch.push(Operation::new(
            "cm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(page_box.left),
                Object::Real(page_box.bottom),
            ],
        ));
    }
    let switch_id = add_operations(doc, switch)?;
    let close_id = add_operations(doc, vec![Operation::new("Q", vec![])])?;

    let mut contents = vec![Object::Reference(open_id)];
    contents.extend(page_content_refs(doc, page_id)?);
    contents.push(Object::Reference(switch_id));
    contents.extend(overlay_contents);
    contents.push(Object::Reference(close_id));

    let overlay_resources = resolve_dictionary(doc, &overlay_resources).unwrap_or_else(Dictionary::new);
    let resources = merged_resources(doc, page_id, &overlay_resources)?;

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));

    Ok(())
}

/// Copy every object of `source` into `doc`, returning the old→new id map
fn import_objects(doc: &mut Document, source: &Document) -> HashMap<ObjectId, ObjectId> {
    let id_offset = doc.max_id;

    let id_map: HashMap<ObjectId, ObjectId> = source
        .objects
        .keys()
        .map(|&old_id| (old_id, (old_id.0 + id_offset, old_id.1)))
        .collect();

    for (old_id, object) in source.objects.iter() {
        doc.objects
            .insert(id_map[old_id], renumber_object_references(object, &id_map));
    }

    doc.max_id = id_offset + source.max_id;
    id_map
}

/// Renumber all object references in an object
fn renumber_object_references(object: &Object, id_map: &HashMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(old_id) => {
            Object::Reference(id_map.get(old_id).copied().unwrap_or(*old_id))
        }
        Object::Array(arr) => Object::Array(
            arr.iter()
                .map(|obj| renumber_object_references(obj, id_map))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(renumber_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut renumbered = stream.clone();
            renumbered.dict = renumber_dictionary(&stream.dict, id_map);
            Object::Stream(renumbered)
        }
        _ => object.clone(),
    }
}

fn renumber_dictionary(dict: &Dictionary, id_map: &HashMap<ObjectId, ObjectId>) -> Dictionary {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), renumber_object_references(value, id_map));
    }
    new_dict
}

/// Content references and resources of the overlay page, with remapped ids
fn overlay_content_and_resources(
    overlay: &Document,
    overlay_page_id: ObjectId,
    id_map: &HashMap<ObjectId, ObjectId>,
) -> Result<(Vec<Object>, Object)> {
    let page = overlay.get_dictionary(overlay_page_id)?;

    let contents = match page.get(b"Contents") {
        Ok(content) => match renumber_object_references(content, id_map) {
            Object::Array(arr) => arr,
            other => vec![other],
        },
        Err(_) => vec![],
    };

    let resources = match page.get(b"Resources") {
        Ok(res) => renumber_object_references(res, id_map),
        Err(_) => Object::Dictionary(Dictionary::new()),
    };

    Ok((contents, resources))
}

/// The page's current content stream references, flattened to a list
fn page_content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;

    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams rather than a single stream
            Ok(Object::Array(arr)) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => vec![],
    };

    Ok(refs)
}

/// Add a content stream built from `operations` and return its id
fn add_operations(doc: &mut Document, operations: Vec<Operation>) -> Result<ObjectId> {
    let content = Content { operations }.encode()?;
    Ok(doc.add_object(Stream::new(Dictionary::new(), content)))
}

/// The page's resources with the overlay's resources merged in
///
/// Referenced dictionaries are resolved and copied, so the result belongs
/// to this page alone even when the original was shared between pages.
fn merged_resources(
    doc: &Document,
    page_id: ObjectId,
    overlay_resources: &Dictionary,
) -> Result<Dictionary> {
    let page = doc.get_dictionary(page_id)?;
    let mut merged = page
        .get(b"Resources")
        .ok()
        .and_then(|res| resolve_dictionary(doc, res))
        .unwrap_or_else(Dictionary::new);

    // Merge each resource type (Font, ExtGState, XObject, etc.)
    for (key, value) in overlay_resources.iter() {
        let existing = merged
            .get(key)
            .ok()
            .and_then(|existing| resolve_dictionary(doc, existing));
        let incoming = resolve_dictionary(doc, value);

        match (existing, incoming) {
            (Some(mut subdict), Some(overlay_subdict)) => {
                for (name, entry) in overlay_subdict.iter() {
                    subdict.set(name.clone(), entry.clone());
                }
                merged.set(key.clone(), Object::Dictionary(subdict));
            }
            (None, _) if merged.has(key) => {
                // Not a dictionary on the page side (e.g. ProcSet); leave it be
            }
            _ => {
                merged.set(key.clone(), value.clone());
            }
        }
    }

    Ok(merged)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
