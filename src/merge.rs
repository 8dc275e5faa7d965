//! Merging per-video PDFs.
//!
//! [`merge_pdfs`] concatenates every per-video PDF in the output directory,
//! ordered by the leading number of its file stem, into one document. The
//! merged file doubles as the completion marker: when it exists the merge is
//! skipped entirely.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use vidnotes::merge::{MergeOutcome, merge_pdfs};
//!
//! match merge_pdfs(Path::new("pdf"), Path::new("pdf/final_merged.pdf"))? {
//!     MergeOutcome::Written { pages, .. } => println!("{pages} pages"),
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), vidnotes::VidnotesError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::assemble::{PDF_VERSION, save_atomically};
use crate::error::VidnotesError;
use crate::naming::compare_names;
use crate::utilities::file_stem_lossy;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed input.
const MAX_TREE_DEPTH: usize = 64;

/// What [`merge_pdfs`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merged file already existed; nothing was read or written.
    AlreadyPresent {
        /// Path of the existing merged file.
        path: PathBuf,
    },
    /// No per-video PDFs were found, so no merged file was written.
    NothingToMerge,
    /// The merged file was written.
    Written {
        /// Path of the new merged file.
        path: PathBuf,
        /// The per-video PDFs, in the order they were appended.
        inputs: Vec<PathBuf>,
        /// Total page count.
        pages: usize,
    },
}

/// Per-video PDFs in `output_directory`, in merge order.
///
/// Excludes `merged_path` and temporary files. PDFs whose stem has no
/// leading number come last.
pub fn per_video_pdfs(
    output_directory: &Path,
    merged_path: &Path,
) -> Result<Vec<PathBuf>, VidnotesError> {
    if !output_directory.is_dir() {
        return Ok(Vec::new());
    }

    let merged_name = merged_path.file_name();
    let mut pdfs = Vec::new();
    for entry in fs::read_dir(output_directory)? {
        let path = entry?.path();
        let is_pdf = path.is_file()
            && path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.file_name() != merged_name {
            pdfs.push(path);
        }
    }

    pdfs.sort_by(|left, right| compare_names(&file_stem_lossy(left), &file_stem_lossy(right)));
    Ok(pdfs)
}

/// Append the pages of every per-video PDF in `output_directory` into
/// `merged_path`, calling `on_input` after each one.
///
/// # Errors
///
/// Returns [`VidnotesError::PdfError`] if an input cannot be parsed or the
/// result cannot be written. Unlike per-video failures, this aborts the
/// merge.
pub fn merge_pdfs_with(
    output_directory: &Path,
    merged_path: &Path,
    mut on_input: impl FnMut(&Path),
) -> Result<MergeOutcome, VidnotesError> {
    if merged_path.exists() {
        log::info!(
            "Merged PDF already exists, skipping merge: {}",
            merged_path.display()
        );
        return Ok(MergeOutcome::AlreadyPresent {
            path: merged_path.to_path_buf(),
        });
    }

    let inputs = per_video_pdfs(output_directory, merged_path)?;
    if inputs.is_empty() {
        log::warn!("No PDFs to merge in {}", output_directory.display());
        return Ok(MergeOutcome::NothingToMerge);
    }

    log::info!("Merging {} PDFs", inputs.len());

    let mut merged = Document::with_version(PDF_VERSION);
    let pages_id = merged.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for input in &inputs {
        log::info!("Adding {}", input.display());
        let page_ids = append_document(&mut merged, input)?;
        for page_id in page_ids {
            if let Ok(page) = merged.get_dictionary_mut(page_id) {
                page.set("Parent", pages_id);
            }
            kids.push(page_id.into());
        }
        on_input(input);
    }

    let pages = kids.len();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    save_atomically(&mut merged, merged_path)?;
    log::info!("Final merged PDF created: {}", merged_path.display());

    Ok(MergeOutcome::Written {
        path: merged_path.to_path_buf(),
        inputs,
        pages,
    })
}

/// [`merge_pdfs_with`] without a per-input callback.
pub fn merge_pdfs(output_directory: &Path, merged_path: &Path) -> Result<MergeOutcome, VidnotesError> {
    merge_pdfs_with(output_directory, merged_path, |_| {})
}

/// Move all objects of the PDF at `path` into `merged`, except its catalog
/// and page tree nodes, and return its page ids in page order.
fn append_document(merged: &mut Document, path: &Path) -> Result<Vec<ObjectId>, VidnotesError> {
    let mut document = Document::load(path)?;
    document.renumber_objects_with(merged.max_id + 1);

    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    for &page_id in &page_ids {
        inherit_attributes(&mut document, page_id)?;
    }

    merged.max_id = merged.max_id.max(document.max_id);
    for (object_id, object) in document.objects {
        if is_tree_node(&object) {
            continue;
        }
        merged.objects.insert(object_id, object);
    }

    Ok(page_ids)
}

/// Copy inheritable attributes from the page's ancestors onto the page, so
/// it renders the same once re-parented under the merged page tree.
fn inherit_attributes(document: &mut Document, page_id: ObjectId) -> Result<(), VidnotesError> {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let page = document.get_dictionary(page_id)?;
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;

        while let Some(parent_id) = parent {
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = document.get_dictionary(parent_id) else {
                break;
            };
            for key in INHERITABLE_ATTRIBUTES {
                let already_set = page.has(key) || inherited.iter().any(|(name, _)| *name == key);
                if already_set {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }

    if !inherited.is_empty() {
        let page = document.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
    Ok(())
}

fn is_tree_node(object: &Object) -> bool {
    let Object::Dictionary(dictionary) = object else {
        return false;
    };
    matches!(
        dictionary.get(b"Type").and_then(Object::as_name),
        Ok(name) if name == b"Catalog" || name == b"Pages"
    )
}
