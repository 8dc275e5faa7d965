//! Page assembly.
//!
//! [`frames_to_pdf`] turns a frame directory into one PDF with a page per
//! frame, in file-name order. Each frame is decoded, normalized to 8-bit RGB,
//! re-encoded as JPEG and embedded as a full-page image whose size in points
//! equals its size in pixels.
//!
//! The document is written next to its destination and renamed into place,
//! so an interrupted run never leaves a truncated PDF behind that a later run
//! would mistake for a finished one.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::error::VidnotesError;
use crate::extract::images_in;

/// PDF version written for per-video and merged documents.
pub const PDF_VERSION: &str = "1.5";

/// JPEG quality used when re-encoding frames.
const JPEG_QUALITY: u8 = 90;

/// Suffix of the temporary file a PDF is written to before being renamed.
pub const PARTIAL_SUFFIX: &str = "part";

/// What [`frames_to_pdf`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembly {
    /// The PDF already existed and was left untouched.
    AlreadyPresent,
    /// A new PDF was written with this many pages.
    Written {
        /// Number of pages (one per frame).
        pages: usize,
    },
}

/// Write every `*.jpg` in `frame_directory` as consecutive pages of
/// `pdf_path`.
///
/// Returns [`Assembly::AlreadyPresent`] if `pdf_path` exists.
///
/// # Errors
///
/// Returns [`VidnotesError::NoFrames`] when the directory holds no images (no
/// file is created), [`VidnotesError::ImageError`] if a frame cannot be
/// decoded, and [`VidnotesError::PdfError`] or [`VidnotesError::IoError`] if
/// the document cannot be written.
pub fn frames_to_pdf(frame_directory: &Path, pdf_path: &Path) -> Result<Assembly, VidnotesError> {
    if pdf_path.exists() {
        log::info!("PDF exists, skipping: {}", pdf_path.display());
        return Ok(Assembly::AlreadyPresent);
    }

    let frames = images_in(frame_directory)?;
    if frames.is_empty() {
        return Err(VidnotesError::NoFrames(frame_directory.to_path_buf()));
    }

    log::info!("Creating PDF {} from {} frames", pdf_path.display(), frames.len());

    let mut document = Document::with_version(PDF_VERSION);
    let pages_id = document.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(frames.len());

    for frame in &frames {
        let page_id = add_image_page(&mut document, pages_id, frame)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    save_atomically(&mut document, pdf_path)?;
    log::info!("PDF created: {}", pdf_path.display());

    Ok(Assembly::Written { pages: page_count })
}

/// Add one page showing `frame` at its native size.
fn add_image_page(
    document: &mut Document,
    pages_id: ObjectId,
    frame: &Path,
) -> Result<ObjectId, VidnotesError> {
    let image = image::open(frame)?.to_rgb8();
    let (width, height) = image.dimensions();

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY).encode_image(&image)?;

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        encoded,
    )
    .with_compression(false);
    let image_id = document.add_object(image_stream);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as i64).into(),
                    0.into(),
                    0.into(),
                    (height as i64).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Frame".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Frame" => image_id,
            },
        },
    });

    Ok(page_id)
}

/// Save `document` to a sibling temporary file, then rename it to `path`.
pub(crate) fn save_atomically(document: &mut Document, path: &Path) -> Result<(), VidnotesError> {
    let partial = partial_path(path);
    if let Err(error) = document.save(&partial) {
        let _ = fs::remove_file(&partial);
        return Err(error.into());
    }
    fs::rename(&partial, path)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}
