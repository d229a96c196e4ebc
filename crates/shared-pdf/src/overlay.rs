//! Stamping signature images onto PDF pages
//!
//! Each overlay parses the buffer, draws one image onto one page, and
//! serializes a fresh buffer. Existing page content streams are kept
//! byte for byte; the image is drawn by a new stream appended after them,
//! with a leading `q` stream so the page's graphics state cannot leak into
//! the stamp.

use crate::coords::{is_valid_normalized_coordinate, transform_viewport_to_document};
use crate::error::PlacementError;
use crate::geometry::calculate_fit_dimensions;
use crate::parser::PdfDocument;
use crate::raster::{decode_signature_image, DecodedImage};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use shared_crypto::{hash, IntegrityDigest};
use shared_types::{
    AuditFragment, CoordinateSpace, FitResult, PageGeometry, Rectangle, SignaturePlacement,
};
use std::io::Write;
use tracing::{debug, info, instrument};

/// Prefix for XObject names registered in page resources
const XOBJECT_PREFIX: &str = "Sig";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Flate-compress image samples and the drawing stream
    pub compress: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self { compress: true }
    }
}

/// Result of stamping one image
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOutcome {
    pub document: Vec<u8>,
    pub before_digest: IntegrityDigest,
    pub after_digest: IntegrityDigest,
    pub applied_fit: FitResult,
}

/// Accumulator threaded through a batch of placements
#[derive(Debug, Clone)]
pub struct BatchState {
    pub document: Vec<u8>,
    pub original_digest: IntegrityDigest,
    pub fragments: Vec<AuditFragment>,
}

impl BatchState {
    pub fn new(document: Vec<u8>) -> Self {
        let original_digest = hash(&document);
        Self {
            document,
            original_digest,
            fragments: Vec::new(),
        }
    }

    /// Digest of the current buffer
    pub fn current_digest(&self) -> IntegrityDigest {
        self.fragments
            .last()
            .map(|f| f.after_digest)
            .unwrap_or(self.original_digest)
    }

    pub fn finish(self) -> BatchOutcome {
        let final_digest = self.current_digest();
        BatchOutcome {
            document: self.document,
            original_digest: self.original_digest,
            final_digest,
            fragments: self.fragments,
        }
    }
}

/// Result of stamping every placement in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub document: Vec<u8>,
    pub original_digest: IntegrityDigest,
    pub final_digest: IntegrityDigest,
    /// One entry per placement, in application order
    pub fragments: Vec<AuditFragment>,
}

/// Number of pages in a PDF buffer
pub fn page_count(document: &[u8]) -> Result<u32, PlacementError> {
    Ok(PdfDocument::from_bytes(document)?.page_count())
}

/// Size of one page's MediaBox in points
pub fn page_geometry(document: &[u8], page_index: u32) -> Result<PageGeometry, PlacementError> {
    Ok(PdfDocument::from_bytes(document)?
        .page_box(page_index)?
        .geometry)
}

/// Draw one signature image into a document-space rectangle on one page
#[instrument(skip_all, fields(page = placement.page_index, encoding = %placement.image.encoding))]
pub fn overlay_image(
    document: &[u8],
    placement: &SignaturePlacement,
    document_rect: &Rectangle,
    options: &OverlayOptions,
) -> Result<OverlayOutcome, PlacementError> {
    if !document_rect.is_in(CoordinateSpace::DocumentPoint) {
        return Err(PlacementError::CoordinateSpaceMismatch {
            expected: CoordinateSpace::DocumentPoint,
            found: document_rect.space,
        });
    }

    let before_digest = hash(document);
    let mut pdf = PdfDocument::from_bytes(document)?;
    let page_id = pdf.page_id(placement.page_index)?;
    let page_box = pdf.page_box(placement.page_index)?;

    let image = decode_signature_image(&placement.image)?;
    let applied_fit = calculate_fit_dimensions(
        image.width as f64,
        image.height as f64,
        document_rect.width,
        document_rect.height,
    )?;

    let x = page_box.origin_x + document_rect.x + applied_fit.offset_x;
    let y = page_box.origin_y + document_rect.y + applied_fit.offset_y;

    let resources = page_resources(&pdf, page_id)?;
    let image_id = embed_image(pdf.doc_mut(), &image, options.compress)?;
    let name = register_xobject(pdf.doc_mut(), page_id, resources, image_id)?;
    let draw = draw_operations(&name, x, y, applied_fit.width, applied_fit.height);
    append_contents(pdf.doc_mut(), page_id, draw, options.compress)?;

    let output = pdf.save_to_bytes()?;
    let after_digest = hash(&output);

    info!(
        xobject = %name,
        width = applied_fit.width,
        height = applied_fit.height,
        before = %before_digest,
        after = %after_digest,
        "signature image stamped"
    );

    Ok(OverlayOutcome {
        document: output,
        before_digest,
        after_digest,
        applied_fit,
    })
}

/// One step of a batch: transform the placement, stamp it, record the fragment
pub fn apply_placement(
    mut state: BatchState,
    placement: &SignaturePlacement,
    options: &OverlayOptions,
) -> Result<BatchState, PlacementError> {
    let page = page_geometry(&state.document, placement.page_index)?;
    let transform = transform_viewport_to_document(&placement.rect, &placement.viewport, &page)?;

    if !is_valid_normalized_coordinate(&transform.normalized) {
        return Err(PlacementError::InvalidGeometry(format!(
            "placement on page {} does not overlap the page",
            placement.page_index
        )));
    }

    let outcome = overlay_image(&state.document, placement, &transform.document_rect, options)?;

    state.fragments.push(AuditFragment {
        page_index: placement.page_index,
        normalized: transform.normalized,
        document_rect: transform.document_rect,
        viewport: placement.viewport,
        applied_fit: outcome.applied_fit,
        before_digest: outcome.before_digest,
        after_digest: outcome.after_digest,
    });
    state.document = outcome.document;
    Ok(state)
}

/// Apply placements in order, each against the previous step's output
pub fn overlay_images(
    document: &[u8],
    placements: &[SignaturePlacement],
    options: &OverlayOptions,
) -> Result<BatchOutcome, PlacementError> {
    let state = placements
        .iter()
        .try_fold(BatchState::new(document.to_vec()), |state, placement| {
            apply_placement(state, placement, options)
        })?;

    debug!(steps = state.fragments.len(), "batch complete");
    Ok(state.finish())
}

/// Effective resources of a page as an owned dictionary, with XObject inlined
fn page_resources(pdf: &PdfDocument, page_id: ObjectId) -> Result<Dictionary, PlacementError> {
    let mut resources = match pdf.inherited(page_id, b"Resources")? {
        Some(obj) => pdf.resolve_dict(obj)?,
        None => Dictionary::new(),
    };

    let xobjects = match resources.get(b"XObject") {
        Ok(obj) => pdf.resolve_dict(obj)?,
        Err(_) => Dictionary::new(),
    };
    resources.set("XObject", xobjects);
    Ok(resources)
}

fn flate(data: &[u8]) -> Result<Vec<u8>, PlacementError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PlacementError::Serialization(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| PlacementError::Serialization(e.to_string()))
}

fn stream(mut dict: Dictionary, data: Vec<u8>, compress: bool) -> Result<Stream, PlacementError> {
    if compress {
        dict.set("Filter", "FlateDecode");
        Ok(Stream::new(dict, flate(&data)?))
    } else {
        Ok(Stream::new(dict, data))
    }
}

/// Add the RGB image, and its soft mask when it has transparency
fn embed_image(
    doc: &mut Document,
    image: &DecodedImage,
    compress: bool,
) -> Result<ObjectId, PlacementError> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if let Some(alpha) = &image.alpha {
        let smask = stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha.clone(),
            compress,
        )?;
        dict.set("SMask", doc.add_object(smask));
    }

    let image_stream = stream(dict, image.rgb.clone(), compress)?;
    Ok(doc.add_object(image_stream))
}

/// First `SigN` name not already taken in the XObject dictionary
fn unused_name(xobjects: &Dictionary) -> String {
    (1..)
        .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
        .find(|name| xobjects.get(name.as_bytes()).is_err())
        .unwrap_or_else(|| XOBJECT_PREFIX.to_string())
}

/// Register the image under a fresh name and give the page its own Resources
fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    mut resources: Dictionary,
    image_id: ObjectId,
) -> Result<String, PlacementError> {
    let mut xobjects = match resources.remove(b"XObject") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };
    let name = unused_name(&xobjects);
    xobjects.set(name.clone(), image_id);
    resources.set("XObject", xobjects);

    page_dict_mut(doc, page_id)?.set("Resources", resources);
    Ok(name)
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, PlacementError> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PlacementError::MalformedDocument(format!("page object: {}", e)))
}

/// PDF number without exponent or trailing zeros
fn pdf_number(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn draw_operations(name: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<u8> {
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        pdf_number(width),
        pdf_number(height),
        pdf_number(x),
        pdf_number(y),
        name
    )
    .into_bytes()
}

/// Wrap the existing content in q/Q and append the drawing stream
fn append_contents(
    doc: &mut Document,
    page_id: ObjectId,
    draw: Vec<u8>,
    compress: bool,
) -> Result<(), PlacementError> {
    let current = page_dict_mut(doc, page_id)?.get(b"Contents").ok().cloned();
    let existing = match current {
        Some(Object::Array(items)) => items,
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(id)],
        },
        Some(_) => {
            return Err(PlacementError::MalformedDocument(
                "page Contents is neither a stream nor an array".to_string(),
            ))
        }
        None => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if existing.is_empty() {
        let draw_id = doc.add_object(stream(Dictionary::new(), draw, compress)?);
        contents.push(Object::Reference(draw_id));
    } else {
        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut closing = b"Q\n".to_vec();
        closing.extend_from_slice(&draw);
        let draw_id = doc.add_object(stream(Dictionary::new(), closing, compress)?);

        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(draw_id));
    }

    page_dict_mut(doc, page_id)?.set("Contents", contents);
    Ok(())
}
