//! PDF parsing and page access using lopdf

use crate::error::PlacementError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::PageGeometry;

/// Page tree nesting we are willing to walk before assuming a cycle
const MAX_TREE_DEPTH: usize = 64;

/// Page size plus the MediaBox lower-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub origin_x: f64,
    pub origin_y: f64,
    pub geometry: PageGeometry,
}

/// Wrapper around lopdf::Document scoped to one signing operation
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Load a PDF from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlacementError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| PlacementError::MalformedDocument(e.to_string()))?;
        Ok(Self { doc })
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get page object ID for a zero-based page index
    pub fn page_id(&self, page_index: u32) -> Result<ObjectId, PlacementError> {
        let pages = self.doc.get_pages();
        // lopdf numbers pages from 1
        page_index
            .checked_add(1)
            .and_then(|number| pages.get(&number).copied())
            .ok_or(PlacementError::PageIndexOutOfRange {
                index: page_index,
                page_count: pages.len() as u32,
            })
    }

    /// MediaBox of a page, inherited from the page tree when the page has none
    pub fn page_box(&self, page_index: u32) -> Result<PageBox, PlacementError> {
        let page_id = self.page_id(page_index)?;

        let media_box = match self.inherited(page_id, b"MediaBox")? {
            Some(obj) => self.parse_rect(obj)?,
            None => {
                tracing::warn!(page_index, "page has no MediaBox, assuming US Letter");
                [0.0, 0.0, 612.0, 792.0]
            }
        };

        let [x1, y1, x2, y2] = media_box;
        Ok(PageBox {
            origin_x: x1.min(x2),
            origin_y: y1.min(y2),
            geometry: PageGeometry::new((x2 - x1).abs(), (y2 - y1).abs()),
        })
    }

    /// Look up an inheritable page attribute, walking Parent links
    pub fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>, PlacementError> {
        let mut current = Some(page_id);
        let mut depth = 0;

        while let Some(id) = current {
            if depth > MAX_TREE_DEPTH {
                return Err(PlacementError::MalformedDocument(
                    "page tree is too deep or cyclic".to_string(),
                ));
            }
            let dict = self.dict(id)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value));
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }

        Ok(None)
    }

    /// Fetch an object that must be a dictionary
    pub fn dict(&self, id: ObjectId) -> Result<&Dictionary, PlacementError> {
        self.doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| PlacementError::MalformedDocument(format!("object {:?}: {}", id, e)))
    }

    /// Resolve a direct dictionary or a reference to one into an owned copy
    pub fn resolve_dict(&self, obj: &Object) -> Result<Dictionary, PlacementError> {
        match obj {
            Object::Dictionary(dict) => Ok(dict.clone()),
            Object::Reference(id) => self.dict(*id).cloned(),
            _ => Err(PlacementError::MalformedDocument(
                "expected a dictionary".to_string(),
            )),
        }
    }

    /// Parse a PDF rectangle array as [x1, y1, x2, y2]
    fn parse_rect(&self, obj: &Object) -> Result<[f64; 4], PlacementError> {
        let arr = match obj {
            Object::Array(a) => a,
            Object::Reference(id) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_array)
                .map_err(|_| {
                    PlacementError::MalformedDocument("MediaBox reference is not an array".to_string())
                })?,
            _ => {
                return Err(PlacementError::MalformedDocument(
                    "MediaBox is not an array".to_string(),
                ))
            }
        };

        if arr.len() != 4 {
            return Err(PlacementError::MalformedDocument(format!(
                "MediaBox has {} elements, expected 4",
                arr.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (i, obj) in arr.iter().enumerate() {
            values[i] = self.extract_number(obj)?;
        }
        Ok(values)
    }

    /// Extract a number from a PDF object
    fn extract_number(&self, obj: &Object) -> Result<f64, PlacementError> {
        match obj {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r as f64),
            Object::Reference(id) => {
                let resolved = self
                    .doc
                    .get_object(*id)
                    .map_err(|e| PlacementError::MalformedDocument(e.to_string()))?;
                self.extract_number(resolved)
            }
            _ => Err(PlacementError::MalformedDocument(
                "Expected number in rectangle".to_string(),
            )),
        }
    }

    /// Get mutable access to the internal document
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Serialize the document to bytes
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, PlacementError> {
        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| PlacementError::Serialization(e.to_string()))?;
        Ok(buffer)
    }
}
