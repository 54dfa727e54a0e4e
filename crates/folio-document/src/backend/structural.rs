// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structural engine: a pure-Rust fallback built on `lopdf`.
//
// It cannot rasterize, but it can count pages, report native page sizes and
// pull text runs straight out of content streams. This keeps page selection
// and PDF-to-text working when no renderer library can be loaded.

use image::RgbaImage;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, instrument};

use super::engine::{
    EngineError, OpenOptions, PageHandle, RenderEngine, SourceDocument, TextContent,
    TextFragment, Viewport,
};

/// US Letter in points, used when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Max page-tree depth followed when looking up inherited attributes.
const MAX_INHERIT_DEPTH: usize = 32;

/// TJ adjustments below this (in thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// The lopdf-backed fallback engine.
#[derive(Debug, Default)]
pub struct StructuralEngine;

impl StructuralEngine {
    pub fn new() -> Self {
        Self
    }
}

impl RenderEngine for StructuralEngine {
    fn name(&self) -> &str {
        "structural"
    }

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn open(
        &self,
        bytes: &[u8],
        options: OpenOptions<'_>,
    ) -> Result<Box<dyn SourceDocument>, EngineError> {
        let mut document = Document::load_mem(bytes)
            .map_err(|err| EngineError::Malformed(format!("lopdf could not parse: {err}")))?;

        if document.is_encrypted() {
            let password = options.password.ok_or_else(|| {
                EngineError::Unsupported("document is password-protected".into())
            })?;
            document.decrypt(password).map_err(|err| {
                EngineError::Unsupported(format!("could not decrypt document: {err}"))
            })?;
        }

        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(EngineError::Malformed("document has no pages".into()));
        }

        debug!(pages = pages.len(), "structural document opened");
        Ok(Box::new(StructuralDocument { document, pages }))
    }
}

struct StructuralDocument {
    document: Document,
    /// Page object ids in page order.
    pages: Vec<ObjectId>,
}

impl SourceDocument for StructuralDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>, EngineError> {
        let id = number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .copied()
            .ok_or(EngineError::NoSuchPage(number))?;
        Ok(Box::new(StructuralPage {
            document: &self.document,
            id,
            number,
        }))
    }

    fn close(self: Box<Self>) -> Result<(), EngineError> {
        Ok(())
    }
}

struct StructuralPage<'a> {
    document: &'a Document,
    id: ObjectId,
    number: u32,
}

impl PageHandle for StructuralPage<'_> {
    fn number(&self) -> u32 {
        self.number
    }

    fn native_size(&self) -> (f32, f32) {
        let (w, h) = inherited(self.document, self.id, b"MediaBox")
            .and_then(|obj| box_size(self.document, obj))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let rotate = inherited(self.document, self.id, b"Rotate")
            .and_then(number)
            .unwrap_or(0.0) as i64;
        if rotate.rem_euclid(180) == 90 { (h, w) } else { (w, h) }
    }

    fn render(&self, _viewport: Viewport) -> Result<RgbaImage, EngineError> {
        Err(EngineError::RenderSurface(
            "structural backend cannot rasterize pages".into(),
        ))
    }

    fn text_content(&self) -> Result<TextContent, EngineError> {
        let raw = self
            .document
            .get_page_content(self.id)
            .map_err(|err| EngineError::Other(format!("page {}: {err}", self.number)))?;
        let content = Content::decode(&raw)
            .map_err(|err| EngineError::Malformed(format!("page {}: {err}", self.number)))?;

        let mut fragments: Vec<TextFragment> = Vec::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "Tj" => push_text(&mut fragments, op.operands.first()),
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        let mut run = String::new();
                        for item in items {
                            match item {
                                Object::String(bytes, _) => run.push_str(&decode_pdf_string(bytes)),
                                other => {
                                    if number(other).is_some_and(|adj| adj < TJ_SPACE_THRESHOLD) {
                                        run.push(' ');
                                    }
                                }
                            }
                        }
                        fragments.push(TextFragment::new(run, false));
                    }
                }
                "'" | "\"" => {
                    mark_end_of_line(&mut fragments);
                    push_text(&mut fragments, op.operands.last());
                }
                "T*" | "ET" => mark_end_of_line(&mut fragments),
                "Td" | "TD" => {
                    let ty = op.operands.get(1).and_then(number).unwrap_or(0.0);
                    if ty != 0.0 {
                        mark_end_of_line(&mut fragments);
                    }
                }
                "Tm" => mark_end_of_line(&mut fragments),
                _ => {}
            }
        }

        Ok(TextContent { fragments })
    }
}

fn push_text(fragments: &mut Vec<TextFragment>, operand: Option<&Object>) {
    if let Some(Object::String(bytes, _)) = operand {
        fragments.push(TextFragment::new(decode_pdf_string(bytes), false));
    }
}

fn mark_end_of_line(fragments: &mut [TextFragment]) {
    if let Some(last) = fragments.last_mut() {
        last.end_of_line = true;
    }
}

/// Decode a PDF string: UTF-16BE when it carries a byte-order mark,
/// otherwise one byte per character.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Look up a page attribute, walking up `/Parent` for inherited values.
fn inherited<'a>(document: &'a Document, page: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = document.get_dictionary(page).ok();
    for _ in 0..MAX_INHERIT_DEPTH {
        let dict = current?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(document, value));
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()
            .and_then(|parent| document.get_dictionary(parent).ok());
    }
    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Width and height of a `[llx lly urx ury]` rectangle.
fn box_size(document: &Document, object: &Object) -> Option<(f32, f32)> {
    let values: Vec<f32> = match object {
        Object::Array(items) => items
            .iter()
            .filter_map(|item| number(resolve(document, item)))
            .collect(),
        _ => return None,
    };
    if values.len() != 4 {
        return None;
    }
    let width = (values[2] - values[0]).abs();
    let height = (values[3] - values[1]).abs();
    if width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}
