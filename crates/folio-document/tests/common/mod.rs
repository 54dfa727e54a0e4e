// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures: a scripted render engine with deterministic failures and
// an event log, plus lopdf helpers for building and inspecting PDFs.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use image::{Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat};

use folio_core::TranscodeSettings;
use folio_document::backend::{
    BackendBootstrap, BackendCandidate, CandidateKind, EngineError, EngineProvider, OpenOptions,
    PageHandle, RenderEngine, SourceDocument, TaskId, TextContent, TextFragment, Viewport,
};
use folio_document::{DocumentLoader, Transcoder};

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// One page of a scripted document.
#[derive(Debug, Clone)]
pub struct PageScript {
    pub size: (f32, f32),
    pub fragments: Vec<TextFragment>,
    pub render_fails: bool,
}

impl PageScript {
    pub fn sized(width: f32, height: f32) -> Self {
        Self {
            size: (width, height),
            fragments: Vec::new(),
            render_fails: false,
        }
    }

    pub fn with_text(mut self, fragments: &[(&str, bool)]) -> Self {
        self.fragments = fragments
            .iter()
            .map(|(text, eol)| TextFragment::new(*text, *eol))
            .collect();
        self
    }
}

/// Pages `1..=n` whose native width encodes the page number: `100 + 10·n`.
pub fn numbered_pages(n: u32) -> Vec<PageScript> {
    (1..=n)
        .map(|page| PageScript::sized(100.0 + 10.0 * page as f32, 200.0))
        .collect()
}

/// Engine that either rejects every open or serves documents from a table
/// keyed by the source bytes.
pub struct ScriptedEngine {
    pub label: String,
    pub rejects: bool,
    pub documents: HashMap<Vec<u8>, Vec<PageScript>>,
    pub log: EventLog,
}

impl RenderEngine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.label
    }

    fn open(
        &self,
        bytes: &[u8],
        _options: OpenOptions<'_>,
    ) -> Result<Box<dyn SourceDocument>, EngineError> {
        self.log.borrow_mut().push(format!("open:{}", self.label));
        if self.rejects {
            return Err(EngineError::Malformed(format!("{} cannot parse", self.label)));
        }
        let pages = self
            .documents
            .get(bytes)
            .cloned()
            .ok_or_else(|| EngineError::Malformed("unknown document".into()))?;
        Ok(Box::new(ScriptedDocument {
            pages,
            log: Rc::clone(&self.log),
        }))
    }

    fn release_task(&self, task: TaskId) -> Result<(), EngineError> {
        self.log.borrow_mut().push(format!("release:{}", task.0));
        Ok(())
    }
}

struct ScriptedDocument {
    pages: Vec<PageScript>,
    log: EventLog,
}

impl SourceDocument for ScriptedDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32) -> Result<Box<dyn PageHandle + '_>, EngineError> {
        let script = number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(EngineError::NoSuchPage(number))?;
        Ok(Box::new(ScriptedPage {
            number,
            script,
            log: &self.log,
        }))
    }

    fn close(self: Box<Self>) -> Result<(), EngineError> {
        self.log.borrow_mut().push("close".into());
        Ok(())
    }
}

struct ScriptedPage<'a> {
    number: u32,
    script: &'a PageScript,
    log: &'a EventLog,
}

impl PageHandle for ScriptedPage<'_> {
    fn number(&self) -> u32 {
        self.number
    }

    fn native_size(&self) -> (f32, f32) {
        self.script.size
    }

    fn render(&self, viewport: Viewport) -> Result<RgbaImage, EngineError> {
        self.log.borrow_mut().push(format!("render:{}", self.number));
        if self.script.render_fails {
            return Err(EngineError::RenderSurface("canvas allocation failed".into()));
        }
        Ok(RgbaImage::from_pixel(
            viewport.width,
            viewport.height,
            Rgba([255, 255, 255, 255]),
        ))
    }

    fn text_content(&self) -> Result<TextContent, EngineError> {
        Ok(TextContent {
            fragments: self.script.fragments.clone(),
        })
    }
}

/// Binds candidates to scripted engines by label and counts binds.
pub struct ScriptedProvider {
    engines: HashMap<String, Rc<ScriptedEngine>>,
    pub binds: EventLog,
}

impl EngineProvider for ScriptedProvider {
    fn bind(&self, candidate: &BackendCandidate) -> Result<Rc<dyn RenderEngine>, EngineError> {
        self.binds.borrow_mut().push(candidate.label.clone());
        let engine = self
            .engines
            .get(&candidate.label)
            .ok_or_else(|| EngineError::Unreachable(candidate.label.clone()))?;
        Ok(Rc::clone(engine) as Rc<dyn RenderEngine>)
    }
}

/// A scripted session: engines named by `labels`, the ones in `rejecting`
/// fail every open. Every working engine serves `documents`.
pub struct Harness {
    pub log: EventLog,
    pub binds: EventLog,
    pub bootstrap: Rc<BackendBootstrap>,
}

impl Harness {
    pub fn new(
        labels: &[&str],
        rejecting: &[&str],
        documents: &[(&[u8], Vec<PageScript>)],
    ) -> Self {
        let log: EventLog = Rc::default();
        let binds: EventLog = Rc::default();
        let table: HashMap<Vec<u8>, Vec<PageScript>> = documents
            .iter()
            .map(|(bytes, pages)| (bytes.to_vec(), pages.clone()))
            .collect();

        let engines = labels
            .iter()
            .map(|label| {
                let engine = ScriptedEngine {
                    label: label.to_string(),
                    rejects: rejecting.contains(label),
                    documents: table.clone(),
                    log: Rc::clone(&log),
                };
                (label.to_string(), Rc::new(engine))
            })
            .collect();

        let candidates = labels
            .iter()
            .map(|label| BackendCandidate::new(*label, CandidateKind::System))
            .collect();
        let provider = ScriptedProvider {
            engines,
            binds: Rc::clone(&binds),
        };

        Self {
            log,
            binds,
            bootstrap: Rc::new(BackendBootstrap::with_candidates(provider, candidates)),
        }
    }

    /// Single working engine serving `documents`.
    pub fn single(documents: &[(&[u8], Vec<PageScript>)]) -> Self {
        Self::new(&["engine"], &[], documents)
    }

    pub fn transcoder(&self, settings: TranscodeSettings) -> Transcoder {
        Transcoder::new(DocumentLoader::new(Rc::clone(&self.bootstrap)), settings)
    }

    pub fn events(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.log.borrow().iter().filter(|e| e.as_str() == event).count()
    }
}

// -- lopdf helpers ------------------------------------------------------------

/// A real PDF whose pages each show the given lines of text.
pub fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]));

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines.iter() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
            ));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
        ]);
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
        (
            "MediaBox",
            Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Page widths in points of a composed PDF, in page order.
pub fn page_widths(pdf: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let mut dict = doc.get_dictionary(page_id).unwrap();
            loop {
                if let Ok(media_box) = dict.get(b"MediaBox") {
                    let values = media_box.as_array().unwrap();
                    return match &values[2] {
                        Object::Integer(w) => *w as f32,
                        Object::Real(w) => *w as f32,
                        other => panic!("unexpected MediaBox entry {other:?}"),
                    };
                }
                let parent = dict.get(b"Parent").and_then(Object::as_reference).unwrap();
                dict = doc.get_dictionary(parent).unwrap();
            }
        })
        .collect()
}

/// A small PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
