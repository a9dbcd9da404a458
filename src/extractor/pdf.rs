//! PDF extraction.
//!
//! The bytes are downloaded through the host, parsed with lopdf and read
//! page by page from the content streams. Only the first [`MAX_PAGES`]
//! pages are parsed; the record's meta discloses how many that was.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use lopdf::content::Content;
use lopdf::{
    Dictionary, Document, Encoding, Object, ObjectId, Stream, StringFormat, decode_text_string,
};
use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::Selector;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::extractor::{
    errors::ExtractError,
    model::{ContentKind, ContentRecord, RecordMeta},
};
use crate::page::{Host, PageContext, Progress};

pub const MAX_PAGES: usize = 15;
/// Hand control back to the scheduler after this many pages.
const YIELD_EVERY: usize = 3;
/// Runs whose baselines differ by more than this start a new line.
const LINE_TOLERANCE: f64 = 2.0;
/// TJ adjustments wider than this (thousandths of an em) read as a space.
const WORD_GAP: f64 = 200.0;
/// Nested form XObjects deeper than this are not read.
const MAX_FORM_DEPTH: usize = 8;

const DRIVE_HOST: &str = "drive.google.com";

static DRIVE_FILE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/file/d/([^/]+)").unwrap());
static PDF_EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.pdf$").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_-]+").unwrap());
static PDF_EMBED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"embed[type="application/pdf"]"#).unwrap());

pub fn can_handle(ctx: &PageContext) -> bool {
    PDF_EXTENSION.is_match(ctx.path())
        || is_drive_viewer(ctx.url())
        || ctx.content_type().as_deref() == Some("application/pdf")
        || (!ctx.html().is_empty() && ctx.document().select(&PDF_EMBED).next().is_some())
}

fn is_drive_viewer(url: &Url) -> bool {
    url.host_str() == Some(DRIVE_HOST) && url.path().starts_with("/file/d/")
}

/// Where the PDF bytes actually live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSource {
    pub url: Url,
    pub drive: bool,
}

/// Drive viewer pages are rewritten to the file's direct-download URL.
pub fn resolve_source(url: &Url) -> Result<PdfSource, ExtractError> {
    if url.host_str() != Some(DRIVE_HOST) {
        return Ok(PdfSource {
            url: url.clone(),
            drive: false,
        });
    }

    let file_id = DRIVE_FILE_ID
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ExtractError::DriveFileId)?;

    let mut download = Url::parse("https://drive.google.com/uc").map_err(|_| ExtractError::DriveFileId)?;
    download
        .query_pairs_mut()
        .append_pair("export", "download")
        .append_pair("id", file_id);

    Ok(PdfSource {
        url: download,
        drive: true,
    })
}

#[instrument(skip_all, fields(url = %ctx.url()))]
pub async fn extract(
    ctx: &PageContext,
    host: &dyn Host,
    progress: Progress<'_>,
) -> Result<ContentRecord, ExtractError> {
    let source = resolve_source(ctx.url())?;

    progress.report("Downloading PDF…");
    let bytes = host.fetch_bytes(&source.url).await.map_err(|err| {
        warn!(error = %err, drive = source.drive, "pdf download failed");
        if source.drive && err.is_permission_denied() {
            ExtractError::DriveDownload(err)
        } else {
            ExtractError::Download(err)
        }
    })?;

    progress.report("Opening PDF…");
    let document = Document::load_mem(&bytes).map_err(|e| ExtractError::PdfParse(e.to_string()))?;
    let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
    let total_pages = page_ids.len();
    let parsed_pages = total_pages.min(MAX_PAGES);

    let mut pages = Vec::with_capacity(parsed_pages);
    for (index, page_id) in page_ids.into_iter().take(parsed_pages).enumerate() {
        let number = index + 1;
        progress.report(&format!("Parsing page {number} of {parsed_pages}…"));
        let runs = page_runs(&document, page_id).unwrap_or_else(|err| {
            warn!(page = number, error = %err, "unreadable page content");
            Vec::new()
        });
        pages.push(join_runs(&runs));

        if number % YIELD_EVERY == 0 {
            host.yield_now().await;
        }
    }

    let title = metadata_title(&document)
        .or_else(|| filename_title(ctx.url()))
        .or_else(|| Some(ctx.title().trim().to_string()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "PDF Document".to_string());

    info!(total_pages, parsed_pages, "pdf parsed");

    let text = assemble(&pages, total_pages);
    Ok(
        ContentRecord::new(ContentKind::Pdf, ctx, title, "PDF", text)?.with_meta(RecordMeta::Pdf {
            total_pages,
            parsed_pages,
        }),
    )
}

/// `--- Page N ---` sections, plus a note when pages were skipped.
pub fn assemble(pages: &[String], total_pages: usize) -> String {
    let mut text = pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("--- Page {} ---\n{}", i + 1, page))
        .collect::<Vec<_>>()
        .join("\n\n");

    if total_pages > pages.len() {
        text.push_str(&format!(
            "\n\n[Note: Only first {} of {} pages were extracted.]",
            pages.len(),
            total_pages
        ));
    }
    text
}

/// A string shown at one baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub y: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, y: f64) -> Self {
        Self {
            text: text.into(),
            y,
        }
    }
}

/// Concatenate runs in stream order, breaking the line whenever the
/// baseline moves by more than the tolerance.
pub fn join_runs(runs: &[TextRun]) -> String {
    let mut out = String::new();
    let mut last_y: Option<f64> = None;
    for run in runs {
        if let Some(y) = last_y
            && (run.y - y).abs() > LINE_TOLERANCE
        {
            out.push('\n');
        }
        out.push_str(&run.text);
        last_y = Some(run.y);
    }
    out
}

fn page_runs(document: &Document, page_id: ObjectId) -> Result<Vec<TextRun>, lopdf::Error> {
    let fonts = document.get_page_fonts(page_id)?;
    let (direct, inherited) = document.get_page_resources(page_id)?;
    let mut forms = BTreeMap::new();
    let scopes = direct
        .into_iter()
        .chain(inherited.iter().filter_map(|id| document.get_dictionary(*id).ok()));
    for resources in scopes {
        collect_forms(document, resources, &mut forms);
    }

    let content = Content::decode(&document.get_page_content(page_id)?)?;
    let scope = Scope::new(Some(document), fonts, forms);
    let mut walker = TextWalker::default();
    walker.walk(&content, &scope, 0);
    Ok(walker.runs)
}

/// Decoders for the fonts visible to one content stream, keyed by
/// resource name.
#[derive(Default)]
struct FontTable<'a> {
    encodings: BTreeMap<Vec<u8>, Encoding<'a>>,
}

impl<'a> FontTable<'a> {
    fn new(document: &'a Document, fonts: &BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let encodings = fonts
            .iter()
            .map(|(name, &font)| (name, font))
            .filter(|(_, font)| font.type_is(b"Font"))
            .filter_map(|(name, font)| match font.get_font_encoding(document) {
                Ok(encoding) => Some((name.clone(), encoding)),
                Err(err) => {
                    debug!(font = %String::from_utf8_lossy(name), error = %err, "no usable font encoding");
                    None
                }
            })
            .collect();
        Self { encodings }
    }

    fn decode(&self, font: Option<&[u8]>, bytes: &[u8]) -> String {
        font.and_then(|name| self.encodings.get(name))
            .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
            .map(|text| text.chars().filter(|c| !c.is_control()).collect())
            .unwrap_or_else(|| decode_pdf_text(bytes))
    }
}

/// Fonts and form XObjects visible to one content stream.
#[derive(Default)]
struct Scope<'a> {
    document: Option<&'a Document>,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    table: FontTable<'a>,
    forms: BTreeMap<Vec<u8>, &'a Stream>,
}

impl<'a> Scope<'a> {
    fn new(
        document: Option<&'a Document>,
        fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
        forms: BTreeMap<Vec<u8>, &'a Stream>,
    ) -> Self {
        let table = document
            .map(|document| FontTable::new(document, &fonts))
            .unwrap_or_default();
        Self {
            document,
            fonts,
            table,
            forms,
        }
    }

    /// The scope inside a form: its own resources layered over ours.
    fn enter(&self, document: &'a Document, form: &'a Stream) -> Scope<'a> {
        let mut fonts = self.fonts.clone();
        let mut forms = self.forms.clone();
        if let Ok(resources) = form
            .dict
            .get(b"Resources")
            .and_then(|obj| document.dereference(obj))
            .and_then(|(_, obj)| obj.as_dict())
        {
            fonts.extend(resource_fonts(document, resources));
            collect_forms(document, resources, &mut forms);
        }
        Scope::new(Some(document), fonts, forms)
    }
}

/// Entries of a resource sub-dictionary (`Font`, `XObject`) resolved to
/// their objects.
fn resource_entries<'a>(
    document: &'a Document,
    resources: &'a Dictionary,
    key: &[u8],
) -> Vec<(&'a Vec<u8>, &'a Object)> {
    let Ok((_, Object::Dictionary(dict))) = resources
        .get(key)
        .and_then(|obj| document.dereference(obj))
    else {
        return Vec::new();
    };
    dict.iter()
        .filter_map(|(name, obj)| document.dereference(obj).ok().map(|(_, obj)| (name, obj)))
        .collect()
}

fn resource_fonts<'a>(
    document: &'a Document,
    resources: &'a Dictionary,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    resource_entries(document, resources, b"Font")
        .into_iter()
        .filter_map(|(name, obj)| obj.as_dict().ok().map(|font| (name.clone(), font)))
        .collect()
}

fn collect_forms<'a>(
    document: &'a Document,
    resources: &'a Dictionary,
    forms: &mut BTreeMap<Vec<u8>, &'a Stream>,
) {
    for (name, obj) in resource_entries(document, resources, b"XObject") {
        if let Ok(stream) = obj.as_stream()
            && stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Form".as_slice())
        {
            forms.entry(name.clone()).or_insert(stream);
        }
    }
}

/// Text positioning state, tracking only the vertical component.
#[derive(Default)]
struct TextCursor {
    line_y: f64,
    leading: f64,
}

impl TextCursor {
    fn move_line(&mut self, ty: f64) {
        self.line_y += ty;
    }

    fn next_line(&mut self) {
        self.line_y -= self.leading;
    }
}

#[derive(Default)]
struct TextWalker {
    cursor: TextCursor,
    runs: Vec<TextRun>,
}

impl TextWalker {
    fn push(&mut self, text: String) {
        if !text.is_empty() {
            self.runs.push(TextRun {
                text,
                y: self.cursor.line_y,
            });
        }
    }

    fn walk(&mut self, content: &Content, scope: &Scope<'_>, depth: usize) {
        let mut font: Option<&[u8]> = None;
        let shown = |obj: &Object, font: Option<&[u8]>| {
            obj.as_str().ok().map(|bytes| scope.table.decode(font, bytes))
        };

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "BT" => self.cursor.line_y = 0.0,
                "Tf" => font = operands.first().and_then(|obj| obj.as_name().ok()),
                "Tm" => {
                    if let Some(f) = operands.get(5).and_then(number) {
                        self.cursor.line_y = f;
                    }
                }
                "Td" => {
                    if let Some(ty) = operands.get(1).and_then(number) {
                        self.cursor.move_line(ty);
                    }
                }
                "TD" => {
                    if let Some(ty) = operands.get(1).and_then(number) {
                        self.cursor.leading = -ty;
                        self.cursor.move_line(ty);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        self.cursor.leading = leading;
                    }
                }
                "T*" => self.cursor.next_line(),
                "Tj" => {
                    if let Some(text) = operands.first().and_then(|obj| shown(obj, font)) {
                        self.push(text);
                    }
                }
                "'" => {
                    self.cursor.next_line();
                    if let Some(text) = operands.first().and_then(|obj| shown(obj, font)) {
                        self.push(text);
                    }
                }
                "\"" => {
                    self.cursor.next_line();
                    if let Some(text) = operands.get(2).and_then(|obj| shown(obj, font)) {
                        self.push(text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let text = array_text(items, |obj| shown(obj, font));
                        self.push(text);
                    }
                }
                "Do" => self.walk_form(operands.first(), scope, depth),
                _ => {}
            }
        }
    }

    fn walk_form(&mut self, name: Option<&Object>, scope: &Scope<'_>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            return;
        }
        let (Some(document), Some(form)) = (
            scope.document,
            name.and_then(|obj| obj.as_name().ok())
                .and_then(|name| scope.forms.get(name).copied()),
        ) else {
            return;
        };
        let content = match form.get_plain_content().and_then(|data| Content::decode(&data)) {
            Ok(content) => content,
            Err(err) => {
                debug!(error = %err, "unreadable form xobject");
                return;
            }
        };

        let inner = scope.enter(document, form);
        let saved = std::mem::take(&mut self.cursor);
        self.walk(&content, &inner, depth + 1);
        self.cursor = saved;
    }
}

/// Walk the content stream's text operators and collect the shown strings
/// with their baselines. Without a document there are no fonts to consult,
/// so strings are read as PDF text strings.
pub fn content_runs(content: &Content) -> Vec<TextRun> {
    let mut walker = TextWalker::default();
    walker.walk(content, &Scope::default(), 0);
    walker.runs
}

fn array_text(items: &[Object], shown: impl Fn(&Object) -> Option<String>) -> String {
    let mut text = String::new();
    for item in items {
        if let Some(s) = shown(item) {
            text.push_str(&s);
        } else if let Some(adjust) = number(item)
            && adjust < -WORD_GAP
            && !text.ends_with(' ')
        {
            text.push(' ');
        }
    }
    text
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Fallback for strings whose font has no usable encoding: a BOM selects
/// UTF-16BE, anything else is PDFDocEncoding. Control characters from
/// undecodable multi-byte codes are dropped.
fn decode_pdf_text(bytes: &[u8]) -> String {
    let text = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        decode_text_string(&Object::String(bytes.to_vec(), StringFormat::Literal)).unwrap_or_default()
    };
    text.chars().filter(|c| !c.is_control()).collect()
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn metadata_title(document: &Document) -> Option<String> {
    let title = info_dictionary(document)?
        .get_deref(b"Title", document)
        .and_then(decode_text_string)
        .ok()?;
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// "Annual_Report-2024.pdf" becomes "Annual Report 2024".
pub fn filename_title(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let stem = PDF_EXTENSION.replace(segment, "");
    let decoded = percent_decode_str(&stem).decode_utf8_lossy();
    let title = SEPARATORS.replace_all(&decoded, " ").trim().to_string();
    (!title.is_empty()).then_some(title)
}
