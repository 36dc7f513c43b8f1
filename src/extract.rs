// File-to-text extraction for uploaded documents (.pdf, .docx, plain text)
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Extensions picked up when a directory is given as input.
pub const SUPPORTED_EXTS: &[&str] = &["txt", "md", "pdf", "docx"];

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_path(p: &Path) -> Self {
        let ext = p
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

fn read_text_file(p: &Path) -> Result<String> {
    let mut s = String::new();
    let mut f = File::open(p)?;
    f.read_to_string(&mut s)
        .with_context(|| format!("{} is not valid UTF-8 text", p.display()))?;
    Ok(s)
}

// pdf-extract panics on some malformed documents instead of returning an error
fn extract_pdf_text(p: &Path) -> Result<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(p))) {
        Ok(result) => result.map_err(|e| anyhow!("PDF extraction failed: {}", e)),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "extractor panicked".to_string());
            Err(anyhow!("PDF extraction failed: {}", reason))
        }
    }
}

/// Pull the textual content out of `p`, choosing the extractor by extension.
pub fn read_file_content(p: &Path) -> Result<String> {
    let kind = DocumentKind::from_path(p);
    log::debug!("extracting {} as {:?}", p.display(), kind);
    match kind {
        DocumentKind::Pdf => extract_pdf_text(p),
        DocumentKind::Docx => {
            let f = File::open(p)?;
            extract_docx_text(BufReader::new(f))
        }
        DocumentKind::PlainText => read_text_file(p),
    }
}

/// Paragraph texts of a .docx body joined by single spaces.
///
/// Paragraphs without any text runs still take a slot (as an empty string).
pub fn extract_docx_text<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| anyhow!("DOCX is not a valid zip archive: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| anyhow!("DOCX has no {}: {}", DOCX_BODY, e))?
        .read_to_string(&mut xml)?;

    let paragraphs = docx_paragraphs(&xml)?;
    Ok(paragraphs.join(" "))
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

// Text boxes nest whole paragraphs inside a run of the enclosing one; their
// text is kept in place inside the outer paragraph.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => open.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"p" if open.is_empty() => paragraphs.push(String::new()),
                b"tab" => {
                    if let Some(text) = open.last_mut() {
                        text.push('\t');
                    }
                }
                b"br" | b"cr" => {
                    if let Some(text) = open.last_mut() {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let chunk = e
                    .unescape()
                    .map_err(|err| anyhow!("bad text in {}: {}", DOCX_BODY, err))?;
                if let Some(text) = open.last_mut() {
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    if let Some(inner) = open.pop() {
                        match open.last_mut() {
                            Some(outer) if !inner.is_empty() => {
                                outer.push(' ');
                                outer.push_str(&inner);
                                outer.push(' ');
                            }
                            Some(_) => {}
                            None => paragraphs.push(inner),
                        }
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("error parsing {}: {}", DOCX_BODY, e)),
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Expand the command line inputs into the ordered list of files to process.
///
/// Files are kept as given, whatever their extension. Directories are walked
/// for supported documents, sorted by path.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for p in paths {
        if !p.is_dir() {
            files.push(p.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(p)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|ext| SUPPORTED_EXTS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        found.sort();
        log::debug!("found {} documents under {}", found.len(), p.display());
        files.extend(found);
    }
    files
}
