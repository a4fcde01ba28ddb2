//! Atom feed parsing for arXiv API responses.
//!
//! The parser is event driven (`quick-xml`) and only looks at elements nested
//! directly under `<entry>`, so feed-level `<title>`/`<id>` never leak into a
//! document. Text is unescaped and whitespace-collapsed.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::domain::{Document, ValidationWarning};
use crate::error::{codes, AppError};
use crate::normalize::collapse_whitespace;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedParseResult {
    pub documents: Vec<Document>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

#[derive(Debug, Default)]
struct EntryDraft {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
}

fn field_for(path: &[Vec<u8>]) -> Option<Field> {
    let entry_at = path.iter().rposition(|name| name.as_slice() == b"entry")?;
    let rest: Vec<&[u8]> = path[entry_at + 1..].iter().map(|n| n.as_slice()).collect();
    match rest.as_slice() {
        [b"id"] => Some(Field::Id),
        [b"title"] => Some(Field::Title),
        [b"summary"] => Some(Field::Summary),
        [b"published"] => Some(Field::Published),
        [b"author", b"name"] => Some(Field::AuthorName),
        _ => None,
    }
}

fn push_text(draft: &mut EntryDraft, field: Field, text: &str) {
    let target = match field {
        Field::Id => &mut draft.id,
        Field::Title => &mut draft.title,
        Field::Summary => &mut draft.summary,
        Field::Published => &mut draft.published,
        Field::AuthorName => match draft.authors.last_mut() {
            Some(name) => name,
            None => return,
        },
    };
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn feed_error(message: &str, err: impl std::fmt::Display, reader: &Reader<&[u8]>) -> AppError {
    AppError::new(codes::SOURCE_UNAVAILABLE, message.to_string()).with_details(format!(
        "pos={}; err={}",
        reader.buffer_position(),
        err
    ))
}

/// Parse an arXiv Atom response into typed documents.
///
/// Entries without an `<id>` are dropped with a warning. The arXiv API reports
/// query errors as a single entry whose id points at `/api/errors`; that is
/// surfaced as `SOURCE_UNAVAILABLE` rather than as a paper.
pub fn parse_atom_feed(xml: &str) -> Result<FeedParseResult, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<EntryDraft> = None;
    let mut saw_feed = false;
    let mut entry_index = 0usize;
    let mut documents = Vec::new();
    let mut warnings = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| feed_error("Malformed Atom feed", e, &reader))?;
        match event {
            Event::Start(start) => {
                let name = start.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"feed" => saw_feed = true,
                    b"entry" => current = Some(EntryDraft::default()),
                    b"author" => {
                        if let Some(draft) = current.as_mut() {
                            draft.authors.push(String::new());
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Event::End(end) => {
                if end.local_name().as_ref() == b"entry" {
                    if let Some(draft) = current.take() {
                        finish_entry(draft, entry_index, &mut documents, &mut warnings)?;
                        entry_index += 1;
                    }
                }
                path.pop();
            }
            Event::Text(text) => {
                let (Some(draft), Some(field)) = (current.as_mut(), field_for(&path)) else {
                    continue;
                };
                let unescaped = text
                    .unescape()
                    .map_err(|e| feed_error("Invalid escape in Atom feed", e, &reader))?;
                push_text(draft, field, &unescaped);
            }
            Event::CData(data) => {
                let (Some(draft), Some(field)) = (current.as_mut(), field_for(&path)) else {
                    continue;
                };
                let raw = data.into_inner();
                push_text(draft, field, &String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_feed {
        return Err(AppError::new(
            codes::SOURCE_UNAVAILABLE,
            "Response is not an Atom feed",
        ));
    }

    Ok(FeedParseResult {
        documents,
        warnings,
    })
}

fn finish_entry(
    draft: EntryDraft,
    position: usize,
    documents: &mut Vec<Document>,
    warnings: &mut Vec<ValidationWarning>,
) -> Result<(), AppError> {
    let id = collapse_whitespace(&draft.id);
    if id.contains("/api/errors") {
        return Err(AppError::new(codes::SOURCE_UNAVAILABLE, "arXiv rejected the query")
            .with_details(collapse_whitespace(&draft.summary)));
    }
    if id.is_empty() {
        warnings.push(
            ValidationWarning::new("SOURCE_ENTRY_MISSING_ID", "Dropped feed entry without an id")
                .with_details(format!(
                    "position={position}; title={}",
                    collapse_whitespace(&draft.title)
                )),
        );
        return Ok(());
    }

    documents.push(Document {
        id,
        title: collapse_whitespace(&draft.title),
        authors: draft
            .authors
            .iter()
            .map(|a| collapse_whitespace(a))
            .filter(|a| !a.is_empty())
            .collect(),
        abstract_text: collapse_whitespace(&draft.summary),
        published: collapse_whitespace(&draft.published),
    });
    Ok(())
}
