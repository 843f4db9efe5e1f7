//! Head-block injection into page documents.
//!
//! The render hook contract: the meta-tag block (and optional JSON-LD
//! block) is inserted immediately after the opening `<head>` tag, before
//! any other head content, exactly once per document.

use anyhow::{Result, bail};
use quick_xml::{Reader, Writer, events::Event};
use std::io::{Cursor, Write};

/// Create an XML reader suitable for HTML documents.
#[inline]
fn create_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

/// Insert `block` right after the first opening `<head>` tag.
///
/// The block is written verbatim (it is already escaped markup). Documents
/// without a `<head>` element pass through unchanged.
pub fn inject_head(html: &[u8], block: &str) -> Result<Vec<u8>> {
    let mut reader = create_reader(html);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(html.len() + block.len())));
    let mut injected = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if !injected && elem.name().as_ref() == b"head" => {
                writer.write_event(Event::Start(elem))?;
                writer.get_mut().write_all(b"\n")?;
                writer.get_mut().write_all(block.as_bytes())?;
                injected = true;
            }
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event)?,
            Err(e) => bail!(
                "HTML parse error at position {}: {:?}",
                reader.error_position(),
                e
            ),
        }
    }

    Ok(writer.into_inner().into_inner())
}
