use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::DocxError;
use crate::document::{Block, Document, Inline, Paragraph, RgbColor, Run, RunProperties};

/// The parts of `word/document.xml` surrounding the body content, kept
/// verbatim so the writer reproduces declarations, namespaces and anything
/// else this tool does not model.
pub(crate) struct DocumentShell {
    /// Everything before the `w:document` open tag
    pub prologue: String,

    /// The `<w:document ...>` open tag
    pub document_open: String,

    /// Content between the document and body open tags, if any
    pub pre_body: String,

    /// The `<w:body ...>` open tag
    pub body_open: String,
}

pub(crate) struct ParsedDocument {
    pub shell: DocumentShell,
    pub document: Document,
}

pub(crate) fn parse_document_xml(xml: &str) -> Result<ParsedDocument, DocxError> {
    let mut reader = Reader::from_str(xml);

    let mut prologue = String::new();
    let document_open;
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"document" => {
                document_open = slice_since(xml, &reader, pos);
                break;
            }
            Event::Eof => {
                return Err(DocxError::Structure("missing w:document element".to_string()));
            }
            _ => prologue.push_str(&slice_since(xml, &reader, pos)),
        }
    }

    let mut pre_body = String::new();
    let body_open;
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => {
                body_open = slice_since(xml, &reader, pos);
                break;
            }
            Event::End(_) | Event::Eof => {
                return Err(DocxError::Structure("w:document has no body".to_string()));
            }
            _ => pre_body.push_str(&slice_since(xml, &reader, pos)),
        }
    }

    let mut blocks = Vec::new();
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"p" => {
                let open_tag = slice_since(xml, &reader, pos);
                blocks.push(Block::Paragraph(parse_paragraph(&mut reader, xml, open_tag)?));
            }
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                blocks.push(Block::Paragraph(Paragraph {
                    open_tag: Some(slice_since(xml, &reader, pos)),
                    ..Paragraph::default()
                }));
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
                blocks.push(Block::Raw(slice_since(xml, &reader, pos)));
            }
            Event::End(e) if e.local_name().as_ref() == b"body" => break,
            Event::End(_) => {
                return Err(DocxError::Structure("unexpected end tag in w:body".to_string()));
            }
            Event::Eof => {
                return Err(DocxError::Structure("unterminated w:body".to_string()));
            }
            _ => blocks.push(Block::Raw(slice_since(xml, &reader, pos))),
        }
    }

    Ok(ParsedDocument {
        shell: DocumentShell {
            prologue,
            document_open,
            pre_body,
            body_open,
        },
        document: Document { blocks },
    })
}

fn parse_paragraph(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    open_tag: String,
) -> Result<Paragraph, DocxError> {
    let mut paragraph = Paragraph {
        open_tag: Some(open_tag),
        ..Paragraph::default()
    };

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => {
                    reader.read_to_end(e.name())?;
                    paragraph.properties = Some(slice_since(xml, reader, pos));
                }
                b"r" => {
                    let open = slice_since(xml, reader, pos);
                    paragraph
                        .children
                        .push(Inline::Run(parse_run(reader, xml, open)?));
                }
                _ => {
                    reader.read_to_end(e.name())?;
                    paragraph
                        .children
                        .push(Inline::Raw(slice_since(xml, reader, pos)));
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"pPr" => {
                paragraph.properties = Some(slice_since(xml, reader, pos));
            }
            Event::End(e) if e.local_name().as_ref() == b"p" => return Ok(paragraph),
            Event::End(_) => {
                return Err(DocxError::Structure("unexpected end tag in w:p".to_string()));
            }
            Event::Eof => return Err(DocxError::Structure("unterminated w:p".to_string())),
            _ => paragraph
                .children
                .push(Inline::Raw(slice_since(xml, reader, pos))),
        }
    }
}

fn parse_run(reader: &mut Reader<&[u8]>, xml: &str, open_tag: String) -> Result<Run, DocxError> {
    let mut run = Run {
        open_tag: Some(open_tag),
        ..Run::default()
    };

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPr" => run.props = parse_run_properties(reader, xml)?,
                b"t" => {
                    let text = reader.read_text(e.name())?;
                    run.text.push_str(&text);
                }
                b"tab" => {
                    reader.read_to_end(e.name())?;
                    run.text.push('\t');
                }
                b"br" | b"cr" => {
                    reader.read_to_end(e.name())?;
                    run.text.push('\n');
                }
                _ => {
                    reader.read_to_end(e.name())?;
                    run.embedded.push(slice_since(xml, reader, pos));
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"rPr" | b"t" => {}
                b"tab" => run.text.push('\t'),
                b"br" | b"cr" => run.text.push('\n'),
                _ => run.embedded.push(slice_since(xml, reader, pos)),
            },
            Event::End(e) if e.local_name().as_ref() == b"r" => return Ok(run),
            Event::End(_) => {
                return Err(DocxError::Structure("unexpected end tag in w:r".to_string()));
            }
            Event::Eof => return Err(DocxError::Structure("unterminated w:r".to_string())),
            // whitespace between run children is not text content
            _ => {}
        }
    }
}

fn parse_run_properties(
    reader: &mut Reader<&[u8]>,
    xml: &str,
) -> Result<RunProperties, DocxError> {
    let mut props = RunProperties::default();

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Empty(e) => {
                let raw = slice_since(xml, reader, pos);
                collect_property(&mut props, &e, raw)?;
            }
            Event::Start(e) => {
                // rPr children are empty elements in practice; anything with
                // content is carried verbatim
                reader.read_to_end(e.name())?;
                props.extra.push(slice_since(xml, reader, pos));
            }
            Event::End(e) if e.local_name().as_ref() == b"rPr" => return Ok(props),
            Event::End(_) => {
                return Err(DocxError::Structure("unexpected end tag in w:rPr".to_string()));
            }
            Event::Eof => return Err(DocxError::Structure("unterminated w:rPr".to_string())),
            _ => {}
        }
    }
}

/// Fold one `w:rPr` child into the typed fields, or keep it verbatim when
/// it carries anything the model does not represent (theme colors, per-script
/// fonts, exotic underlines).
fn collect_property(
    props: &mut RunProperties,
    e: &BytesStart<'_>,
    raw: String,
) -> Result<(), DocxError> {
    match e.local_name().as_ref() {
        b"color" => {
            let val = attr_value(e, b"val")?;
            match val.as_deref().and_then(RgbColor::parse_hex) {
                Some(color) if attr_count(e)? == 1 => props.color = Some(color),
                _ => props.extra.push(raw),
            }
        }
        b"rFonts" => match simple_font_name(e)? {
            Some(name) => props.font = Some(name),
            None => props.extra.push(raw),
        },
        b"sz" => {
            let val = attr_value(e, b"val")?;
            match val.as_deref().and_then(|v| v.parse::<u32>().ok()) {
                Some(size) if attr_count(e)? == 1 => props.size = Some(size),
                None | Some(_) => props.extra.push(raw),
            }
        }
        b"b" => match toggle_value(e)? {
            Some(on) => props.bold = Some(on),
            None => props.extra.push(raw),
        },
        b"i" => match toggle_value(e)? {
            Some(on) => props.italic = Some(on),
            None => props.extra.push(raw),
        },
        b"u" => match attr_value(e, b"val")?.as_deref() {
            Some("single") => props.underline = Some(true),
            Some("none") => props.underline = Some(false),
            _ => props.extra.push(raw),
        },
        _ => props.extra.push(raw),
    }
    Ok(())
}

/// `w:b` / `w:i` boolean semantics: the bare element means on, an explicit
/// `w:val` of 0/false means off.
fn toggle_value(e: &BytesStart<'_>) -> Result<Option<bool>, DocxError> {
    if attr_count(e)? == 0 {
        return Ok(Some(true));
    }
    Ok(match attr_value(e, b"val")?.as_deref() {
        Some("0") | Some("false") => Some(false),
        Some("1") | Some("true") => Some(true),
        _ => None,
    })
}

/// A `w:rFonts` is modeled only when it names a single typeface for the
/// ascii and hAnsi scripts and nothing else.
fn simple_font_name(e: &BytesStart<'_>) -> Result<Option<String>, DocxError> {
    let mut name: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.local_name().as_ref() {
            b"ascii" | b"hAnsi" => {
                let value = attr.unescape_value()?.into_owned();
                match &name {
                    Some(existing) if *existing != value => return Ok(None),
                    _ => name = Some(value),
                }
            }
            _ => return Ok(None),
        }
    }
    Ok(name)
}

fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, DocxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn attr_count(e: &BytesStart<'_>) -> Result<usize, DocxError> {
    let mut count = 0;
    for attr in e.attributes() {
        attr?;
        count += 1;
    }
    Ok(count)
}

/// The verbatim source text between `pos` and the reader's current position.
fn slice_since(xml: &str, reader: &Reader<&[u8]>, pos: usize) -> String {
    xml[pos..reader.buffer_position() as usize].to_string()
}
