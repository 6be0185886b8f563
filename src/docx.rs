use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::document::Document;

mod read;
mod write;

use read::DocumentShell;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("not a valid docx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("package has no word/document.xml part")]
    MissingDocumentPart,

    #[error("malformed document xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("malformed document xml: {0}")]
    Structure(String),
}

/// One entry of the source package. Everything except the main document part
/// is carried through byte-identical on save.
enum Part {
    Raw { name: String, bytes: Vec<u8> },
    Directory { name: String },
    DocumentXml,
}

/// A DOCX package opened from disk: the parsed document tree plus every
/// other package part, kept in archive order.
pub struct DocxFile {
    parts: Vec<Part>,
    shell: DocumentShell,
    pub document: Document,
}

impl DocxFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocxError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut document_xml: Option<String> = None;
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            if entry.is_dir() {
                parts.push(Part::Directory { name });
                continue;
            }
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            if name == DOCUMENT_PART {
                let xml = String::from_utf8(bytes).map_err(|_| {
                    DocxError::Structure("word/document.xml is not valid UTF-8".to_string())
                })?;
                document_xml = Some(xml);
                parts.push(Part::DocumentXml);
            } else {
                parts.push(Part::Raw { name, bytes });
            }
        }

        let xml = document_xml.ok_or(DocxError::MissingDocumentPart)?;
        let parsed = read::parse_document_xml(&xml)?;
        Ok(Self {
            parts,
            shell: parsed.shell,
            document: parsed.document,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocxError> {
        let file = File::create(path)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default();

        for part in &self.parts {
            match part {
                Part::Directory { name } => writer.add_directory(name.as_str(), options)?,
                Part::Raw { name, bytes } => {
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(bytes)?;
                }
                Part::DocumentXml => {
                    writer.start_file(DOCUMENT_PART, options)?;
                    let xml = write::serialize_document_xml(&self.shell, &self.document);
                    writer.write_all(xml.as_bytes())?;
                }
            }
        }

        writer.finish()?.flush()?;
        Ok(())
    }
}
