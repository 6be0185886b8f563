use quick_xml::escape::escape;

use super::read::DocumentShell;
use crate::document::{Block, Document, Inline, Paragraph, Run, RunProperties};

pub(crate) fn serialize_document_xml(shell: &DocumentShell, document: &Document) -> String {
    let mut out = String::new();
    out.push_str(&shell.prologue);
    out.push_str(&shell.document_open);
    out.push_str(&shell.pre_body);
    out.push_str(&shell.body_open);
    for block in &document.blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(&mut out, paragraph),
            Block::Raw(raw) => out.push_str(raw),
        }
    }
    out.push_str("</w:body></w:document>");
    out
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    let open = paragraph.open_tag.as_deref().unwrap_or("<w:p>");
    if let Some(self_closing) = open.strip_suffix("/>") {
        if paragraph.children.is_empty() && paragraph.properties.is_none() {
            out.push_str(open);
            return;
        }
        out.push_str(self_closing);
        out.push('>');
    } else {
        out.push_str(open);
    }

    if let Some(properties) = &paragraph.properties {
        out.push_str(properties);
    }
    for child in &paragraph.children {
        match child {
            Inline::Run(run) => write_run(out, run),
            Inline::Raw(raw) => out.push_str(raw),
        }
    }
    out.push_str("</w:p>");
}

fn write_run(out: &mut String, run: &Run) {
    out.push_str(run.open_tag.as_deref().unwrap_or("<w:r>"));
    write_run_properties(out, &run.props);
    write_run_text(out, &run.text);
    for raw in &run.embedded {
        out.push_str(raw);
    }
    out.push_str("</w:r>");
}

fn write_run_properties(out: &mut String, props: &RunProperties) {
    if props.is_empty() {
        return;
    }
    out.push_str("<w:rPr>");
    if let Some(font) = &props.font {
        let name = escape(font.as_str());
        out.push_str(&format!("<w:rFonts w:ascii=\"{name}\" w:hAnsi=\"{name}\"/>"));
    }
    if let Some(bold) = props.bold {
        out.push_str(if bold { "<w:b/>" } else { "<w:b w:val=\"0\"/>" });
    }
    if let Some(italic) = props.italic {
        out.push_str(if italic { "<w:i/>" } else { "<w:i w:val=\"0\"/>" });
    }
    if let Some(color) = props.color {
        out.push_str(&format!("<w:color w:val=\"{color}\"/>"));
    }
    if let Some(size) = props.size {
        out.push_str(&format!("<w:sz w:val=\"{size}\"/>"));
    }
    if let Some(underline) = props.underline {
        out.push_str(if underline {
            "<w:u w:val=\"single\"/>"
        } else {
            "<w:u w:val=\"none\"/>"
        });
    }
    for raw in &props.extra {
        out.push_str(raw);
    }
    out.push_str("</w:rPr>");
}

/// Emit run text, translating `\t` and `\n` back into `w:tab` and `w:br`
/// elements the way the reader folded them in.
fn write_run_text(out: &mut String, text: &str) {
    let mut chunk = String::new();
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush_text_chunk(out, &chunk);
                chunk.clear();
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush_text_chunk(out, &chunk);
                chunk.clear();
                out.push_str("<w:br/>");
            }
            _ => chunk.push(ch),
        }
    }
    flush_text_chunk(out, &chunk);
}

fn flush_text_chunk(out: &mut String, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    let edge_whitespace = chunk.chars().next().is_some_and(char::is_whitespace)
        || chunk.chars().last().is_some_and(char::is_whitespace);
    if edge_whitespace {
        out.push_str("<w:t xml:space=\"preserve\">");
    } else {
        out.push_str("<w:t>");
    }
    out.push_str(&escape(chunk));
    out.push_str("</w:t>");
}
