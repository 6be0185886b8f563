use std::fmt;

mod isolate;

pub use isolate::IsolateError;

/// An RGB color as stored in a `w:color` element (`RRGGBB` hex).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(value: &str) -> Option<Self> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&value[0..2], 16).ok()?;
        let g = u8::from_str_radix(&value[2..4], 16).ok()?;
        let b = u8::from_str_radix(&value[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Character formatting carried by a single run.
///
/// The typed fields cover what this tool reads or writes; everything else
/// found in a `w:rPr` is kept verbatim in `extra` and written back unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProperties {
    /// Text color
    pub color: Option<RgbColor>,

    /// Typeface name (`w:rFonts` ascii/hAnsi)
    pub font: Option<String>,

    /// Font size in half-points (`w:sz`)
    pub size: Option<u32>,

    /// Bold flag
    pub bold: Option<bool>,

    /// Italic flag
    pub italic: Option<bool>,

    /// Underline flag (single underline on, explicit none off)
    pub underline: Option<bool>,

    /// Unrecognized `w:rPr` children, verbatim
    pub extra: Vec<String>,
}

impl RunProperties {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the text color, dropping any verbatim color element that would
    /// otherwise be written alongside it.
    pub fn set_color(&mut self, color: RgbColor) {
        self.color = Some(color);
        self.extra.retain(|raw| raw_element_name(raw) != "color");
    }

    /// Set the typeface name, dropping any verbatim `rFonts` element.
    pub fn set_font(&mut self, name: &str) {
        self.font = Some(name.to_string());
        self.extra.retain(|raw| raw_element_name(raw) != "rFonts");
    }

    /// Set the font size in half-points, dropping any verbatim `sz` element.
    /// A complex-script size (`szCs`) is left alone, as the original tooling
    /// did.
    pub fn set_size(&mut self, half_points: u32) {
        self.size = Some(half_points);
        self.extra.retain(|raw| raw_element_name(raw) != "sz");
    }
}

/// Element name of a verbatim XML fragment like `<w:color w:val="FF0000"/>`,
/// with the namespace prefix stripped.
fn raw_element_name(raw: &str) -> &str {
    let inner = raw.strip_prefix('<').unwrap_or(raw);
    let end = inner
        .find(|ch: char| ch.is_whitespace() || ch == '/' || ch == '>')
        .unwrap_or(inner.len());
    let name = &inner[..end];
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// A contiguous span of paragraph text sharing one set of character
/// formatting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub props: RunProperties,

    /// Verbatim non-text child elements (drawings and the like), written
    /// back after the text
    pub(crate) embedded: Vec<String>,

    /// Verbatim `<w:r ...>` open tag when the source carried attributes
    pub(crate) open_tag: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.props.color = Some(color);
        self
    }

    pub fn with_bold(mut self) -> Self {
        self.props.bold = Some(true);
        self
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Duplicate the run's formatting identity without its text. This is the
    /// copy the isolator inserts when it splits a run.
    pub fn clone_format(&self) -> Self {
        Self {
            text: String::new(),
            props: self.props.clone(),
            embedded: Vec::new(),
            open_tag: self.open_tag.clone(),
        }
    }
}

/// One inline child of a paragraph: a run, or anything else (bookmarks,
/// hyperlinks, proofing marks) carried through verbatim and invisible to
/// text offsets.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Run(Run),
    Raw(String),
}

/// An ordered sequence of inline children. Paragraph text is the
/// concatenation of the run texts, in order; `Raw` children contribute
/// nothing to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub children: Vec<Inline>,

    /// Verbatim `w:pPr` element, if any
    pub(crate) properties: Option<String>,

    /// Verbatim `<w:p ...>` open tag when the source carried attributes
    pub(crate) open_tag: Option<String>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runs(runs: Vec<Run>) -> Self {
        Self {
            children: runs.into_iter().map(Inline::Run).collect(),
            ..Self::default()
        }
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().filter_map(|child| match child {
            Inline::Run(run) => Some(run),
            Inline::Raw(_) => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.children.iter_mut().filter_map(|child| match child {
            Inline::Run(run) => Some(run),
            Inline::Raw(_) => None,
        })
    }

    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    pub fn text(&self) -> String {
        let mut text = String::new();
        for run in self.runs() {
            text.push_str(&run.text);
        }
        text
    }

    pub fn char_len(&self) -> usize {
        self.runs().map(Run::char_len).sum()
    }
}

/// One body-level block: a paragraph, or content the tool never touches
/// (tables, section properties) carried through verbatim.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Raw(String),
}

/// The in-memory document tree: the body-level block sequence of one
/// `word/document.xml`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            blocks: paragraphs.into_iter().map(Block::Paragraph).collect(),
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::Raw(_) => None,
        })
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::Raw(_) => None,
        })
    }
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}
