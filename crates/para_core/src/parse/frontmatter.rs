//! Frontmatter split/parse and document rendering.
//!
//! # Responsibility
//! - Split raw document text into a metadata block and a body.
//! - Decide, per caller-chosen mode, whether malformed metadata is fatal.
//! - Render `(metadata, body)` back into on-disk text.
//!
//! # Invariants
//! - No opening delimiter: metadata is empty, body is the whole text, no
//!   error in either mode.
//! - Strict mode never guesses: malformed or unterminated blocks are errors.
//! - Graceful mode never fails: it returns empty metadata, a best-effort body
//!   and the error as a warning.
//! - `parse(render(m, b))` yields `m` and a byte-identical `b`.

use crate::model::metadata::Metadata;
use serde::Serialize;
use serde_yaml::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Line that opens and closes a metadata block.
pub const FRONTMATTER_DELIMITER: &str = "---";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// How malformed metadata is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Malformed metadata is an error for the document.
    Strict,
    /// Malformed metadata is downgraded to a warning.
    #[default]
    Graceful,
}

/// Frontmatter parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Opening delimiter found but no closing delimiter line.
    Unterminated { opening_line: usize },
    /// Metadata block is not valid YAML.
    Malformed {
        message: String,
        /// 1-based document line, when the YAML parser reports one.
        line: Option<usize>,
    },
    /// Metadata block parsed, but to something other than a mapping.
    NotAMapping { found: &'static str },
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unterminated { opening_line } => write!(
                f,
                "metadata block opened on line {opening_line} is never closed"
            ),
            Self::Malformed {
                message,
                line: Some(line),
            } => write!(f, "malformed metadata near line {line}: {message}"),
            Self::Malformed {
                message,
                line: None,
            } => write!(f, "malformed metadata: {message}"),
            Self::NotAMapping { found } => {
                write!(f, "metadata block must be a key/value mapping, found {found}")
            }
        }
    }
}

impl Error for FrontmatterError {}

/// Result of splitting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub metadata: Metadata,
    pub body: String,
    /// 1-based document line on which `body` starts.
    pub body_start_line: usize,
    /// Whether the document opened a metadata block at all.
    pub has_block: bool,
    /// Non-fatal parse problem (graceful mode only).
    pub warning: Option<FrontmatterError>,
}

impl Frontmatter {
    fn without_block(text: &str) -> Self {
        Self {
            metadata: Metadata::new(),
            body: text.to_string(),
            body_start_line: 1,
            has_block: false,
            warning: None,
        }
    }
}

/// Splits `text` into metadata and body.
///
/// # Errors
/// - Strict mode only: `Unterminated`, `Malformed` or `NotAMapping`.
pub fn parse_frontmatter(text: &str, mode: ParseMode) -> Result<Frontmatter, FrontmatterError> {
    let content = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut lines = LineCursor::new(content);

    let Some(opening) = lines.next() else {
        return Ok(Frontmatter::without_block(text));
    };
    if !is_delimiter(opening.text) {
        return Ok(Frontmatter::without_block(text));
    }

    let closing = lines.find(|line| is_delimiter(line.text));
    let Some(closing) = closing else {
        let err = FrontmatterError::Unterminated { opening_line: 1 };
        return match mode {
            ParseMode::Strict => Err(err),
            ParseMode::Graceful => Ok(unterminated_fallback(content, opening.end, err)),
        };
    };

    let yaml = &content[opening.end..closing.start];
    let body = &content[closing.end..];
    let body_start_line = closing.index + 2;

    match parse_metadata_block(yaml) {
        Ok(metadata) => Ok(Frontmatter {
            metadata,
            body: body.to_string(),
            body_start_line,
            has_block: true,
            warning: None,
        }),
        Err(err) => match mode {
            ParseMode::Strict => Err(err),
            ParseMode::Graceful => Ok(Frontmatter {
                metadata: Metadata::new(),
                body: body.to_string(),
                body_start_line,
                has_block: true,
                warning: Some(err),
            }),
        },
    }
}

/// Renders metadata and body into document text.
///
/// Empty metadata renders the body alone, without delimiters.
///
/// # Errors
/// - Returns the YAML serializer error when metadata cannot be encoded.
pub fn render_document(metadata: &Metadata, body: &str) -> Result<String, serde_yaml::Error> {
    if metadata.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(&Value::Mapping(metadata.to_mapping()))?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(FRONTMATTER_DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FRONTMATTER_DELIMITER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

fn parse_metadata_block(yaml: &str) -> Result<Metadata, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let value: Value = serde_yaml::from_str(yaml).map_err(|err| FrontmatterError::Malformed {
        // The block starts on document line 2.
        line: err.location().map(|location| location.line() + 1),
        message: err.to_string(),
    })?;
    match value {
        Value::Null => Ok(Metadata::new()),
        Value::Mapping(mapping) => Ok(Metadata::from_mapping(mapping)),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => Ok(Metadata::from_mapping(mapping)),
            other => Err(FrontmatterError::NotAMapping {
                found: yaml_kind(&other),
            }),
        },
        other => Err(FrontmatterError::NotAMapping {
            found: yaml_kind(&other),
        }),
    }
}

fn unterminated_fallback(content: &str, after_opening: usize, err: FrontmatterError) -> Frontmatter {
    let rest = &content[after_opening..];
    let (body, body_start_line) = if rest.trim().is_empty() {
        (content, 1)
    } else {
        (rest, 2)
    };
    Frontmatter {
        metadata: Metadata::new(),
        body: body.to_string(),
        body_start_line,
        has_block: true,
        warning: Some(err),
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == FRONTMATTER_DELIMITER
}

struct Line<'a> {
    index: usize,
    start: usize,
    end: usize,
    text: &'a str,
}

/// Iterates lines with byte offsets; `end` includes the line terminator.
struct LineCursor<'a> {
    content: &'a str,
    offset: usize,
    index: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            offset: 0,
            index: 0,
        }
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.content.len() {
            return None;
        }
        let rest = &self.content[self.offset..];
        let (text, consumed) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        let line = Line {
            index: self.index,
            start: self.offset,
            end: self.offset + consumed,
            text,
        };
        self.offset += consumed;
        self.index += 1;
        Some(line)
    }
}
