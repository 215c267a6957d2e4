//! Header model and parser.

use std::fmt;
use std::io::{BufRead, Read};

use serde::Serialize;
use tracing::{debug, trace};

use crate::{PlyError, ScalarType};

/// PLY data section encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl Encoding {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "ascii" => Some(Encoding::Ascii),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            _ => None,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Ascii => write!(f, "ascii"),
            Encoding::BinaryBigEndian => write!(f, "binary_big_endian"),
            Encoding::BinaryLittleEndian => write!(f, "binary_little_endian"),
        }
    }
}

/// PLY property definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropertySpec {
    /// A single value
    Scalar { name: String, data_type: ScalarType },
    /// A count of type `count_type` followed by that many `data_type` values
    List {
        name: String,
        count_type: ScalarType,
        data_type: ScalarType,
    },
}

impl PropertySpec {
    pub fn name(&self) -> &str {
        match self {
            PropertySpec::Scalar { name, .. } | PropertySpec::List { name, .. } => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertySpec::List { .. })
    }
}

/// How records of one element kind are laid out in a binary data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordLayout {
    /// Scalars only; every record has the same byte size.
    FixedWidth { record_size: usize },
    /// Exactly one property, and it is a list (the usual face element).
    SingleList,
    /// Any other mix; decoded field by field.
    Mixed,
}

impl RecordLayout {
    fn of(properties: &[PropertySpec]) -> Self {
        match properties {
            [PropertySpec::List { .. }] => RecordLayout::SingleList,
            props if props.iter().any(PropertySpec::is_list) => RecordLayout::Mixed,
            props => RecordLayout::FixedWidth {
                record_size: props
                    .iter()
                    .map(|p| match p {
                        PropertySpec::Scalar { data_type, .. } => data_type.size_bytes(),
                        PropertySpec::List { .. } => 0,
                    })
                    .sum(),
            },
        }
    }
}

/// PLY element definition (e.g., vertex, face)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSpec {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertySpec>,
    layout: RecordLayout,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>, count: usize, properties: Vec<PropertySpec>) -> Self {
        let layout = RecordLayout::of(&properties);
        Self {
            name: name.into(),
            count,
            properties,
            layout,
        }
    }

    pub fn layout(&self) -> RecordLayout {
        self.layout
    }
}

/// Everything the header declares, plus where the data section starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub encoding: Encoding,
    pub version: String,
    pub comments: Vec<String>,
    pub elements: Vec<ElementSpec>,
    /// Byte offset of the first data byte, just past the `end_header` line.
    pub data_offset: u64,
}

/// An element whose property lines are still being read.
struct OpenElement {
    name: String,
    count: usize,
    properties: Vec<PropertySpec>,
    line: usize,
}

impl OpenElement {
    fn close(self) -> Result<ElementSpec, PlyError> {
        if self.properties.is_empty() {
            return Err(PlyError::header(
                self.line,
                format!("element {} declares no properties", self.name),
            ));
        }
        Ok(ElementSpec::new(self.name, self.count, self.properties))
    }
}

impl Schema {
    /// Parses a PLY header from a reader positioned at the start of the file.
    ///
    /// Leaves the reader positioned at the first data byte. Fails with
    /// [`PlyError::FormatMismatch`] if the magic or format line is wrong, which
    /// callers should treat as "not a PLY file" rather than as a broken one.
    pub fn parse<R: BufRead>(mut reader: R) -> Result<Self, PlyError> {
        let mut buf = Vec::new();
        let mut bytes_read = 0u64;

        // Magic and format lines. Anything off here means "not ours".
        bytes_read += read_preamble_line(&mut reader, &mut buf)? as u64;
        let magic = std::str::from_utf8(&buf).unwrap_or_default();
        if magic.trim_end() != "ply" {
            return Err(PlyError::FormatMismatch(
                "file must start with 'ply'".to_string(),
            ));
        }

        bytes_read += read_preamble_line(&mut reader, &mut buf)? as u64;
        let format_line = std::str::from_utf8(&buf)
            .map_err(|_| PlyError::FormatMismatch("format line is not text".to_string()))?;
        let parts: Vec<&str> = format_line.split_whitespace().collect();
        let (encoding, version) = match parts.as_slice() {
            ["format", encoding, version] => match Encoding::parse(encoding) {
                Some(encoding) => (encoding, version.to_string()),
                None => {
                    return Err(PlyError::FormatMismatch(format!(
                        "unsupported format {encoding}"
                    )))
                }
            },
            _ => {
                return Err(PlyError::FormatMismatch(format!(
                    "invalid format line: {}",
                    format_line.trim_end()
                )))
            }
        };
        debug!(%encoding, %version, "recognized PLY format line");

        let mut comments = Vec::new();
        let mut elements = Vec::new();
        let mut current: Option<OpenElement> = None;
        let mut line_no = 2;

        loop {
            let line_bytes = read_header_line(&mut reader, &mut buf)?;
            if line_bytes == 0 {
                return Err(PlyError::HeaderTruncated);
            }
            bytes_read += line_bytes as u64;
            line_no += 1;

            let line = std::str::from_utf8(&buf)
                .map_err(|_| PlyError::header(line_no, "header line is not valid UTF-8"))?
                .trim_end_matches(['\n', '\r']);

            if line.trim_end() == "end_header" {
                break;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let Some(keyword) = parts.first() else {
                return Err(PlyError::header(line_no, "empty header line"));
            };

            match *keyword {
                "comment" => {
                    let rest = line.trim_start()["comment".len()..].to_string();
                    // Drop the single separator after the keyword, keep the rest verbatim.
                    let comment = match rest.chars().next() {
                        Some(c) if c.is_whitespace() => rest[c.len_utf8()..].to_string(),
                        _ => rest,
                    };
                    comments.push(comment);
                }
                "element" => {
                    let [_, name, count] = parts.as_slice() else {
                        return Err(PlyError::header(line_no, "invalid element line"));
                    };
                    let count = count.parse::<usize>().map_err(|_| {
                        PlyError::header(line_no, format!("invalid element count: {count}"))
                    })?;

                    if let Some(element) = current.take() {
                        elements.push(element.close()?);
                    }
                    trace!(element = %name, count, "element declared");
                    current = Some(OpenElement {
                        name: name.to_string(),
                        count,
                        properties: Vec::new(),
                        line: line_no,
                    });
                }
                "property" => {
                    let element = current
                        .as_mut()
                        .ok_or_else(|| PlyError::header(line_no, "property without element"))?;

                    let property = match parts.as_slice() {
                        [_, data_type, name] => PropertySpec::Scalar {
                            name: name.to_string(),
                            data_type: parse_type(data_type, line_no)?,
                        },
                        [_, "list", count_type, data_type, name] => PropertySpec::List {
                            name: name.to_string(),
                            count_type: parse_type(count_type, line_no)?,
                            data_type: parse_type(data_type, line_no)?,
                        },
                        _ => {
                            return Err(PlyError::header(line_no, "invalid property line"));
                        }
                    };
                    element.properties.push(property);
                }
                other => {
                    return Err(PlyError::header(
                        line_no,
                        format!("unknown header keyword: {other}"),
                    ));
                }
            }
        }

        // Save the last element
        if let Some(element) = current {
            elements.push(element.close()?);
        }

        Ok(Schema {
            encoding,
            version,
            comments,
            elements,
            data_offset: bytes_read,
        })
    }

    /// Get element definition by name
    pub fn get_element(&self, name: &str) -> Option<&ElementSpec> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Longest magic or format line read before giving up on the input.
const MAX_PREAMBLE_LINE: u64 = 256;

/// Reads a line of at most [`MAX_PREAMBLE_LINE`] bytes, so input without
/// newlines is rejected without buffering all of it.
fn read_preamble_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<usize, PlyError> {
    buf.clear();
    let n = Read::take(&mut *reader, MAX_PREAMBLE_LINE).read_until(b'\n', buf)?;
    if n as u64 == MAX_PREAMBLE_LINE && buf.last() != Some(&b'\n') {
        return Err(PlyError::FormatMismatch(format!(
            "no line break in the first {MAX_PREAMBLE_LINE} bytes of a header line"
        )));
    }
    Ok(n)
}

fn read_header_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<usize, PlyError> {
    buf.clear();
    Ok(reader.read_until(b'\n', buf)?)
}

fn parse_type(name: &str, line: usize) -> Result<ScalarType, PlyError> {
    ScalarType::parse(name)
        .ok_or_else(|| PlyError::header(line, format!("unknown property type: {name}")))
}
