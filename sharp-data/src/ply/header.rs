//! PLY header parsing.
//!
//! The header is a run of text lines ending with `end_header`. Only the
//! `format`, `element` and `property` lines matter here; everything else
//! (comments, `obj_info`, the `ply` magic) is skipped.

use crate::error::{PlyError, Result};
use crate::types::ScalarValue;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// The only payload layout the decoder understands.
pub const BINARY_LITTLE_ENDIAN: &str = "binary_little_endian";

/// Scalar property types that may appear in a vertex element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Float32,
    Float64,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl PropertyType {
    /// Resolve a header type name. Both the classic names (`float`, `uchar`, ...)
    /// and the sized names (`float32`, `uint8`, ...) are accepted, case-sensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "float" | "float32" => PropertyType::Float32,
            "double" | "float64" => PropertyType::Float64,
            "char" | "int8" => PropertyType::Int8,
            "uchar" | "uint8" => PropertyType::UInt8,
            "short" | "int16" => PropertyType::Int16,
            "ushort" | "uint16" => PropertyType::UInt16,
            "int" | "int32" => PropertyType::Int32,
            "uint" | "uint32" => PropertyType::UInt32,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical sized name.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Float32 => "float32",
            PropertyType::Float64 => "float64",
            PropertyType::Int8 => "int8",
            PropertyType::UInt8 => "uint8",
            PropertyType::Int16 => "int16",
            PropertyType::UInt16 => "uint16",
            PropertyType::Int32 => "int32",
            PropertyType::UInt32 => "uint32",
        }
    }

    /// Width in bytes of one value.
    pub fn size(self) -> usize {
        match self {
            PropertyType::Int8 | PropertyType::UInt8 => 1,
            PropertyType::Int16 | PropertyType::UInt16 => 2,
            PropertyType::Float32 | PropertyType::Int32 | PropertyType::UInt32 => 4,
            PropertyType::Float64 => 8,
        }
    }

    /// Decode one little-endian value from the start of `bytes`.
    ///
    /// `bytes` must hold at least [`size`](Self::size) bytes.
    pub fn decode(self, bytes: &[u8]) -> ScalarValue {
        match self {
            PropertyType::Float32 => ScalarValue::Float(f32::from_le_bytes(le(bytes)) as f64),
            PropertyType::Float64 => ScalarValue::Float(f64::from_le_bytes(le(bytes))),
            PropertyType::Int8 => ScalarValue::Int(i8::from_le_bytes(le(bytes)) as i64),
            PropertyType::UInt8 => ScalarValue::Int(bytes[0] as i64),
            PropertyType::Int16 => ScalarValue::Int(i16::from_le_bytes(le(bytes)) as i64),
            PropertyType::UInt16 => ScalarValue::Int(u16::from_le_bytes(le(bytes)) as i64),
            PropertyType::Int32 => ScalarValue::Int(i32::from_le_bytes(le(bytes)) as i64),
            PropertyType::UInt32 => ScalarValue::Int(u32::from_le_bytes(le(bytes)) as i64),
        }
    }

    /// Append `value` in this type's little-endian encoding.
    ///
    /// Values are cast to the target width the same way `as` does.
    pub fn encode(self, value: ScalarValue, out: &mut Vec<u8>) {
        match (self, value) {
            (PropertyType::Float32, v) => {
                out.extend_from_slice(&(v.as_f64() as f32).to_le_bytes())
            }
            (PropertyType::Float64, v) => out.extend_from_slice(&v.as_f64().to_le_bytes()),
            (ty, ScalarValue::Float(v)) => ty.encode(ScalarValue::Int(v as i64), out),
            (PropertyType::Int8, ScalarValue::Int(v)) => {
                out.extend_from_slice(&(v as i8).to_le_bytes())
            }
            (PropertyType::UInt8, ScalarValue::Int(v)) => out.push(v as u8),
            (PropertyType::Int16, ScalarValue::Int(v)) => {
                out.extend_from_slice(&(v as i16).to_le_bytes())
            }
            (PropertyType::UInt16, ScalarValue::Int(v)) => {
                out.extend_from_slice(&(v as u16).to_le_bytes())
            }
            (PropertyType::Int32, ScalarValue::Int(v)) => {
                out.extend_from_slice(&(v as i32).to_le_bytes())
            }
            (PropertyType::UInt32, ScalarValue::Int(v)) => {
                out.extend_from_slice(&(v as u32).to_le_bytes())
            }
        }
    }
}

fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

/// How to treat property type names that are not in the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypePolicy {
    /// Fail with [`PlyError::UnrecognizedPropertyType`].
    #[default]
    Strict,
    /// Assume float32 and keep going. Offsets after the unknown property
    /// are wrong if the guess is.
    Lenient,
}

/// One `property <type> <name>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub ty: PropertyType,
}

/// One `element <name> <count>` line and the scalar properties that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDeclaration {
    pub name: String,
    pub count: usize,
    pub properties: Vec<PropertyDeclaration>,
    /// Names of `property list ...` lines, which are skipped rather than decoded.
    pub list_properties: Vec<String>,
}

impl ElementDeclaration {
    /// Bytes per record: the sum of the declared property widths.
    pub fn record_size(&self) -> usize {
        self.properties.iter().map(|p| p.ty.size()).sum()
    }
}

/// Everything the header tells us about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub elements: Vec<ElementDeclaration>,
    /// Format token from the `format` line, if there was one.
    pub format: Option<String>,
    /// Byte offset of the first payload byte.
    pub header_size: u64,
}

impl FileMetadata {
    /// Find an element by name.
    pub fn element(&self, name: &str) -> Option<&ElementDeclaration> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Parse the header of the PLY file at `path`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_header(path: impl AsRef<Path>, policy: TypePolicy) -> Result<FileMetadata> {
    let file = File::open(path.as_ref())?;
    parse_header_from_reader(BufReader::new(file), policy)
}

/// Parse a PLY header from any buffered reader positioned at the start of the file.
///
/// Reading stops right after the `end_header` line; the payload is left unread.
pub fn parse_header_from_reader<R: BufRead>(
    mut reader: R,
    policy: TypePolicy,
) -> Result<FileMetadata> {
    let mut elements: Vec<ElementDeclaration> = Vec::new();
    let mut format = None;
    let mut offset: u64 = 0;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let read = reader.read_until(b'\n', &mut raw)?;
        if read == 0 {
            return Err(PlyError::HeaderMalformed(
                "reached end of file before 'end_header'".into(),
            ));
        }
        offset += read as u64;

        let line = std::str::from_utf8(&raw)
            .map_err(|_| {
                PlyError::HeaderMalformed(format!("header line ending at byte {offset} is not UTF-8"))
            })?
            .trim();

        if line == "end_header" {
            break;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("format") => {
                let token = tokens
                    .next()
                    .ok_or_else(|| malformed("format line without a format", line))?;
                format = Some(token.to_string());
            }
            Some("element") => {
                let (Some(name), Some(count)) = (tokens.next(), tokens.next()) else {
                    return Err(malformed("expected 'element <name> <count>'", line));
                };
                let count = count
                    .parse::<usize>()
                    .map_err(|_| malformed("element count is not a number", line))?;
                elements.push(ElementDeclaration {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                    list_properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| malformed("property declared before any element", line))?;
                let rest: Vec<&str> = tokens.collect();
                match rest.as_slice() {
                    ["list", .., name] => {
                        debug!("Skipping list property '{}' of '{}'", name, element.name);
                        element.list_properties.push(name.to_string());
                    }
                    [type_name, name, ..] => {
                        let ty = resolve_type(type_name, policy)?;
                        element.properties.push(PropertyDeclaration {
                            name: name.to_string(),
                            ty,
                        });
                    }
                    _ => return Err(malformed("expected 'property <type> <name>'", line)),
                }
            }
            _ => {}
        }
    }

    if let Some(format) = format.as_deref() {
        if format != BINARY_LITTLE_ENDIAN {
            warn!(
                "PLY format is '{}', decoding as {} anyway",
                format, BINARY_LITTLE_ENDIAN
            );
        }
    }

    debug!(
        "Parsed PLY header: {} elements, {} header bytes",
        elements.len(),
        offset
    );

    Ok(FileMetadata {
        elements,
        format,
        header_size: offset,
    })
}

fn resolve_type(name: &str, policy: TypePolicy) -> Result<PropertyType> {
    match (PropertyType::from_name(name), policy) {
        (Some(ty), _) => Ok(ty),
        (None, TypePolicy::Strict) => Err(PlyError::UnrecognizedPropertyType(name.to_string())),
        (None, TypePolicy::Lenient) => {
            warn!("Unknown property type '{}', assuming float32", name);
            Ok(PropertyType::Float32)
        }
    }
}

fn malformed(reason: &str, line: &str) -> PlyError {
    PlyError::HeaderMalformed(format!("{reason}: '{line}'"))
}
