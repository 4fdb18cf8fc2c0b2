//! Binary PLY header parsing and vertex decoding

mod header;
mod loader;
mod vertex;

pub use header::{
    BINARY_LITTLE_ENDIAN, ElementDeclaration, FileMetadata, PropertyDeclaration, PropertyType,
    TypePolicy, parse_header, parse_header_from_reader,
};
pub use loader::{VERTEX_ELEMENT, VertexDecoder};
pub use vertex::{ColumnMap, VertexLayout};
