//! Vertex payload loading and per-record decoding.

use crate::color::sh_dc_to_rgb;
use crate::error::{PlyError, Result};
use crate::ply::header::FileMetadata;
use crate::ply::vertex::{ColumnMap, VertexLayout};
use crate::types::Point;
use glam::DVec3;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Name of the element holding the Gaussians.
pub const VERTEX_ELEMENT: &str = "vertex";

/// Decodes the vertex element of one file into [`Point`]s.
#[derive(Debug, Clone)]
pub struct VertexDecoder {
    layout: VertexLayout,
    columns: ColumnMap,
    count: usize,
    header_size: u64,
}

impl VertexDecoder {
    /// Build the record layout and column map for the vertex element of `metadata`.
    pub fn new(metadata: &FileMetadata) -> Result<Self> {
        let vertex = metadata
            .element(VERTEX_ELEMENT)
            .ok_or(PlyError::MissingVertexElement)?;
        let layout = VertexLayout::new(vertex)?;
        // With no records the position columns are never read.
        let columns = match ColumnMap::resolve(&layout) {
            Err(PlyError::MissingProperty { .. }) if vertex.count == 0 => ColumnMap::default(),
            columns => columns?,
        };

        Ok(Self {
            layout,
            columns,
            count: vertex.count,
            header_size: metadata.header_size,
        })
    }

    /// Number of vertex records declared in the header.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of properties per record.
    pub fn property_count(&self) -> usize {
        self.layout.len()
    }

    /// Bytes per record.
    pub fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    /// Whether colors come from DC coefficients rather than the gray default.
    pub fn has_color(&self) -> bool {
        self.columns.dc.is_some()
    }

    /// Exact size of the vertex payload in bytes.
    pub fn payload_size(&self) -> Result<usize> {
        self.count
            .checked_mul(self.layout.record_size())
            .ok_or_else(|| {
                PlyError::HeaderMalformed(format!(
                    "{} vertices of {} bytes overflow the addressable size",
                    self.count,
                    self.layout.record_size()
                ))
            })
    }

    /// Read the whole vertex payload of the file at `path` into memory.
    ///
    /// The payload starts right after the header. Fewer bytes than
    /// [`payload_size`](Self::payload_size) is an error; trailing bytes are ignored.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_payload(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let expected = self.payload_size()?;
        let mut file = File::open(path.as_ref())?;

        let available = file.metadata()?.len().saturating_sub(self.header_size);
        if available < expected as u64 {
            return Err(PlyError::PayloadSizeMismatch {
                expected,
                actual: available as usize,
            });
        }

        file.seek(SeekFrom::Start(self.header_size))?;
        let mut payload = Vec::with_capacity(expected);
        file.take(expected as u64).read_to_end(&mut payload)?;
        if payload.len() != expected {
            return Err(PlyError::PayloadSizeMismatch {
                expected,
                actual: payload.len(),
            });
        }

        debug!("Read {} bytes of vertex data", payload.len());
        Ok(payload)
    }

    /// Decode a single record.
    pub fn decode_record(&self, record: &[u8]) -> Point {
        let [x, y, z] = self.columns.position;
        let position = [
            self.layout.value(record, x),
            self.layout.value(record, y),
            self.layout.value(record, z),
        ];

        match self.columns.dc {
            Some([r, g, b]) => {
                let dc = DVec3::new(
                    self.layout.value(record, r).as_f64(),
                    self.layout.value(record, g).as_f64(),
                    self.layout.value(record, b).as_f64(),
                );
                Point::new(position, sh_dc_to_rgb(dc))
            }
            None => Point::gray(position),
        }
    }

    /// Decode every record of an in-memory payload, in file order.
    ///
    /// `payload` must be exactly [`payload_size`](Self::payload_size) bytes.
    pub fn points<'a>(&'a self, payload: &'a [u8]) -> Result<impl Iterator<Item = Point> + 'a> {
        let expected = self.payload_size()?;
        if payload.len() != expected {
            return Err(PlyError::PayloadSizeMismatch {
                expected,
                actual: payload.len(),
            });
        }

        // A zero-sized record only occurs with zero vertices, where the payload is empty.
        Ok(payload
            .chunks_exact(self.layout.record_size().max(1))
            .map(|record| self.decode_record(record)))
    }
}
