//! Fixed-width vertex record layout and column lookup.

use crate::error::{PlyError, Result};
use crate::ply::header::{ElementDeclaration, PropertyType};
use crate::types::ScalarValue;
use std::collections::HashMap;

/// Position columns and the index used when the name is not declared.
const POSITION_COLUMNS: [(&str, usize); 3] = [("x", 0), ("y", 1), ("z", 2)];

/// Spherical harmonics DC columns. No positional fallback.
const DC_COLUMNS: [&str; 3] = ["f_dc_0", "f_dc_1", "f_dc_2"];

/// Byte layout of one vertex record.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    types: Vec<PropertyType>,
    offsets: Vec<usize>,
    record_size: usize,
    index: HashMap<String, usize>,
}

impl VertexLayout {
    /// Compute offsets for the properties of `element` in declared order.
    pub fn new(element: &ElementDeclaration) -> Result<Self> {
        if let Some(name) = element.list_properties.first() {
            return Err(PlyError::UnsupportedListProperty {
                element: element.name.clone(),
                name: name.clone(),
            });
        }

        let mut offsets = Vec::with_capacity(element.properties.len());
        let mut record_size = 0;
        for property in &element.properties {
            offsets.push(record_size);
            record_size += property.ty.size();
        }

        // Later duplicates win.
        let index = element
            .properties
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();

        Ok(Self {
            types: element.properties.iter().map(|p| p.ty).collect(),
            offsets,
            record_size,
            index,
        })
    }

    /// Bytes per record.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Number of properties per record.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Byte offset of property `index` within a record.
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Index of the property called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Decode property `index` from one record.
    ///
    /// `record` must be exactly [`record_size`](Self::record_size) bytes and
    /// `index` must be in range.
    pub fn value(&self, record: &[u8], index: usize) -> ScalarValue {
        let ty = self.types[index];
        let start = self.offsets[index];
        ty.decode(&record[start..start + ty.size()])
    }
}

/// Columns that feed a [`Point`](crate::Point), resolved once per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub position: [usize; 3],
    /// Present only if all three DC columns are declared.
    pub dc: Option<[usize; 3]>,
}

impl ColumnMap {
    pub fn resolve(layout: &VertexLayout) -> Result<Self> {
        let mut position = [0; 3];
        for (slot, (name, fallback)) in position.iter_mut().zip(POSITION_COLUMNS) {
            let index = layout.index_of(name).unwrap_or(fallback);
            if index >= layout.len() {
                return Err(PlyError::MissingProperty { name, index });
            }
            *slot = index;
        }

        let dc = match DC_COLUMNS.map(|name| layout.index_of(name)) {
            [Some(r), Some(g), Some(b)] => Some([r, g, b]),
            _ => None,
        };

        Ok(Self { position, dc })
    }
}
