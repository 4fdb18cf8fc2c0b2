//! Sharp Data Crate
//!
//! Decoding of 3D Gaussian Splatting PLY files (as written by SHARP) and
//! conversion to plain-text XYZ point clouds with per-point RGB color.

pub mod color;
pub mod convert;
pub mod error;
pub mod ply;
pub mod types;
pub mod xyz;

pub use color::{SH_C0, sh_dc_to_rgb};
pub use convert::{ConvertOptions, batch_convert, convert_ply_to_xyz, default_output_path};
pub use error::PlyError;
pub use ply::{FileMetadata, TypePolicy, VertexDecoder, parse_header};
pub use types::{Point, ScalarValue};
