//! DDS texture decoding for the MIX viewer.
//!
//! Parses the fixed 128-byte DirectDraw Surface container header and
//! decompresses FourCC-tagged DXT1/DXT3/DXT5 (BC1/BC2/BC3) surfaces into
//! flat RGBA8 bitmaps, one per mipmap level.
//!
//! Everything else a DDS file can carry (uncompressed RGB, BC4-BC7,
//! cubemaps, volumes, DX10 extended headers) is out of scope and rejected.
//!
//! # Example
//!
//! ```no_run
//! use mixview_dds::DdsFile;
//!
//! let dds = DdsFile::read("path/to/texture.dds", false)?;
//! for image in &dds.images {
//!     println!("{}x{}", image.width, image.height);
//! }
//! # Ok::<(), mixview_dds::Error>(())
//! ```

mod decode;
mod error;
pub mod header;

use std::fs;
use std::path::Path;

pub use decode::{decode_header, decode_images, Image};
pub use error::{Error, Result};
pub use header::{block_size, mipmap_size, DdsHeader, DdsPixelFormat, FourCC};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// A fully decoded DDS file: the header plus the base image and its mipmap
/// chain, base level first.
#[derive(Debug, Clone)]
pub struct DdsFile {
    pub header: DdsHeader,
    pub images: Vec<Image>,
}

impl DdsFile {
    /// Read and decode a DDS file from disk.
    ///
    /// With `shallow` set, only the base level is decoded.
    pub fn read<P: AsRef<Path>>(path: P, shallow: bool) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data, shallow)
    }

    /// Decode a DDS file from an in-memory buffer.
    pub fn parse(data: &[u8], shallow: bool) -> Result<Self> {
        let header = decode_header(data)?;
        let images = decode_images(&header, data, shallow)?;
        Ok(Self { header, images })
    }
}
