//! DDS header structures.
//!
//! Layout reference:
//! <https://docs.microsoft.com/en-us/windows/win32/direct3ddds/dds-header>

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

// DDS_HEADER flags.
pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PITCH: u32 = 0x8;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20_000;
pub const DDSD_LINEARSIZE: u32 = 0x80_000;
pub const DDSD_DEPTH: u32 = 0x800_000;

// Surface capabilities.
pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_MIPMAP: u32 = 0x400_000;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;

pub const DDSCAPS2_CUBEMAP: u32 = 0x200;
pub const DDSCAPS2_CUBEMAP_POSITIVEX: u32 = 0x400;
pub const DDSCAPS2_CUBEMAP_NEGATIVEX: u32 = 0x800;
pub const DDSCAPS2_CUBEMAP_POSITIVEY: u32 = 0x1000;
pub const DDSCAPS2_CUBEMAP_NEGATIVEY: u32 = 0x2000;
pub const DDSCAPS2_CUBEMAP_POSITIVEZ: u32 = 0x4000;
pub const DDSCAPS2_CUBEMAP_NEGATIVEZ: u32 = 0x8000;
pub const DDSCAPS2_VOLUME: u32 = 0x200_000;

// Pixel format flags.
pub const DDPF_ALPHAPIXELS: u32 = 0x1;
pub const DDPF_ALPHA: u32 = 0x2;
pub const DDPF_FOURCC: u32 = 0x4;
pub const DDPF_RGB: u32 = 0x40;
pub const DDPF_YUV: u32 = 0x200;
pub const DDPF_LUMINANCE: u32 = 0x20_000;

/// DDS file header, the 124 bytes following the magic.
///
/// Returned exactly as read; no flag/caps combination is validated beyond
/// what decoding requires.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags (`DDSD_*`).
    pub flags: u32,
    /// Image height in texels.
    pub height: u32,
    /// Image width in texels.
    pub width: u32,
    /// Pitch or linear size. Informational; level sizes are recomputed.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures, unsupported).
    pub depth: u32,
    /// Number of mipmap levels. 0 and 1 both mean "no mipmaps".
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities (`DDSCAPS_*`).
    pub caps: u32,
    /// Surface capabilities 2 (`DDSCAPS2_*`).
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// Offset of the pixel data within the file.
    ///
    /// Trusts the header's own `size` field rather than a hardcoded 124,
    /// so files with a nonstandard declared size still locate their data.
    pub fn data_offset(&self) -> usize {
        self.size as usize + 4
    }

    /// Number of images in the file, with the "0 means 1" floor applied.
    pub fn mip_count(&self) -> u32 {
        self.mipmap_count.max(1)
    }
}

/// DDS pixel format, embedded in the header at offset 72.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags (`DDPF_*`).
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed formats).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Whether the FourCC field carries a compression code.
    pub fn has_four_cc(&self) -> bool {
        self.flags & DDPF_FOURCC != 0
    }
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 (BC1) compression, 1-bit punch-through alpha.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 compression (premultiplied DXT3, not decodable).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 (BC2) compression, explicit 4-bit alpha.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 compression (premultiplied DXT5, not decodable).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 (BC3) compression, interpolated alpha.
    pub const DXT5: Self = Self(*b"DXT5");
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// Bytes per 4x4 block for a compression format.
pub fn block_size(four_cc: FourCC) -> usize {
    // DXT1 has no separate alpha block
    match four_cc {
        FourCC::DXT1 => 8,
        _ => 16,
    }
}

/// Byte length of one mipmap level.
///
/// Dimensions below 4 are clamped up to one block, the compression
/// minimum granularity.
pub fn mipmap_size(width: u32, height: u32, block_size: usize) -> usize {
    let blocks_x = (width.max(4) as usize + 3) / 4;
    let blocks_y = (height.max(4) as usize + 3) / 4;
    blocks_x * blocks_y * block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), 124);
        assert_eq!(std::mem::size_of::<DdsPixelFormat>(), 32);
    }

    #[test]
    fn test_block_size() {
        assert_eq!(block_size(FourCC::DXT1), 8);
        assert_eq!(block_size(FourCC::DXT3), 16);
        assert_eq!(block_size(FourCC::DXT5), 16);
    }

    #[test]
    fn test_mipmap_size() {
        // 4x4 block minimum
        assert_eq!(mipmap_size(1, 1, 8), 8);
        assert_eq!(mipmap_size(4, 4, 8), 8);
        assert_eq!(mipmap_size(8, 8, 16), 64);
        // non-multiple-of-4 dimensions round up to whole blocks
        assert_eq!(mipmap_size(6, 6, 8), 32);
        assert_eq!(mipmap_size(1024, 1024, 16), 1024 * 1024);
    }

    #[test]
    fn test_four_cc_display() {
        assert_eq!(FourCC::DXT1.to_string(), "DXT1");
        assert_eq!(FourCC([0, b'A', b'B', 0xff]).to_string(), "\\x00AB\\xff");
    }

    #[test]
    fn test_four_cc_numeric_values() {
        // the little-endian u32 readings of the recognized codes
        assert_eq!(u32::from_le_bytes(FourCC::DXT1.0), 827611204);
        assert_eq!(u32::from_le_bytes(FourCC::DXT3.0), 861165636);
        assert_eq!(u32::from_le_bytes(FourCC::DXT5.0), 894720068);
    }
}
