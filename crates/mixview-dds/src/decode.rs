//! DDS surface decoding: header parse, mipmap walk, and DXT block
//! decompression.
//!
//! The whole pipeline is a single forward pass over the input buffer. Each
//! call owns its slice and a local offset, so independent decodes never
//! share cursor state.

use std::time::Instant;

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;
use zerocopy::FromBytes;

use crate::header::{block_size, mipmap_size, DdsHeader, FourCC};
use crate::{Error, Result, DDS_MAGIC};

/// One decoded mipmap level.
///
/// `data` holds exactly `width * height * 4` RGBA8 bytes, row-major,
/// top-to-bottom.
#[derive(Debug, Clone)]
pub struct Image {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Parse the fixed 128-byte DDS preamble: 4-byte magic plus 124-byte header.
///
/// The header is returned exactly as read, even if reserved or capability
/// bits are non-standard. Pixel data follows at [`DdsHeader::data_offset`].
pub fn decode_header(data: &[u8]) -> Result<DdsHeader> {
    if data.len() < 4 {
        return Err(Error::TruncatedInput {
            needed: 4,
            available: data.len(),
        });
    }

    let magic: [u8; 4] = data[..4].try_into().unwrap();
    if &magic != DDS_MAGIC {
        return Err(Error::InvalidMagic(magic));
    }

    let (header, _) =
        DdsHeader::read_from_prefix(&data[4..]).map_err(|_| Error::TruncatedInput {
            needed: std::mem::size_of::<DdsHeader>(),
            available: data.len() - 4,
        })?;

    Ok(header)
}

/// Decode the mipmap chain described by `header` from the full file buffer.
///
/// Returns the images base level first, each half the linear dimensions of
/// the previous. `shallow` limits the decode to the base level, for callers
/// that only need a thumbnail.
///
/// All-or-nothing: if any level's data is short, no images are returned.
pub fn decode_images(header: &DdsHeader, data: &[u8], shallow: bool) -> Result<Vec<Image>> {
    let pixel_format = header.pixel_format;
    if !pixel_format.has_four_cc() {
        return Err(Error::MissingFourCc {
            flags: pixel_format.flags,
        });
    }

    let four_cc = pixel_format.four_cc;
    match four_cc {
        FourCC::DXT1 | FourCC::DXT3 | FourCC::DXT5 => {}
        other => return Err(Error::UnsupportedFourCc(other)),
    }

    let block_bytes = block_size(four_cc);
    let levels = if shallow { 1 } else { header.mip_count() as usize };

    let mut width = header.width;
    let mut height = header.height;
    let mut offset = header.data_offset();
    // mipmap_count is untrusted; cap the reservation by what the buffer
    // can possibly hold (every level consumes at least one 8-byte block)
    let mut images = Vec::with_capacity(levels.min(data.len() / 8 + 1));

    for level in 0..levels {
        let length = mipmap_size(width, height, block_bytes);
        let available = data.len().saturating_sub(offset);
        if available < length {
            return Err(Error::TruncatedInput {
                needed: length,
                available,
            });
        }

        let start = Instant::now();
        let pixels = decompress_blocks(&data[offset..offset + length], width, height, four_cc);
        trace!(level, width, height, elapsed = ?start.elapsed(), "decoded mip level");

        images.push(Image {
            data: pixels,
            width,
            height,
        });

        offset += length;
        width /= 2;
        height /= 2;
    }

    Ok(images)
}

/// Decompress a stream of 4x4 DXT blocks into a fresh RGBA8 buffer.
///
/// Blocks are traversed in raster order over the floor(h/4) x floor(w/4)
/// block grid. The buffer is pre-zeroed, so texels beyond the grid on
/// non-multiple-of-4 edges stay (0,0,0,0).
fn decompress_blocks(data: &[u8], width: u32, height: u32, four_cc: FourCC) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let mut rgba = vec![0u8; width * height * 4];

    let block_bytes = block_size(four_cc);
    let mut offset = 0;

    for block_row in 0..height / 4 {
        for block_col in 0..width / 4 {
            let block = &data[offset..offset + block_bytes];
            let texels = match four_cc {
                FourCC::DXT3 => decode_dxt3_block(block),
                FourCC::DXT5 => decode_dxt5_block(block),
                _ => decode_dxt1_block(block),
            };

            for row in 0..4 {
                for col in 0..4 {
                    let out = ((block_row * 4 + row) * width + block_col * 4 + col) * 4;
                    rgba[out..out + 4].copy_from_slice(&texels[row * 4 + col]);
                }
            }

            offset += block_bytes;
        }
    }

    rgba
}

/// Decode an 8-byte DXT1 block. Punch-through alpha applies when the first
/// color word compares less-or-equal to the second.
fn decode_dxt1_block(block: &[u8]) -> [[u8; 4]; 16] {
    decode_color_texels(block, true)
}

/// Decode a 16-byte DXT3 block: 8 bytes of explicit 4-bit alpha followed by
/// the color block. The color palette always uses four-color mode.
fn decode_dxt3_block(block: &[u8]) -> [[u8; 4]; 16] {
    let mut texels = decode_color_texels(&block[8..16], false);

    // one nibble per texel, little-endian nibble order
    let alpha_bits = LittleEndian::read_u64(&block[0..8]);
    for (i, texel) in texels.iter_mut().enumerate() {
        let nibble = ((alpha_bits >> (4 * i)) & 0xf) as u8;
        texel[3] = nibble << 4 | nibble;
    }

    texels
}

/// Decode a 16-byte DXT5 block: two alpha endpoints plus a 48-bit stream of
/// 3-bit palette indices, followed by the color block.
fn decode_dxt5_block(block: &[u8]) -> [[u8; 4]; 16] {
    let mut texels = decode_color_texels(&block[8..16], false);

    let palette = alpha_palette(block[0], block[1]);
    let mut bits = 0u64;
    for (i, &byte) in block[2..8].iter().enumerate() {
        bits |= (byte as u64) << (8 * i);
    }
    for (i, texel) in texels.iter_mut().enumerate() {
        texel[3] = palette[((bits >> (3 * i)) & 0x7) as usize];
    }

    texels
}

/// Decode the 8-byte color half of a block into 16 RGBA texels in row-major
/// order: two little-endian 565 words, then a 32-bit table of 2-bit palette
/// indices, texel (x, y) at bits `2 * (y * 4 + x)`.
fn decode_color_texels(block: &[u8], punch_through: bool) -> [[u8; 4]; 16] {
    let word0 = LittleEndian::read_u16(&block[0..2]);
    let word1 = LittleEndian::read_u16(&block[2..4]);
    let indices = LittleEndian::read_u32(&block[4..8]);

    let palette = color_palette(word0, word1, punch_through);

    let mut texels = [[0u8; 4]; 16];
    for (i, texel) in texels.iter_mut().enumerate() {
        *texel = palette[((indices >> (2 * i)) & 0x3) as usize];
    }
    texels
}

/// Derive the four-entry RGBA palette from a color block's two 565 words.
///
/// With `punch_through` set and `word0 <= word1`, entry 2 is the
/// componentwise average of the two colors and entry 3 is transparent
/// black. Otherwise entries 2 and 3 interpolate at 1/3 and 2/3.
fn color_palette(word0: u16, word1: u16, punch_through: bool) -> [[u8; 4]; 4] {
    let c0 = unpack_565(word0);
    let c1 = unpack_565(word1);

    let mut palette = [[0, 0, 0, 255u8]; 4];
    palette[0][..3].copy_from_slice(&c0);
    palette[1][..3].copy_from_slice(&c1);

    if punch_through && word0 <= word1 {
        for i in 0..3 {
            palette[2][i] = ((c0[i] as u16 + c1[i] as u16) / 2) as u8;
        }
        palette[3] = [0, 0, 0, 0];
    } else {
        for i in 0..3 {
            palette[2][i] = ((2 * c0[i] as u16 + c1[i] as u16) / 3) as u8;
            palette[3][i] = ((c0[i] as u16 + 2 * c1[i] as u16) / 3) as u8;
        }
    }

    palette
}

/// Expand a 565 color word to 888 using the truncating scale factors the
/// format expects (255/31 = 8, 255/63 = 4), not rounded expansion.
fn unpack_565(word: u16) -> [u8; 3] {
    [
        (((word >> 11) & 31) * 8) as u8,
        (((word >> 5) & 63) * 4) as u8,
        ((word & 31) * 8) as u8,
    ]
}

/// Derive the eight-entry alpha palette for a DXT5 alpha block.
fn alpha_palette(a0: u8, a1: u8) -> [u8; 8] {
    let (w0, w1) = (a0 as u16, a1 as u16);
    let mut palette = [0u8; 8];
    palette[0] = a0;
    palette[1] = a1;

    if a0 > a1 {
        for i in 2..8u16 {
            palette[i as usize] = (((8 - i) * w0 + (i - 1) * w1) / 7) as u8;
        }
    } else {
        for i in 2..6u16 {
            palette[i as usize] = (((6 - i) * w0 + (i - 1) * w1) / 5) as u8;
        }
        palette[6] = 0;
        palette[7] = 255;
    }

    palette
}
