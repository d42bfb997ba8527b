//! MTX texture block format (.mtx)
//!
//! A texture block is produced offline and loaded in one allocation. The
//! runtime takes the block over as-is: pixel data and palette are used in
//! place, never copied.
//!
//! # Layout
//! ```text
//! 0x00: signature u32            - MTX_SIGNATURE_CURRENT
//! 0x04: pixel_format u32         - PixelFormat (GU_PSM_*)
//! 0x08: texture_width u32
//! 0x0C: texture_height u32
//! 0x10: texture_stride u32       - row length in pixels
//! 0x14: clut_format u32          - PixelFormat of palette entries
//! 0x18: clut_entries u32         - palette entry count (0 = no palette)
//! 0x1C: palette_offset u32       - bytes from start of pixel data to palette
//! 0x20: swizzle u32              - 1 if pixel data is swizzled
//! 0x24: vram_allocation_size u32 - bytes of VRAM the texture needs
//! 0x28: pixel data, immediately followed (at palette_offset) by the palette
//! ```
//!
//! All words are little-endian.

use bytemuck::{Pod, Zeroable};

/// Signature of the current block revision ("MTX1")
pub const MTX_SIGNATURE_CURRENT: u32 = u32::from_le_bytes(*b"MTX1");

/// PSP GU pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PixelFormat {
    Psm5650 = 0,
    Psm5551 = 1,
    Psm4444 = 2,
    Psm8888 = 3,
    T4 = 4,
    T8 = 5,
    T16 = 6,
    T32 = 7,
    Dxt1 = 8,
    Dxt3 = 9,
    Dxt5 = 10,
}

impl PixelFormat {
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => PixelFormat::Psm5650,
            1 => PixelFormat::Psm5551,
            2 => PixelFormat::Psm4444,
            3 => PixelFormat::Psm8888,
            4 => PixelFormat::T4,
            5 => PixelFormat::T8,
            6 => PixelFormat::T16,
            7 => PixelFormat::T32,
            8 => PixelFormat::Dxt1,
            9 => PixelFormat::Dxt3,
            10 => PixelFormat::Dxt5,
            _ => return None,
        })
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::T4 | PixelFormat::Dxt1 => 4,
            PixelFormat::T8 | PixelFormat::Dxt3 | PixelFormat::Dxt5 => 8,
            PixelFormat::Psm5650
            | PixelFormat::Psm5551
            | PixelFormat::Psm4444
            | PixelFormat::T16 => 16,
            PixelFormat::Psm8888 | PixelFormat::T32 => 32,
        }
    }

    /// Indexed formats sample through a CLUT
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            PixelFormat::T4 | PixelFormat::T8 | PixelFormat::T16 | PixelFormat::T32
        )
    }

    pub fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::Dxt1 | PixelFormat::Dxt3 | PixelFormat::Dxt5)
    }

    /// Bytes for `stride × height` pixels of this format
    pub fn data_size(self, stride: u32, height: u32) -> usize {
        (stride as usize * height as usize * self.bits_per_pixel() as usize).div_ceil(8)
    }
}

/// MTX block header (40 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct MtxHeader {
    pub signature: u32,
    pub pixel_format: u32,
    pub texture_width: u32,
    pub texture_height: u32,
    pub texture_stride: u32,
    pub clut_format: u32,
    pub clut_entries: u32,
    /// Byte offset of the palette, measured from the start of pixel data
    pub palette_offset: u32,
    pub swizzle: u32,
    /// Informational; not used by the takeover path
    pub vram_allocation_size: u32,
}

const WORDS: usize = MtxHeader::SIZE / 4;

impl MtxHeader {
    pub const SIZE: usize = 40;

    /// Header for an unpaletted, unswizzled texture
    pub fn new(pixel_format: PixelFormat, width: u32, height: u32, stride: u32) -> Self {
        Self {
            signature: MTX_SIGNATURE_CURRENT,
            pixel_format: pixel_format as u32,
            texture_width: width,
            texture_height: height,
            texture_stride: stride,
            ..Self::zeroed()
        }
    }

    pub fn with_clut(mut self, clut_format: PixelFormat, clut_entries: u32) -> Self {
        self.clut_format = clut_format as u32;
        self.clut_entries = clut_entries;
        self
    }

    pub fn with_swizzle(mut self, swizzled: bool) -> Self {
        self.swizzle = swizzled as u32;
        self
    }

    pub fn is_current(&self) -> bool {
        self.signature == MTX_SIGNATURE_CURRENT
    }

    pub fn is_swizzled(&self) -> bool {
        self.swizzle != 0
    }

    /// Palette size in bytes implied by `clut_format` and `clut_entries`
    pub fn clut_size(&self) -> Option<usize> {
        if self.clut_entries == 0 {
            return None;
        }
        let format = PixelFormat::from_u32(self.clut_format)?;
        Some(self.clut_entries as usize * format.bits_per_pixel() as usize / 8)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let words: [u32; WORDS] = bytemuck::cast(*self);
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut words = [0u32; WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes[..Self::SIZE].chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Some(bytemuck::cast(words))
    }
}

/// Error building an MTX block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MtxError {
    #[error("{field} of {size} bytes does not fit in a header word")]
    TooLarge { field: &'static str, size: usize },
}

fn header_word(field: &'static str, size: usize) -> Result<u32, MtxError> {
    u32::try_from(size).map_err(|_| MtxError::TooLarge { field, size })
}

/// Build a complete MTX block: header, pixels, then the optional palette.
///
/// Fills in the signature, `palette_offset` and `vram_allocation_size`.
pub fn encode_mtx(
    header: MtxHeader,
    pixels: &[u8],
    palette: Option<&[u8]>,
) -> Result<Vec<u8>, MtxError> {
    let palette = palette.unwrap_or(&[]);
    let payload = pixels.len() + palette.len();
    let header = MtxHeader {
        signature: MTX_SIGNATURE_CURRENT,
        palette_offset: if palette.is_empty() {
            0
        } else {
            header_word("palette_offset", pixels.len())?
        },
        vram_allocation_size: header_word("vram_allocation_size", payload)?,
        ..header
    };

    let mut block = Vec::with_capacity(MtxHeader::SIZE + payload);
    block.extend_from_slice(&header.to_bytes());
    block.extend_from_slice(pixels);
    block.extend_from_slice(palette);
    Ok(block)
}
