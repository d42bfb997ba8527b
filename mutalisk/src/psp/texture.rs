//! PSP texture descriptor
//!
//! A descriptor either owns an entire MTX block (header + pixels + palette)
//! taken over from the loader, or owns a bare pixel buffer built some other
//! way. Release is dispatched on which of the two it holds.

use crate::formats::{MTX_SIGNATURE_CURRENT, MtxHeader, PixelFormat};

/// Memory held by a [`PspTexture`]
#[derive(Debug)]
pub enum TextureStorage<B> {
    Empty,
    /// Whole MTX block; pixel data starts right after the header
    Container { block: B, clut_offset: usize },
    /// Independently owned pixel buffer with no header and no palette
    Data { buffer: B },
}

impl<B> Default for TextureStorage<B> {
    fn default() -> Self {
        TextureStorage::Empty
    }
}

/// Texture descriptor in the PSP platform layer
///
/// `B` is the owned block type. It defaults to `Box<[u8]>`; anything that
/// releases its memory on drop works.
#[derive(Debug)]
pub struct PspTexture<B: AsRef<[u8]> = Box<[u8]>> {
    /// Raw `PixelFormat` word
    pub format: u32,
    pub width: u32,
    pub height: u32,
    /// Row length in pixels
    pub stride: u32,
    /// Mip level count beyond the base level; always 0 from a block
    pub mipmap: u32,
    pub clut_format: u32,
    pub clut_entries: u32,
    pub swizzled: bool,
    /// VRAM bytes the producer reserved for this texture
    pub vram_size: u32,
    storage: TextureStorage<B>,
}

impl<B: AsRef<[u8]>> Default for PspTexture<B> {
    fn default() -> Self {
        Self {
            format: 0,
            width: 0,
            height: 0,
            stride: 0,
            mipmap: 0,
            clut_format: 0,
            clut_entries: 0,
            swizzled: false,
            vram_size: 0,
            storage: TextureStorage::Empty,
        }
    }
}

impl<B: AsRef<[u8]>> PspTexture<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take over an MTX block produced by the loader
    pub fn from_memory(block: B) -> Self {
        let mut texture = Self::new();
        texture.patch_up_texture_from_memory(block);
        texture
    }

    /// Own a bare pixel buffer (no header, no palette)
    pub fn from_data(
        buffer: B,
        format: PixelFormat,
        width: u32,
        height: u32,
        stride: u32,
    ) -> Self {
        let mut texture = Self::new();
        texture.format = format as u32;
        texture.width = width;
        texture.height = height;
        texture.stride = stride;
        texture.storage = TextureStorage::Data { buffer };
        texture
    }

    /// Take ownership of `block` and describe it in place.
    ///
    /// Anything this descriptor held before is released first.
    ///
    /// # Panics
    /// If the block is shorter than a header or its signature is not the
    /// current revision. Beyond the signature the header is trusted; offsets
    /// that point outside the block only make [`clut`](Self::clut) return
    /// `None`.
    pub fn patch_up_texture_from_memory(&mut self, block: B) {
        let header = MtxHeader::from_bytes(block.as_ref())
            .unwrap_or_else(|| panic!("MTX block too short: {} bytes", block.as_ref().len()));
        assert_eq!(
            header.signature, MTX_SIGNATURE_CURRENT,
            "MTX signature mismatch: 0x{:08X}",
            header.signature
        );

        self.clear();

        self.format = header.pixel_format;
        self.width = header.texture_width;
        self.height = header.texture_height;
        self.stride = header.texture_stride;
        self.mipmap = 0;

        self.clut_format = header.clut_format;
        self.clut_entries = header.clut_entries;
        self.swizzled = header.is_swizzled();
        self.vram_size = header.vram_allocation_size;

        // Palette offset counts from the start of pixel data, not the block
        let clut_offset = MtxHeader::SIZE + header.palette_offset as usize;

        tracing::trace!(
            "took over MTX block: {}x{} format {} ({} bytes), clut at +{}",
            self.width,
            self.height,
            self.format,
            block.as_ref().len(),
            header.palette_offset
        );

        self.storage = TextureStorage::Container { block, clut_offset };
    }

    /// Release owned memory and reset every field.
    ///
    /// Calling this on an empty descriptor does nothing.
    pub fn clear(&mut self) {
        match std::mem::take(&mut self.storage) {
            TextureStorage::Container { block, .. } => {
                tracing::trace!("releasing MTX block ({} bytes)", block.as_ref().len());
                drop(block);
            }
            TextureStorage::Data { buffer } => {
                tracing::trace!("releasing pixel buffer ({} bytes)", buffer.as_ref().len());
                drop(buffer);
            }
            TextureStorage::Empty => {}
        }

        self.format = 0;
        self.width = 0;
        self.height = 0;
        self.stride = 0;
        self.mipmap = 0;
        self.clut_format = 0;
        self.clut_entries = 0;
        self.swizzled = false;
        self.vram_size = 0;
    }

    pub fn storage(&self) -> &TextureStorage<B> {
        &self.storage
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.storage, TextureStorage::Empty)
    }

    /// True when the descriptor owns a whole block rather than a bare buffer
    pub fn is_container(&self) -> bool {
        matches!(self.storage, TextureStorage::Container { .. })
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_u32(self.format)
    }

    /// Offset of pixel data within the owned memory
    pub fn data_offset(&self) -> Option<usize> {
        match self.storage {
            TextureStorage::Container { .. } => Some(MtxHeader::SIZE),
            TextureStorage::Data { .. } => Some(0),
            TextureStorage::Empty => None,
        }
    }

    /// Offset of the palette within the owned block
    pub fn clut_offset(&self) -> Option<usize> {
        match self.storage {
            TextureStorage::Container { clut_offset, .. } => Some(clut_offset),
            _ => None,
        }
    }

    /// Pixel data, through the end of the owned memory
    pub fn data(&self) -> &[u8] {
        match &self.storage {
            TextureStorage::Container { block, .. } => &block.as_ref()[MtxHeader::SIZE..],
            TextureStorage::Data { buffer } => buffer.as_ref(),
            TextureStorage::Empty => &[],
        }
    }

    /// Palette bytes, if the texture has one and it lies inside the block.
    ///
    /// The slice length comes from `clut_format × clut_entries`; with an
    /// unknown CLUT format it runs to the end of the block.
    pub fn clut(&self) -> Option<&[u8]> {
        let TextureStorage::Container { block, clut_offset } = &self.storage else {
            return None;
        };
        if self.clut_entries == 0 {
            return None;
        }
        let block = block.as_ref();
        let end = match PixelFormat::from_u32(self.clut_format) {
            Some(format) => {
                let size = self.clut_entries as usize * format.bits_per_pixel() as usize / 8;
                clut_offset.checked_add(size)?
            }
            None => block.len(),
        };
        block.get(*clut_offset..end)
    }

    /// Owned memory, including the header for a taken-over block
    pub fn memory(&self) -> Option<&[u8]> {
        match &self.storage {
            TextureStorage::Container { block, .. } => Some(block.as_ref()),
            TextureStorage::Data { buffer } => Some(buffer.as_ref()),
            TextureStorage::Empty => None,
        }
    }
}

impl<B: AsRef<[u8]>> Drop for PspTexture<B> {
    fn drop(&mut self) {
        self.clear();
    }
}
