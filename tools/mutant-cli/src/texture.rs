//! MTX texture block commands

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use mutalisk::{MtxHeader, PixelFormat, PspTexture, encode_mtx};
use std::fmt;
use std::path::Path;

/// Pixel format names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[value(name = "5650")]
    Psm5650,
    #[value(name = "5551")]
    Psm5551,
    #[value(name = "4444")]
    Psm4444,
    #[value(name = "8888")]
    Psm8888,
    T4,
    T8,
    T16,
    T32,
    Dxt1,
    Dxt3,
    Dxt5,
}

impl From<FormatArg> for PixelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Psm5650 => PixelFormat::Psm5650,
            FormatArg::Psm5551 => PixelFormat::Psm5551,
            FormatArg::Psm4444 => PixelFormat::Psm4444,
            FormatArg::Psm8888 => PixelFormat::Psm8888,
            FormatArg::T4 => PixelFormat::T4,
            FormatArg::T8 => PixelFormat::T8,
            FormatArg::T16 => PixelFormat::T16,
            FormatArg::T32 => PixelFormat::T32,
            FormatArg::Dxt1 => PixelFormat::Dxt1,
            FormatArg::Dxt3 => PixelFormat::Dxt3,
            FormatArg::Dxt5 => PixelFormat::Dxt5,
        }
    }
}

/// Parameters for building an MTX block from raw pixel data
#[derive(Debug, Clone)]
pub struct TexturePackOptions {
    pub width: u32,
    pub height: u32,
    /// Row length in pixels (defaults to width)
    pub stride: Option<u32>,
    pub format: PixelFormat,
    /// Palette entry format (defaults to 8888)
    pub clut_format: PixelFormat,
    pub swizzle: bool,
}

/// Build an MTX block from raw pixels and an optional raw palette
pub fn build_block(
    pixels: &[u8],
    palette: Option<&[u8]>,
    opts: &TexturePackOptions,
) -> Result<Vec<u8>> {
    let stride = opts.stride.unwrap_or(opts.width);
    if stride < opts.width {
        bail!("Stride {} is smaller than width {}", stride, opts.width);
    }

    let expected = opts.format.data_size(stride, opts.height);
    if pixels.len() < expected {
        bail!(
            "Pixel data too small: {} bytes, {:?} {}x{} needs {}",
            pixels.len(),
            opts.format,
            stride,
            opts.height,
            expected
        );
    }

    let mut header = MtxHeader::new(opts.format, opts.width, opts.height, stride)
        .with_swizzle(opts.swizzle);

    if let Some(palette) = palette {
        if !opts.format.is_indexed() {
            tracing::warn!("Palette given for non-indexed format {:?}", opts.format);
        }
        let entry_size = (opts.clut_format.bits_per_pixel() / 8) as usize;
        if entry_size == 0 || palette.len() % entry_size != 0 {
            bail!(
                "Palette size {} is not a multiple of the {:?} entry size",
                palette.len(),
                opts.clut_format
            );
        }
        let entries = u32::try_from(palette.len() / entry_size)
            .context("Palette has too many entries for the header")?;
        header = header.with_clut(opts.clut_format, entries);
    } else if opts.format.is_indexed() {
        bail!("Indexed format {:?} requires a palette", opts.format);
    }

    encode_mtx(header, pixels, palette).context("Failed to encode MTX block")
}

/// Read raw pixel (and palette) files and write an MTX block
pub fn pack(
    pixels_path: &Path,
    palette_path: Option<&Path>,
    output: &Path,
    opts: &TexturePackOptions,
) -> Result<()> {
    let pixels =
        std::fs::read(pixels_path).with_context(|| format!("Failed to read {:?}", pixels_path))?;
    let palette = palette_path
        .map(|p| std::fs::read(p).with_context(|| format!("Failed to read {:?}", p)))
        .transpose()?;

    let block = build_block(&pixels, palette.as_deref(), opts)?;
    std::fs::write(output, &block).with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Wrote {}x{} {:?} texture ({} bytes)",
        opts.width,
        opts.height,
        opts.format,
        block.len()
    );
    Ok(())
}

/// Description of a taken-over texture block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub format: Option<PixelFormat>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub clut_entries: u32,
    pub clut_bytes: Option<usize>,
    pub swizzled: bool,
    pub data_bytes: usize,
    pub vram_size: u32,
}

impl fmt::Display for TextureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = self
            .format
            .map(|p| format!("{:?}", p))
            .unwrap_or_else(|| "unknown".to_string());
        writeln!(f, "format:   {}", format)?;
        writeln!(f, "size:     {}x{} (stride {})", self.width, self.height, self.stride)?;
        writeln!(f, "swizzled: {}", if self.swizzled { "yes" } else { "no" })?;
        writeln!(f, "data:     {} bytes", self.data_bytes)?;
        match self.clut_bytes {
            Some(bytes) => writeln!(f, "clut:     {} entries, {} bytes", self.clut_entries, bytes)?,
            None => writeln!(f, "clut:     none")?,
        }
        write!(f, "vram:     {} bytes", self.vram_size)
    }
}

/// Take over a block and describe it.
///
/// The header is checked first so that a bad file is an error here rather
/// than a takeover assertion.
pub fn inspect_block(block: Vec<u8>) -> Result<TextureInfo> {
    let header = MtxHeader::from_bytes(&block).context("File too small for an MTX header")?;
    if !header.is_current() {
        bail!("Not an MTX block (signature 0x{:08X})", header.signature);
    }

    let texture: PspTexture = PspTexture::from_memory(block.into_boxed_slice());
    Ok(TextureInfo {
        format: texture.pixel_format(),
        width: texture.width,
        height: texture.height,
        stride: texture.stride,
        clut_entries: texture.clut_entries,
        clut_bytes: texture.clut().map(<[u8]>::len),
        swizzled: texture.swizzled,
        data_bytes: texture.data().len(),
        vram_size: texture.vram_size,
    })
}

pub fn info(input: &Path) -> Result<TextureInfo> {
    let block = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;
    inspect_block(block).with_context(|| format!("Invalid texture {:?}", input))
}
