//! Mutalisk: platform data layer
//!
//! Runtime-side asset descriptors built directly on top of the memory the
//! loader hands over. The only platform here is the PSP.
//!
//! # Modules
//!
//! - [`formats`] - MTX texture block layout and the offline encoder
//! - [`psp`] - PSP texture descriptor with in-place block takeover
//!
//! # Usage
//!
//! ```
//! use mutalisk::formats::{MtxHeader, PixelFormat, encode_mtx};
//! use mutalisk::psp::PspTexture;
//!
//! let header = MtxHeader::new(PixelFormat::T8, 16, 16, 16).with_clut(PixelFormat::Psm8888, 4);
//! let block = encode_mtx(header, &[0u8; 256], Some(&[0xFFu8; 16])).unwrap();
//!
//! let texture: PspTexture = PspTexture::from_memory(block.into_boxed_slice());
//! assert_eq!(texture.width, 16);
//! assert_eq!(texture.clut().map(<[u8]>::len), Some(16));
//! ```

pub mod formats;
pub mod psp;

pub use formats::{MTX_SIGNATURE_CURRENT, MtxError, MtxHeader, PixelFormat, encode_mtx};
pub use psp::{PspTexture, TextureStorage};
