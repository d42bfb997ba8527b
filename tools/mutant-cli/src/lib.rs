//! mutant-cli library
//!
//! Command implementations shared by the `mutant-tool` binary and its tests.

pub mod archive;
pub mod texture;

pub use archive::ArchiveSummary;
pub use texture::{TextureInfo, TexturePackOptions};
