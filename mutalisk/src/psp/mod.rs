//! PSP platform data

mod texture;


pub use texture::{PspTexture, TextureStorage};
