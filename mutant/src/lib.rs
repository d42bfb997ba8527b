//! Mutant: binary animation archive codec
//!
//! Serializes a hierarchical animation scene (characters, skeleton
//! hierarchies, clips, bundles and per-track keyframes) to a flat
//! little-endian byte stream and reads it back.
//!
//! # Archive Layout
//!
//! ```text
//! archive    = u32 char_count, character[char_count]
//! character  = string name, u32 hier_count, u32 clip_count,
//!              hierarchy[hier_count], clip[clip_count]
//! hierarchy  = string name, u32 node_count, node[node_count]
//! node       = string name, u32 child_count, u32 child_index[child_count]
//! clip       = string name, u32 flags, f32 clip_length, u32 bundle_count,
//!              bundle[bundle_count]
//! bundle     = string name, u32 track_count, track[track_count]
//!              (all float tracks, then all string tracks)
//! track      = u32 kind, string name, u32 key_count,
//!              f32 time[key_count], value[key_count]
//! value      = f32            (kind == ANIM_FLOAT)
//!            | string         (kind == ANIM_STRING)
//! string     = u32 byte_len, u8 utf8[byte_len]
//! ```
//!
//! Name-keyed collections are written in insertion order (see
//! [`NamedMap`]), so the same tree always produces the same bytes.
//!
//! # Errors
//!
//! Every failure collapses into [`ArchiveError`]: a short stream or a
//! structurally invalid one is `CorruptOrTruncatedArchive`, anything else the
//! stream reports is `Io`. There is no partial success.
//!
//! # Usage
//!
//! ```
//! use mutant::{Bundle, Character, CharacterSet, Clip, FloatTrack, Hierarchy};
//!
//! let mut skeleton = Hierarchy::new("skeleton");
//! let root = skeleton.add_node("root");
//! skeleton.add_child(root, "spine");
//!
//! let mut bundle = Bundle::new();
//! bundle.insert_float("rot.y", [(0.0, 0.0), (1.0, 90.0)].into_iter().collect::<FloatTrack>());
//!
//! let mut walk = Clip::new(1.0);
//! walk.insert("spine", bundle);
//!
//! let mut hero = Character::new();
//! hero.add_hierarchy(skeleton);
//! hero.insert_clip("walk", walk);
//!
//! let mut set = CharacterSet::new();
//! set.insert("hero", hero);
//!
//! let bytes = mutant::write_archive(&set).unwrap();
//! assert_eq!(mutant::read_archive(&bytes).unwrap(), set);
//! ```

mod error;
mod hierarchy;
mod io;
mod model;
mod named_map;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use error::ArchiveError;
pub use hierarchy::{Hierarchy, HierarchyError, Node};
pub use io::{BinaryInput, BinaryOutput};
pub use model::{
    AnimKind, AnimationData, Bundle, Character, CharacterSet, Clip, FloatTrack, Keyframe,
    StringTrack, TrackValue,
};
pub use named_map::NamedMap;
pub use reader::{MutantReader, read_archive};
pub use writer::{MutantWriter, write_archive};

// =============================================================================
// Constants
// =============================================================================

/// Track kind tag for float-valued tracks
pub const ANIM_FLOAT: u32 = 0;

/// Track kind tag for string-valued tracks
pub const ANIM_STRING: u32 = 1;

/// Conventional file extension for archives
pub const MUTANT_EXT: &str = "mut";
