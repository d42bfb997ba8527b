//! Archive reader
//!
//! Mirrors [`MutantWriter`](crate::MutantWriter) field for field. Anything
//! that does not decode into a well-formed tree is reported as
//! [`ArchiveError::CorruptOrTruncatedArchive`].

use std::io::{self, Read};

use crate::error::{ArchiveError, corrupt};
use crate::hierarchy::{Hierarchy, Node};
use crate::io::{BinaryInput, MAX_PREALLOC};
use crate::model::{AnimKind, AnimationData, Bundle, Character, CharacterSet, Clip, TrackValue};
use crate::named_map::NamedMap;

/// Rebuilds a [`CharacterSet`] from a byte stream
pub struct MutantReader<R: Read> {
    input: R,
}

impl<R: Read> MutantReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Read one complete archive from the current stream position
    pub fn read(&mut self) -> Result<CharacterSet, ArchiveError> {
        self.read_character_set().map_err(ArchiveError::from_io)
    }

    /// Read one archive and require the stream to end right after it
    pub fn read_to_end(&mut self) -> Result<CharacterSet, ArchiveError> {
        let char_set = self.read()?;

        let mut probe = [0u8; 1];
        match self.input.read(&mut probe) {
            Ok(0) => Ok(char_set),
            Ok(_) => {
                tracing::debug!("trailing bytes after archive");
                Err(ArchiveError::CorruptOrTruncatedArchive)
            }
            Err(e) => Err(ArchiveError::from_io(e)),
        }
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    fn read_character_set(&mut self) -> io::Result<CharacterSet> {
        let char_count = self.input.read_count()?;

        let mut characters = NamedMap::with_capacity(char_count.min(MAX_PREALLOC));
        for _ in 0..char_count {
            let (name, character) = self.read_character_data()?;
            insert_unique(&mut characters, "character", name, character)?;
        }
        Ok(CharacterSet { characters })
    }

    fn read_character_data(&mut self) -> io::Result<(String, Character)> {
        let char_name = self.input.read_string()?;
        let hierarchy_count = self.input.read_count()?;
        let clip_count = self.input.read_count()?;

        let mut hierarchies = Vec::with_capacity(hierarchy_count.min(MAX_PREALLOC));
        for _ in 0..hierarchy_count {
            hierarchies.push(self.read_hierarchy_data()?);
        }

        let mut clips = NamedMap::with_capacity(clip_count.min(MAX_PREALLOC));
        for _ in 0..clip_count {
            let (name, clip) = self.read_clip_data()?;
            insert_unique(&mut clips, "clip", name, clip)?;
        }

        tracing::debug!(
            "read character '{}': {} hierarchies, {} clips",
            char_name,
            hierarchies.len(),
            clips.len()
        );
        Ok((char_name, Character { hierarchies, clips }))
    }

    fn read_hierarchy_data(&mut self) -> io::Result<Hierarchy> {
        let name = self.input.read_string()?;
        let node_count = self.input.read_count()?;

        let mut nodes = Vec::with_capacity(node_count.min(MAX_PREALLOC));
        for _ in 0..node_count {
            let name = self.input.read_string()?;
            let child_count = self.input.read_count()?;
            let children = self.input.read_dwords(child_count)?;
            nodes.push(Node { name, children });
        }

        let hierarchy = Hierarchy { name, nodes };
        hierarchy
            .validate()
            .map_err(|e| corrupt(format!("hierarchy '{}': {}", hierarchy.name, e)))?;
        Ok(hierarchy)
    }

    fn read_clip_data(&mut self) -> io::Result<(String, Clip)> {
        let clip_name = self.input.read_string()?;
        let flags = self.input.read_dword()?;
        let clip_length = self.input.read_float()?;
        let bundle_count = self.input.read_count()?;

        let mut bundles = NamedMap::with_capacity(bundle_count.min(MAX_PREALLOC));
        for _ in 0..bundle_count {
            let (name, bundle) = self.read_bundle_data()?;
            insert_unique(&mut bundles, "bundle", name, bundle)?;
        }

        Ok((
            clip_name,
            Clip {
                flags,
                clip_length,
                bundles,
            },
        ))
    }

    fn read_bundle_data(&mut self) -> io::Result<(String, Bundle)> {
        let bundle_name = self.input.read_string()?;
        let anim_count = self.input.read_count()?;

        let mut bundle = Bundle::new();
        for _ in 0..anim_count {
            let tag = self.input.read_dword()?;
            match AnimKind::from_u32(tag) {
                Some(AnimKind::Float) => {
                    let (name, track) = self.read_animation_data::<f32>()?;
                    insert_unique(&mut bundle.float_tracks, "float track", name, track)?;
                }
                Some(AnimKind::String) => {
                    let (name, track) = self.read_animation_data::<String>()?;
                    insert_unique(&mut bundle.string_tracks, "string track", name, track)?;
                }
                None => {
                    return Err(corrupt(format!(
                        "bundle '{}': unknown track kind {}",
                        bundle_name, tag
                    )));
                }
            }
        }
        Ok((bundle_name, bundle))
    }

    fn read_animation_data<V: TrackValue>(&mut self) -> io::Result<(String, AnimationData<V>)> {
        let name = self.input.read_string()?;
        let key_count = self.input.read_count()?;
        let times = self.input.read_floats(key_count)?;

        let mut track = AnimationData::new();
        track.keys.reserve(key_count.min(MAX_PREALLOC));
        for time in times {
            let value = V::read_value(&mut self.input)?;
            track.push(time, value);
        }
        Ok((name, track))
    }
}

/// Names are unique per collection; the writer cannot emit a repeat
fn insert_unique<T>(map: &mut NamedMap<T>, what: &str, name: String, value: T) -> io::Result<()> {
    if map.contains(&name) {
        return Err(corrupt(format!("duplicate {} name '{}'", what, name)));
    }
    map.insert(name, value);
    Ok(())
}

/// Decode an archive held in memory, rejecting trailing bytes
pub fn read_archive(bytes: &[u8]) -> Result<CharacterSet, ArchiveError> {
    MutantReader::new(bytes).read_to_end()
}
