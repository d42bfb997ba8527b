//! Archive writer

use std::io::{self, Write};

use crate::error::ArchiveError;
use crate::hierarchy::Hierarchy;
use crate::io::BinaryOutput;
use crate::model::{AnimationData, Bundle, Character, CharacterSet, Clip, TrackValue};

/// Serializes a [`CharacterSet`] into a byte stream
///
/// # Example
/// ```
/// use mutant::{Character, CharacterSet, MutantWriter};
///
/// let mut set = CharacterSet::new();
/// set.insert("hero", Character::new());
///
/// let mut bytes = Vec::new();
/// MutantWriter::new(&mut bytes).write(&set).unwrap();
/// assert_eq!(&bytes[..4], &1u32.to_le_bytes());
/// ```
pub struct MutantWriter<W: Write> {
    output: W,
}

impl<W: Write> MutantWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    /// Write a complete archive.
    ///
    /// On failure the stream may hold a partial archive and should be
    /// discarded.
    pub fn write(&mut self, char_set: &CharacterSet) -> Result<(), ArchiveError> {
        self.write_character_set(char_set)
            .map_err(ArchiveError::from_io)
    }

    /// Flush and return the underlying stream
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        self.output.flush().map_err(ArchiveError::from_io)?;
        Ok(self.output)
    }

    fn write_character_set(&mut self, char_set: &CharacterSet) -> io::Result<()> {
        self.output.write_count(char_set.len())?;

        for (char_name, character) in char_set.iter() {
            self.write_character_data(char_name, character)?;
        }
        Ok(())
    }

    fn write_character_data(&mut self, char_name: &str, character: &Character) -> io::Result<()> {
        tracing::debug!(
            "writing character '{}': {} hierarchies, {} clips",
            char_name,
            character.hierarchies.len(),
            character.clips.len()
        );

        self.output.write_string(char_name)?;

        // Both counts come first; hierarchies are always emitted before clips
        self.output.write_count(character.hierarchies.len())?;
        self.output.write_count(character.clips.len())?;

        for hierarchy in &character.hierarchies {
            self.write_hierarchy_data(hierarchy)?;
        }

        for (clip_name, clip) in character.clips.iter() {
            self.write_clip_data(clip_name, clip)?;
        }
        Ok(())
    }

    fn write_hierarchy_data(&mut self, hierarchy: &Hierarchy) -> io::Result<()> {
        self.output.write_string(&hierarchy.name)?;
        self.output.write_count(hierarchy.nodes.len())?;

        for node in &hierarchy.nodes {
            self.output.write_string(&node.name)?;
            self.output.write_count(node.children.len())?;
            self.output.write_dwords(&node.children)?;
        }
        Ok(())
    }

    fn write_clip_data(&mut self, clip_name: &str, clip: &Clip) -> io::Result<()> {
        self.output.write_string(clip_name)?;
        self.output.write_dword(clip.flags)?;
        self.output.write_float(clip.clip_length)?;
        self.output.write_count(clip.bundles.len())?;

        for (bundle_name, bundle) in clip.bundles.iter() {
            self.write_bundle_data(bundle_name, bundle)?;
        }
        Ok(())
    }

    pub(crate) fn write_bundle_data(
        &mut self,
        bundle_name: &str,
        bundle: &Bundle,
    ) -> io::Result<()> {
        self.output.write_string(bundle_name)?;
        self.output.write_count(bundle.track_count())?;

        // Float tracks first, then string tracks, whatever the insertion order
        for (name, track) in bundle.float_tracks.iter() {
            self.write_animation_data(name, track)?;
        }
        for (name, track) in bundle.string_tracks.iter() {
            self.write_animation_data(name, track)?;
        }
        Ok(())
    }

    fn write_animation_data<V: TrackValue>(
        &mut self,
        name: &str,
        track: &AnimationData<V>,
    ) -> io::Result<()> {
        self.output.write_dword(V::KIND.as_u32())?;
        self.output.write_string(name)?;
        self.output.write_count(track.len())?;

        let times: Vec<f32> = track.times().collect();
        self.output.write_floats(&times)?;
        for key in &track.keys {
            key.value.write_value(&mut self.output)?;
        }
        Ok(())
    }
}

/// Serialize a character set into a new byte buffer
pub fn write_archive(char_set: &CharacterSet) -> Result<Vec<u8>, ArchiveError> {
    let mut bytes = Vec::new();
    MutantWriter::new(&mut bytes).write(char_set)?;
    Ok(bytes)
}
