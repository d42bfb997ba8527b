//! Archive commands (JSON <-> .mut, check, dump)

use anyhow::{Context, Result, bail};
use mutant::{AnimKind, CharacterSet, MutantReader, MutantWriter};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Counts of everything stored in an archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub characters: usize,
    pub hierarchies: usize,
    pub nodes: usize,
    pub clips: usize,
    pub bundles: usize,
    pub float_tracks: usize,
    pub string_tracks: usize,
    pub keys: usize,
}

impl ArchiveSummary {
    pub fn of(char_set: &CharacterSet) -> Self {
        let mut summary = Self {
            characters: char_set.len(),
            ..Self::default()
        };

        for (_, character) in char_set.iter() {
            summary.hierarchies += character.hierarchies.len();
            summary.nodes += character.hierarchies.iter().map(|h| h.len()).sum::<usize>();
            summary.clips += character.clips.len();

            for clip in character.clips.values() {
                summary.bundles += clip.bundles.len();
                for bundle in clip.bundles.values() {
                    summary.float_tracks += bundle.float_tracks.len();
                    summary.string_tracks += bundle.string_tracks.len();
                    summary.keys += bundle.float_tracks.values().map(|t| t.len()).sum::<usize>();
                    summary.keys += bundle.string_tracks.values().map(|t| t.len()).sum::<usize>();
                }
            }
        }
        summary
    }
}

impl fmt::Display for ArchiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} characters, {} hierarchies ({} nodes), {} clips, {} bundles, \
             {} float tracks, {} string tracks, {} keys",
            self.characters,
            self.hierarchies,
            self.nodes,
            self.clips,
            self.bundles,
            self.float_tracks,
            self.string_tracks,
            self.keys
        )
    }
}

/// Read a JSON scene description
pub fn load_json(input: &Path) -> Result<CharacterSet> {
    let file = File::open(input).with_context(|| format!("Failed to open {:?}", input))?;
    let char_set: CharacterSet = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse scene description {:?}", input))?;

    // Reject hierarchies the reader would refuse
    for (char_name, character) in char_set.iter() {
        for hierarchy in &character.hierarchies {
            if let Err(e) = hierarchy.validate() {
                bail!(
                    "Character '{}', hierarchy '{}': {}",
                    char_name,
                    hierarchy.name,
                    e
                );
            }
        }
    }
    Ok(char_set)
}

/// Read an archive, requiring the file to contain nothing else
pub fn load_archive(input: &Path) -> Result<CharacterSet> {
    let file = File::open(input).with_context(|| format!("Failed to open {:?}", input))?;
    MutantReader::new(BufReader::new(file))
        .read_to_end()
        .with_context(|| format!("Failed to read archive {:?}", input))
}

/// Write an archive file
pub fn save_archive(char_set: &CharacterSet, output: &Path) -> Result<()> {
    let file = File::create(output).with_context(|| format!("Failed to create {:?}", output))?;
    let mut writer = MutantWriter::new(BufWriter::new(file));
    writer
        .write(char_set)
        .with_context(|| format!("Failed to write archive {:?}", output))?;
    writer
        .finish()
        .with_context(|| format!("Failed to flush {:?}", output))?;
    Ok(())
}

/// JSON scene description -> archive
pub fn pack(input: &Path, output: &Path) -> Result<ArchiveSummary> {
    let char_set = load_json(input)?;
    save_archive(&char_set, output)?;

    let summary = ArchiveSummary::of(&char_set);
    tracing::info!("Packed {}", summary);
    Ok(summary)
}

/// Archive -> pretty-printed JSON
pub fn unpack(input: &Path, output: &Path) -> Result<ArchiveSummary> {
    let char_set = load_archive(input)?;

    let file = File::create(output).with_context(|| format!("Failed to create {:?}", output))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &char_set)
        .with_context(|| format!("Failed to write JSON {:?}", output))?;

    let summary = ArchiveSummary::of(&char_set);
    tracing::info!("Unpacked {}", summary);
    Ok(summary)
}

/// Render the archive tree as indented text
pub fn dump(char_set: &CharacterSet) -> String {
    let mut out = String::new();

    for (char_name, character) in char_set.iter() {
        out.push_str(&format!("character '{}'\n", char_name));

        for hierarchy in &character.hierarchies {
            out.push_str(&format!(
                "  hierarchy '{}' ({} nodes)\n",
                hierarchy.name,
                hierarchy.len()
            ));
            for (i, node) in hierarchy.nodes.iter().enumerate() {
                out.push_str(&format!("    [{}] {} -> {:?}\n", i, node.name, node.children));
            }
        }

        for (clip_name, clip) in character.clips.iter() {
            out.push_str(&format!(
                "  clip '{}' length={} flags=0x{:08X}\n",
                clip_name, clip.clip_length, clip.flags
            ));
            for (bundle_name, bundle) in clip.bundles.iter() {
                out.push_str(&format!(
                    "    bundle '{}' ({} tracks)\n",
                    bundle_name,
                    bundle.track_count()
                ));
                let float_tracks = bundle
                    .float_tracks
                    .iter()
                    .map(|(name, track)| (AnimKind::Float, name, track.len()));
                let string_tracks = bundle
                    .string_tracks
                    .iter()
                    .map(|(name, track)| (AnimKind::String, name, track.len()));

                for (kind, name, keys) in float_tracks.chain(string_tracks) {
                    out.push_str(&format!(
                        "      {:<6} '{}': {} keys\n",
                        kind.name(),
                        name,
                        keys
                    ));
                }
            }
        }
    }
    out
}
