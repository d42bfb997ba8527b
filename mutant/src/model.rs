//! Animation scene data model
//!
//! ```text
//! CharacterSet
//! └── Character (by name)
//!     ├── Hierarchy[]          (written first)
//!     └── Clip (by name)       (written second)
//!         └── Bundle (by name)
//!             ├── float tracks  (ANIM_FLOAT)
//!             └── string tracks (ANIM_STRING)
//! ```
//!
//! The codec reads these structures during write and rebuilds equal ones
//! during read. It never creates or mutates producer-owned trees otherwise.

use std::io;

use serde::{Deserialize, Serialize};

use crate::hierarchy::Hierarchy;
use crate::io::{BinaryInput, BinaryOutput};
use crate::named_map::NamedMap;
use crate::{ANIM_FLOAT, ANIM_STRING};

/// Track kind discriminant, stored as a dword before each track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AnimKind {
    Float = ANIM_FLOAT,
    String = ANIM_STRING,
}

impl AnimKind {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            ANIM_FLOAT => Some(AnimKind::Float),
            ANIM_STRING => Some(AnimKind::String),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            AnimKind::Float => "float",
            AnimKind::String => "string",
        }
    }
}

/// Value type that can be stored in an animation track
pub trait TrackValue: Sized {
    const KIND: AnimKind;

    fn write_value<W: BinaryOutput + ?Sized>(&self, out: &mut W) -> io::Result<()>;

    fn read_value<R: BinaryInput + ?Sized>(input: &mut R) -> io::Result<Self>;
}

impl TrackValue for f32 {
    const KIND: AnimKind = AnimKind::Float;

    fn write_value<W: BinaryOutput + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_float(*self)
    }

    fn read_value<R: BinaryInput + ?Sized>(input: &mut R) -> io::Result<Self> {
        input.read_float()
    }
}

impl TrackValue for String {
    const KIND: AnimKind = AnimKind::String;

    fn write_value<W: BinaryOutput + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_string(self)
    }

    fn read_value<R: BinaryInput + ?Sized>(input: &mut R) -> io::Result<Self> {
        input.read_string()
    }
}

/// Single key of a track
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe<V> {
    pub time: f32,
    pub value: V,
}

/// Timeline of keyed values
///
/// Keys are kept in the order they were added; the codec does not sort them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationData<V> {
    pub keys: Vec<Keyframe<V>>,
}

pub type FloatTrack = AnimationData<f32>;
pub type StringTrack = AnimationData<String>;

impl<V> AnimationData<V> {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn push(&mut self, time: f32, value: V) {
        self.keys.push(Keyframe { time, value });
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn times(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.keys.iter().map(|k| k.time)
    }

    /// Time of the last key, or 0 for an empty track
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }
}

impl<V> Default for AnimationData<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(f32, V)> for AnimationData<V> {
    fn from_iter<I: IntoIterator<Item = (f32, V)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(time, value)| Keyframe { time, value })
                .collect(),
        }
    }
}

/// Named group of tracks, partitioned by value kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub float_tracks: NamedMap<FloatTrack>,
    #[serde(default)]
    pub string_tracks: NamedMap<StringTrack>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_float(&mut self, name: impl Into<String>, track: FloatTrack) -> Option<FloatTrack> {
        self.float_tracks.insert(name, track)
    }

    pub fn insert_string(
        &mut self,
        name: impl Into<String>,
        track: StringTrack,
    ) -> Option<StringTrack> {
        self.string_tracks.insert(name, track)
    }

    /// Total track count across both kinds
    pub fn track_count(&self) -> usize {
        self.float_tracks.len() + self.string_tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_count() == 0
    }
}

/// Named animation unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Clip {
    /// Opaque bitmask owned by the producer
    #[serde(default)]
    pub flags: u32,
    /// Clip length; seconds or frames by producer convention
    pub clip_length: f32,
    #[serde(default)]
    pub bundles: NamedMap<Bundle>,
}

impl Clip {
    pub fn new(clip_length: f32) -> Self {
        Self {
            flags: 0,
            clip_length,
            bundles: NamedMap::new(),
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bundle: Bundle) -> Option<Bundle> {
        self.bundles.insert(name, bundle)
    }

    pub fn track_count(&self) -> usize {
        self.bundles.values().map(Bundle::track_count).sum()
    }
}

/// Animated character: skeleton hierarchies plus named clips
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub hierarchies: Vec<Hierarchy>,
    #[serde(default)]
    pub clips: NamedMap<Clip>,
}

impl Character {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hierarchy(&mut self, hierarchy: Hierarchy) {
        self.hierarchies.push(hierarchy);
    }

    pub fn insert_clip(&mut self, name: impl Into<String>, clip: Clip) -> Option<Clip> {
        self.clips.insert(name, clip)
    }
}

/// Root of an archive: characters keyed by unique name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterSet {
    pub characters: NamedMap<Character>,
}

impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, character: Character) -> Option<Character> {
        self.characters.insert(name, character)
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Character)> {
        self.characters.iter()
    }
}
