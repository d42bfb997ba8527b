//! Archive round-trip and corruption tests

use std::io::{self, Cursor, Write};

use super::*;

// ========================================================================
// Fixtures
// ========================================================================

fn skeleton(name: &str) -> Hierarchy {
    let mut h = Hierarchy::new(name);
    let root = h.add_node("root");
    let pelvis = h.add_child(root, "pelvis");
    let spine = h.add_child(pelvis, "spine");
    h.add_child(spine, "head");
    h.add_child(pelvis, "l_leg");
    h.add_child(pelvis, "r_leg");
    h
}

fn float_track(n: usize, scale: f32) -> FloatTrack {
    (0..n).map(|i| (i as f32 / 30.0, i as f32 * scale)).collect()
}

fn event_track(events: &[&str]) -> StringTrack {
    events
        .iter()
        .enumerate()
        .map(|(i, e)| (i as f32 * 0.5, e.to_string()))
        .collect()
}

fn walk_clip() -> Clip {
    let mut root = Bundle::new();
    root.insert_float("pos.x", float_track(4, 0.1));
    root.insert_float("pos.z", float_track(4, -0.2));
    root.insert_string("footstep", event_track(&["left", "right"]));

    let mut spine = Bundle::new();
    spine.insert_float("rot.y", float_track(3, 15.0));

    let mut clip = Clip::new(1.5).with_flags(0x0000_0003);
    clip.insert("root", root);
    clip.insert("spine", spine);
    clip
}

fn sample_set() -> CharacterSet {
    let mut hero = Character::new();
    hero.add_hierarchy(skeleton("body"));
    hero.add_hierarchy(Hierarchy::new("empty"));
    hero.insert_clip("walk", walk_clip());
    hero.insert_clip("idle", Clip::new(0.0));

    let mut prop = Character::new();
    prop.add_hierarchy(skeleton("crate"));

    let mut set = CharacterSet::new();
    set.insert("hero", hero);
    set.insert("prop", prop);
    set.insert("nobody", Character::new());
    set
}

/// Sink that accepts `limit` bytes then fails with the given kind
struct FailingWriter {
    written: usize,
    limit: usize,
    kind: io::ErrorKind,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written >= self.limit {
            return Err(io::Error::from(self.kind));
        }
        let n = buf.len().min(self.limit - self.written);
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ========================================================================
// Round Trip
// ========================================================================

#[test]
fn test_roundtrip_sample_set() {
    let set = sample_set();
    let bytes = write_archive(&set).unwrap();
    let decoded = read_archive(&bytes).unwrap();
    assert_eq!(decoded, set);
}

#[test]
fn test_roundtrip_preserves_character_order() {
    let decoded = read_archive(&write_archive(&sample_set()).unwrap()).unwrap();
    let names: Vec<_> = decoded.characters.names().collect();
    assert_eq!(names, ["hero", "prop", "nobody"]);
}

#[test]
fn test_roundtrip_many_characters() {
    let mut set = CharacterSet::new();
    for c in 0..8 {
        let mut character = Character::new();
        for h in 0..(c % 3) {
            character.add_hierarchy(skeleton(&format!("h{}", h)));
        }
        for k in 0..c {
            let mut clip = Clip::new(k as f32).with_flags(k as u32);
            for b in 0..(k % 4) {
                let mut bundle = Bundle::new();
                for t in 0..b {
                    bundle.insert_float(format!("f{}", t), float_track(t + 1, 0.5));
                    bundle.insert_string(format!("s{}", t), event_track(&["a", "bb", ""]));
                }
                clip.insert(format!("b{}", b), bundle);
            }
            character.insert_clip(format!("clip{}", k), clip);
        }
        set.insert(format!("char{}", c), character);
    }

    let bytes = write_archive(&set).unwrap();
    assert_eq!(read_archive(&bytes).unwrap(), set);
}

#[test]
fn test_empty_set_is_four_zero_bytes() {
    let bytes = write_archive(&CharacterSet::new()).unwrap();
    assert_eq!(bytes, [0, 0, 0, 0]);

    let decoded = read_archive(&bytes).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_unicode_names() {
    let mut set = CharacterSet::new();
    set.insert("キャラ", Character::new());
    let bytes = write_archive(&set).unwrap();
    assert_eq!(read_archive(&bytes).unwrap(), set);
}

// ========================================================================
// Layout
// ========================================================================

#[test]
fn test_exact_layout_single_track() {
    let mut bundle = Bundle::new();
    bundle.insert_float("x", [(0.0, 2.0)].into_iter().collect::<FloatTrack>());
    let mut clip = Clip::new(1.0).with_flags(7);
    clip.insert("b", bundle);

    let mut h = Hierarchy::new("h");
    let r = h.add_node("r");
    h.add_child(r, "c");

    let mut character = Character::new();
    character.add_hierarchy(h);
    character.insert_clip("c", clip);
    let mut set = CharacterSet::new();
    set.insert("n", character);

    let mut expected = Vec::new();
    let dw = |v: &mut Vec<u8>, x: u32| v.extend_from_slice(&x.to_le_bytes());
    let fl = |v: &mut Vec<u8>, x: f32| v.extend_from_slice(&x.to_le_bytes());
    let st = |v: &mut Vec<u8>, s: &str| {
        v.extend_from_slice(&(s.len() as u32).to_le_bytes());
        v.extend_from_slice(s.as_bytes());
    };

    dw(&mut expected, 1); // characters
    st(&mut expected, "n");
    dw(&mut expected, 1); // hierarchies
    dw(&mut expected, 1); // clips
    st(&mut expected, "h");
    dw(&mut expected, 2); // nodes
    st(&mut expected, "r");
    dw(&mut expected, 1);
    dw(&mut expected, 1); // child index
    st(&mut expected, "c");
    dw(&mut expected, 0);
    st(&mut expected, "c"); // clip
    dw(&mut expected, 7);
    fl(&mut expected, 1.0);
    dw(&mut expected, 1); // bundles
    st(&mut expected, "b");
    dw(&mut expected, 1); // tracks
    dw(&mut expected, ANIM_FLOAT);
    st(&mut expected, "x");
    dw(&mut expected, 1); // keys
    fl(&mut expected, 0.0);
    fl(&mut expected, 2.0);

    assert_eq!(write_archive(&set).unwrap(), expected);
}

#[test]
fn test_float_tracks_written_before_string_tracks() {
    // String track inserted first; float tracks still lead on the wire
    let mut bundle = Bundle::new();
    bundle.insert_string("event", event_track(&["go"]));
    bundle.insert_float("value", float_track(1, 1.0));

    let mut out = Vec::new();
    MutantWriter::new(&mut out)
        .write_bundle_for_test("b", &bundle)
        .unwrap();

    // name "b" (5 bytes) + track count (4 bytes), then first kind tag
    let first_kind = u32::from_le_bytes(out[9..13].try_into().unwrap());
    assert_eq!(first_kind, ANIM_FLOAT);
    let track_count = u32::from_le_bytes(out[5..9].try_into().unwrap());
    assert_eq!(track_count, 2);
}

#[test]
fn test_kind_partition_after_read() {
    let decoded = read_archive(&write_archive(&sample_set()).unwrap()).unwrap();
    let walk = decoded.get("hero").unwrap().clips.get("walk").unwrap();
    let root = walk.bundles.get("root").unwrap();

    let floats: Vec<_> = root.float_tracks.names().collect();
    let strings: Vec<_> = root.string_tracks.names().collect();
    assert_eq!(floats, ["pos.x", "pos.z"]);
    assert_eq!(strings, ["footstep"]);
    assert_eq!(root.track_count(), 3);
}

#[test]
fn test_hierarchies_precede_clips() {
    let mut character = Character::new();
    // Clip added before the hierarchy
    character.insert_clip("z", Clip::new(0.0));
    character.add_hierarchy(Hierarchy::new("h"));
    let mut set = CharacterSet::new();
    set.insert("c", character);

    let bytes = write_archive(&set).unwrap();
    // count(4) + "c"(5) + hier count(4) + clip count(4) -> hierarchy name
    let name_len = u32::from_le_bytes(bytes[17..21].try_into().unwrap());
    assert_eq!(name_len, 1);
    assert_eq!(bytes[21], b'h');
}

#[test]
fn test_writer_does_not_mutate_input() {
    let set = sample_set();
    let before = set.clone();
    write_archive(&set).unwrap();
    write_archive(&set).unwrap();
    assert_eq!(set, before);
}

#[test]
fn test_output_is_deterministic() {
    let set = sample_set();
    assert_eq!(write_archive(&set).unwrap(), write_archive(&set).unwrap());
}

// ========================================================================
// Failures
// ========================================================================

#[test]
fn test_truncation_at_every_byte() {
    let bytes = write_archive(&sample_set()).unwrap();
    for len in 0..bytes.len() {
        let result = MutantReader::new(&bytes[..len]).read();
        assert!(
            matches!(result, Err(ArchiveError::CorruptOrTruncatedArchive)),
            "truncated at {} of {} bytes decoded as {:?}",
            len,
            bytes.len(),
            result.map(|s| s.len())
        );
    }
}

#[test]
fn test_trailing_bytes_rejected_by_read_archive() {
    let mut bytes = write_archive(&sample_set()).unwrap();
    bytes.push(0);
    assert!(matches!(
        read_archive(&bytes),
        Err(ArchiveError::CorruptOrTruncatedArchive)
    ));

    // The streaming read stops at the end of the archive
    let mut reader = MutantReader::new(Cursor::new(&bytes));
    assert_eq!(reader.read().unwrap(), sample_set());
    assert_eq!(reader.into_inner().position() as usize, bytes.len() - 1);
}

#[test]
fn test_write_into_small_buffer_is_truncation() {
    let full = write_archive(&sample_set()).unwrap();
    let mut buf = vec![0u8; full.len() / 2];
    let result = MutantWriter::new(Cursor::new(&mut buf[..])).write(&sample_set());
    assert!(matches!(result, Err(ArchiveError::CorruptOrTruncatedArchive)));
}

#[test]
fn test_write_exact_buffer_succeeds() {
    let full = write_archive(&sample_set()).unwrap();
    let mut buf = vec![0u8; full.len()];
    MutantWriter::new(Cursor::new(&mut buf[..]))
        .write(&sample_set())
        .unwrap();
    assert_eq!(buf, full);
}

#[test]
fn test_sink_failure_is_io_error() {
    let sink = FailingWriter {
        written: 0,
        limit: 10,
        kind: io::ErrorKind::PermissionDenied,
    };
    match MutantWriter::new(sink).write(&sample_set()) {
        Err(ArchiveError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn test_unknown_track_kind() {
    let mut bundle = Bundle::new();
    bundle.insert_float("x", float_track(2, 1.0));
    let mut clip = Clip::new(1.0);
    clip.insert("b", bundle);
    let mut character = Character::new();
    character.insert_clip("c", clip);
    let mut set = CharacterSet::new();
    set.insert("n", character);

    let mut bytes = write_archive(&set).unwrap();
    // Locate the ANIM_FLOAT tag that follows the bundle header "b" + count 1
    let marker = [1u8, 0, 0, 0, b'b', 1, 0, 0, 0];
    let pos = bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .unwrap()
        + marker.len();
    assert_eq!(&bytes[pos..pos + 4], &ANIM_FLOAT.to_le_bytes());
    bytes[pos..pos + 4].copy_from_slice(&7u32.to_le_bytes());

    assert!(matches!(
        read_archive(&bytes),
        Err(ArchiveError::CorruptOrTruncatedArchive)
    ));
}

#[test]
fn test_out_of_range_child_index() {
    let mut h = Hierarchy::new("h");
    h.add_node("only");
    h.nodes[0].children.push(5);
    let mut character = Character::new();
    character.add_hierarchy(h);
    let mut set = CharacterSet::new();
    set.insert("n", character);

    // The writer does not validate producer data
    let bytes = write_archive(&set).unwrap();
    assert!(matches!(
        read_archive(&bytes),
        Err(ArchiveError::CorruptOrTruncatedArchive)
    ));
}

#[test]
fn test_cyclic_child_index() {
    let mut h = skeleton("h");
    let head = h.find("head").unwrap() as usize;
    h.nodes[head].children.push(0);
    let mut character = Character::new();
    character.add_hierarchy(h);
    let mut set = CharacterSet::new();
    set.insert("n", character);

    let bytes = write_archive(&set).unwrap();
    assert!(read_archive(&bytes).unwrap_err().is_corrupt());
}

#[test]
fn test_garbage_count_fails_cleanly() {
    // Claims 4 billion characters, has none
    let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
    assert!(read_archive(&bytes).unwrap_err().is_corrupt());
}

// ========================================================================
// Hand-built Archives
// ========================================================================

/// Archive holding one character "n" with one clip "c" and one bundle "b"
/// whose track records are written by `tracks`
fn single_bundle_archive(track_count: u32, tracks: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_dword(1).unwrap();
    out.write_string("n").unwrap();
    out.write_dword(0).unwrap();
    out.write_dword(1).unwrap();

    out.write_string("c").unwrap();
    out.write_dword(0).unwrap();
    out.write_float(1.0).unwrap();
    out.write_dword(1).unwrap();

    out.write_string("b").unwrap();
    out.write_dword(track_count).unwrap();
    tracks(&mut out);
    out
}

fn raw_float_track(out: &mut Vec<u8>, name: &str, time: f32, value: f32) {
    out.write_dword(ANIM_FLOAT).unwrap();
    out.write_string(name).unwrap();
    out.write_dword(1).unwrap();
    out.write_float(time).unwrap();
    out.write_float(value).unwrap();
}

fn raw_string_track(out: &mut Vec<u8>, name: &str, time: f32, value: &str) {
    out.write_dword(ANIM_STRING).unwrap();
    out.write_string(name).unwrap();
    out.write_dword(1).unwrap();
    out.write_float(time).unwrap();
    out.write_string(value).unwrap();
}

fn only_bundle(set: &CharacterSet) -> &Bundle {
    set.get("n")
        .and_then(|c| c.clips.get("c"))
        .and_then(|clip| clip.bundles.get("b"))
        .unwrap()
}

#[test]
fn test_string_track_before_float_track_is_partitioned() {
    let bytes = single_bundle_archive(2, |out| {
        raw_string_track(out, "event", 0.5, "footstep");
        raw_float_track(out, "pos.x", 0.25, 3.0);
    });

    let set = read_archive(&bytes).unwrap();
    let bundle = only_bundle(&set);
    assert_eq!(bundle.track_count(), 2);
    assert_eq!(bundle.float_tracks.len(), 1);
    assert_eq!(bundle.string_tracks.len(), 1);

    let pos = bundle.float_tracks.get("pos.x").unwrap();
    assert_eq!(pos.keys, [Keyframe { time: 0.25, value: 3.0 }]);
    let event = bundle.string_tracks.get("event").unwrap();
    assert_eq!(event.keys[0].value, "footstep");
}

#[test]
fn test_same_name_in_both_track_kinds_is_accepted() {
    let bytes = single_bundle_archive(2, |out| {
        raw_float_track(out, "x", 0.0, 1.0);
        raw_string_track(out, "x", 0.0, "one");
    });

    let set = read_archive(&bytes).unwrap();
    assert_eq!(only_bundle(&set).track_count(), 2);
    assert_eq!(write_archive(&set).unwrap(), bytes);
}

#[test]
fn test_duplicate_character_name() {
    let mut bytes = Vec::new();
    bytes.write_dword(2).unwrap();
    for _ in 0..2 {
        bytes.write_string("a").unwrap();
        bytes.write_dword(0).unwrap();
        bytes.write_dword(0).unwrap();
    }
    assert!(read_archive(&bytes).unwrap_err().is_corrupt());
}

#[test]
fn test_duplicate_clip_name() {
    let mut bytes = Vec::new();
    bytes.write_dword(1).unwrap();
    bytes.write_string("n").unwrap();
    bytes.write_dword(0).unwrap();
    bytes.write_dword(2).unwrap();
    for _ in 0..2 {
        bytes.write_string("c").unwrap();
        bytes.write_dword(0).unwrap();
        bytes.write_float(1.0).unwrap();
        bytes.write_dword(0).unwrap();
    }
    assert!(read_archive(&bytes).unwrap_err().is_corrupt());
}

#[test]
fn test_duplicate_bundle_name() {
    let mut bytes = Vec::new();
    bytes.write_dword(1).unwrap();
    bytes.write_string("n").unwrap();
    bytes.write_dword(0).unwrap();
    bytes.write_dword(1).unwrap();
    bytes.write_string("c").unwrap();
    bytes.write_dword(0).unwrap();
    bytes.write_float(1.0).unwrap();
    bytes.write_dword(2).unwrap();
    for _ in 0..2 {
        bytes.write_string("b").unwrap();
        bytes.write_dword(0).unwrap();
    }
    assert!(read_archive(&bytes).unwrap_err().is_corrupt());
}

#[test]
fn test_duplicate_track_name() {
    let floats = single_bundle_archive(2, |out| {
        raw_float_track(out, "x", 0.0, 1.0);
        raw_float_track(out, "x", 1.0, 2.0);
    });
    assert!(read_archive(&floats).unwrap_err().is_corrupt());

    let strings = single_bundle_archive(2, |out| {
        raw_string_track(out, "ev", 0.0, "a");
        raw_string_track(out, "ev", 1.0, "b");
    });
    assert!(read_archive(&strings).unwrap_err().is_corrupt());
}

// ========================================================================
// Helpers
// ========================================================================

impl<W: Write> MutantWriter<W> {
    fn write_bundle_for_test(&mut self, name: &str, bundle: &Bundle) -> Result<(), ArchiveError> {
        self.write_bundle_data(name, bundle)
            .map_err(ArchiveError::from_io)
    }
}
