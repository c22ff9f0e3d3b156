//! Fragment reduction tests.
//!
//! Replaying the fragment list of a snapshot against its original text must reproduce the
//! final text of the snapshot, for any sequence of edits.

use edit_command::{
    BatchExecutor, BatchStatus, Command, Fragment, FragmentTracker, MutationSession,
    SessionConfig, TextRange, Workspace, apply, replay,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[&str] = &["", "a", "xy", "你好", "👋", "\n", "test"];

/// Apply `count` random replacements to `text`, tracking them with `gap`.
fn random_edits(rng: &mut StdRng, text: &str, count: usize, gap: usize) -> (String, Vec<Fragment>) {
    let mut current: Vec<char> = text.chars().collect();
    let mut tracker = FragmentTracker::new(gap);

    for _ in 0..count {
        let len = current.len();
        let start = rng.gen_range(0..=len);
        let end = rng.gen_range(start..=len.min(start + 4));
        let insert = ALPHABET[rng.gen_range(0..ALPHABET.len())];

        current.splice(start..end, insert.chars());
        tracker.record(start, end - start, insert.chars().count());
    }

    (current.into_iter().collect(), tracker.into_fragments())
}

fn assert_well_formed(fragments: &[Fragment], gap: usize) {
    for pair in fragments.windows(2) {
        assert!(
            pair[0].end() + gap < pair[1].offset,
            "fragments too close: {:?}",
            pair
        );
    }
    for fragment in fragments {
        assert!(fragment.old_len > 0 || fragment.new_len > 0, "empty fragment");
    }
}

#[test]
fn test_random_edits_replay_to_final_text() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let originals = ["", "abc", "hello world\nsecond line", "你好世界 emoji 👋 end"];

    for gap in [0, 1, 3] {
        for original in originals {
            for _ in 0..200 {
                let count = rng.gen_range(1..12);
                let (updated, fragments) = random_edits(&mut rng, original, count, gap);

                assert_eq!(apply(original, &updated, &fragments), updated);
                assert_well_formed(&fragments, gap);
            }
        }
    }
}

#[test]
fn test_replay_offsets_point_into_original() {
    let mut rng = StdRng::seed_from_u64(42);
    let original = "fn main() {\n    println!(\"hi\");\n}\n";
    let original_len = original.chars().count();

    for _ in 0..200 {
        let (updated, fragments) = random_edits(&mut rng, original, 6, 0);
        let replacements = replay(&updated, &fragments);

        let mut previous_start = usize::MAX;
        for replacement in &replacements {
            assert!(replacement.range.fits(original_len));
            assert!(replacement.range.end <= previous_start);
            previous_start = replacement.range.start;
        }
    }
}

#[test]
fn test_round_trip_scenario() {
    let mut tracker = FragmentTracker::new(SessionConfig::default().coalesce_gap);
    // "abc" -> "Xbc"
    tracker.record(0, 1, 1);
    // "Xbc" -> "XbYZ"
    tracker.record(2, 1, 2);

    assert_eq!(tracker.fragments(), &[Fragment::new(0, 3, 4)]);
    assert_eq!(apply("abc", "XbYZ", tracker.fragments()), "XbYZ");
}

#[test]
fn test_session_edits_apply_to_live_document() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let original = "The quick brown fox jumps over the lazy dog.";
        let mut ws = Workspace::new();
        let doc = ws.open_document(ws.root(), "fox.txt", original).unwrap();

        let (cmd, expected) = {
            let mut session = MutationSession::new(&ws, doc);
            for _ in 0..rng.gen_range(1..8) {
                let len = session.text(doc).unwrap().chars().count();
                let start = rng.gen_range(0..=len);
                let end = rng.gen_range(start..=len);
                let insert = ALPHABET[rng.gen_range(0..ALPHABET.len())];
                session.replace(doc, TextRange::new(start, end), insert).unwrap();
            }
            let expected = session.text(doc).unwrap();
            (session.into_command().unwrap(), expected)
        };

        if expected == original {
            assert_eq!(cmd, Command::Nothing);
            continue;
        }
        let status = BatchExecutor::new(&mut ws).execute(&cmd).unwrap();
        assert_eq!(status, BatchStatus::Success);
        assert_eq!(ws.document_text(doc).unwrap(), expected);
    }
}
