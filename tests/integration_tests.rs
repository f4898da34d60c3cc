//! Integration tests for joseki-tutor
//!
//! These drive whole sessions through the public API: parsing a record,
//! walking lines with seeded reply selection, and saving the statistics.
//! Record files used here live in tests/data/.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use joseki_tutor::board::{BoardPosition, Color, Coordinate};
use joseki_tutor::selector::TrainingSelector;
use joseki_tutor::session::{MoveOutcome, Session, SessionState};
use joseki_tutor::sgf::parse;
use joseki_tutor::source::read_record;
use joseki_tutor::store;
use joseki_tutor::tree::VariationTree;
use tempfile::TempDir;

// =============================================================================
// Helper functions
// =============================================================================

const TWO_LINES: &str = "(;B[dd];W[pd](;B[dp];W[pp])(;B[pp];W[dp]))";

fn star_point_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/star_point.sgf"))
}

fn star_point_tree() -> VariationTree {
    let text = read_record(star_point_path()).expect("read test record");
    parse(&text).expect("parse test record")
}

fn sgf(value: &str) -> Coordinate {
    Coordinate::from_sgf(value, 19).expect("valid coordinate")
}

/// Play the first recorded candidate until the variation ends.
fn play_first_candidates(session: &mut Session) -> usize {
    let mut moves = 0;
    while session.state() == SessionState::Playing {
        let next = session
            .candidates()
            .coordinates()
            .next()
            .expect("playing state has candidates");
        let outcome = session.human_move(next);
        assert!(
            matches!(outcome, MoveOutcome::Played { .. }),
            "recorded move {next} rejected: {outcome:?}"
        );
        moves += 1;
        assert!(moves < 50, "variation does not end");
    }
    moves
}

/// Reply chosen right after the learner's opening move.
fn first_reply(session: &mut Session, opening: Coordinate) -> Coordinate {
    session.restart();
    match session.human_move(opening) {
        MoveOutcome::Played {
            reply: Some((_, reply)),
            ..
        } => reply,
        other => panic!("expected a reply, got {other:?}"),
    }
}

// =============================================================================
// Two-line record
// =============================================================================

#[test]
fn test_end_to_end_two_lines() {
    let tree = parse(TWO_LINES).unwrap();
    let mut session = Session::new(tree, TrainingSelector::with_seed(17)).unwrap();

    // The opening two moves: learner's 4-4, then the recorded 16-4 reply.
    let outcome = session.human_move(sgf("dd"));
    assert!(matches!(
        outcome,
        MoveOutcome::Played {
            reply: Some((Color::White, _)),
            state: SessionState::Playing,
            ..
        }
    ));

    let candidates = session.candidates().clone();
    assert_eq!(candidates.len(), 2);
    let subtrees: HashSet<_> = candidates.iter().map(|(_, id)| id).collect();
    assert_eq!(subtrees.len(), 2, "each coordinate leads to its own subtree");
    assert!(candidates.contains(sgf("dp")));
    assert!(candidates.contains(sgf("pp")));

    // A third coordinate outside the recorded lines.
    let current = session.current();
    let node_before = session.tree().node(current).mistake_count();
    let total_before = session.total_mistakes();
    let outcome = session.human_move(sgf("jj"));
    assert!(matches!(outcome, MoveOutcome::Mistake { .. }));
    assert_eq!(session.current(), current);
    assert_eq!(session.tree().node(current).mistake_count(), node_before + 1);
    assert_eq!(session.total_mistakes(), total_before + 1);
    assert_eq!(session.candidates(), &candidates);
}

#[test]
fn test_branch_sharing() {
    let tree = parse(TWO_LINES).unwrap();
    let branch_point = tree.node(tree.root()).children()[0];
    let shared = tree.node(branch_point).children()[0];
    let forks = tree.node(shared).children();
    assert_eq!(forks.len(), 2);
    assert_eq!(tree.node(forks[0]).parent(), Some(shared));
    assert_eq!(tree.node(forks[1]).parent(), Some(shared));
}

#[test]
fn test_parse_is_idempotent() {
    let text = fs::read_to_string(star_point_path()).unwrap();
    let a = parse(&text).unwrap();
    let b = parse(&text).unwrap();
    assert_eq!(a.node_count(), b.node_count());
    for id in 0..a.node_count() {
        assert_eq!(a.node(id).properties(), b.node(id).properties());
        assert_eq!(a.node(id).children(), b.node(id).children());
    }
}

// =============================================================================
// Star point record
// =============================================================================

#[test]
fn test_star_point_record_shape() {
    let tree = star_point_tree();
    assert_eq!(tree.node_count(), 20);

    let (start, board) = tree.advance_to_first_branch_point().unwrap();
    assert_eq!(start, 1);
    assert_eq!(board.len(), 1);
    assert_eq!(board.color_at(sgf("pd")), Some(Color::Black));

    let candidates = tree.children_by_move(start);
    assert_eq!(candidates.color(), Some(Color::White));
    assert_eq!(candidates.coordinates().collect::<Vec<_>>(), vec![sgf("qf")]);

    let replies = tree.children_by_move(2);
    assert_eq!(
        replies.coordinates().collect::<Vec<_>>(),
        vec![sgf("nd"), sgf("pf"), sgf("qg")]
    );
}

#[test]
fn test_learner_takes_recorded_side() {
    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(1)).unwrap();
    assert_eq!(session.learner(), Color::White);
    assert_eq!(
        session.comment(),
        Some("Star point joseki. Black has taken the upper right star point.")
    );
    let outcome = session.human_move(sgf("qf"));
    let MoveOutcome::Played {
        reply: Some((color, reply)),
        ..
    } = outcome
    else {
        panic!("expected a black reply, got {outcome:?}");
    };
    assert_eq!(color, Color::Black);
    assert!([sgf("nd"), sgf("pf"), sgf("qg")].contains(&reply));
    assert_eq!(session.board().len(), 3);
}

#[test]
fn test_walk_to_end_of_variation() {
    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(8)).unwrap();
    let moves = play_first_candidates(&mut session);
    assert!(moves >= 2);
    assert_eq!(session.state(), SessionState::EndOfVariation);
    assert_eq!(session.total_mistakes(), 0);
    assert_eq!(
        &BoardPosition::derive(session.tree(), session.current()),
        session.board()
    );
    assert_eq!(session.human_move(sgf("aa")), MoveOutcome::Finished);
}

#[test]
fn test_unseen_lines_come_first() {
    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(21)).unwrap();
    let seen: HashSet<Coordinate> = (0..3).map(|_| first_reply(&mut session, sgf("qf"))).collect();
    assert_eq!(seen.len(), 3, "three sessions cover the three replies");
}

#[test]
fn test_mistakes_bring_a_line_back() {
    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(5)).unwrap();
    for _ in 0..3 {
        first_reply(&mut session, sgf("qf"));
    }

    // Charge mistakes at the pincer node, then count how often it returns.
    let pincer = session.tree().children_by_move(2).get(sgf("qg")).unwrap();
    let mut tree = session.into_tree();
    for _ in 0..5 {
        tree.record_mistake(pincer);
    }
    let mut session = Session::new(tree, TrainingSelector::with_seed(6)).unwrap();

    let trials = 300;
    let pincers = (0..trials)
        .filter(|_| first_reply(&mut session, sgf("qf")) == sgf("qg"))
        .count();
    assert!(
        pincers * 2 > trials,
        "pincer chosen {pincers} times out of {trials}"
    );
}

#[test]
fn test_tenuki_reply_places_no_stone() {
    let tree = parse("(;B[dd];W[];B[dp];W[pd])").unwrap();
    let mut session = Session::new(tree, TrainingSelector::with_seed(2)).unwrap();
    let outcome = session.human_move(sgf("dd"));
    assert_eq!(
        outcome,
        MoveOutcome::Played {
            captured: vec![],
            reply: Some((Color::White, Coordinate::TENUKI)),
            state: SessionState::Playing,
        }
    );
    assert_eq!(session.board().len(), 1);
    assert!(session.candidates().contains(sgf("dp")));
}

#[test]
fn test_learner_can_tenuki() {
    let tree = parse("(;B[dd];W[pd](;B[])(;B[dp];W[pp]))").unwrap();
    let mut session = Session::new(tree, TrainingSelector::with_seed(2)).unwrap();
    session.human_move(sgf("dd"));
    let outcome = session.human_move(Coordinate::TENUKI);
    assert!(matches!(
        outcome,
        MoveOutcome::Played {
            state: SessionState::EndOfVariation,
            ..
        }
    ));
    assert_eq!(session.board().len(), 2);
}

// =============================================================================
// Counters
// =============================================================================

#[test]
fn test_counters_stay_consistent() {
    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(77)).unwrap();
    let mut rng = fastrand::Rng::with_seed(78);
    for _ in 0..500 {
        match rng.u8(..10) {
            0 => session.restart(),
            1 | 2 => {
                session.reject_last_mistake();
            }
            3..=5 => {
                let coord = Coordinate::new(rng.usize(1..=19), rng.usize(1..=19));
                session.human_move(coord);
            }
            _ => {
                let next = session.candidates().coordinates().next();
                match next {
                    Some(coord) => {
                        session.human_move(coord);
                    }
                    None => session.restart(),
                }
            }
        }
    }
    let tree = session.into_tree();
    tree.check_consistency().unwrap();
    let sum: u64 = (0..tree.node_count())
        .map(|id| tree.node(id).mistake_count() as u64)
        .sum();
    assert_eq!(sum, tree.total_mistake_count());
}

// =============================================================================
// Persistence and record sources
// =============================================================================

#[test]
fn test_session_statistics_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("joseki.json");

    let mut session = Session::new(star_point_tree(), TrainingSelector::with_seed(3)).unwrap();
    session.human_move(sgf("aa"));
    play_first_candidates(&mut session);
    let tree = session.into_tree();
    store::save(&tree, &path).unwrap();

    let loaded = store::load(&path).unwrap();
    assert_eq!(loaded, tree);
    assert_eq!(loaded.total_mistake_count(), 1);
    assert_eq!(loaded.node(2).visit_count(), 1);
}

#[test]
fn test_zip_record_source() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("joseki.zip");
    let file = File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("joseki/star_point.sgf", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(fs::read_to_string(star_point_path()).unwrap().as_bytes())
        .unwrap();
    writer.finish().unwrap();

    let text = read_record(&path).unwrap();
    assert_eq!(parse(&text).unwrap(), star_point_tree());
}
