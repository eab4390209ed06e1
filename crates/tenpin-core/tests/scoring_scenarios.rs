use tenpin_core::game::serialization::GameSnapshot;
use tenpin_core::model::frame::TENTH_FRAME;
use tenpin_core::model::game::SessionSetup;
use tenpin_core::model::pin::{Pin, PinSet};
use tenpin_core::split::is_split_leave;
use tenpin_core::stats::calculate_stats;
use tenpin_core::symbols::frame_symbols;
use tenpin_core::turn::{Action, Cursor, ScoringSession, Transition};

fn first(count: usize) -> PinSet {
    Pin::ALL.iter().copied().take(count).collect()
}

fn leaving(numbers: &[u8]) -> PinSet {
    PinSet::FULL_RACK.difference(PinSet::from_numbers(numbers).unwrap())
}

fn session() -> ScoringSession {
    ScoringSession::new(SessionSetup::default())
}

#[test]
fn no_mark_game_sums_pins() {
    let mut session = session();
    for frame in 0..10usize {
        session.commit(first(frame % 5), false);
        session.commit(PinSet::EMPTY, false);
    }
    assert!(session.is_complete());
    let expected: u32 = (0..10u32).map(|frame| frame % 5).sum();
    assert_eq!(session.scores().total(), expected);
}

#[test]
fn all_nines_scores_eighty_one() {
    let mut session = session();
    for _ in 0..9 {
        session.commit(first(9), false);
        session.declare_miss();
    }
    session.declare_miss();
    session.declare_miss();
    assert!(session.is_complete());
    assert_eq!(session.scores().total(), 81);

    let stats = calculate_stats(session.game().frames());
    assert_eq!(stats.strikes, 0);
    assert_eq!(stats.spares, 0);
    assert_eq!(stats.open_frames, 9);
}

#[test]
fn twelve_strikes_is_perfect() {
    let mut session = session();
    let mut transitions = Vec::new();
    for _ in 0..12 {
        transitions.push(session.apply(Action::StrikeOrSpare));
    }
    assert!(matches!(transitions.last(), Some(Transition::Completed { .. })));
    let card = session.scores();
    assert_eq!(card.total(), 300);
    assert!(card.is_perfect());
    for number in 1..=10u8 {
        assert_eq!(card.through(number), Some(30 * u32::from(number)));
    }
}

#[test]
fn spare_bonus_reads_one_ball() {
    let mut session = session();
    session.commit(first(7), false);
    session.declare_strike_or_spare();
    assert_eq!(session.scores().through(1), None);
    session.commit(first(4), false);
    assert_eq!(session.scores().through(1), Some(14));
}

#[test]
fn strike_bonus_reads_two_balls() {
    let mut session = session();
    session.declare_strike_or_spare();
    session.commit(first(3), false);
    assert_eq!(session.scores().through(1), None);
    session.commit(PinSet::from_numbers(&[4, 5]).unwrap(), false);
    assert_eq!(session.scores().through(1), Some(15));
    assert_eq!(session.scores().through(2), Some(20));
}

#[test]
fn tenth_frame_double_and_seven_completes_on_third_ball() {
    let mut session = session();
    for _ in 0..9 {
        session.declare_miss();
        session.declare_miss();
    }
    session.declare_strike_or_spare();
    assert_eq!(session.standing_pins(), PinSet::FULL_RACK);
    session.declare_strike_or_spare();
    assert!(!session.is_complete());
    assert_eq!(session.cursor(), Cursor::new(TENTH_FRAME, 3).unwrap());
    assert_eq!(session.standing_pins(), PinSet::FULL_RACK);
    assert_eq!(
        session.commit(first(7), false),
        Transition::Completed {
            at: Cursor::new(TENTH_FRAME, 3).unwrap()
        }
    );
    assert_eq!(session.scores().total(), 27);
    assert_eq!(
        frame_symbols(session.game().frame(TENTH_FRAME)).to_string(),
        "XX7"
    );
}

#[test]
fn tenth_frame_strike_then_partial_leaves_remainder() {
    let mut session = session();
    for _ in 0..9 {
        session.declare_miss();
        session.declare_miss();
    }
    session.declare_strike_or_spare();
    session.commit(first(5), false);
    assert_eq!(session.standing_pins(), leaving(&[1, 2, 3, 4, 5]));
    assert!(
        session
            .standing_pins()
            .iter()
            .all(|pin| pin.number() > 5)
    );
}

#[test]
fn undo_then_same_commit_restores_state() {
    let mut session = session();
    session.commit(leaving(&[7, 10]), false);
    session.commit(PinSet::from_numbers(&[7]).unwrap(), false);
    session.declare_strike_or_spare();
    session.commit(first(6), false);
    let before = session.clone();

    session.undo();
    session.undo();
    session.undo();
    session.commit(PinSet::from_numbers(&[7]).unwrap(), false);
    session.undo();
    session.commit(PinSet::from_numbers(&[7]).unwrap(), false);
    session.declare_strike_or_spare();
    session.commit(first(6), false);

    assert_eq!(session.game(), before.game());
    assert_eq!(session.cursor(), before.cursor());
}

#[test]
fn undo_at_start_changes_nothing() {
    let mut session = session();
    let before = session.clone();
    session.undo();
    assert_eq!(session, before);
}

#[test]
fn split_detection_on_first_ball() {
    let mut session = session();
    session.commit(leaving(&[7, 10]), false);
    session.declare_miss();
    session.commit(leaving(&[2]), false);
    session.declare_strike_or_spare();
    let game = session.game();
    assert!(is_split_leave(game.frame(1), 0));
    assert!(!is_split_leave(game.frame(2), 0));
}

#[test]
fn completed_game_survives_a_snapshot() {
    let mut session = session();
    while !session.is_complete() {
        session.commit(first(8), false);
        session.declare_strike_or_spare();
    }
    let json = GameSnapshot::to_json(session.game()).unwrap();
    let restored = GameSnapshot::from_json(&json).unwrap();
    assert!(restored.is_complete());
    assert_eq!(restored.total_score(), session.scores().total());

    let resumed = ScoringSession::from_game(restored);
    assert!(resumed.is_complete());
}
