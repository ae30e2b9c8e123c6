//! Property-based tests for the undo/redo laws over real scoreboards.
//!
//! 1. One undo after any edit sequence restores the state from just before
//!    the last push.
//! 2. Undo followed by redo is the identity on a non-empty history.
//! 3. `push_undo` always empties the redo stack.
//! 4. Undo/redo on an empty stack leaves state unchanged.

use proptest::prelude::*;
use tally_history::{History, HistoryLimit};
use tally_types::Scoreboard;

const PARTICIPANTS: [&str; 3] = ["Ana", "Ben", "Cleo"];
const CATEGORIES: [&str; 2] = ["prospecting", "recruitment"];

/// One mutation of the board.
#[derive(Debug, Clone)]
enum Edit {
    Add { category: usize, participant: usize, points: i64 },
    Clear { category: usize },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (0..CATEGORIES.len(), 0..PARTICIPANTS.len(), -50_i64..50)
            .prop_map(|(category, participant, points)| Edit::Add { category, participant, points }),
        1 => (0..CATEGORIES.len()).prop_map(|category| Edit::Clear { category }),
    ]
}

fn apply(board: &mut Scoreboard, edit: &Edit) {
    match *edit {
        Edit::Add { category, participant, points } => {
            let category = CATEGORIES.get(category).copied().unwrap_or_default();
            let participant = PARTICIPANTS.get(participant).copied().unwrap_or_default();
            let _ = board.add_points(category, participant, points);
        }
        Edit::Clear { category } => {
            let category = CATEGORIES.get(category).copied().unwrap_or_default();
            let _ = board.clear_category(category);
        }
    }
}

fn fresh_board() -> Scoreboard {
    Scoreboard::new(PARTICIPANTS, CATEGORIES)
}

/// Run every edit with the push -> mutate order, returning the state
/// captured by the last push.
fn run_edits(
    board: &mut Scoreboard,
    history: &mut History<Scoreboard>,
    edits: &[Edit],
) -> Option<Scoreboard> {
    let mut last_before = None;
    for edit in edits {
        history.push_undo(board);
        last_before = Some(board.clone());
        apply(board, edit);
    }
    last_before
}

proptest! {
    #[test]
    fn single_undo_restores_last_before_image(
        edits in prop::collection::vec(edit_strategy(), 1..30),
    ) {
        let mut board = fresh_board();
        let mut history = History::new(HistoryLimit::Unbounded);
        let expected = run_edits(&mut board, &mut history, &edits);

        prop_assert!(history.undo(&mut board));
        prop_assert_eq!(Some(board), expected);
    }

    #[test]
    fn undo_then_redo_is_identity(
        edits in prop::collection::vec(edit_strategy(), 1..30),
        undos in 0_usize..10,
    ) {
        let mut board = fresh_board();
        let mut history = History::new(HistoryLimit::Unbounded);
        run_edits(&mut board, &mut history, &edits);

        for _ in 0..undos {
            if history.undo_depth() <= 1 {
                break;
            }
            history.undo(&mut board);
        }

        let before_undo = board.clone();
        prop_assert!(history.undo(&mut board));
        prop_assert!(history.redo(&mut board));
        prop_assert_eq!(board, before_undo);
    }

    #[test]
    fn push_always_empties_redo(
        edits in prop::collection::vec(edit_strategy(), 1..20),
        undos in 0_usize..20,
    ) {
        let mut board = fresh_board();
        let mut history = History::new(HistoryLimit::Unbounded);
        run_edits(&mut board, &mut history, &edits);
        for _ in 0..undos {
            history.undo(&mut board);
        }

        history.push_undo(&board);
        prop_assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn empty_stacks_are_no_ops(edits in prop::collection::vec(edit_strategy(), 0..10)) {
        let mut board = fresh_board();
        for edit in &edits {
            apply(&mut board, edit);
        }
        let before = board.clone();
        let mut history: History<Scoreboard> = History::new(HistoryLimit::Unbounded);

        prop_assert!(!history.undo(&mut board));
        prop_assert!(!history.redo(&mut board));
        prop_assert_eq!(&board, &before);
        prop_assert_eq!(history.undo_depth(), 0);
        prop_assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn depth_cap_is_respected(
        edits in prop::collection::vec(edit_strategy(), 0..40),
        depth in 1_usize..8,
    ) {
        let mut board = fresh_board();
        let mut history = History::new(HistoryLimit::from_depth(depth));
        run_edits(&mut board, &mut history, &edits);

        prop_assert_eq!(history.undo_depth(), edits.len().min(depth));
        while history.undo(&mut board) {}
        prop_assert!(history.redo_depth() <= depth);
    }
}
