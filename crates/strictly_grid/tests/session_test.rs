//! Scenario tests for sessions, resolution and standings.

use chrono::NaiveDate;
use strictly_grid::{
    Board, Cell, Game, GameStatus, Mark, MatchResult, MoveError, PlayerId, Resolution, Standing,
    Transition, apply_settlement, rank, resolve,
};

const SIZE: usize = 3;

fn ann() -> PlayerId {
    PlayerId::from(1)
}

fn bob() -> PlayerId {
    PlayerId::from(2)
}

fn board(size: usize, layout: &str) -> Board {
    let cells = layout
        .chars()
        .map(|c| match c {
            'X' => Cell::Marked(Mark::X),
            'O' => Cell::Marked(Mark::O),
            _ => Cell::Empty,
        })
        .collect();
    Board::from_cells(size, cells).unwrap()
}

fn play(game: &mut Game, moves: &[usize]) -> Transition {
    let mut last = None;
    for &index in moves {
        let player = game.next_to_move();
        last = Some(game.apply_move(player, index).unwrap());
    }
    last.unwrap()
}

#[test]
fn test_top_row_wins_for_x() {
    // X X X / O O . / . . .
    let b = board(SIZE, "XXXOO....");
    assert_eq!(resolve(&b, 2, Mark::X), Resolution::Win(Mark::X));
}

#[test]
fn test_anti_diagonal_wins_for_o() {
    // X X O / X O . / O . .
    let b = board(SIZE, "XXOXO.O..");
    assert_eq!(resolve(&b, 6, Mark::O), Resolution::Win(Mark::O));
}

#[test]
fn test_full_board_without_line_draws() {
    // X O X / X O O / O X X
    let b = board(SIZE, "XOXXOOOXX");
    assert_eq!(resolve(&b, 8, Mark::X), Resolution::Draw);
}

#[test]
fn test_last_cell_win_beats_draw() {
    // X O X / O X O / O X X : X fills the board and the main diagonal together
    let b = board(SIZE, "XOXOXOOXX");
    assert_eq!(resolve(&b, 8, Mark::X), Resolution::Win(Mark::X));
}

#[test]
fn test_four_by_four_column_win() {
    let mut game = Game::new(ann(), bob(), 4).unwrap();
    let t = play(&mut game, &[1, 0, 5, 2, 9, 3, 13]);
    assert_eq!(
        t,
        Transition::Won {
            winner: ann(),
            loser: bob(),
            mark: Mark::X
        }
    );
}

#[test]
fn test_full_game_settles_ledger_once() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let mut game = Game::new(ann(), bob(), SIZE).unwrap();
    play(&mut game, &[0, 3, 1, 4, 2]);
    assert!(matches!(game.status(), GameStatus::Won { winner, .. } if *winner == ann()));

    let settlement = game.settlement(date).unwrap();
    assert_eq!(*settlement.result(), MatchResult::PlayerXWon);

    let mut x = Standing::new(ann(), "ann");
    let mut o = Standing::new(bob(), "bob");
    apply_settlement(&settlement, &mut x, &mut o).unwrap();

    // A retried move on the finished game cannot settle again
    assert_eq!(game.apply_move(bob(), 8), Err(MoveError::GameAlreadyOver));

    assert_eq!(x.points(), 3);
    assert_eq!(o.points(), 0);
    assert_eq!(o.losses(), 1);

    let table = rank(vec![o.clone(), x.clone()]);
    assert_eq!(table, vec![x, o]);
}

#[test]
fn test_stranger_cannot_move() {
    let mut game = Game::new(ann(), bob(), SIZE).unwrap();
    let err = game.apply_move(PlayerId::from(7), 0).unwrap_err();
    assert!(err.to_string().contains("turn"));
    assert!(game.history().is_empty());
}

#[test]
fn test_status_string_reports_progress() {
    let mut game = Game::new(ann(), bob(), SIZE).unwrap();
    assert_eq!(game.status_string(), "In progress. Player 1 to move.");
    play(&mut game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
    assert_eq!(game.status_string(), "Game over. Draw!");
}
