//! Move evaluator backing the in-process oracle. Scores candidate cells
//! from run length and openness for both colors and maps the result
//! into a win-rate in [0, 1].

use std::cmp::Ordering;

use rand::Rng;

use crate::board::{Board, BOARD_SIZE};
use crate::player::Role;
use crate::rules::{DIRECTIONS, WIN_LENGTH};

#[rustfmt::skip]
mod weight {
  pub const FIVE: i32         = 1_000_000;
  pub const OPEN_FOUR: i32    = 100_000;
  pub const CLOSED_FOUR: i32  = 20_000;
  pub const OPEN_THREE: i32   = 5_000;
  pub const CLOSED_THREE: i32 = 800;
  pub const OPEN_TWO: i32     = 200;
  pub const CLOSED_TWO: i32   = 40;
  pub const OPEN_ONE: i32     = 10;
}

// Defensive placements matter slightly less than the same shape played
// as an attack
const DEFENSE_DISCOUNT: f64 = 0.8;

// How far from existing stones a cell may be to stay interesting
const NEIGHBORHOOD: usize = 2;

/// Rank candidate moves for `playing`, best first. `level` trims the
/// list and, when low, blurs the ordering with random jitter.
pub fn rank_moves(board: &Board, playing: Role, level: u8) -> Vec<(usize, usize, f64)> {
  let candidates = interesting_moves(board);
  if candidates.is_empty() {
    return Vec::new();
  }

  let jitter = match level {
    0 | 1 => 0.05,
    2 => 0.02,
    _ => 0.0,
  };
  let mut rng = rand::thread_rng();

  let mut ranked: Vec<(usize, usize, f64)> = candidates
    .into_iter()
    .map(|(row, col)| {
      let attack = point_score(board, row, col, playing);
      let defend = point_score(board, row, col, playing.opponent());
      let score = attack as f64 + defend as f64 * DEFENSE_DISCOUNT;
      let mut winrate = if attack >= weight::FIVE {
        1.0
      } else {
        score / (score + weight::OPEN_THREE as f64)
      };
      if jitter > 0.0 && winrate < 1.0 {
        winrate = (winrate + rng.gen_range(-jitter..jitter)).clamp(0.0, 1.0);
      }
      (row, col, winrate)
    })
    .collect();

  ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

  let keep = match level {
    0 | 1 => 10,
    2 => 20,
    _ => 40,
  };
  ranked.truncate(keep);
  ranked
}

// Empty cells within reach of the existing stones; the center seed on an
// empty board
fn interesting_moves(board: &Board) -> Vec<(usize, usize)> {
  if board.stone_count() == 0 {
    return vec![(BOARD_SIZE / 2, BOARD_SIZE / 2)];
  }
  let mut moves = Vec::new();
  for row in 0..BOARD_SIZE {
    for col in 0..BOARD_SIZE {
      if board.get(row, col).is_some() {
        continue;
      }
      if has_neighbor(board, row, col) {
        moves.push((row, col));
      }
    }
  }
  moves
}

fn has_neighbor(board: &Board, row: usize, col: usize) -> bool {
  let lo_r = row.saturating_sub(NEIGHBORHOOD);
  let lo_c = col.saturating_sub(NEIGHBORHOOD);
  for r in lo_r..=(row + NEIGHBORHOOD).min(BOARD_SIZE - 1) {
    for c in lo_c..=(col + NEIGHBORHOOD).min(BOARD_SIZE - 1) {
      if board.get(r, c).is_some() {
        return true;
      }
    }
  }
  false
}

// Value of placing `role` at (row, col): sum the shape each of the four
// lines would form through that cell
fn point_score(board: &Board, row: usize, col: usize, role: Role) -> i32 {
  let mut total = 0;
  for &(dr, dc) in &DIRECTIONS {
    let (fwd_len, fwd_open) = run_from(board, row, col, dr, dc, role);
    let (bwd_len, bwd_open) = run_from(board, row, col, -dr, -dc, role);
    let count = 1 + fwd_len + bwd_len;
    let open_ends = fwd_open as u8 + bwd_open as u8;

    // an overline cannot win under the exact-five rule, so the
    // direction is worthless
    if count > WIN_LENGTH {
      continue;
    }
    total += match (count, open_ends) {
      (5, _) => weight::FIVE,
      (4, 2) => weight::OPEN_FOUR,
      (4, 1) => weight::CLOSED_FOUR,
      (3, 2) => weight::OPEN_THREE,
      (3, 1) => weight::CLOSED_THREE,
      (2, 2) => weight::OPEN_TWO,
      (2, 1) => weight::CLOSED_TWO,
      (1, 2) | (1, 1) => weight::OPEN_ONE,
      _ => 0,
    };
  }
  total
}

// Length of the same-color run adjacent to (row, col) along (dr, dc),
// and whether it ends on an empty cell
fn run_from(board: &Board, row: usize, col: usize, dr: isize, dc: isize, role: Role) -> (usize, bool) {
  let mut len = 0;
  let mut r = row as isize + dr;
  let mut c = col as isize + dc;
  loop {
    if r < 0 || c < 0 || r >= BOARD_SIZE as isize || c >= BOARD_SIZE as isize {
      return (len, false);
    }
    match board.get(r as usize, c as usize) {
      Some(stone) if stone == role => {
        len += 1;
        r += dr;
        c += dc;
      }
      Some(_) => return (len, false),
      None => return (len, true),
    }
  }
}
