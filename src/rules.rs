//! Win detection. A move wins only by completing a straight run of
//! exactly five stones; an overline of six or more does not count.

use crate::board::Board;
use crate::player::Role;

/// The four undirected line directions; the other four are covered by
/// walking each one both ways.
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, 0), (0, 1), (1, -1)];

pub const WIN_LENGTH: usize = 5;

/// Collect the winning run completed by the stone just played at
/// `last_move`, if any. Returns the five cells of the first winning
/// direction (played cell first), or an empty vector.
pub fn winning_line(board: &Board, last_move: (usize, usize), role: Role) -> Vec<(usize, usize)> {
  let (row, col) = last_move;
  for &(dr, dc) in &DIRECTIONS {
    let mut line = vec![(row, col)];

    // extend in the positive direction
    let mut r = row as isize;
    let mut c = col as isize;
    for _ in 0..WIN_LENGTH {
      r += dr;
      c += dc;
      if r < 0 || c < 0 || board.get(r as usize, c as usize) != Some(role) {
        break;
      }
      line.push((r as usize, c as usize));
    }

    // extend in the opposite direction; once the run is past five cells
    // it can no longer be a win, so stop collecting
    r = row as isize;
    c = col as isize;
    for _ in 0..WIN_LENGTH {
      r -= dr;
      c -= dc;
      if line.len() > WIN_LENGTH {
        break;
      }
      if r < 0 || c < 0 || board.get(r as usize, c as usize) != Some(role) {
        break;
      }
      line.push((r as usize, c as usize));
    }

    if line.len() == WIN_LENGTH {
      return line;
    }
  }
  Vec::new()
}
