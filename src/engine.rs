//! The game state machine. Owns the board, the state aggregate, the
//! settings and the undo stack; everything else reads snapshots and
//! mutates through the command surface below.

use log::{debug, info};

use crate::board::Board;
use crate::history::UndoStack;
use crate::player::Role;
use crate::rules;
use crate::state::{cell_index, GameSettings, GameState, Move, Setting};

pub struct GameEngine {
  board: Board,
  state: GameState,
  settings: GameSettings,
  undo_stack: UndoStack,
}

impl GameEngine {
  pub fn new() -> Self {
    Self {
      board: Board::new(),
      state: GameState::new(),
      settings: GameSettings::new(),
      undo_stack: UndoStack::new(),
    }
  }

  // Read-only snapshots for the frontend and the coordinator
  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn state(&self) -> &GameState {
    &self.state
  }

  pub fn settings(&self) -> &GameSettings {
    &self.settings
  }

  pub fn undo_depth(&self) -> usize {
    self.undo_stack.len()
  }

  /// Play a stone for the color on move. Illegal attempts (occupied
  /// cell, out-of-range coordinates, game already over) are silent
  /// no-ops; the return value reports acceptance.
  pub fn play_cell(&mut self, row: usize, col: usize) -> bool {
    let role = match self.state.playing {
      Some(role) => role,
      None => return false,
    };
    if !self.board.is_empty_at(row, col) {
      return false;
    }

    // save the pre-move position, then mutate
    self.undo_stack.push(&self.state, &self.board);
    self.board.try_place(row, col, role);
    self.state.history.push(Move { row, col, role });

    let line = rules::winning_line(&self.board, (row, col), role);
    if !line.is_empty() {
      info!("{:?} wins at ({}, {}) after {} moves", role, row, col, self.state.history.len());
      self.state.winner = Some(role);
      self.state.playing = None;
      self.state.winning_line = line;
    } else if self.board.is_full() {
      info!("board full after {} moves, draw", self.state.history.len());
      self.state.playing = None;
      self.state.winning_line.clear();
    } else {
      debug!("{:?} played ({}, {})", role, row, col);
      self.state.playing = Some(role.opponent());
      self.state.winning_line.clear();
    }

    // any hints shown so far are for the previous position
    self.state.advice.clear();
    true
  }

  /// Revert the last accepted move by restoring the snapshot taken
  /// before it. No-op on an empty stack.
  pub fn undo(&mut self) -> bool {
    match self.undo_stack.pop() {
      None => false,
      Some(snapshot) => {
        debug!("undo to move {}", snapshot.state.history.len());
        self.state = snapshot.state;
        self.board = snapshot.board;
        true
      }
    }
  }

  /// Start over: empty board, Black to move. Settings are kept.
  pub fn reset(&mut self) {
    info!("game reset");
    self.board = Board::new();
    self.state = GameState::new();
    self.undo_stack.clear();
  }

  pub fn update_setting(&mut self, setting: Setting) {
    debug!("setting update: {:?}", setting);
    self.settings.apply(setting);
  }

  /// Replace the advice overlay with a ranked move list from the
  /// oracle. An empty list carries no new information and leaves the
  /// overlay untouched.
  pub fn apply_advice(&mut self, move_winrates: &[(usize, usize, f64)]) {
    if move_winrates.is_empty() {
      return;
    }
    self.state.advice = move_winrates.iter().map(|&(row, col, winrate)| (cell_index(row, col), winrate)).collect();
  }
}

impl Default for GameEngine {
  fn default() -> Self {
    Self::new()
  }
}
