use std::collections::HashMap;

use crate::board::BOARD_SIZE;
use crate::player::Role;

/// One accepted placement, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
  pub row: usize,
  pub col: usize,
  pub role: Role,
}

// Advice map key for a cell, matching the wire format of the oracle
pub fn cell_index(row: usize, col: usize) -> usize {
  row * BOARD_SIZE + col
}

/// Full state of the current game. Together with the board this is
/// enough to reproduce the position; the two are kept in lockstep by the
/// engine (every occupied cell has a history entry and vice versa).
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
  /// Color on move; `None` once the game is over
  pub playing: Option<Role>,
  pub winner: Option<Role>,
  pub history: Vec<Move>,
  /// The exact five cells that ended the game, empty while playing
  pub winning_line: Vec<(usize, usize)>,
  /// Win-rate hints from the oracle, keyed by `cell_index`
  pub advice: HashMap<usize, f64>,
}

impl GameState {
  // Black opens the game
  pub fn new() -> Self {
    Self {
      playing: Some(Role::Black),
      winner: None,
      history: Vec::new(),
      winning_line: Vec::new(),
      advice: HashMap::new(),
    }
  }

  /// True once no further stones may be placed (win or full board)
  pub fn is_over(&self) -> bool {
    self.playing.is_none()
  }
}

impl Default for GameState {
  fn default() -> Self {
    Self::new()
  }
}

/// Per-color assistance: off, advice overlay, or automated play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistMode {
  Disabled,
  Predict,
  Autoplay,
}

impl AssistMode {
  // Cycle order used by the settings key binding
  pub fn next(&self) -> AssistMode {
    match self {
      AssistMode::Disabled => AssistMode::Predict,
      AssistMode::Predict => AssistMode::Autoplay,
      AssistMode::Autoplay => AssistMode::Disabled,
    }
  }
}

/// Settings that survive `reset` and `undo`. Mutated only through
/// `GameEngine::update_setting`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSettings {
  pub black_mode: AssistMode,
  pub white_mode: AssistMode,
  /// Oracle strength parameter, forwarded with every advice request
  pub level: u8,
  pub show_history_idx: bool,
  pub board_color: String,
}

impl GameSettings {
  pub fn new() -> Self {
    Self {
      black_mode: AssistMode::Disabled,
      white_mode: AssistMode::Disabled,
      level: 1,
      show_history_idx: false,
      board_color: String::from("#f1b06c"),
    }
  }

  pub fn mode_for(&self, role: Role) -> AssistMode {
    match role {
      Role::Black => self.black_mode,
      Role::White => self.white_mode,
    }
  }

  pub fn apply(&mut self, setting: Setting) {
    match setting {
      Setting::BlackMode(mode) => self.black_mode = mode,
      Setting::WhiteMode(mode) => self.white_mode = mode,
      Setting::Level(level) => self.level = level,
      Setting::ShowHistoryIdx(show) => self.show_history_idx = show,
      Setting::BoardColor(color) => self.board_color = color,
    }
  }
}

impl Default for GameSettings {
  fn default() -> Self {
    Self::new()
  }
}

/// One settings field update. A closed enum: there is no such thing as
/// an unrecognized key.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
  BlackMode(AssistMode),
  WhiteMode(AssistMode),
  Level(u8),
  ShowHistoryIdx(bool),
  BoardColor(String),
}
