use std::io::Result as IoResult;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::board::BOARD_SIZE;
use crate::coordinator::PredictionCoordinator;
use crate::engine::GameEngine;
use crate::state::{AssistMode, Setting};
use crate::terminal_ui::{GameAction, TerminalUI};

/// How long one pass waits for a key before handing control back to
/// the prediction coordinator
const INPUT_TICK: Duration = Duration::from_millis(50);

/// Headless pacing between coordinator passes
const HEADLESS_TICK: Duration = Duration::from_millis(5);

/// Give up on a stalled headless game after this many quiet passes
/// (an unreachable oracle would otherwise spin forever)
const HEADLESS_STALL_LIMIT: u32 = 2000;

pub struct Game {
  engine: GameEngine,
  coordinator: PredictionCoordinator,
  ui: TerminalUI,

  // Cursor position for the human move
  cursor_row: usize,
  cursor_col: usize,
}

impl Game {
  pub fn new(engine: GameEngine, coordinator: PredictionCoordinator) -> Self {
    Self {
      engine,
      coordinator,
      ui: TerminalUI::new(),
      cursor_row: BOARD_SIZE / 2,
      cursor_col: BOARD_SIZE / 2,
    }
  }

  /// Interactive loop: poll input, dispatch the command, let the
  /// coordinator pump/request/reconcile between keystrokes. A decided
  /// game stays in the loop so undo and reset keep working.
  pub fn run(&mut self) -> IoResult<()> {
    self.ui.init_screen()?;
    self.ui.show_message("Arrows move, Enter places, u undoes, r resets, b/w cycle assist, q quits.");

    loop {
      self.coordinator.pump();
      self.coordinator.maybe_request(&self.engine);
      self.coordinator.reconcile(&mut self.engine);

      self.ui.draw_board(
        self.engine.board(),
        self.engine.state(),
        self.engine.settings(),
        self.coordinator.status(),
        self.cursor_row,
        self.cursor_col,
      );

      match self.ui.poll_input(INPUT_TICK)? {
        GameAction::None => {}
        GameAction::Quit => break,
        GameAction::Undo => {
          if !self.engine.undo() {
            self.ui.show_message("No moves to undo.");
          }
        }
        GameAction::Reset => {
          self.engine.reset();
          self.ui.show_message("New game. Black opens.");
        }
        GameAction::MoveLeft => {
          if self.cursor_col > 0 {
            self.cursor_col -= 1;
          }
        }
        GameAction::MoveRight => {
          if self.cursor_col + 1 < BOARD_SIZE {
            self.cursor_col += 1;
          }
        }
        GameAction::MoveUp => {
          if self.cursor_row > 0 {
            self.cursor_row -= 1;
          }
        }
        GameAction::MoveDown => {
          if self.cursor_row + 1 < BOARD_SIZE {
            self.cursor_row += 1;
          }
        }
        GameAction::PlaceStone => {
          // an illegal placement is a silent no-op in the engine; tell
          // the human why nothing happened
          if !self.engine.play_cell(self.cursor_row, self.cursor_col) {
            self.ui.show_message("Cannot play there.");
          }
        }
        GameAction::CycleBlackAssist => {
          let next = self.engine.settings().black_mode.next();
          self.engine.update_setting(Setting::BlackMode(next));
        }
        GameAction::CycleWhiteAssist => {
          let next = self.engine.settings().white_mode.next();
          self.engine.update_setting(Setting::WhiteMode(next));
        }
        GameAction::LevelUp => {
          let level = (self.engine.settings().level + 1).min(3);
          self.engine.update_setting(Setting::Level(level));
        }
        GameAction::LevelDown => {
          let level = self.engine.settings().level.saturating_sub(1).max(1);
          self.engine.update_setting(Setting::Level(level));
        }
        GameAction::ToggleHistoryIdx => {
          let show = !self.engine.settings().show_history_idx;
          self.engine.update_setting(Setting::ShowHistoryIdx(show));
        }
      }
    }

    self.ui.restore_terminal()
  }

  /// Self-play without a terminal: both colors forced to Autoplay, the
  /// coordinator drives the whole game, progress goes to the log.
  pub fn run_headless(&mut self, max_moves: usize) {
    info!("headless self-play, level {}, move cap {}", self.engine.settings().level, max_moves);
    self.engine.update_setting(Setting::BlackMode(AssistMode::Autoplay));
    self.engine.update_setting(Setting::WhiteMode(AssistMode::Autoplay));

    let mut quiet_passes = 0;
    while !self.engine.state().is_over() && self.engine.state().history.len() < max_moves {
      let moves_before = self.engine.state().history.len();

      self.coordinator.pump();
      self.coordinator.maybe_request(&self.engine);
      self.coordinator.reconcile(&mut self.engine);

      if self.engine.state().history.len() == moves_before {
        quiet_passes += 1;
        if quiet_passes > HEADLESS_STALL_LIMIT {
          warn!("no progress from the oracle, giving up");
          break;
        }
        thread::sleep(HEADLESS_TICK);
      } else {
        quiet_passes = 0;
      }
    }

    let state = self.engine.state();
    match state.winner {
      Some(winner) => info!("{:?} ({}) wins after {} moves", winner, winner.glyph(), state.history.len()),
      None if state.is_over() => info!("draw after {} moves", state.history.len()),
      None => info!("stopped after {} moves without a result", state.history.len()),
    }
  }
}
