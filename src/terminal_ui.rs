use crossterm::{
  cursor::{Hide, MoveTo, Show},
  event::{poll, read, Event, KeyCode, KeyEvent},
  execute,
  style::{Color, Print, ResetColor, SetForegroundColor},
  terminal::{disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
};

use std::io::{stdout, Result as IoResult};
use std::time::Duration;

use crate::board::Board;
use crate::oracle::OracleStatus;
use crate::state::{cell_index, GameSettings, GameState};

// Everything the event loop can ask for
#[derive(Debug)]
pub enum GameAction {
  None,
  Quit,
  Undo,
  Reset,
  MoveLeft,
  MoveRight,
  MoveUp,
  MoveDown,
  PlaceStone,
  CycleBlackAssist,
  CycleWhiteAssist,
  LevelUp,
  LevelDown,
  ToggleHistoryIdx,
}

pub struct TerminalUI {
  /// Last message shown on the bottom line
  last_message: String,
}

impl TerminalUI {
  /// "Light green" for the cursor
  const CURSOR_COLOR: Color = Color::Rgb { r: 120, g: 255, b: 120 };
  /// "Light red" for the last stone
  const LAST_STONE_COLOR: Color = Color::Rgb { r: 255, g: 140, b: 140 };
  /// Gold for the five winning cells
  const WIN_COLOR: Color = Color::Rgb { r: 255, g: 215, b: 0 };
  /// Light blue for cells carrying oracle advice
  const ADVICE_COLOR: Color = Color::Rgb { r: 110, g: 200, b: 255 };

  pub fn new() -> Self {
    Self {
      last_message: String::new(),
    }
  }

  pub fn init_screen(&mut self) -> IoResult<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;
    Ok(())
  }

  pub fn restore_terminal(&mut self) -> IoResult<()> {
    execute!(stdout(), Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
  }

  /// Wait up to `tick` for a key. Returns `None` on timeout so the
  /// caller can run the prediction coordinator between keystrokes.
  pub fn poll_input(&mut self, tick: Duration) -> IoResult<GameAction> {
    if !poll(tick)? {
      return Ok(GameAction::None);
    }
    if let Event::Key(KeyEvent { code, .. }) = read()? {
      let action = match code {
        KeyCode::Esc | KeyCode::Char('q') => GameAction::Quit,
        KeyCode::Backspace | KeyCode::Char('u') => GameAction::Undo,
        KeyCode::Char('r') => GameAction::Reset,
        KeyCode::Char('b') => GameAction::CycleBlackAssist,
        KeyCode::Char('w') => GameAction::CycleWhiteAssist,
        KeyCode::Char('+') | KeyCode::Char('=') => GameAction::LevelUp,
        KeyCode::Char('-') => GameAction::LevelDown,
        KeyCode::Char('h') => GameAction::ToggleHistoryIdx,
        KeyCode::Left => GameAction::MoveLeft,
        KeyCode::Right => GameAction::MoveRight,
        KeyCode::Up => GameAction::MoveUp,
        KeyCode::Down => GameAction::MoveDown,
        KeyCode::Enter | KeyCode::Char(' ') => GameAction::PlaceStone,
        _ => GameAction::None,
      };
      return Ok(action);
    }
    Ok(GameAction::None)
  }

  /// Set (and immediately draw) a new message
  pub fn show_message(&mut self, msg: &str) {
    self.last_message = msg.to_string();
    self.draw_message();
  }

  fn draw_message(&mut self) {
    let (cols, rows) = size().unwrap_or((80, 24));
    let y = rows.saturating_sub(2);

    let msg_len = self.last_message.len() as u16;
    let x = if cols > msg_len { (cols - msg_len) / 2 } else { 0 };

    execute!(stdout(), MoveTo(0, y), Print(" ".repeat(cols as usize))).ok();
    execute!(stdout(), MoveTo(x, y), Print(&self.last_message)).ok();
  }

  pub fn draw_board(
    &mut self,
    board: &Board,
    state: &GameState,
    settings: &GameSettings,
    oracle_status: OracleStatus,
    cursor_row: usize,
    cursor_col: usize,
  ) {
    let (cols, rows) = size().unwrap_or((80, 24));

    let bsize = board.size as u16;
    let cell_width: u16 = 3;
    let used_width = bsize * cell_width - 1;
    let used_height = bsize;

    let offset_x = if cols > used_width { (cols - used_width) / 2 } else { 0 };
    let offset_y = if rows > used_height { (rows - used_height) / 2 } else { 1 };

    let last_move = state.history.last().copied();

    let mut stdout_ = stdout();

    // Clear the drawing area
    for row in 0..rows {
      execute!(stdout_, MoveTo(0, row), Print(" ".repeat(cols as usize))).ok();
    }

    // Top border
    execute!(stdout_, MoveTo(offset_x.saturating_sub(1), offset_y.saturating_sub(1)), Print("╔")).ok();
    for _ in 0..used_width {
      execute!(stdout_, Print("═")).ok();
    }
    execute!(stdout_, Print("╗")).ok();

    for row in 0..board.size {
      execute!(stdout_, MoveTo(offset_x.saturating_sub(1), offset_y + row as u16), Print("║")).ok();
      for col in 0..board.size {
        let sx = offset_x + (col as u16) * cell_width;
        let sy = offset_y + row as u16;

        let is_cursor = row == cursor_row && col == cursor_col;
        let is_last_stone = last_move.map(|m| m.row == row && m.col == col).unwrap_or(false);
        let on_winning_line = state.winning_line.contains(&(row, col));
        let advice = state.advice.get(&cell_index(row, col));

        let (symbol, color) = match board.get(row, col) {
          Some(role) => {
            let glyph = role.glyph();
            if on_winning_line {
              (glyph, Some(Self::WIN_COLOR))
            } else if is_cursor {
              (glyph, Some(Self::CURSOR_COLOR))
            } else if is_last_stone {
              (glyph, Some(Self::LAST_STONE_COLOR))
            } else {
              (glyph, None)
            }
          }
          None => {
            if is_cursor {
              ('+', Some(Self::CURSOR_COLOR))
            } else if let Some(&winrate) = advice {
              // one digit of win-rate: 0 = hopeless, 9 = near-certain
              (winrate_digit(winrate), Some(Self::ADVICE_COLOR))
            } else {
              ('.', None)
            }
          }
        };

        if let Some(color) = color {
          execute!(stdout_, MoveTo(sx, sy), SetForegroundColor(color), Print(symbol), ResetColor).ok();
        } else {
          execute!(stdout_, MoveTo(sx, sy), Print(symbol)).ok();
        }
      }
      execute!(stdout_, MoveTo(offset_x + used_width - 1, offset_y + row as u16), Print(" ║")).ok();
    }

    // Bottom border
    execute!(stdout_, MoveTo(offset_x.saturating_sub(1), offset_y + used_height), Print("╚")).ok();
    for _ in 0..used_width {
      execute!(stdout_, Print("═")).ok();
    }
    execute!(stdout_, Print("╝")).ok();

    self.draw_status(state, settings, oracle_status, cursor_row, cursor_col);
    self.draw_message();
  }

  // One line of game facts above the message line
  fn draw_status(
    &mut self,
    state: &GameState,
    settings: &GameSettings,
    oracle_status: OracleStatus,
    cursor_row: usize,
    cursor_col: usize,
  ) {
    let turn = match (state.winner, state.playing) {
      (Some(winner), _) => format!("{:?} ({}) wins!", winner, winner.glyph()),
      (None, Some(playing)) => format!("{:?} ({}) to move", playing, playing.glyph()),
      (None, None) => String::from("Draw - board full"),
    };
    let mut status = format!(
      "{} | black {:?} / white {:?} | level {} | oracle {:?}",
      turn, settings.black_mode, settings.white_mode, settings.level, oracle_status
    );
    if let Some(winrate) = state.advice.get(&cell_index(cursor_row, cursor_col)) {
      status.push_str(&format!(" | cursor {:.0}%", winrate * 100.0));
    }
    if settings.show_history_idx {
      if let Some(mv) = state.history.last() {
        status.push_str(&format!(" | move #{} {:?} ({}, {})", state.history.len(), mv.role, mv.row, mv.col));
      }
    }

    let (cols, rows) = size().unwrap_or((80, 24));
    let y = rows.saturating_sub(3);
    let len = status.len() as u16;
    let x = if cols > len { (cols - len) / 2 } else { 0 };
    execute!(stdout(), MoveTo(0, y), Print(" ".repeat(cols as usize))).ok();
    execute!(stdout(), MoveTo(x, y), Print(&status)).ok();
  }
}

impl Default for TerminalUI {
  fn default() -> Self {
    Self::new()
  }
}

fn winrate_digit(winrate: f64) -> char {
  let decile = (winrate * 10.0).clamp(0.0, 9.0) as u32;
  char::from_digit(decile, 10).unwrap_or('?')
}
