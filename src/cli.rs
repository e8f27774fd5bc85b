use clap::{Parser, ValueEnum};

use crate::state::AssistMode;

/// Per-color assistance on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssistModeArg {
  /// No assistance
  Disabled,
  /// Show win-rate hints from the oracle
  Predict,
  /// Let the oracle play for this color
  Autoplay,
}

impl From<AssistModeArg> for AssistMode {
  fn from(arg: AssistModeArg) -> Self {
    match arg {
      AssistModeArg::Disabled => AssistMode::Disabled,
      AssistModeArg::Predict => AssistMode::Predict,
      AssistModeArg::Autoplay => AssistMode::Autoplay,
    }
  }
}

/// Gomoku with an assistive oracle
#[derive(Parser, Debug)]
#[command(name = "gomoku_assist", version)]
pub struct CliArgs {
  /// Assistance for Black
  #[arg(long, value_enum, default_value_t = AssistModeArg::Disabled)]
  pub black: AssistModeArg,

  /// Assistance for White
  #[arg(long, value_enum, default_value_t = AssistModeArg::Disabled)]
  pub white: AssistModeArg,

  /// Oracle strength (1 = weakest, 3 = strongest)
  #[arg(long, default_value_t = 1)]
  pub level: u8,

  /// Run a full self-play game without the terminal UI
  #[arg(long, default_value_t = false)]
  pub headless: bool,

  /// Move cap for headless games
  #[arg(long, default_value_t = 225)]
  pub max_moves: usize,

  /// Board color preference, kept with the other display settings
  #[arg(long, default_value = "#f1b06c")]
  pub board_color: String,

  /// Log file for interactive sessions (the UI owns the terminal)
  #[arg(long, default_value = "gomoku_assist.log")]
  pub log_file: String,
}
