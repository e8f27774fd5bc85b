mod board;
mod cli;
mod coordinator;
mod engine;
mod game;
mod heuristic;
mod history;
mod oracle;
mod player;
mod rules;
mod state;
mod terminal_ui;

use std::fs::File;
use std::io::Result as IoResult;

use clap::Parser;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

use crate::cli::CliArgs;
use crate::coordinator::PredictionCoordinator;
use crate::engine::GameEngine;
use crate::game::Game;
use crate::oracle::ThreadedOracle;
use crate::state::Setting;

fn main() -> IoResult<()> {
  let args = CliArgs::parse();

  // Interactive sessions own the terminal, so logs go to a file; a
  // headless run logs to stderr like any other batch tool
  if args.headless {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  } else {
    let log_file = File::create(&args.log_file)?;
    if let Err(e) = WriteLogger::init(LevelFilter::Info, Config::default(), log_file) {
      eprintln!("logger init failed: {e}");
    }
  }

  let mut engine = GameEngine::new();
  engine.update_setting(Setting::BlackMode(args.black.into()));
  engine.update_setting(Setting::WhiteMode(args.white.into()));
  engine.update_setting(Setting::Level(args.level.clamp(1, 3)));
  engine.update_setting(Setting::BoardColor(args.board_color));

  let oracle = ThreadedOracle::spawn();
  let coordinator = PredictionCoordinator::new(Box::new(oracle));

  let mut game = Game::new(engine, coordinator);
  if args.headless {
    game.run_headless(args.max_moves);
    Ok(())
  } else {
    game.run()
  }
}
