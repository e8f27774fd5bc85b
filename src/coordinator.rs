//! Bridges the synchronous engine and the asynchronous oracle. Replies
//! are buffered in arrival order and reconciled against the live game
//! before they are applied; a reply for a color no longer on move is
//! stale and silently dropped.

use std::collections::VecDeque;

use log::{debug, info};

use crate::engine::GameEngine;
use crate::oracle::{AdviceRequest, Oracle, OracleEvent, OracleStatus, Prediction};
use crate::player::Role;
use crate::state::AssistMode;

pub struct PredictionCoordinator {
  oracle: Box<dyn Oracle>,
  queue: VecDeque<Prediction>,
  /// Fingerprint (move count, color on move) of the last issued
  /// request, so one state transition starts at most one round-trip
  last_request: Option<(usize, Role)>,
}

impl PredictionCoordinator {
  pub fn new(oracle: Box<dyn Oracle>) -> Self {
    Self {
      oracle,
      queue: VecDeque::new(),
      last_request: None,
    }
  }

  pub fn status(&self) -> OracleStatus {
    self.oracle.status()
  }

  pub fn queued(&self) -> usize {
    self.queue.len()
  }

  /// Buffer everything the oracle has delivered since the last pass.
  pub fn pump(&mut self) {
    for event in self.oracle.poll() {
      match event {
        OracleEvent::Prediction(prediction) => {
          debug!("buffered prediction for {:?} ({} moves ranked)", prediction.playing, prediction.move_winrates.len());
          self.queue.push_back(prediction);
        }
        OracleEvent::Status(status) => {
          debug!("oracle status: {:?}", status);
        }
      }
    }
  }

  /// Ask for advice if the color on move wants assistance and nothing
  /// is cached or outstanding for the current state. Never issues
  /// requests while the oracle is unreachable or busy.
  pub fn maybe_request(&mut self, engine: &GameEngine) {
    let state = engine.state();
    let playing = match state.playing {
      Some(role) => role,
      None => return,
    };
    if engine.settings().mode_for(playing) == AssistMode::Disabled {
      return;
    }
    if !state.advice.is_empty() {
      return;
    }
    if self.oracle.status() != OracleStatus::Idle {
      return;
    }
    let fingerprint = (state.history.len(), playing);
    if self.last_request == Some(fingerprint) {
      return;
    }

    let request = AdviceRequest {
      board: engine.board().clone(),
      playing,
      level: engine.settings().level,
    };
    if self.oracle.request_advice(request) {
      self.oracle.trigger_processing();
      self.last_request = Some(fingerprint);
      info!("requested advice for {:?} at move {}", playing, state.history.len());
    }
  }

  /// Drain the queue front: drop stale replies until one matches the
  /// color on move, then apply it per the active assist mode. At most
  /// one matching reply is applied per pass; whatever is left stays
  /// queued for the next pass.
  pub fn reconcile(&mut self, engine: &mut GameEngine) {
    loop {
      let playing = match engine.state().playing {
        Some(role) => role,
        None => return,
      };
      let front_is_stale = match self.queue.front() {
        None => return,
        Some(front) => front.playing != playing,
      };
      if front_is_stale {
        debug!("dropping stale prediction (not {:?}'s turn)", playing);
        self.queue.pop_front();
        continue;
      }
      let prediction = match self.queue.pop_front() {
        Some(prediction) => prediction,
        None => return,
      };
      match engine.settings().mode_for(playing) {
        AssistMode::Disabled => {
          // assistance was switched off after the request went out
          debug!("discarding reply for {:?}, assistance disabled", playing);
          continue;
        }
        AssistMode::Predict => {
          engine.apply_advice(&prediction.move_winrates);
        }
        AssistMode::Autoplay => {
          if let Some(&(row, col, winrate)) = prediction.move_winrates.first() {
            info!("autoplay for {:?}: ({}, {}) at {:.2}", playing, row, col, winrate);
            // same validation as a human click; a racing manual move
            // that already filled the cell degrades to a no-op
            engine.play_cell(row, col);
          }
        }
      }
      return;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::rc::Rc;

  use crate::state::{cell_index, Setting};

  /// Scripted stand-in for the remote service: events are handed out on
  /// the next poll, requests and triggers are recorded for inspection.
  #[derive(Default)]
  struct ScriptLog {
    requests: Vec<AdviceRequest>,
    triggers: usize,
  }

  struct ScriptedOracle {
    status: OracleStatus,
    pending: Vec<OracleEvent>,
    log: Rc<RefCell<ScriptLog>>,
  }

  impl ScriptedOracle {
    fn new(status: OracleStatus) -> (Self, Rc<RefCell<ScriptLog>>) {
      let log = Rc::new(RefCell::new(ScriptLog::default()));
      (
        Self {
          status,
          pending: Vec::new(),
          log: Rc::clone(&log),
        },
        log,
      )
    }

    fn with_predictions(predictions: Vec<Prediction>) -> Self {
      let (mut oracle, _) = Self::new(OracleStatus::Idle);
      oracle.pending = predictions.into_iter().map(OracleEvent::Prediction).collect();
      oracle
    }
  }

  impl Oracle for ScriptedOracle {
    fn status(&self) -> OracleStatus {
      self.status
    }

    fn request_advice(&mut self, request: AdviceRequest) -> bool {
      self.log.borrow_mut().requests.push(request);
      true
    }

    fn trigger_processing(&mut self) {
      self.log.borrow_mut().triggers += 1;
    }

    fn poll(&mut self) -> Vec<OracleEvent> {
      std::mem::take(&mut self.pending)
    }
  }

  fn prediction(playing: Role, move_winrates: Vec<(usize, usize, f64)>) -> Prediction {
    Prediction { playing, move_winrates }
  }

  #[test]
  fn stale_prediction_is_dropped_without_effect() {
    // Black is on move, the queued reply targets White
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::White, vec![(3, 4, 0.9)])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));
    engine.update_setting(Setting::WhiteMode(AssistMode::Predict));

    coordinator.pump();
    assert_eq!(coordinator.queued(), 1);
    coordinator.reconcile(&mut engine);

    assert_eq!(coordinator.queued(), 0);
    assert!(engine.state().advice.is_empty());
    assert!(engine.state().history.is_empty());
  }

  #[test]
  fn matching_prediction_populates_the_advice_overlay() {
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::Black, vec![(3, 4, 0.9), (5, 5, 0.4)])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));

    coordinator.pump();
    coordinator.reconcile(&mut engine);

    assert_eq!(coordinator.queued(), 0);
    assert_eq!(engine.state().advice.len(), 2);
    assert_eq!(engine.state().advice.get(&cell_index(3, 4)), Some(&0.9));
    assert_eq!(engine.state().advice.get(&cell_index(5, 5)), Some(&0.4));
    // the board itself is untouched in Predict mode
    assert!(engine.state().history.is_empty());
  }

  #[test]
  fn empty_ranked_list_leaves_advice_untouched() {
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::Black, vec![])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));
    engine.apply_advice(&[(9, 9, 0.5)]);

    coordinator.pump();
    coordinator.reconcile(&mut engine);

    assert_eq!(coordinator.queued(), 0);
    assert_eq!(engine.state().advice.len(), 1);
  }

  #[test]
  fn autoplay_commits_the_top_ranked_move() {
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::Black, vec![(3, 4, 0.9), (5, 5, 0.4)])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Autoplay));

    coordinator.pump();
    coordinator.reconcile(&mut engine);

    assert_eq!(engine.board().get(3, 4), Some(Role::Black));
    assert_eq!(engine.state().playing, Some(Role::White));
    assert_eq!(coordinator.queued(), 0);
  }

  #[test]
  fn autoplay_race_against_a_filled_cell_is_a_no_op() {
    // the reply still targets the color on move, but its top-ranked
    // cell was taken while the reply was in flight; the commit runs
    // through the same validation as a click and is rejected
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::Black, vec![(3, 4, 0.9)])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Autoplay));
    engine.play_cell(0, 0);
    engine.play_cell(3, 4); // White grabs the suggested cell

    coordinator.pump();
    coordinator.reconcile(&mut engine);

    assert_eq!(engine.board().get(3, 4), Some(Role::White));
    assert_eq!(engine.state().history.len(), 2);
    assert_eq!(engine.state().playing, Some(Role::Black));
    assert_eq!(coordinator.queued(), 0);
  }

  #[test]
  fn one_pass_applies_at_most_one_matching_reply() {
    let oracle = ScriptedOracle::with_predictions(vec![
      prediction(Role::White, vec![(0, 0, 0.1)]), // stale
      prediction(Role::Black, vec![(3, 4, 0.9)]),
      prediction(Role::Black, vec![(5, 5, 0.8)]),
    ]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));

    coordinator.pump();
    coordinator.reconcile(&mut engine);

    // stale dropped, first match applied, the leftover stays queued
    assert_eq!(engine.state().advice.get(&cell_index(3, 4)), Some(&0.9));
    assert_eq!(coordinator.queued(), 1);

    // the next pass tolerates the leftover
    coordinator.reconcile(&mut engine);
    assert_eq!(coordinator.queued(), 0);
  }

  #[test]
  fn reconcile_stops_once_the_game_is_decided() {
    let oracle = ScriptedOracle::with_predictions(vec![prediction(Role::Black, vec![(0, 0, 0.9)])]);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Autoplay));
    // Black wins on row 7
    for i in 0..4 {
      engine.play_cell(7, 3 + i);
      engine.play_cell(0, i);
    }
    engine.play_cell(7, 7);
    assert!(engine.state().is_over());

    coordinator.pump();
    coordinator.reconcile(&mut engine);
    // nothing applied, the reply stays queued until the game resumes
    assert_eq!(coordinator.queued(), 1);
    assert_eq!(engine.state().history.len(), 9);
  }

  #[test]
  fn no_request_while_disconnected() {
    let (oracle, log) = ScriptedOracle::new(OracleStatus::NoConnection);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));

    coordinator.maybe_request(&engine);
    assert!(log.borrow().requests.is_empty());
  }

  #[test]
  fn no_request_while_assistance_is_disabled() {
    let (oracle, log) = ScriptedOracle::new(OracleStatus::Idle);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let engine = GameEngine::new();

    coordinator.maybe_request(&engine);
    assert!(log.borrow().requests.is_empty());
  }

  #[test]
  fn at_most_one_request_per_state() {
    let (oracle, log) = ScriptedOracle::new(OracleStatus::Idle);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));

    coordinator.maybe_request(&engine);
    coordinator.maybe_request(&engine);
    {
      let log = log.borrow();
      assert_eq!(log.requests.len(), 1);
      assert_eq!(log.triggers, 1);
      assert_eq!(log.requests[0].playing, Role::Black);
      assert_eq!(log.requests[0].level, engine.settings().level);
    }

    // a new state transition allows the next request
    engine.play_cell(7, 7);
    engine.update_setting(Setting::WhiteMode(AssistMode::Predict));
    coordinator.maybe_request(&engine);
    let log = log.borrow();
    assert_eq!(log.requests.len(), 2);
    assert_eq!(log.requests[1].playing, Role::White);
  }

  #[test]
  fn no_request_while_advice_is_cached() {
    let (oracle, log) = ScriptedOracle::new(OracleStatus::Idle);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();
    engine.update_setting(Setting::BlackMode(AssistMode::Predict));
    engine.apply_advice(&[(3, 4, 0.9)]);

    coordinator.maybe_request(&engine);
    assert!(log.borrow().requests.is_empty());
  }

  #[test]
  fn settings_change_can_enable_a_request_mid_state() {
    let (oracle, log) = ScriptedOracle::new(OracleStatus::Idle);
    let mut coordinator = PredictionCoordinator::new(Box::new(oracle));
    let mut engine = GameEngine::new();

    coordinator.maybe_request(&engine);
    assert!(log.borrow().requests.is_empty());

    engine.update_setting(Setting::BlackMode(AssistMode::Predict));
    coordinator.maybe_request(&engine);
    assert_eq!(log.borrow().requests.len(), 1);
  }
}
