//! Boundary with the advisory service. The engine never talks to it
//! directly; the coordinator sends snapshot requests and drains
//! asynchronous replies through the `Oracle` trait. `ThreadedOracle` is
//! the in-process stand-in for the remote inference server, speaking
//! the same queue-then-process contract.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

use log::warn;

use crate::board::Board;
use crate::heuristic;
use crate::player::Role;

/// Coarse connectivity of the advisory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleStatus {
  NoConnection,
  Idle,
  Busy,
}

/// Ranked move list for the color that was on move when the request was
/// issued, winrates descending. Consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
  pub playing: Role,
  pub move_winrates: Vec<(usize, usize, f64)>,
}

/// Deep snapshot of everything the service needs to answer.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
  pub board: Board,
  pub playing: Role,
  pub level: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OracleEvent {
  Prediction(Prediction),
  Status(OracleStatus),
}

pub trait Oracle {
  fn status(&self) -> OracleStatus;

  /// Fire-and-forget enqueue. The return value acknowledges receipt,
  /// not completion.
  fn request_advice(&mut self, request: AdviceRequest) -> bool;

  /// Tell the service it may start computing on its queued requests.
  fn trigger_processing(&mut self);

  /// Drain asynchronously delivered events, in arrival order. Arrival
  /// order is not guaranteed to match request order.
  fn poll(&mut self) -> Vec<OracleEvent>;
}

enum WorkerMsg {
  Queue(AdviceRequest),
  Process,
}

/// Worker-thread oracle answering with heuristic rankings.
pub struct ThreadedOracle {
  requests: Sender<WorkerMsg>,
  events: Receiver<OracleEvent>,
  status: OracleStatus,
}

impl ThreadedOracle {
  pub fn spawn() -> Self {
    let (request_tx, request_rx) = channel::<WorkerMsg>();
    let (event_tx, event_rx) = channel::<OracleEvent>();
    thread::spawn(move || worker_loop(request_rx, event_tx));
    Self {
      requests: request_tx,
      events: event_rx,
      status: OracleStatus::Idle,
    }
  }
}

impl Oracle for ThreadedOracle {
  fn status(&self) -> OracleStatus {
    self.status
  }

  fn request_advice(&mut self, request: AdviceRequest) -> bool {
    if self.requests.send(WorkerMsg::Queue(request)).is_err() {
      warn!("advisory worker is gone, dropping request");
      self.status = OracleStatus::NoConnection;
      return false;
    }
    true
  }

  fn trigger_processing(&mut self) {
    if self.requests.send(WorkerMsg::Process).is_err() {
      self.status = OracleStatus::NoConnection;
    }
  }

  fn poll(&mut self) -> Vec<OracleEvent> {
    let mut drained = Vec::new();
    loop {
      match self.events.try_recv() {
        Ok(event) => {
          if let OracleEvent::Status(status) = event {
            self.status = status;
          }
          drained.push(event);
        }
        Err(TryRecvError::Empty) => break,
        Err(TryRecvError::Disconnected) => {
          self.status = OracleStatus::NoConnection;
          break;
        }
      }
    }
    drained
  }
}

// The service side: buffer requests until told to process, then answer
// each with a ranked move list. Runs until the client half hangs up.
fn worker_loop(requests: Receiver<WorkerMsg>, events: Sender<OracleEvent>) {
  let mut pending: VecDeque<AdviceRequest> = VecDeque::new();
  loop {
    match requests.recv() {
      Err(_) => break,
      Ok(WorkerMsg::Queue(request)) => pending.push_back(request),
      Ok(WorkerMsg::Process) => {
        if events.send(OracleEvent::Status(OracleStatus::Busy)).is_err() {
          break;
        }
        while let Some(request) = pending.pop_front() {
          let move_winrates = heuristic::rank_moves(&request.board, request.playing, request.level);
          let prediction = Prediction {
            playing: request.playing,
            move_winrates,
          };
          if events.send(OracleEvent::Prediction(prediction)).is_err() {
            return;
          }
        }
        if events.send(OracleEvent::Status(OracleStatus::Idle)).is_err() {
          break;
        }
      }
    }
  }
}
