//! Navigation decision engine
//!
//! One [`NavigationController::tick`] per control period:
//!
//! ```text
//! sensors ──▶ mark / front edges ──▶ executor ──▶ (idle?) classify + plan ──▶ executor
//!                    │                    │                                      │
//!                 counter            motion cmd                              motion cmd
//! ```
//!
//! - [`action`]: Timed maneuvers and their effect on motion and count mode
//! - [`queue`]: Bounded FIFO of planned maneuvers
//! - [`executor`]: Runs at most one maneuver at a time, to completion
//! - [`planner`]: Scene classification and maneuver plans
//! - [`state`]: Counter, modes and scene bookkeeping
//! - [`controller`]: Per-tick orchestration

pub mod action;
pub mod controller;
pub mod executor;
pub mod planner;
pub mod queue;
pub mod state;

pub use action::{ActionKind, ActionTiming, SpeedProfile, TimedAction};
pub use controller::{ControllerConfig, NavigationController};
pub use executor::{ActiveAction, Executor};
pub use planner::{ActionPlanner, classify};
pub use queue::ActionQueue;
pub use state::NavigationState;
