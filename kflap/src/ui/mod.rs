//! Live terminal UI for the flap monitor.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        session.rs                            │
//! │  run ─── run_loop (tokio::select!)                           │
//! │            │  ticks ──► Scheduler::dispatch ──► poll task    │
//! │            │  PollOutcome ◄──────────────── mpsc ◄───┘       │
//! │            │  key / resize events (crossterm)                │
//! └────────────┼─────────────────────────────────────────────────┘
//!              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  state.rs  FlapState (MonitorState + PollTracker + Phase)    │
//! │  view.rs   rank ─── Table ─── footer                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `session` - terminal setup/teardown and the event loop
//! - `state` - state owned by the loop
//! - `view` - frame rendering
//! - `components` - title, header row and footer widgets
//! - `events` - quit key detection
//! - `layout` - column widths and truncation

pub mod components;
pub mod events;
pub mod layout;
pub mod session;
pub mod state;
pub mod view;

pub use session::run;
