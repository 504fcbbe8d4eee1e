//! Shared game state, balance tables, errors, and the session that drives a
//! playthrough.

pub mod balance;
pub mod constants;
pub mod error;
pub mod game_state;
pub mod session;

pub use balance::*;
pub use error::*;
pub use game_state::GameState;
pub use session::{ItemUse, Progress, Session};
