//! Session list feature slice.

pub mod state;

pub use state::{SessionsState, mint_temp_session_id};
