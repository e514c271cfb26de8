//! Rendering: one function per panel or tab, all reading from [`AppState`].
//!
//! [`AppState`]: crate::state::AppState

pub mod loading;
pub mod panels;
pub mod preview;
pub mod scene;
pub mod statistics;
