//! The `citations` binary: batch modes and the interactive console menu.
pub mod batch;
pub mod cli;
pub mod console;
pub mod logging;
pub mod menu;
