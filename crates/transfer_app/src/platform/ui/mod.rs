//! Console stand-in for the window: typed commands in, status lines out.
pub mod commands;
pub mod render;
