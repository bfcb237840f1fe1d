//! nineslice - Library for nine-slice editing and compositing
//!
//! This library provides functionality to:
//! - Place and drag the four cut lines that split an image into a 3x3 grid
//! - Decompose the grid into source/destination cells for any target size
//! - Composite the cells into a resized image with unscaled corners
//! - Render an editor overlay and save results as PNG

pub mod cli;
pub mod compositor;
pub mod config;
pub mod editor;
pub mod layout;
pub mod models;
pub mod output;
pub mod overlay;
pub mod pointer;
pub mod session;
pub mod sidecar;
pub mod source;
pub mod watch;
