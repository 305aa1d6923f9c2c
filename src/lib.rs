// SYNOID Highlights Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod agent;
pub mod editor_api;
pub mod error;
pub mod server;
pub mod state;

pub use error::HighlightError;
