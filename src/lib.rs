//! Admin timeline for events and their date-ranged blocks.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod ui;
