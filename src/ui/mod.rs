//! Ratatui front end: three list screens (doctors, patients, appointments)
//! with modal add forms and delete confirmations. Every action calls straight
//! into the record store and reloads the lists afterwards.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
