//! Core library for the medical agenda: an SQLite-backed record store for
//! doctors, patients, and appointments, plus the terminal front end that
//! drives it.
//!
//! The record store is usable on its own:
//!
//! ```no_run
//! use medical_agenda::{add_doctor, list_doctors, Store};
//!
//! let store = Store::open("agenda.sqlite")?;
//! add_doctor(&store, "Ana", "Cardiologia", "123")?;
//! assert_eq!(list_doctors(&store)?.len(), 1);
//! # Ok::<(), medical_agenda::StoreError>(())
//! ```
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;
pub mod validation;

/// Runtime settings resolved once by `main.rs` before anything else starts.
pub use config::AppConfig;

/// The record store: the [`Store`] handle plus add/list/remove per entity.
/// These are the only calls the front end makes into persistence.
pub use db::{
    add_appointment, add_doctor, add_patient, list_appointments, list_doctors, list_patients,
    remove_appointment, remove_doctor, remove_patient, Store,
};

/// Error kinds returned by the record store, so callers can tell rejected
/// input apart from a missing doctor or patient.
pub use error::{StoreError, ValidationError};

/// Plain record types passed between persistence and presentation.
pub use models::{Appointment, Doctor, Patient, ScheduledAppointment};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
