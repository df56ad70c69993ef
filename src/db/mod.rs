//! Persistence module split across logical submodules. Every public function
//! takes the [`Store`] handle, opens one connection, runs one statement inside
//! a transaction, and drops the connection before returning.

mod appointments;
mod connection;
mod doctors;
mod patients;

pub use appointments::{add_appointment, list_appointments, remove_appointment};
pub use connection::Store;
pub use doctors::{add_doctor, list_doctors, remove_doctor};
pub use patients::{add_patient, list_patients, remove_patient};
