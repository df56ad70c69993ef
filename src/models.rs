//! Record types that mirror the SQLite schema. They stay plain data holders so
//! the persistence layer fills them and the terminal front end only formats
//! them.

use std::fmt;

/// A doctor that can be booked for appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Display name. Never blank once stored.
    pub name: String,
    /// Free-text specialty, empty when not informed.
    pub specialty: String,
    /// Contact phone kept as raw text so any local format fits.
    pub phone: String,
}

impl Doctor {
    /// Label used by the appointment form picker, e.g. `3: Ana (Cardiologia)`.
    pub fn picker_label(&self) -> String {
        format!("{}: {} ({})", self.id, self.name, self.specialty)
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Display name. Never blank once stored.
    pub name: String,
    /// Identifying code shown as CPF in the UI. The store treats it as opaque
    /// text and never validates it.
    pub code: String,
    /// Contact phone, empty when not informed.
    pub phone: String,
}

impl Patient {
    /// Label used by the appointment form picker, e.g. `7: Bruno`.
    pub fn picker_label(&self) -> String {
        format!("{}: {}", self.id, self.name)
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A stored appointment row, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    /// Primary key assigned by SQLite.
    pub id: i64,
    /// Doctor being booked. Removing that doctor removes the appointment.
    pub doctor_id: i64,
    /// Patient being seen. Removing that patient removes the appointment.
    pub patient_id: i64,
    /// Date and time in `YYYY-MM-DD HH:MM`. The fixed width makes string order
    /// chronological.
    pub scheduled_at: String,
    /// Free-text reason for the visit, empty when not informed.
    pub reason: String,
}

/// Appointment joined with the names of its doctor and patient, as returned by
/// the appointment listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAppointment {
    /// The stored appointment row.
    pub appointment: Appointment,
    /// Name of the booked doctor at the time of listing.
    pub doctor_name: String,
    /// Name of the patient at the time of listing.
    pub patient_name: String,
}

impl ScheduledAppointment {
    /// Shorthand for the underlying appointment id.
    pub fn id(&self) -> i64 {
        self.appointment.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picker_labels_include_id_and_name() {
        let doctor = Doctor {
            id: 3,
            name: "Ana".into(),
            specialty: "Cardiologia".into(),
            phone: String::new(),
        };
        assert_eq!(doctor.picker_label(), "3: Ana (Cardiologia)");

        let patient = Patient {
            id: 7,
            name: "Bruno".into(),
            code: String::new(),
            phone: String::new(),
        };
        assert_eq!(patient.picker_label(), "7: Bruno");
        assert_eq!(patient.to_string(), "Bruno");
    }
}
