use ratatui::layout::Constraint;
use ratatui::widgets::{Cell, Row};

use crate::models::{Doctor, Patient, ScheduledAppointment};

/// The three list screens, in navigation order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum Screen {
    #[default]
    Doctors,
    Patients,
    Appointments,
}

impl Screen {
    pub(crate) const ALL: [Screen; 3] = [Screen::Doctors, Screen::Patients, Screen::Appointments];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Screen::Doctors => "Doctors",
            Screen::Patients => "Patients",
            Screen::Appointments => "Appointments",
        }
    }

    pub(crate) fn heading(self) -> &'static str {
        match self {
            Screen::Doctors => "Doctor Management",
            Screen::Patients => "Patient Management",
            Screen::Appointments => "Appointment Scheduling",
        }
    }

    pub(crate) fn index(self) -> usize {
        Screen::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Neighbouring screen, wrapping at both ends.
    pub(crate) fn offset(self, delta: isize) -> Screen {
        let len = Screen::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(len);
        Screen::ALL[idx as usize]
    }

    pub(crate) fn header(self) -> Row<'static> {
        let cells: &[&str] = match self {
            Screen::Doctors => &["ID", "Name", "Specialty", "Phone"],
            Screen::Patients => &["ID", "Name", "CPF", "Phone"],
            Screen::Appointments => &["ID", "Date/Time", "Doctor", "Patient", "Reason"],
        };
        Row::new(cells.iter().map(|c| Cell::from(*c)))
    }

    pub(crate) fn widths(self) -> Vec<Constraint> {
        match self {
            Screen::Doctors | Screen::Patients => vec![
                Constraint::Length(6),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ],
            Screen::Appointments => vec![
                Constraint::Length(6),
                Constraint::Length(17),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(50),
            ],
        }
    }
}

pub(crate) fn doctor_row(doctor: &Doctor) -> Row<'static> {
    Row::new(vec![
        doctor.id.to_string(),
        doctor.name.clone(),
        doctor.specialty.clone(),
        doctor.phone.clone(),
    ])
}

pub(crate) fn patient_row(patient: &Patient) -> Row<'static> {
    Row::new(vec![
        patient.id.to_string(),
        patient.name.clone(),
        patient.code.clone(),
        patient.phone.clone(),
    ])
}

pub(crate) fn appointment_row(entry: &ScheduledAppointment) -> Row<'static> {
    Row::new(vec![
        entry.appointment.id.to_string(),
        entry.appointment.scheduled_at.clone(),
        entry.doctor_name.clone(),
        entry.patient_name.clone(),
        entry.appointment.reason.clone(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_wrap_in_both_directions() {
        assert_eq!(Screen::Doctors.offset(-1), Screen::Appointments);
        assert_eq!(Screen::Appointments.offset(1), Screen::Doctors);
        assert_eq!(Screen::Doctors.offset(1), Screen::Patients);
    }

    #[test]
    fn widths_match_header_columns() {
        assert_eq!(Screen::Doctors.widths().len(), 4);
        assert_eq!(Screen::Appointments.widths().len(), 5);
    }
}
