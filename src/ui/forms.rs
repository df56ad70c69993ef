use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Doctor, Patient};
use crate::validation::validate_date;

/// Render one `Label: value` row, highlighting the focused field and showing a
/// placeholder when the value is empty.
fn field_line(name: &str, value: &str, is_active: bool, required: bool) -> Line<'static> {
    let display = match (value.is_empty(), required) {
        (false, _) => value.to_string(),
        (true, true) => "<required>".to_string(),
        (true, false) => "<optional>".to_string(),
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{name}: ")),
        Span::styled(display, style),
    ])
}

/// Accept any printable character into a text buffer.
fn push_text(buffer: &mut String, ch: char) -> bool {
    if ch.is_control() {
        false
    } else {
        buffer.push(ch);
        true
    }
}

/// Fields of the doctor form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum DoctorField {
    #[default]
    Name,
    Specialty,
    Phone,
}

impl DoctorField {
    pub(crate) const ALL: [DoctorField; 3] =
        [DoctorField::Name, DoctorField::Specialty, DoctorField::Phone];

    pub(crate) fn label(self) -> &'static str {
        match self {
            DoctorField::Name => "Name",
            DoctorField::Specialty => "Specialty",
            DoctorField::Phone => "Phone",
        }
    }
}

#[derive(Default, Clone, Debug)]
pub(crate) struct DoctorForm {
    pub(crate) name: String,
    pub(crate) specialty: String,
    pub(crate) phone: String,
    pub(crate) active: DoctorField,
    pub(crate) error: Option<String>,
}

impl DoctorForm {
    pub(crate) fn focus_next(&mut self, forward: bool) {
        self.active = cycle(&DoctorField::ALL, self.active, forward);
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.active {
            DoctorField::Name => &mut self.name,
            DoctorField::Specialty => &mut self.specialty,
            DoctorField::Phone => &mut self.phone,
        }
    }

    pub(crate) fn value(&self, field: DoctorField) -> &str {
        match field {
            DoctorField::Name => &self.name,
            DoctorField::Specialty => &self.specialty,
            DoctorField::Phone => &self.phone,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        push_text(self.buffer_mut(), ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.buffer_mut().pop();
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        DoctorField::ALL
            .iter()
            .map(|&field| {
                field_line(
                    field.label(),
                    self.value(field),
                    self.active == field,
                    field == DoctorField::Name,
                )
            })
            .collect()
    }

    /// Row and column of the text cursor relative to the form body.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = DoctorField::ALL
            .iter()
            .position(|&f| f == self.active)
            .unwrap_or(0);
        let column = self.active.label().len() + 2 + self.value(self.active).chars().count();
        (column as u16, row as u16)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum PatientField {
    #[default]
    Name,
    Code,
    Phone,
}

impl PatientField {
    pub(crate) const ALL: [PatientField; 3] =
        [PatientField::Name, PatientField::Code, PatientField::Phone];

    pub(crate) fn label(self) -> &'static str {
        match self {
            PatientField::Name => "Name",
            PatientField::Code => "CPF",
            PatientField::Phone => "Phone",
        }
    }
}

#[derive(Default, Clone, Debug)]
pub(crate) struct PatientForm {
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) phone: String,
    pub(crate) active: PatientField,
    pub(crate) error: Option<String>,
}

impl PatientForm {
    pub(crate) fn focus_next(&mut self, forward: bool) {
        self.active = cycle(&PatientField::ALL, self.active, forward);
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self.active {
            PatientField::Name => &mut self.name,
            PatientField::Code => &mut self.code,
            PatientField::Phone => &mut self.phone,
        }
    }

    pub(crate) fn value(&self, field: PatientField) -> &str {
        match field {
            PatientField::Name => &self.name,
            PatientField::Code => &self.code,
            PatientField::Phone => &self.phone,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        push_text(self.buffer_mut(), ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.buffer_mut().pop();
    }

    /// The CPF field doubles as a date in some records; when filled in it must
    /// read `YYYY-MM-DD`. The store itself never checks it.
    pub(crate) fn check_code(&self) -> Result<()> {
        let code = self.code.trim();
        if !code.is_empty() {
            validate_date(code)?;
        }
        Ok(())
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        PatientField::ALL
            .iter()
            .map(|&field| {
                field_line(
                    field.label(),
                    self.value(field),
                    self.active == field,
                    field == PatientField::Name,
                )
            })
            .collect()
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = PatientField::ALL
            .iter()
            .position(|&f| f == self.active)
            .unwrap_or(0);
        let column = self.active.label().len() + 2 + self.value(self.active).chars().count();
        (column as u16, row as u16)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum AppointmentField {
    #[default]
    Doctor,
    Patient,
    DateTime,
    Reason,
}

impl AppointmentField {
    pub(crate) const ALL: [AppointmentField; 4] = [
        AppointmentField::Doctor,
        AppointmentField::Patient,
        AppointmentField::DateTime,
        AppointmentField::Reason,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            AppointmentField::Doctor => "Doctor",
            AppointmentField::Patient => "Patient",
            AppointmentField::DateTime => "Date/Time (YYYY-MM-DD HH:MM)",
            AppointmentField::Reason => "Reason",
        }
    }
}

/// A pick-one list of `(id, label)` options.
#[derive(Default, Clone, Debug)]
pub(crate) struct Picker {
    pub(crate) options: Vec<(i64, String)>,
    pub(crate) selected: usize,
}

impl Picker {
    pub(crate) fn new(options: Vec<(i64, String)>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub(crate) fn step(&mut self, offset: isize) {
        let len = self.options.len();
        if len == 0 {
            return;
        }
        let next = (self.selected as isize + offset).rem_euclid(len as isize);
        self.selected = next as usize;
    }

    pub(crate) fn current(&self) -> Option<&(i64, String)> {
        self.options.get(self.selected)
    }
}

#[derive(Default, Clone, Debug)]
pub(crate) struct AppointmentForm {
    pub(crate) doctors: Picker,
    pub(crate) patients: Picker,
    pub(crate) scheduled_at: String,
    pub(crate) reason: String,
    pub(crate) active: AppointmentField,
    pub(crate) error: Option<String>,
}

impl AppointmentForm {
    pub(crate) fn new(doctors: &[Doctor], patients: &[Patient]) -> Self {
        Self {
            doctors: Picker::new(doctors.iter().map(|d| (d.id, d.picker_label())).collect()),
            patients: Picker::new(patients.iter().map(|p| (p.id, p.picker_label())).collect()),
            ..Self::default()
        }
    }

    pub(crate) fn focus_next(&mut self, forward: bool) {
        self.active = cycle(&AppointmentField::ALL, self.active, forward);
    }

    /// Left/Right on a picker field cycles its options; other fields ignore it.
    pub(crate) fn step_picker(&mut self, offset: isize) {
        match self.active {
            AppointmentField::Doctor => self.doctors.step(offset),
            AppointmentField::Patient => self.patients.step(offset),
            AppointmentField::DateTime | AppointmentField::Reason => {}
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            AppointmentField::DateTime => push_text(&mut self.scheduled_at, ch),
            AppointmentField::Reason => push_text(&mut self.reason, ch),
            AppointmentField::Doctor | AppointmentField::Patient => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            AppointmentField::DateTime => {
                self.scheduled_at.pop();
            }
            AppointmentField::Reason => {
                self.reason.pop();
            }
            AppointmentField::Doctor | AppointmentField::Patient => {}
        }
    }

    /// Ids of the chosen doctor and patient.
    pub(crate) fn selected_ids(&self) -> Result<(i64, i64)> {
        match (self.doctors.current(), self.patients.current()) {
            (Some((doctor_id, _)), Some((patient_id, _))) => Ok((*doctor_id, *patient_id)),
            _ => Err(anyhow!("Choose a doctor and a patient.")),
        }
    }

    fn picker_text(picker: &Picker) -> String {
        match picker.current() {
            Some((_, label)) if picker.options.len() > 1 => format!("< {label} >"),
            Some((_, label)) => label.clone(),
            None => String::new(),
        }
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        AppointmentField::ALL
            .iter()
            .map(|&field| {
                let value = match field {
                    AppointmentField::Doctor => Self::picker_text(&self.doctors),
                    AppointmentField::Patient => Self::picker_text(&self.patients),
                    AppointmentField::DateTime => self.scheduled_at.clone(),
                    AppointmentField::Reason => self.reason.clone(),
                };
                field_line(
                    field.label(),
                    &value,
                    self.active == field,
                    field != AppointmentField::Reason,
                )
            })
            .collect()
    }

    /// Cursor position for text fields; pickers hide the cursor.
    pub(crate) fn cursor(&self) -> Option<(u16, u16)> {
        let (row, value) = match self.active {
            AppointmentField::DateTime => (2, &self.scheduled_at),
            AppointmentField::Reason => (3, &self.reason),
            AppointmentField::Doctor | AppointmentField::Patient => return None,
        };
        let column = self.active.label().len() + 2 + value.chars().count();
        Some((column as u16, row))
    }
}

/// Which list a pending deletion targets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum DeleteTarget {
    Doctor,
    Patient,
    Appointment,
}

#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) target: DeleteTarget,
    pub(crate) id: i64,
    pub(crate) description: String,
}

impl ConfirmDelete {
    pub(crate) fn prompt(&self) -> String {
        match self.target {
            DeleteTarget::Doctor => format!("Remove doctor {}?", self.description),
            DeleteTarget::Patient => format!("Remove patient {}?", self.description),
            DeleteTarget::Appointment => format!("Remove appointment {}?", self.description),
        }
    }

    /// Extra warning for deletions that cascade.
    pub(crate) fn warning(&self) -> Option<&'static str> {
        match self.target {
            DeleteTarget::Doctor | DeleteTarget::Patient => {
                Some("This will also remove linked appointments.")
            }
            DeleteTarget::Appointment => None,
        }
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|&f| f == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else {
        (idx + all.len() - 1) % all.len()
    };
    all[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_form_edits_the_focused_field() {
        let mut form = DoctorForm::default();
        for ch in "Ana".chars() {
            form.push_char(ch);
        }
        form.focus_next(true);
        form.push_char('X');
        form.backspace();
        form.push_char('C');
        assert!(!form.push_char('\n'));

        assert_eq!(form.name, "Ana");
        assert_eq!(form.specialty, "C");
        assert_eq!(form.cursor(), ("Specialty: ".len() as u16 + 1, 1));

        form.focus_next(false);
        form.focus_next(false);
        assert_eq!(form.active, DoctorField::Phone);
    }

    #[test]
    fn patient_code_is_checked_only_when_filled() {
        let mut form = PatientForm::default();
        assert!(form.check_code().is_ok());

        form.code = "1990-05-20".into();
        assert!(form.check_code().is_ok());

        form.code = "20/05/1990".into();
        assert!(form.check_code().is_err());
    }

    #[test]
    fn appointment_pickers_wrap_around() {
        let doctors = vec![
            Doctor {
                id: 1,
                name: "Ana".into(),
                specialty: String::new(),
                phone: String::new(),
            },
            Doctor {
                id: 4,
                name: "Davi".into(),
                specialty: String::new(),
                phone: String::new(),
            },
        ];
        let patients = vec![Patient {
            id: 9,
            name: "Bruno".into(),
            code: String::new(),
            phone: String::new(),
        }];

        let mut form = AppointmentForm::new(&doctors, &patients);
        form.step_picker(-1);
        assert_eq!(form.selected_ids().unwrap(), (4, 9));
        form.step_picker(1);
        assert_eq!(form.selected_ids().unwrap(), (1, 9));

        assert!(!form.push_char('x'));
        assert_eq!(form.cursor(), None);
    }

    #[test]
    fn appointment_form_requires_both_pickers() {
        let form = AppointmentForm::new(&[], &[]);
        assert!(form.selected_ids().is_err());
    }

    #[test]
    fn only_cascading_deletes_carry_a_warning() {
        let confirm = ConfirmDelete {
            target: DeleteTarget::Doctor,
            id: 1,
            description: "Ana".into(),
        };
        assert!(confirm.warning().is_some());
        assert_eq!(confirm.prompt(), "Remove doctor Ana?");

        let confirm = ConfirmDelete {
            target: DeleteTarget::Appointment,
            ..confirm
        };
        assert!(confirm.warning().is_none());
    }
}
