use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use tracing::debug;

use crate::db::{
    add_appointment, add_doctor, add_patient, list_appointments, list_doctors, list_patients,
    remove_appointment, remove_doctor, remove_patient, Store,
};
use crate::models::{Doctor, Patient, ScheduledAppointment};

use super::forms::{AppointmentForm, ConfirmDelete, DeleteTarget, DoctorForm, PatientForm};
use super::helpers::{centered_rect, step_selection, surface_error};
use super::screens::{appointment_row, doctor_row, patient_row, Screen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Tab bar plus screen heading.
const HEADER_HEIGHT: u16 = 3;

const ABOUT_TEXT: &[&str] = &[
    "Medical Agenda",
    "",
    "Register doctors and patients and schedule appointments.",
    "Removing a doctor or patient also removes their appointments.",
    "",
    "Data is kept in a local SQLite file.",
];

/// Modal state layered on top of the current screen.
enum Mode {
    Normal,
    AddingDoctor(DoctorForm),
    AddingPatient(PatientForm),
    Scheduling(AppointmentForm),
    ConfirmDelete(ConfirmDelete),
    About,
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Holds the store handle plus the last listing of
/// each entity; every mutation goes through the store and then reloads.
pub struct App {
    store: Store,
    doctors: Vec<Doctor>,
    patients: Vec<Patient>,
    appointments: Vec<ScheduledAppointment>,
    screen: Screen,
    selected: [usize; 3],
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app and load the three lists.
    pub fn new(store: Store) -> Result<Self> {
        let mut app = Self {
            store,
            doctors: Vec::new(),
            patients: Vec::new(),
            appointments: Vec::new(),
            screen: Screen::default(),
            selected: [0; 3],
            mode: Mode::Normal,
            status: None,
        };
        app.reload_all()?;
        Ok(app)
    }

    /// Process a key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingDoctor(form) => self.handle_doctor_form(code, form),
            Mode::AddingPatient(form) => self.handle_patient_form(code, form),
            Mode::Scheduling(form) => self.handle_appointment_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::About => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                    Mode::Normal
                }
                _ => Mode::About,
            },
        };

        Ok(exit)
    }

    /// Storage failures in this mode land in the status bar; the app keeps
    /// running with the lists it last loaded.
    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Tab | KeyCode::Right => self.switch_screen(self.screen.offset(1)),
            KeyCode::BackTab | KeyCode::Left => self.switch_screen(self.screen.offset(-1)),
            KeyCode::Char('1') => self.switch_screen(Screen::Doctors),
            KeyCode::Char('2') => self.switch_screen(Screen::Patients),
            KeyCode::Char('3') => self.switch_screen(Screen::Appointments),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('r') => {
                if self.refresh() {
                    self.set_status("Lists refreshed.", StatusKind::Info);
                }
            }
            KeyCode::Char('?') => return Mode::About,
            KeyCode::Char('a') => return self.open_add_form(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(confirm) = self.pending_delete() {
                    return Mode::ConfirmDelete(confirm);
                }
                let noun = match self.screen {
                    Screen::Doctors => "a doctor",
                    Screen::Patients => "a patient",
                    Screen::Appointments => "an appointment",
                };
                self.set_status(format!("Select {noun} in the list."), StatusKind::Warning);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn open_add_form(&mut self) -> Mode {
        self.clear_status();
        match self.screen {
            Screen::Doctors => Mode::AddingDoctor(DoctorForm::default()),
            Screen::Patients => Mode::AddingPatient(PatientForm::default()),
            Screen::Appointments => {
                if self.doctors.is_empty() || self.patients.is_empty() {
                    self.set_status(
                        "Register at least one doctor and one patient first.",
                        StatusKind::Warning,
                    );
                    Mode::Normal
                } else {
                    Mode::Scheduling(AppointmentForm::new(&self.doctors, &self.patients))
                }
            }
        }
    }

    fn handle_doctor_form(&mut self, code: KeyCode, mut form: DoctorForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add doctor cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(true),
            KeyCode::BackTab | KeyCode::Up => form.focus_next(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_doctor(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingDoctor(form)
    }

    fn handle_patient_form(&mut self, code: KeyCode, mut form: PatientForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add patient cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(true),
            KeyCode::BackTab | KeyCode::Up => form.focus_next(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_patient(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingPatient(form)
    }

    fn handle_appointment_form(&mut self, code: KeyCode, mut form: AppointmentForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Scheduling cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(true),
            KeyCode::BackTab | KeyCode::Up => form.focus_next(false),
            KeyCode::Left => form.step_picker(-1),
            KeyCode::Right => form.step_picker(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_appointment(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Scheduling(form)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.report_error(&err);
                        Mode::ConfirmDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn save_doctor(&mut self, form: &DoctorForm) -> Result<()> {
        let doctor = add_doctor(&self.store, &form.name, &form.specialty, &form.phone)
            .context("failed to add doctor")?;
        self.after_write(
            format!("Doctor {} added.", doctor.name),
            Some((Screen::Doctors, doctor.id)),
        );
        Ok(())
    }

    fn save_patient(&mut self, form: &PatientForm) -> Result<()> {
        form.check_code()?;
        let patient = add_patient(&self.store, &form.name, &form.code, &form.phone)
            .context("failed to add patient")?;
        self.after_write(
            format!("Patient {} added.", patient.name),
            Some((Screen::Patients, patient.id)),
        );
        Ok(())
    }

    fn save_appointment(&mut self, form: &AppointmentForm) -> Result<()> {
        let (doctor_id, patient_id) = form.selected_ids()?;
        let appointment = add_appointment(
            &self.store,
            doctor_id,
            patient_id,
            &form.scheduled_at,
            &form.reason,
        )
        .context("failed to schedule appointment")?;
        self.after_write(
            format!("Appointment scheduled for {}.", appointment.scheduled_at),
            Some((Screen::Appointments, appointment.id)),
        );
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        match confirm.target {
            DeleteTarget::Doctor => remove_doctor(&self.store, confirm.id),
            DeleteTarget::Patient => remove_patient(&self.store, confirm.id),
            DeleteTarget::Appointment => remove_appointment(&self.store, confirm.id),
        }
        .context("failed to remove record")?;

        // Cascades touch the appointment list too, so refresh everything.
        self.after_write(format!("Removed {}.", confirm.description), None);
        Ok(())
    }

    /// Finish a committed write: reload the lists and report success. A failed
    /// reload is reported on its own so the caller still closes its form and
    /// the write is not submitted twice.
    fn after_write(&mut self, message: String, focus: Option<(Screen, i64)>) {
        if !self.refresh() {
            if let Some(status) = self.status.as_mut() {
                status.text = format!("{message} Lists could not be reloaded: {}", status.text);
            }
            return;
        }
        if let Some((screen, id)) = focus {
            self.focus_row(screen, id);
        }
        self.set_status(message, StatusKind::Info);
    }

    /// Reload every list, sending a failure to the status bar. Returns whether
    /// the reload succeeded.
    fn refresh(&mut self) -> bool {
        match self.reload_all() {
            Ok(()) => true,
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    fn pending_delete(&self) -> Option<ConfirmDelete> {
        let idx = self.selected[self.screen.index()];
        match self.screen {
            Screen::Doctors => self.doctors.get(idx).map(|d| ConfirmDelete {
                target: DeleteTarget::Doctor,
                id: d.id,
                description: d.name.clone(),
            }),
            Screen::Patients => self.patients.get(idx).map(|p| ConfirmDelete {
                target: DeleteTarget::Patient,
                id: p.id,
                description: p.name.clone(),
            }),
            Screen::Appointments => self.appointments.get(idx).map(|a| ConfirmDelete {
                target: DeleteTarget::Appointment,
                id: a.id(),
                description: format!(
                    "{} ({} with {})",
                    a.appointment.scheduled_at, a.patient_name, a.doctor_name
                ),
            }),
        }
    }

    fn reload_all(&mut self) -> Result<()> {
        // Load everything before replacing anything so a failure keeps the
        // previous lists intact.
        let doctors = list_doctors(&self.store).context("failed to load doctors")?;
        let patients = list_patients(&self.store).context("failed to load patients")?;
        let appointments =
            list_appointments(&self.store).context("failed to load appointments")?;
        self.doctors = doctors;
        self.patients = patients;
        self.appointments = appointments;

        let lens = [
            self.doctors.len(),
            self.patients.len(),
            self.appointments.len(),
        ];
        for (selected, len) in self.selected.iter_mut().zip(lens) {
            if *selected >= len {
                *selected = len.saturating_sub(1);
            }
        }
        Ok(())
    }

    fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.clear_status();
        self.refresh();
    }

    fn row_count(&self) -> usize {
        match self.screen {
            Screen::Doctors => self.doctors.len(),
            Screen::Patients => self.patients.len(),
            Screen::Appointments => self.appointments.len(),
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.row_count();
        let slot = &mut self.selected[self.screen.index()];
        *slot = step_selection(*slot, len, offset);
    }

    fn focus_row(&mut self, screen: Screen, id: i64) {
        let position = match screen {
            Screen::Doctors => self.doctors.iter().position(|d| d.id == id),
            Screen::Patients => self.patients.iter().position(|p| p.id == id),
            Screen::Appointments => self.appointments.iter().position(|a| a.id() == id),
        };
        if let Some(idx) = position {
            self.selected[screen.index()] = idx;
        }
    }

    fn report_error(&mut self, err: &anyhow::Error) -> String {
        debug!(error = %format!("{err:#}"), "operation failed");
        let message = surface_error(err);
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingDoctor(form) => {
                let cursor = form.cursor();
                self.draw_form(
                    frame,
                    area,
                    "Add Doctor",
                    form.lines(),
                    form.error.as_deref(),
                    Some(cursor),
                );
            }
            Mode::AddingPatient(form) => {
                let cursor = form.cursor();
                self.draw_form(
                    frame,
                    area,
                    "Add Patient",
                    form.lines(),
                    form.error.as_deref(),
                    Some(cursor),
                );
            }
            Mode::Scheduling(form) => self.draw_form(
                frame,
                area,
                "Schedule Appointment",
                form.lines(),
                form.error.as_deref(),
                form.cursor(),
            ),
            Mode::ConfirmDelete(confirm) => self.draw_confirm(frame, area, confirm),
            Mode::About => self.draw_about(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = Screen::ALL
            .iter()
            .enumerate()
            .map(|(idx, screen)| format!("{} {}", idx + 1, screen.title()));
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.screen.heading()),
            )
            .select(self.screen.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = match self.screen {
            Screen::Doctors => self.doctors.iter().map(doctor_row).collect(),
            Screen::Patients => self.patients.iter().map(patient_row).collect(),
            Screen::Appointments => self.appointments.iter().map(appointment_row).collect(),
        };
        let empty = rows.is_empty();

        let block = Block::default().borders(Borders::ALL);
        if empty {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Nothing registered yet. Press A to add.",
                Style::default().fg(Color::DarkGray),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let table = Table::new(rows, self.screen.widths())
            .header(
                self.screen
                    .header()
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");

        let mut state = TableState::default();
        state.select(Some(self.selected[self.screen.index()]));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[Tab]", " Screen   "),
                ("[↑↓]", " Select   "),
                ("[A]", " Add   "),
                ("[D]", " Remove   "),
                ("[R]", " Refresh   "),
                ("[?]", " About   "),
                ("[Q]", " Quit"),
            ],
            Mode::Scheduling(_) => &[
                ("[Tab]", " Next field   "),
                ("[←→]", " Choose   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::AddingDoctor(_) | Mode::AddingPatient(_) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) => &[("[Y]", " Confirm   "), ("[N]", " Cancel")],
            Mode::About => &[("[Esc]", " Close")],
        };

        let spans = pairs
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(action.to_string()),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        error: Option<&str>,
        cursor: Option<(u16, u16)>,
    ) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if let Some((column, row)) = cursor {
            let x = (inner.x + column).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((x, inner.y + row));
        }
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(confirm.prompt())];
        if let Some(warning) = confirm.warning() {
            lines.push(Line::from(Span::styled(
                warning,
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_about(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let lines: Vec<Line> = ABOUT_TEXT.iter().map(|line| Line::from(*line)).collect();
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("About").borders(Borders::ALL));
        frame.render_widget(paragraph, popup_area);
    }
}
