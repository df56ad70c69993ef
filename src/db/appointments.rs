use rusqlite::params;
use tracing::{debug, info, warn};

use super::connection::Store;
use crate::error::{is_foreign_key_violation, StoreError};
use crate::models::{Appointment, ScheduledAppointment};
use crate::validation::validate_datetime;

/// Book an appointment. The date/time layout is checked before any connection
/// is opened; missing doctor or patient rows are caught by SQLite's foreign
/// keys and reported as [`StoreError::Referential`].
pub fn add_appointment(
    store: &Store,
    doctor_id: i64,
    patient_id: i64,
    scheduled_at: &str,
    reason: &str,
) -> Result<Appointment, StoreError> {
    validate_datetime(scheduled_at).inspect_err(|err| {
        warn!(error = %err, "rejected appointment");
    })?;
    let reason = reason.trim().to_string();

    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO appointments (doctor_id, patient_id, scheduled_at, reason)
         VALUES (?1, ?2, ?3, ?4)",
        params![doctor_id, patient_id, scheduled_at, reason],
    )
    .map_err(|err| {
        if is_foreign_key_violation(&err) {
            warn!(doctor_id, patient_id, "appointment references missing record");
            StoreError::Referential {
                doctor_id,
                patient_id,
            }
        } else {
            err.into()
        }
    })?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    info!(appointment_id = id, doctor_id, patient_id, "appointment added");
    Ok(Appointment {
        id,
        doctor_id,
        patient_id,
        scheduled_at: scheduled_at.to_string(),
        reason,
    })
}

/// All appointments with their doctor and patient names, earliest first. The
/// fixed-width date/time format makes the string order chronological.
pub fn list_appointments(store: &Store) -> Result<Vec<ScheduledAppointment>, StoreError> {
    let conn = store.connect()?;
    let mut stmt = conn.prepare(
        "SELECT a.id, a.doctor_id, a.patient_id, a.scheduled_at, a.reason,
                d.name, p.name
         FROM appointments a
         INNER JOIN doctors d ON d.id = a.doctor_id
         INNER JOIN patients p ON p.id = a.patient_id
         ORDER BY a.scheduled_at, a.id",
    )?;

    let appointments = stmt
        .query_map([], |row| {
            Ok(ScheduledAppointment {
                appointment: Appointment {
                    id: row.get(0)?,
                    doctor_id: row.get(1)?,
                    patient_id: row.get(2)?,
                    scheduled_at: row.get(3)?,
                    reason: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                },
                doctor_name: row.get(5)?,
                patient_name: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = appointments.len(), "listed appointments");
    Ok(appointments)
}

/// Cancel a single appointment. Unknown ids are ignored.
pub fn remove_appointment(store: &Store, id: i64) -> Result<(), StoreError> {
    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    let deleted = tx.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!(appointment_id = id, deleted, "appointment removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_doctor, add_patient, list_doctors, remove_doctor, remove_patient};

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("agenda.sqlite")).unwrap();
        (dir, store)
    }

    #[test]
    fn calendar_invalid_but_well_formed_datetime_is_accepted() {
        let (_dir, store) = temp_store();
        let doctor = add_doctor(&store, "Ana", "", "").unwrap();
        let patient = add_patient(&store, "Bruno", "", "").unwrap();

        let appointment =
            add_appointment(&store, doctor.id, patient.id, "2024-02-30 10:00", "").unwrap();

        let listed = list_appointments(&store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment, appointment);
        assert_eq!(listed[0].appointment.scheduled_at, "2024-02-30 10:00");
    }

    #[test]
    fn wrong_datetime_format_is_rejected_before_storage() {
        let (_dir, store) = temp_store();
        let doctor = add_doctor(&store, "Ana", "", "").unwrap();
        let patient = add_patient(&store, "Bruno", "", "").unwrap();

        let err = add_appointment(&store, doctor.id, patient.id, "02-30-2024 10:00", "")
            .unwrap_err();
        assert!(err.is_validation());
        assert!(list_appointments(&store).unwrap().is_empty());
    }

    #[test]
    fn unknown_doctor_or_patient_is_a_referential_error() {
        let (_dir, store) = temp_store();
        let doctor = add_doctor(&store, "Ana", "", "").unwrap();
        let patient = add_patient(&store, "Bruno", "", "").unwrap();

        let err = add_appointment(&store, 42, patient.id, "2024-03-01 08:00", "").unwrap_err();
        assert!(err.is_referential());
        let err = add_appointment(&store, doctor.id, 42, "2024-03-01 08:00", "").unwrap_err();
        assert!(err.is_referential());

        assert!(list_appointments(&store).unwrap().is_empty());
    }

    #[test]
    fn list_joins_names_and_orders_chronologically() {
        let (_dir, store) = temp_store();
        let ana = add_doctor(&store, "Ana", "Cardiologia", "").unwrap();
        let bruno = add_patient(&store, "Bruno", "", "").unwrap();
        let carla = add_patient(&store, "Carla", "", "").unwrap();

        add_appointment(&store, ana.id, bruno.id, "2024-05-10 14:00", " retorno ").unwrap();
        add_appointment(&store, ana.id, carla.id, "2024-05-10 09:15", "").unwrap();
        add_appointment(&store, ana.id, bruno.id, "2023-12-01 16:45", "").unwrap();

        let listed = list_appointments(&store).unwrap();
        let times: Vec<&str> = listed
            .iter()
            .map(|a| a.appointment.scheduled_at.as_str())
            .collect();
        assert_eq!(
            times,
            ["2023-12-01 16:45", "2024-05-10 09:15", "2024-05-10 14:00"]
        );
        assert_eq!(listed[1].patient_name, "Carla");
        assert_eq!(listed[2].doctor_name, "Ana");
        assert_eq!(listed[2].appointment.reason, "retorno");
    }

    #[test]
    fn removing_a_doctor_cascades_to_their_appointments() {
        let (_dir, store) = temp_store();
        let ana = add_doctor(&store, "Ana", "", "").unwrap();
        let davi = add_doctor(&store, "Davi", "", "").unwrap();
        let bruno = add_patient(&store, "Bruno", "", "").unwrap();

        add_appointment(&store, ana.id, bruno.id, "2024-01-01 10:00", "").unwrap();
        add_appointment(&store, ana.id, bruno.id, "2024-01-02 10:00", "").unwrap();
        let kept = add_appointment(&store, davi.id, bruno.id, "2024-01-03 10:00", "").unwrap();

        remove_doctor(&store, ana.id).unwrap();

        let listed = list_appointments(&store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].appointment, kept);
        assert_eq!(list_doctors(&store).unwrap(), vec![davi]);
    }

    #[test]
    fn removing_a_patient_cascades_to_their_appointments() {
        let (_dir, store) = temp_store();
        let ana = add_doctor(&store, "Ana", "", "").unwrap();
        let bruno = add_patient(&store, "Bruno", "", "").unwrap();

        add_appointment(&store, ana.id, bruno.id, "2024-01-01 10:00", "").unwrap();
        remove_patient(&store, bruno.id).unwrap();

        assert!(list_appointments(&store).unwrap().is_empty());
    }

    #[test]
    fn removing_an_appointment_leaves_the_rest() {
        let (_dir, store) = temp_store();
        let ana = add_doctor(&store, "Ana", "", "").unwrap();
        let bruno = add_patient(&store, "Bruno", "", "").unwrap();
        let first = add_appointment(&store, ana.id, bruno.id, "2024-01-01 10:00", "").unwrap();
        let second = add_appointment(&store, ana.id, bruno.id, "2024-01-02 10:00", "").unwrap();

        remove_appointment(&store, first.id).unwrap();
        remove_appointment(&store, 9999).unwrap();

        let listed = list_appointments(&store).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), second.id);
    }
}
