use rusqlite::params;
use tracing::{debug, info, warn};

use super::connection::Store;
use crate::error::StoreError;
use crate::models::Doctor;
use crate::validation::require_name;

/// Insert a doctor after trimming every field. Names may repeat; only a blank
/// name is rejected, and that happens before the database is touched.
pub fn add_doctor(
    store: &Store,
    name: &str,
    specialty: &str,
    phone: &str,
) -> Result<Doctor, StoreError> {
    let name = require_name("Doctor", name).inspect_err(|err| {
        warn!(error = %err, "rejected doctor");
    })?;
    let specialty = specialty.trim().to_string();
    let phone = phone.trim().to_string();

    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO doctors (name, specialty, phone) VALUES (?1, ?2, ?3)",
        params![name, specialty, phone],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    info!(doctor_id = id, "doctor added");
    Ok(Doctor {
        id,
        name,
        specialty,
        phone,
    })
}

/// Every doctor ordered by name. Ties keep insertion order. Names compare
/// byte by byte (SQLite's default collation), so `"B"` sorts before `"a"`.
pub fn list_doctors(store: &Store) -> Result<Vec<Doctor>, StoreError> {
    let conn = store.connect()?;
    let mut stmt = conn.prepare(
        "SELECT id, name, specialty, phone FROM doctors ORDER BY name, id",
    )?;

    let doctors = stmt
        .query_map([], |row| {
            Ok(Doctor {
                id: row.get(0)?,
                name: row.get(1)?,
                specialty: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = doctors.len(), "listed doctors");
    Ok(doctors)
}

/// Remove a doctor. The schema cascades to `appointments`, so every
/// appointment with this doctor goes too. Unknown ids are ignored.
pub fn remove_doctor(store: &Store, id: i64) -> Result<(), StoreError> {
    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    let deleted = tx.execute("DELETE FROM doctors WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!(doctor_id = id, deleted, "doctor removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("agenda.sqlite")).unwrap();
        (dir, store)
    }

    #[test]
    fn round_trip_trims_fields_and_assigns_id() {
        let (_dir, store) = temp_store();

        let added = add_doctor(&store, "  Ana ", " Cardiologia ", " 123 ").unwrap();
        let doctors = list_doctors(&store).unwrap();

        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0], added);
        assert_eq!(doctors[0].name, "Ana");
        assert_eq!(doctors[0].specialty, "Cardiologia");
        assert_eq!(doctors[0].phone, "123");
        assert!(doctors[0].id > 0);
    }

    #[test]
    fn blank_names_are_rejected_and_not_stored() {
        let (_dir, store) = temp_store();

        for name in ["", "   ", "\t\n"] {
            let err = add_doctor(&store, name, "Clínico", "").unwrap_err();
            assert!(err.is_validation());
        }
        assert!(list_doctors(&store).unwrap().is_empty());
    }

    #[test]
    fn list_orders_by_name_and_allows_duplicates() {
        let (_dir, store) = temp_store();

        add_doctor(&store, "Carla", "", "").unwrap();
        add_doctor(&store, "Ana", "", "").unwrap();
        add_doctor(&store, "Bruno", "", "").unwrap();
        add_doctor(&store, "Ana", "Pediatria", "").unwrap();

        let names: Vec<String> = list_doctors(&store)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["Ana", "Ana", "Bruno", "Carla"]);
    }

    #[test]
    fn ordering_is_byte_wise_not_case_insensitive() {
        let (_dir, store) = temp_store();

        add_doctor(&store, "b", "", "").unwrap();
        add_doctor(&store, "a", "", "").unwrap();
        add_doctor(&store, "B", "", "").unwrap();
        add_doctor(&store, "Álvaro", "", "").unwrap();

        let names: Vec<String> = list_doctors(&store)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["B", "a", "b", "Álvaro"]);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let (_dir, store) = temp_store();
        add_doctor(&store, "Ana", "", "").unwrap();

        remove_doctor(&store, 9999).unwrap();
        assert_eq!(list_doctors(&store).unwrap().len(), 1);
    }
}
