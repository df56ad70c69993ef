use rusqlite::params;
use tracing::{debug, info, warn};

use super::connection::Store;
use crate::error::StoreError;
use crate::models::Patient;
use crate::validation::require_name;

/// Insert a patient. `code` is stored as given (trimmed); any format check on
/// it belongs to the caller.
pub fn add_patient(
    store: &Store,
    name: &str,
    code: &str,
    phone: &str,
) -> Result<Patient, StoreError> {
    let name = require_name("Patient", name).inspect_err(|err| {
        warn!(error = %err, "rejected patient");
    })?;
    let code = code.trim().to_string();
    let phone = phone.trim().to_string();

    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO patients (name, code, phone) VALUES (?1, ?2, ?3)",
        params![name, code, phone],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    info!(patient_id = id, "patient added");
    Ok(Patient {
        id,
        name,
        code,
        phone,
    })
}

/// Every patient ordered by name, ties by insertion order. The order is the
/// plain byte order of the stored names, so uppercase sorts before lowercase.
pub fn list_patients(store: &Store) -> Result<Vec<Patient>, StoreError> {
    let conn = store.connect()?;
    let mut stmt =
        conn.prepare("SELECT id, name, code, phone FROM patients ORDER BY name, id")?;

    let patients = stmt
        .query_map([], |row| {
            Ok(Patient {
                id: row.get(0)?,
                name: row.get(1)?,
                code: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = patients.len(), "listed patients");
    Ok(patients)
}

/// Remove a patient together with their appointments (cascade). Unknown ids
/// are ignored.
pub fn remove_patient(store: &Store, id: i64) -> Result<(), StoreError> {
    let mut conn = store.connect()?;
    let tx = conn.transaction()?;
    let deleted = tx.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!(patient_id = id, deleted, "patient removed");
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
    fn code_is_stored_as_opaque_text() {
        let (_dir, store) = temp_store();

        add_patient(&store, "Bruno", " 123.456.789-00 ", "9999").unwrap();
        add_patient(&store, "Alice", "1990-05-20", "").unwrap();

        let patients = list_patients(&store).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].name, "Alice");
        assert_eq!(patients[0].code, "1990-05-20");
        assert_eq!(patients[1].name, "Bruno");
        assert_eq!(patients[1].code, "123.456.789-00");
        assert_eq!(patients[1].phone, "9999");
    }

    #[test]
    fn blank_name_is_rejected() {
        let (_dir, store) = temp_store();

        let err = add_patient(&store, "  ", "", "").unwrap_err();
        assert!(err.is_validation());
        assert!(list_patients(&store).unwrap().is_empty());
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let (_dir, store) = temp_store();
        let patient = add_patient(&store, "Bruno", "", "").unwrap();

        remove_patient(&store, 9999).unwrap();
        assert_eq!(list_patients(&store).unwrap(), vec![patient]);
    }
}
