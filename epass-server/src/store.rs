//! Registration sheet (Artifact Store)
//!
//! One `.xlsx` workbook, one row per registration. Every append is a full
//! read-modify-write of the file: read the first sheet with `calamine`,
//! rewrite the workbook with `rust_xlsxwriter` into a fresh temp file, then
//! rename it over the existing file. Appends inside this process are
//! serialized by a mutex held until the blocking write finishes, even if the
//! caller's future is dropped. Other processes writing the same file are not
//! coordinated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook};
use shared::models::Registration;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Sheet name used when the workbook is created
pub const SHEET_NAME: &str = "Registrations";

/// Header row written into a new workbook
pub const HEADER: [&str; 7] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Department/Club",
    "Event",
    "Registration Date",
];

/// Append-only registration spreadsheet
#[derive(Debug, Clone)]
pub struct RegistrationSheet {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl RegistrationSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one registration row, creating the workbook on first use
    pub async fn append(&self, registration: &Registration) -> Result<(), StorageError> {
        let row = sheet_row(registration);
        let path = self.path.clone();

        let guard = self.write_lock.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            append_row(&path, row)
        })
        .await??;

        tracing::debug!(
            participant_id = %registration.id,
            sheet = %self.path.display(),
            "Registration row appended"
        );
        Ok(())
    }

    /// All rows as text, header included; empty if the workbook does not exist
    pub async fn rows(&self) -> Result<Vec<Vec<String>>, StorageError> {
        let path = self.path.clone();

        let guard = self.write_lock.clone().lock_owned().await;
        let rows = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            if path.exists() {
                read_first_sheet(&path).map(|(_, rows)| rows)
            } else {
                Ok(Vec::new())
            }
        })
        .await??;
        Ok(rows)
    }
}

/// The seven columns, in header order
fn sheet_row(registration: &Registration) -> Vec<String> {
    vec![
        registration.id.clone(),
        registration.full_name.clone(),
        registration.email.clone(),
        registration.phone.clone(),
        registration.club.clone(),
        registration.event.clone(),
        registration.registration_date_text(),
    ]
}

fn append_row(path: &Path, row: Vec<String>) -> Result<(), StorageError> {
    let (sheet_name, mut rows) = if path.exists() {
        read_first_sheet(path)?
    } else {
        let header = HEADER.iter().map(|h| h.to_string()).collect();
        (SHEET_NAME.to_string(), vec![header])
    };
    rows.push(row);
    write_sheet(path, &sheet_name, &rows)
}

fn read_first_sheet(path: &Path) -> Result<(String, Vec<Vec<String>>), StorageError> {
    let read_error = |message: String| StorageError::SheetRead {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| read_error(format!("{e}")))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| read_error("workbook has no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_error(format!("{e}")))?;

    let rows = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect();
    Ok((sheet_name, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_sheet(path: &Path, sheet_name: &str, rows: &[Vec<String>]) -> Result<(), StorageError> {
    let write_error = |message: String| StorageError::SheetWrite {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .map_err(|e| write_error(e.to_string()))?;

        for (r, row) in rows.iter().enumerate() {
            let r = u32::try_from(r).map_err(|_| write_error("too many rows".into()))?;
            for (c, value) in row.iter().enumerate() {
                let c = u16::try_from(c).map_err(|_| write_error("too many columns".into()))?;
                let written = if r == 0 {
                    worksheet.write_string_with_format(r, c, value, &bold)
                } else {
                    worksheet.write_string(r, c, value)
                };
                written.map_err(|e| write_error(e.to_string()))?;
            }
        }
    }

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
            parent
        }
        None => Path::new("."),
    };

    // Readers never see a half-written workbook
    let tmp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
    workbook
        .save(tmp.path())
        .map_err(|e| write_error(e.to_string()))?;
    tmp.persist(path).map_err(|e| write_error(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn registration(id: &str, name: &str) -> Registration {
        Registration {
            id: id.into(),
            full_name: name.into(),
            email: "kavya@example.com".into(),
            phone: "9876543210".into(),
            club: "Music Club".into(),
            event: "Isai Illam".into(),
            registration_date: Utc.with_ymd_and_hms(2025, 1, 5, 10, 20, 30).unwrap(),
            payment_proof: format!("payment-{id}-1.png"),
        }
    }

    #[tokio::test]
    async fn test_first_append_creates_header() {
        let temp = tempfile::tempdir().unwrap();
        let sheet = RegistrationSheet::new(temp.path().join("registrations.xlsx"));

        sheet.append(&registration("AAAA0001", "Kavya Raman")).await.unwrap();

        let rows = sheet.rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], HEADER.map(String::from).to_vec());
        assert_eq!(
            rows[1],
            vec![
                "AAAA0001",
                "Kavya Raman",
                "kavya@example.com",
                "9876543210",
                "Music Club",
                "Isai Illam",
                "2025-01-05T10:20:30.000Z",
            ]
        );
    }

    #[tokio::test]
    async fn test_appends_keep_existing_rows_in_order() {
        let temp = tempfile::tempdir().unwrap();
        let sheet = RegistrationSheet::new(temp.path().join("registrations.xlsx"));

        for (i, name) in ["Kavya", "Arjun", "Meera"].iter().enumerate() {
            sheet
                .append(&registration(&format!("AAAA000{i}"), name))
                .await
                .unwrap();
        }

        let rows = sheet.rows().await.unwrap();
        let names: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, ["Kavya", "Arjun", "Meera"]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_no_rows() {
        let temp = tempfile::tempdir().unwrap();
        let sheet = RegistrationSheet::new(temp.path().join("registrations.xlsx"));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let sheet = sheet.clone();
                tokio::spawn(async move {
                    sheet
                        .append(&registration(&format!("BBBB000{i}"), "Concurrent"))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(sheet.rows().await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_cancelled_append_does_not_break_the_next_one() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("registrations.xlsx");
        let mut seed = vec![HEADER.map(String::from).to_vec()];
        seed.extend((0..400).map(|i| sheet_row(&registration(&format!("SEED{i:04}"), "Seeded"))));
        write_sheet(&path, SHEET_NAME, &seed).unwrap();

        let sheet = RegistrationSheet::new(&path);
        for wait in [0, 1, 2, 5] {
            let dropped = registration(&format!("DROP000{wait}"), "Cancelled");
            let _ = tokio::time::timeout(
                std::time::Duration::from_millis(wait),
                sheet.append(&dropped),
            )
            .await;

            sheet
                .append(&registration(&format!("KEEP000{wait}"), "Kept"))
                .await
                .unwrap();
        }

        let rows = sheet.rows().await.unwrap();
        assert_eq!(&rows[..401], &seed[..]);
        let kept: Vec<&str> = rows[401..]
            .iter()
            .map(|r| r[0].as_str())
            .filter(|id| id.starts_with("KEEP"))
            .collect();
        assert_eq!(kept, ["KEEP0000", "KEEP0001", "KEEP0002", "KEEP0005"]);

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "registrations.xlsx")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[tokio::test]
    async fn test_existing_sheet_name_is_preserved() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("registrations.xlsx");
        write_sheet(
            &path,
            "Attendees",
            &[vec!["ID".into(), "Name".into()], vec!["OLD00001".into(), "Early Bird".into()]],
        )
        .unwrap();

        let sheet = RegistrationSheet::new(&path);
        sheet.append(&registration("NEW00001", "Kavya")).await.unwrap();

        let (name, rows) = read_first_sheet(&path).unwrap();
        assert_eq!(name, "Attendees");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "Early Bird");
        assert_eq!(rows[2][0], "NEW00001");
    }

    #[tokio::test]
    async fn test_corrupt_workbook_is_a_read_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("registrations.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let sheet = RegistrationSheet::new(&path);
        let err = sheet.append(&registration("AAAA0001", "Kavya")).await.unwrap_err();
        assert!(matches!(err, StorageError::SheetRead { .. }));
    }

    #[tokio::test]
    async fn test_rows_of_missing_workbook_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let sheet = RegistrationSheet::new(temp.path().join("absent.xlsx"));
        assert!(sheet.rows().await.unwrap().is_empty());
    }
}
