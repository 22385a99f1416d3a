use crate::domain::model::StreetRecord;
use crate::domain::ports::StreetRepository;
use crate::utils::error::{Result, SectionError};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Streets kept as a JSON array in a single file. Every update rewrites the
/// file, so an interrupted run keeps everything saved so far.
#[derive(Debug)]
pub struct JsonStreetStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStreetStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<StreetRecord>> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl StreetRepository for JsonStreetStore {
    async fn list_streets(&self) -> Result<Vec<StreetRecord>> {
        self.read_all().await
    }

    async fn update_section(&self, street_id: &str, section_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut streets = self.read_all().await?;
        let street = streets
            .iter_mut()
            .find(|s| s.id == street_id)
            .ok_or_else(|| SectionError::PersistenceError {
                street_id: street_id.to_string(),
                message: format!("not found in {}", self.path.display()),
            })?;
        street.section = Some(section_id.to_string());

        let data = serde_json::to_vec_pretty(&streets)?;
        // write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("streets.json");
        let streets = serde_json::json!([
            {"id": "a", "name": "Kent Rd", "section": null, "order": 1},
            {"id": "b", "name": "Surrey St", "section": "section-2", "order": 2}
        ]);
        std::fs::write(&path, streets.to_string()).unwrap();
        path
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = TempDir::new().unwrap();
        let store = JsonStreetStore::new(seed(&dir));

        tokio_test::block_on(async {
            store.update_section("a", "section-4").await.unwrap();
            let streets = store.list_streets().await.unwrap();
            assert_eq!(streets[0].section.as_deref(), Some("section-4"));
            assert_eq!(streets[1].section.as_deref(), Some("section-2"));
        });
    }

    #[tokio::test]
    async fn unknown_street_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonStreetStore::new(seed(&dir));

        let err = store.update_section("zzz", "section-1").await.unwrap_err();
        assert!(matches!(err, SectionError::PersistenceError { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let store = JsonStreetStore::new("/definitely/not/here/streets.json");
        assert!(matches!(
            store.list_streets().await,
            Err(SectionError::IoError(_))
        ));
    }
}
