use crate::domain::model::Role;
use crate::domain::ports::Storage;
use crate::utils::error::{ClinicError, Result};
use serde::{Deserialize, Serialize};

const SESSION_FILE: &str = "session.json";

/// Identity issued by the external provider. We only keep what the API needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub role: Role,
}

pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if session.token.trim().is_empty() {
            return Err(ClinicError::validation("El token de sesión está vacío."));
        }
        let data = serde_json::to_vec_pretty(session)?;
        self.storage.write_file(SESSION_FILE, &data).await?;
        tracing::debug!("Session stored for user {}", session.user_id);
        Ok(())
    }

    /// `None` when nobody is logged in.
    pub async fn load(&self) -> Result<Option<Session>> {
        match self.storage.read_file(SESSION_FILE).await {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(ClinicError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn clear(&self) -> Result<()> {
        match self.storage.remove_file(SESSION_FILE).await {
            Err(ClinicError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ClinicError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn remove_file(&self, path: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            files.remove(path).map(|_| ()).ok_or_else(|| {
                ClinicError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = SessionStore::new(MockStorage::default());
        assert_eq!(store.load().await.unwrap(), None);

        let session = Session {
            token: "tok-123".to_string(),
            user_id: "vet-7".to_string(),
            role: Role::Veterinario,
        };
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_blank_token() {
        let store = SessionStore::new(MockStorage::default());
        let session = Session {
            token: " ".to_string(),
            user_id: "c-1".to_string(),
            role: Role::Cliente,
        };
        assert!(store.save(&session).await.is_err());
    }

    #[test]
    fn test_corrupted_session_file_is_an_error() {
        let storage = MockStorage::default();
        let store = SessionStore::new(storage.clone());

        tokio_test::block_on(async {
            storage
                .write_file(SESSION_FILE, b"{not json")
                .await
                .unwrap();
            assert!(matches!(
                store.load().await,
                Err(ClinicError::SerializationError(_))
            ));
        });
    }
}
