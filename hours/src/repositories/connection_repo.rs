use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Connection;

use super::repo_error::RepositoryError;

pub trait ConnectionRepository {
    /// Connections that have not been soft-deleted.
    async fn list_connections(&self) -> Result<Vec<Connection>, RepositoryError>;
    async fn get_connection(&self, id: Uuid) -> Result<Connection, RepositoryError>;
    /// Looks up a live connection by host. Soft-deleted connections never match.
    async fn find_by_url(&self, url: &str) -> Result<Option<Connection>, RepositoryError>;
    async fn upsert_connection(&self, connection: &Connection) -> Result<(), RepositoryError>;
    async fn delete_connection(&self, id: Uuid, hard: bool) -> Result<(), RepositoryError>;
}

/// Stores every connection in one JSON file.
pub struct ConnectionRepositoryImpl {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ConnectionRepositoryImpl {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Connection>, RepositoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, connections: &[Connection]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(connections)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), count = connections.len(), "Saved connections");
        Ok(())
    }
}

impl ConnectionRepository for ConnectionRepositoryImpl {
    async fn list_connections(&self) -> Result<Vec<Connection>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let connections = self.load().await?;

        Ok(connections.into_iter().filter(|c| !c.deleted).collect())
    }

    async fn get_connection(&self, id: Uuid) -> Result<Connection, RepositoryError> {
        let _guard = self.lock.lock().await;

        self.load()
            .await?
            .into_iter()
            .find(|c| c.id == id && !c.deleted)
            .ok_or_else(|| RepositoryError::NotFound(format!("connection {id}")))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Connection>, RepositoryError> {
        let _guard = self.lock.lock().await;

        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|c| !c.deleted && c.matches_url(url)))
    }

    async fn upsert_connection(&self, connection: &Connection) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut connections = self.load().await?;

        match connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection.clone(),
            None => connections.push(connection.clone()),
        }

        self.save(&connections).await
    }

    async fn delete_connection(&self, id: Uuid, hard: bool) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut connections = self.load().await?;

        let position = connections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("connection {id}")))?;

        if hard {
            connections.remove(position);
        } else {
            connections[position].deleted = true;
        }

        self.save(&connections).await
    }
}

#[cfg(test)]
mod tests {
    use redmine::User;

    use super::*;

    fn connection(url: &str) -> Connection {
        let user = User {
            id: 3,
            login: "bob".to_string(),
            ..Default::default()
        };
        Connection::from_user("Bob", url, &user, "ct:iv".to_string())
    }

    fn repo(dir: &tempfile::TempDir) -> ConnectionRepositoryImpl {
        ConnectionRepositoryImpl::new(dir.path().join("nested").join("connections.json"))
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        assert!(repo.list_connections().await.unwrap().is_empty());
        assert!(matches!(
            repo.get_connection(Uuid::new_v4()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn upsert_creates_then_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let mut conn = connection("https://a.example.com");

        repo.upsert_connection(&conn).await.unwrap();
        conn.name = "Renamed".to_string();
        repo.upsert_connection(&conn).await.unwrap();

        let all = repo.list_connections().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
        assert!(repo.path().exists());

        let reopened = ConnectionRepositoryImpl::new(repo.path());
        assert_eq!(reopened.get_connection(conn.id).await.unwrap(), conn);
    }

    #[tokio::test]
    async fn soft_delete_hides_but_keeps_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let conn = connection("https://a.example.com");
        repo.upsert_connection(&conn).await.unwrap();

        repo.delete_connection(conn.id, false).await.unwrap();

        assert!(repo.list_connections().await.unwrap().is_empty());
        assert!(repo
            .find_by_url("https://a.example.com/")
            .await
            .unwrap()
            .is_none());

        let raw = tokio::fs::read_to_string(repo.path()).await.unwrap();
        let stored: Vec<Connection> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].deleted);
    }

    #[tokio::test]
    async fn hard_delete_removes_the_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let keep = connection("https://keep.example.com");
        let drop = connection("https://drop.example.com");
        repo.upsert_connection(&keep).await.unwrap();
        repo.upsert_connection(&drop).await.unwrap();

        repo.delete_connection(drop.id, true).await.unwrap();

        assert!(repo
            .find_by_url("https://drop.example.com")
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.list_connections().await.unwrap(), vec![keep]);
        assert!(matches!(
            repo.delete_connection(drop.id, true).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
