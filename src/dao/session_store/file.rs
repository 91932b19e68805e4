//! Session store keeping one JSON document per key inside a directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use uuid::Uuid;

use crate::dao::{
    session_store::{SessionStore, StoreKey},
    storage::{StorageError, StorageResult},
};

/// Directory-backed [`SessionStore`]. Each write goes through its own temporary file and
/// a rename, so concurrent writers of one key never share a temp path.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    dir: Arc<PathBuf>,
}

impl FileSessionStore {
    /// Open the store, creating the directory when needed.
    pub async fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.map_err(|source| {
            StorageError::unavailable(
                format!("cannot create state directory `{}`", dir.display()),
                source,
            )
        })?;
        Ok(Self { dir: Arc::new(dir) })
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn temp_path_for(&self, key: StoreKey) -> PathBuf {
        self.dir
            .join(format!(".{}.{}.tmp", key.as_str(), Uuid::new_v4().simple()))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: StoreKey) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::unavailable(
                    format!("cannot read `{}`", path.display()),
                    err,
                )),
            }
        })
    }

    fn save(&self, key: StoreKey, value: String) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path_for(key);
        let tmp = self.temp_path_for(key);
        Box::pin(async move {
            fs::write(&tmp, value.as_bytes()).await.map_err(|source| {
                StorageError::unavailable(format!("cannot write `{}`", tmp.display()), source)
            })?;
            if let Err(source) = fs::rename(&tmp, &path).await {
                let _ = fs::remove_file(&tmp).await;
                return Err(StorageError::unavailable(
                    format!("cannot replace `{}`", path.display()),
                    source,
                ));
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let dir = Arc::clone(&self.dir);
        Box::pin(async move {
            let metadata = fs::metadata(dir.as_path()).await.map_err(|source| {
                StorageError::unavailable(
                    format!("state directory `{}` is unreachable", dir.display()),
                    source,
                )
            })?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(StorageError::unavailable(
                    format!("`{}` is not a directory", dir.display()),
                    std::io::Error::from(ErrorKind::NotADirectory),
                ))
            }
        })
    }
}
