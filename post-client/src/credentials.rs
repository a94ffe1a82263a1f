use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// Долговременное хранилище JWT-токена.
///
/// Один писатель за раз по соглашению; блокировок между процессами нет.
pub trait CredentialStore: Send + Sync {
    /// Возвращает сохранённый токен, если он есть.
    fn load(&self) -> Option<String>;
    /// Сохраняет токен.
    fn save(&self, token: &str) -> ClientResult<()>;
    /// Удаляет токен.
    fn clear(&self) -> ClientResult<()>;
}

/// Пустая или состоящая из пробелов запись считается отсутствующей.
pub fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[derive(Debug, Default)]
/// Хранилище токена в памяти процесса.
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Создаёт хранилище с уже сохранённым токеном.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(parse_token(&token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| ClientError::Storage("token mutex poisoned".to_string()))?;
        *guard = parse_token(token);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| ClientError::Storage("token mutex poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(feature = "native")]
pub use file::FileCredentialStore;

#[cfg(feature = "native")]
mod file {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{CredentialStore, parse_token};
    use crate::error::{ClientError, ClientResult};

    #[derive(Debug, Clone)]
    /// Хранилище токена в файле (аналог `localStorage` для терминала).
    pub struct FileCredentialStore {
        path: PathBuf,
    }

    impl FileCredentialStore {
        /// Создаёт хранилище поверх файла `path`. Файл может не существовать.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Путь к файлу с токеном.
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl CredentialStore for FileCredentialStore {
        fn load(&self) -> Option<String> {
            let raw = fs::read_to_string(&self.path).ok()?;
            parse_token(&raw)
        }

        fn save(&self, token: &str) -> ClientResult<()> {
            fs::write(&self.path, token).map_err(|err| {
                ClientError::Storage(format!("write {}: {err}", self.path.display()))
            })
        }

        fn clear(&self) -> ClientResult<()> {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(ClientError::Storage(format!(
                    "remove {}: {err}",
                    self.path.display()
                ))),
            }
        }
    }
}
