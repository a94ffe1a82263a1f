use post_client::{ClientError, ClientResult, CredentialStore, parse_token};
use web_sys::Storage;

const TOKEN_KEY: &str = "token";

fn local_storage() -> ClientResult<Storage> {
    let window =
        web_sys::window().ok_or_else(|| ClientError::Storage("window is not available".to_string()))?;
    window
        .local_storage()
        .map_err(|_| ClientError::Storage("failed to access localStorage".to_string()))?
        .ok_or_else(|| ClientError::Storage("localStorage is not available".to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
/// JWT-токен в `localStorage` под ключом `token`.
pub(crate) struct LocalStorageCredentialStore;

impl CredentialStore for LocalStorageCredentialStore {
    fn load(&self) -> Option<String> {
        let raw = local_storage().ok()?.get_item(TOKEN_KEY).ok()??;
        parse_token(&raw)
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        local_storage()?
            .set_item(TOKEN_KEY, token)
            .map_err(|_| ClientError::Storage("failed to save token".to_string()))
    }

    fn clear(&self) -> ClientResult<()> {
        local_storage()?
            .remove_item(TOKEN_KEY)
            .map_err(|_| ClientError::Storage("failed to clear token".to_string()))
    }
}
