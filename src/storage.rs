use serde::{Serialize, de::DeserializeOwned};

const PREFIX: &str = "candlr.";

pub fn storage_key(key: &str) -> String {
    format!("{PREFIX}{key}")
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub fn load_string(key: &str) -> Option<String> {
    match storage()?.get_item(&storage_key(key)) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("localStorage read of {key} failed: {e:?}");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn save_string(key: &str, value: &str) {
    let Some(store) = storage() else {
        log::warn!("localStorage unavailable, {key} not saved");
        return;
    };
    if let Err(e) = store.set_item(&storage_key(key), value) {
        log::warn!("localStorage write of {key} failed: {e:?}");
    }
}

#[cfg(target_arch = "wasm32")]
pub fn remove(key: &str) {
    if let Some(store) = storage() {
        if let Err(e) = store.remove_item(&storage_key(key)) {
            log::warn!("localStorage remove of {key} failed: {e:?}");
        }
    }
}

pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let raw = load_string(key)?;
    decode_json(key, &raw)
}

pub fn save_json<T: Serialize>(key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => save_string(key, &raw),
        Err(e) => log::warn!("could not serialize {key}: {e}"),
    }
}

fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring stale {key} in localStorage: {e}");
            None
        }
    }
}

// --------------------------- non-wasm fallbacks ---------------------------

#[cfg(not(target_arch = "wasm32"))]
pub fn load_string(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_string(key: &str, _value: &str) {
    log::debug!("no localStorage outside the browser, {key} not saved");
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove(_key: &str) {}
