//! Configuration supplied by the extension's storage layer.

use hl_core::{ConfigError, ConfigProvider, EngineConfig};
use wasm_bindgen::JsValue;

/// Calls a JS function returning the current configuration object.
///
/// The extension reads its storage asynchronously and keeps the latest
/// settings cached; the loader hands that cache over synchronously.
pub struct JsConfigProvider {
    loader: js_sys::Function,
}

impl JsConfigProvider {
    pub fn new(loader: js_sys::Function) -> Self {
        Self { loader }
    }
}

impl ConfigProvider for JsConfigProvider {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        let value = self
            .loader
            .call0(&JsValue::NULL)
            .map_err(|e| ConfigError::Unavailable(describe(&e)))?;

        if value.is_undefined() || value.is_null() {
            return Err(ConfigError::Unavailable("loader returned no configuration".to_string()));
        }

        let json = js_sys::JSON::stringify(&value)
            .map_err(|e| ConfigError::Unavailable(describe(&e)))?
            .as_string()
            .ok_or_else(|| ConfigError::Unavailable("configuration is not serializable".to_string()))?;

        EngineConfig::from_json(&json)
    }
}

pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
