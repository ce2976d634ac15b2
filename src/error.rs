//! Error type shared by the simulation core and the browser bindings.

use thiserror::Error;

/// Result alias for fallible field operations.
pub type Result<T> = std::result::Result<T, FieldError>;

#[derive(Error, Debug)]
pub enum FieldError {
    /// The `data-config` payload or a preset override did not parse.
    #[error("invalid field config: {0}")]
    Config(#[from] serde_json::Error),

    /// A config value is out of its allowed range.
    #[error("invalid field config: {0}")]
    Invalid(String),

    /// Unknown preset name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A DOM element the mount sequence depends on is absent.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// A browser API call rejected.
    #[error("browser call failed: {0}")]
    Js(String),

    /// Font, image or audio resource could not be loaded.
    #[error("failed to load {asset}: {reason}")]
    AssetLoad { asset: String, reason: String },

    /// The view was torn down while work was still queued against it.
    #[error("view already torn down")]
    Detached,
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for FieldError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        FieldError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{value:?}")),
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<FieldError> for wasm_bindgen::JsValue {
    fn from(err: FieldError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_wraps_serde() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = FieldError::from(err);
        assert!(err.to_string().starts_with("invalid field config"));
    }

    #[test]
    fn asset_error_names_asset() {
        let err = FieldError::AssetLoad {
            asset: "font".into(),
            reason: "404".into(),
        };
        assert_eq!(err.to_string(), "failed to load font: 404");
    }
}
