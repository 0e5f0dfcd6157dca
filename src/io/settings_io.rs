use std::fs;
use std::io;
use std::path::Path;

use crate::io::store::{StoreError, atomic_write};
use crate::model::settings::{Settings, SettingsError};

/// Error type for editing settings.toml from the command line
#[derive(Debug, thiserror::Error)]
pub enum SettingsIoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Invalid(#[from] SettingsError),
    #[error("could not parse {path}: {source}")]
    DocumentError {
        path: String,
        source: toml_edit::TomlError,
    },
}

/// Read settings.toml, returning both the parsed settings and the raw
/// toml_edit document for formatting-preserving edits. A missing file gives
/// defaults and an empty document.
pub fn read_settings(path: &Path) -> Result<(Settings, toml_edit::DocumentMut), SettingsIoError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }
    };
    let settings: Settings = toml::from_str(&text).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let doc: toml_edit::DocumentMut =
        text.parse()
            .map_err(|e| SettingsIoError::DocumentError {
                path: path.display().to_string(),
                source: e,
            })?;
    Ok((settings, doc))
}

/// Write the settings document back to disk, preserving formatting.
pub fn write_settings(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), SettingsIoError> {
    atomic_write(path, doc.to_string().as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Replace settings.toml with the defaults. Custom models and color
/// overrides go with it.
pub fn reset_settings(path: &Path) -> Result<Settings, SettingsIoError> {
    let settings = Settings::default();
    let text = toml::to_string_pretty(&settings).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    atomic_write(path, text.as_bytes()).map_err(|e| StoreError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(settings)
}

/// Write one top-level field's current value into the document
fn sync_key(doc: &mut toml_edit::DocumentMut, settings: &Settings, key: &str) {
    let value = match key {
        "ai_enabled" => toml_edit::value(settings.ai_enabled),
        "use_built_in_openai" => toml_edit::value(settings.use_built_in_openai),
        "use_built_in_deepseek" => toml_edit::value(settings.use_built_in_deepseek),
        "active_api" => toml_edit::value(settings.active_api.to_string()),
        "api_key" => toml_edit::value(&settings.api_key),
        "api_endpoint" => toml_edit::value(&settings.api_endpoint),
        "system_prompt" => toml_edit::value(&settings.system_prompt),
        "user_prompt" => toml_edit::value(&settings.user_prompt),
        "deepseek_api_key" => toml_edit::value(&settings.deepseek_api_key),
        "deepseek_api_endpoint" => toml_edit::value(&settings.deepseek_api_endpoint),
        "deepseek_system_prompt" => toml_edit::value(&settings.deepseek_system_prompt),
        "deepseek_user_prompt" => toml_edit::value(&settings.deepseek_user_prompt),
        "model" => toml_edit::value(&settings.model),
        "custom_models" => toml_edit::value(
            settings
                .custom_models
                .iter()
                .map(String::as_str)
                .collect::<toml_edit::Array>(),
        ),
        _ => return,
    };
    doc[key] = value;
}

/// Which way a custom model list edit goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEdit {
    Add,
    Remove,
}

/// Add or remove a custom model and write the list and the selected model
/// back into the document.
pub fn edit_custom_models(
    doc: &mut toml_edit::DocumentMut,
    settings: &Settings,
    edit: ModelEdit,
    name: &str,
) -> Result<Settings, SettingsError> {
    let mut updated = settings.clone();
    match edit {
        ModelEdit::Add => updated.add_custom_model(name)?,
        ModelEdit::Remove => updated.remove_custom_model(name)?,
    }
    let updated = updated.validate()?;
    sync_key(doc, &updated, "custom_models");
    if updated.model != settings.model {
        sync_key(doc, &updated, "model");
    }
    Ok(updated)
}

/// Set one setting by key and validate the result. Returns the updated
/// settings; the document is only touched when validation passes.
pub fn set_setting(
    doc: &mut toml_edit::DocumentMut,
    settings: &Settings,
    key: &str,
    value: &str,
) -> Result<Settings, SettingsError> {
    let mut updated = settings.clone();
    updated.set_by_key(key, value)?;
    let updated = updated.validate()?;
    sync_key(doc, &updated, key);
    if updated.model != settings.model {
        sync_key(doc, &updated, "model");
    }
    Ok(updated)
}
