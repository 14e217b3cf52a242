//! Model persistence: serde JSON with an open schema.
//!
//! The artifact stores the punctuation policy, marker, ordered merge list,
//! token vocabulary, and the final word-frequency table, so a loaded model
//! encodes exactly like the freshly trained one.

use std::fs;
use std::path::Path;

use crate::error::{Result, WbpeError};
use crate::model::BpeModel;

/// Serialises the trained model to a JSON string.
pub fn model_json(model: &BpeModel, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(model)?
    } else {
        serde_json::to_string(model)?
    };
    Ok(json)
}

/// Persists the trained model as JSON at `path`.
pub fn save_model<P: AsRef<Path>>(model: &BpeModel, path: P, pretty: bool) -> Result<()> {
    let json = model_json(model, pretty)?;
    fs::write(path.as_ref(), json)
        .map_err(|err| WbpeError::io(err, Some(path.as_ref().to_path_buf())))
}

/// Loads a model previously written by [`save_model`].
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<BpeModel> {
    let data = fs::read_to_string(path.as_ref())
        .map_err(|err| WbpeError::io(err, Some(path.as_ref().to_path_buf())))?;
    let model: BpeModel = serde_json::from_str(&data)?;
    model.config().validate()?;
    Ok(model)
}
