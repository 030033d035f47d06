//! Shallow, top-level JSON merges used by record patches and filter updates.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Merge `patch` into the top level of `target`'s JSON form and decode the result.
///
/// Keys listed in `protected` are never overwritten. Nested objects in the patch
/// replace the existing value entirely.
pub fn shallow_merge<T>(target: &T, patch: &Map<String, Value>, protected: &[&str]) -> Result<T>
where
  T: Serialize + DeserializeOwned,
{
  let mut value = serde_json::to_value(target).map_err(|e| eyre!("Failed to encode: {}", e))?;
  let object = value
    .as_object_mut()
    .ok_or_else(|| eyre!("Merge target is not a JSON object"))?;

  for (key, field) in patch {
    if protected.contains(&key.as_str()) {
      continue;
    }
    object.insert(key.clone(), field.clone());
  }

  serde_json::from_value(value).map_err(|e| eyre!("Merged value is invalid: {}", e))
}
