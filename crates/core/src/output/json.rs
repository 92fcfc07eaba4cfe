use super::FormatError;
use crate::models::FoldMap;

/// Convert FoldMap to pretty-printed JSON
pub fn to_json(fold_map: &FoldMap) -> Result<String, FormatError> {
    serde_json::to_string_pretty(fold_map).map_err(FormatError::from)
}

/// Convert FoldMap to compact JSON
#[allow(dead_code)]
pub fn to_json_compact(fold_map: &FoldMap) -> Result<String, FormatError> {
    serde_json::to_string(fold_map).map_err(FormatError::from)
}
