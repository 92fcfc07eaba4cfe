use super::FormatError;
use crate::models::FoldMap;

/// Convert FoldMap to YAML
pub fn to_yaml(fold_map: &FoldMap) -> Result<String, FormatError> {
    serde_yaml::to_string(fold_map).map_err(FormatError::from)
}
