//! Per-target configuration merging

use crate::formats;
use crate::scope::DeletionScope;
use crate::types::{GlobalConfig, TargetConfig, TargetOverride};
use sdkpack_common::{GeneratorError, Result};
use serde_json::Value;

/// Recursively merge `overlay` into `base`
///
/// Objects merge key by key; any other value in `overlay` (arrays included)
/// replaces the one in `base`.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Compute the effective configuration of one target
///
/// The output directory becomes `<dest>/<projectName>` using the merged
/// project name, and the deletion scope is derived from it.
pub fn merge(global: &GlobalConfig, target: &TargetOverride) -> Result<TargetConfig> {
    let mut merged = serde_json::to_value(global)?;
    deep_merge(&mut merged, &Value::Object(target.overrides.clone()));

    let mut settings: GlobalConfig = serde_json::from_value(merged).map_err(|e| {
        GeneratorError::Config(format!("Invalid settings for target {}: {}", target.name, e))
    })?;
    if !formats::is_path_segment(&settings.project_name) {
        return Err(GeneratorError::Config(format!(
            "Invalid projectName {:?} for target {}: must be a single directory name",
            settings.project_name, target.name
        )));
    }
    settings.dest = settings.dest.join(&settings.project_name);

    tracing::debug!(
        target_name = %target.name,
        dest = %settings.dest.display(),
        "Merged target configuration"
    );

    Ok(TargetConfig {
        name: target.name.clone(),
        deletion_scope: DeletionScope::for_output(&settings.dest),
        options: target.options.clone(),
        settings,
    })
}
