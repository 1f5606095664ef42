use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value as Yaml;

use super::value::ConfigValue;
use super::ConfigError;

type Leaves = HashMap<String, ConfigValue>;

/// Merge the YAML file at `path` into `leaves`; an absent file adds nothing.
pub(crate) fn load_yaml_file(path: &Path, leaves: &mut Leaves) -> Result<(), ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => load_yaml_str(&text, leaves),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    }
}

pub(crate) fn load_yaml_str(text: &str, leaves: &mut Leaves) -> Result<(), ConfigError> {
    let doc: Yaml = serde_yaml::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten(None, &doc, leaves);
    Ok(())
}

fn child_key(parent: Option<&str>, segment: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{segment}"),
        None => segment.to_string(),
    }
}

/// Write every leaf of `node` under its dotted path. Existing leaves with the
/// same path are replaced, other leaves are left alone, so loading a second
/// document merges it into the first.
fn flatten(path: Option<&str>, node: &Yaml, leaves: &mut Leaves) {
    match (path, node) {
        (_, Yaml::Mapping(map)) => {
            for (k, v) in map {
                let segment = match k {
                    Yaml::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                flatten(Some(&child_key(path, &segment)), v, leaves);
            }
        }
        (Some(path), Yaml::Sequence(items)) => {
            leaves.insert(path.to_string(), ConfigValue::from_yaml(node));
            // indexed entries too, so one item can be replaced from the environment
            for (i, item) in items.iter().enumerate() {
                flatten(Some(&child_key(Some(path), &i.to_string())), item, leaves);
            }
        }
        (Some(path), leaf) => {
            leaves.insert(path.to_string(), ConfigValue::from_yaml(leaf));
        }
        (None, _) => {}
    }
}
