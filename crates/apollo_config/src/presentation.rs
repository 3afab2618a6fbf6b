//! Builds a human-facing nested JSON view of a config, as opposed to the flat
//! [`crate::dumping`] representation used for round-tripping.

use std::ops::IndexMut;

use serde_json::{json, Value};

use crate::dumping::SerializeConfig;
use crate::{ConfigError, FIELD_SEPARATOR, IS_NONE_MARK};

/// Renders `config` as a nested JSON object keyed by its dotted param paths.
///
/// Params marked private in [`SerializeConfig::dump`] are omitted unless `include_private_params`
/// is set. `#is_none` marker entries are never included directly; instead, a `None` sub-config or
/// optional value presents as `null`.
pub fn get_config_presentation<T: SerializeConfig>(
    config: &T,
    include_private_params: bool,
) -> Result<Value, ConfigError> {
    let dump = config.dump();
    let none_prefixes: Vec<String> = dump
        .iter()
        .filter_map(|(param_path, serialized_param)| {
            let is_none = param_path.ends_with(&format!("{FIELD_SEPARATOR}{IS_NONE_MARK}"))
                && serialized_param_value(serialized_param) == Some(json!(true));
            is_none
                .then(|| param_path.strip_suffix(&format!("{FIELD_SEPARATOR}{IS_NONE_MARK}")))
                .flatten()
                .map(str::to_owned)
        })
        .collect();

    let mut presentation = json!({});
    for (param_path, serialized_param) in &dump {
        if param_path.ends_with(IS_NONE_MARK) {
            continue;
        }
        if !include_private_params && serialized_param.is_private() {
            continue;
        }
        if let Some(none_prefix) = none_prefixes.iter().find(|prefix| {
            param_path == *prefix
                || param_path.starts_with(&format!("{prefix}{FIELD_SEPARATOR}"))
        }) {
            if param_path == none_prefix {
                insert_nested(&mut presentation, param_path, Value::Null);
            }
            continue;
        }
        let Some(value) = serialized_param_value(serialized_param) else { continue };
        insert_nested(&mut presentation, param_path, value);
    }
    Ok(presentation)
}

fn serialized_param_value(serialized_param: &crate::SerializedParam) -> Option<Value> {
    match &serialized_param.content {
        crate::SerializedContent::DefaultValue(value) => Some(value.clone()),
        crate::SerializedContent::PointerTarget(_) | crate::SerializedContent::ParamType(_) => {
            None
        }
    }
}

fn insert_nested(root: &mut Value, param_path: &str, value: Value) {
    let mut entry = root;
    for part in param_path.split(FIELD_SEPARATOR) {
        entry = entry.index_mut(part);
    }
    *entry = value;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::get_config_presentation;
    use crate::dumping::{ser_param, SerializeConfig};
    use crate::{ParamPath, ParamPrivacyInput, SerializedParam};

    struct SamplePresentationConfig {
        public: u64,
        secret: u64,
    }

    impl SerializeConfig for SamplePresentationConfig {
        fn dump(&self) -> BTreeMap<ParamPath, SerializedParam> {
            BTreeMap::from([
                ser_param("public", &self.public, "public field", ParamPrivacyInput::Public),
                ser_param("secret", &self.secret, "private field", ParamPrivacyInput::Private),
            ])
        }
    }

    #[test]
    fn private_params_are_hidden_by_default() {
        let config = SamplePresentationConfig { public: 1, secret: 2 };
        let full = get_config_presentation(&config, true).unwrap();
        assert_eq!(full, json!({"public": 1, "secret": 2}));

        let public_only = get_config_presentation(&config, false).unwrap();
        assert_eq!(public_only, json!({"public": 1}));
    }
}
