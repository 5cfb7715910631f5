//! Configuration loading and management

use crate::core::{Operation, Options};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_id_param() -> String {
    "resourceId".to_string()
}

/// Routing configuration for one generated service
///
/// ```yaml
/// resource: /dalmatians
/// id_param: dalmatianId
/// allowed_operations: [DETAIL, LIST]
/// options:
///   LIST:
///     page_size: 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Mount path of the collection (e.g., "/dalmatians")
    pub resource: String,

    /// Name of the path parameter carrying the resource key
    #[serde(default = "default_id_param")]
    pub id_param: String,

    /// When present, only these operations are routed
    #[serde(default)]
    pub allowed_operations: Option<Vec<Operation>>,

    /// Static options handed to each operation's handler factory
    #[serde(default)]
    pub options: HashMap<Operation, Options>,
}

impl ServiceConfig {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id_param: default_id_param(),
            allowed_operations: None,
            options: HashMap::new(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn with_id_param(mut self, id_param: impl Into<String>) -> Self {
        self.id_param = id_param.into();
        self
    }

    pub fn with_allowed_operations(
        mut self,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Self {
        self.allowed_operations = Some(operations.into_iter().collect());
        self
    }

    pub fn with_options(mut self, operation: Operation, options: Options) -> Self {
        self.options.insert(operation, options);
        self
    }

    /// Whether `operation` should be routed
    ///
    /// Without an explicit list every operation is allowed (permissive mode)
    pub fn allows(&self, operation: Operation) -> bool {
        match &self.allowed_operations {
            Some(allowed) => allowed.contains(&operation),
            None => true,
        }
    }

    /// Static options for `operation`, empty when none are configured
    pub fn options_for(&self, operation: Operation) -> Options {
        self.options.get(&operation).cloned().unwrap_or_default()
    }

    /// Collection path with a single leading slash and no trailing slash
    pub fn collection_path(&self) -> String {
        format!("/{}", self.resource.trim_matches('/'))
    }

    /// Item path, e.g. `/dalmatians/{resourceId}`
    pub fn item_path(&self) -> String {
        format!("{}/{{{}}}", self.collection_path(), self.id_param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_yaml_str("resource: /dalmatians").unwrap();

        assert_eq!(config.id_param, "resourceId");
        assert!(config.allowed_operations.is_none());
        assert!(Operation::ALL.iter().all(|op| config.allows(*op)));
        assert!(config.options_for(Operation::List).is_empty());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
resource: dalmatians/
id_param: dalmatianId
allowed_operations: [DETAIL, LIST]
options:
  LIST:
    page_size: 20
"#;
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();

        assert!(config.allows(Operation::Detail));
        assert!(config.allows(Operation::List));
        assert!(!config.allows(Operation::Delete));
        assert_eq!(
            serde_json::Value::Object(config.options_for(Operation::List)),
            json!({"page_size": 20})
        );
        assert_eq!(config.collection_path(), "/dalmatians");
        assert_eq!(config.item_path(), "/dalmatians/{dalmatianId}");
    }

    #[test]
    fn test_operation_names_ignore_case() {
        let yaml = r#"
resource: /x
allowed_operations: [detail, List]
options:
  create:
    a: 1
"#;
        let config = ServiceConfig::from_yaml_str(yaml).unwrap();

        assert!(config.allows(Operation::Detail));
        assert!(config.allows(Operation::List));
        assert!(!config.allows(Operation::Create));
        assert_eq!(config.options_for(Operation::Create).get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let yaml = "resource: /x\nallowed_operations: [PATCH]";
        assert!(ServiceConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ServiceConfig::new("/dogs")
            .with_allowed_operations([Operation::Create])
            .with_options(Operation::Create, Options::new());
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ServiceConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
