//! Loading service configuration from YAML files

use crudella::prelude::*;
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
resource: /kennels
id_param: kennelId
allowed_operations:
  - LIST
  - CREATE
options:
  CREATE:
    owner: anita
"#
    )
    .unwrap();

    let config = ServiceConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.collection_path(), "/kennels");
    assert_eq!(config.item_path(), "/kennels/{kennelId}");
    assert!(config.allows(Operation::Create));
    assert!(!config.allows(Operation::Update));
    assert_eq!(
        config.options_for(Operation::Create).get("owner"),
        Some(&json!("anita"))
    );
}

#[test]
fn test_missing_file() {
    assert!(ServiceConfig::from_yaml_file("/definitely/not/here.yaml").is_err());
}

#[test]
fn test_missing_resource_is_rejected() {
    assert!(ServiceConfig::from_yaml_str("id_param: x").is_err());
}
