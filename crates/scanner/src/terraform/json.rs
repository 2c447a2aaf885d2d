use super::{FileContent, REMOTE_STATE};
use crate::parser::{BackendDeclaration, RemoteStateReference};
use serde_json::{Map, Value};
use std::path::Path;
use terradep_state::{AttrValue, Attributes};

/// Extract backend and remote state blocks from a file in Terraform JSON syntax
pub(super) fn parse(source: &str, file: &Path) -> Result<FileContent, String> {
    let root: Value = serde_json::from_str(source).map_err(|err| err.to_string())?;
    let root = root
        .as_object()
        .ok_or("root of a JSON configuration must be an object")?;
    let mut content = FileContent::default();

    for terraform in objects(root.get("terraform"), "terraform")? {
        for backends in objects(terraform.get("backend"), "backend")? {
            for (backend_type, body) in backends {
                let config = single_object(body)
                    .ok_or_else(|| format!("backend {backend_type:?} must be an object"))?;
                content.backend = Some(BackendDeclaration {
                    backend_type: backend_type.clone(),
                    config: object_attributes(config),
                    file: file.to_path_buf(),
                });
            }
        }
    }

    for data in objects(root.get("data"), "data")? {
        for states in objects(data.get(REMOTE_STATE), REMOTE_STATE)? {
            for (name, body) in states {
                // every block counts as declared, decoded or not
                let bodies = blocks(body);
                content.declared_references += bodies.len();
                for block in bodies {
                    let block = block.as_object().ok_or_else(|| {
                        format!(
                            "remote state {name:?} must be an object, got {}",
                            convert(block).describe()
                        )
                    })?;
                    content.references.push(remote_state(name, block, file)?);
                }
            }
        }
    }

    Ok(content)
}

fn remote_state(
    name: &str,
    block: &Map<String, Value>,
    file: &Path,
) -> Result<RemoteStateReference, String> {
    if name.is_empty() {
        return Err(format!("block {REMOTE_STATE:?} does not have a name"));
    }

    let backend_type = match block.get("backend").map(convert) {
        Some(AttrValue::String(value)) => value,
        Some(other) => {
            return Err(format!(
                "remote state {name:?}: backend must be a string literal, got {}",
                other.describe()
            ))
        }
        None => return Err(format!("remote state {name:?}: missing attribute \"backend\"")),
    };

    let config = match block.get("config").map(convert) {
        Some(AttrValue::Object(attrs)) => attrs,
        None => Attributes::new(),
        Some(other) => {
            return Err(format!(
                "remote state {name:?}: config must be an object, got {}",
                other.describe()
            ))
        }
    };

    Ok(RemoteStateReference {
        name: name.to_string(),
        backend_type,
        config,
        file: file.to_path_buf(),
    })
}

/// Blocks may be given as one object or as an array of objects
fn objects<'a>(
    value: Option<&'a Value>,
    what: &str,
) -> Result<Vec<&'a Map<String, Value>>, String> {
    let not_an_object = |found: &Value| {
        format!(
            "{what:?} must be an object or an array of objects, got {}",
            convert(found).describe()
        )
    };
    match value {
        None => Ok(Vec::new()),
        Some(Value::Object(map)) => Ok(vec![map]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_object().ok_or_else(|| not_an_object(item)))
            .collect(),
        Some(other) => Err(not_an_object(other)),
    }
}

/// Bodies of the blocks sharing one label
fn blocks(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn single_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) if items.len() == 1 => items[0].as_object(),
        _ => None,
    }
}

fn object_attributes(map: &Map<String, Value>) -> Attributes {
    map.iter()
        .map(|(key, value)| (key.clone(), convert(value)))
        .collect()
}

fn convert(value: &Value) -> AttrValue {
    match value {
        Value::Null => AttrValue::Null,
        Value::Bool(value) => AttrValue::Bool(*value),
        Value::Number(value) => AttrValue::Number(value.to_string()),
        // JSON syntax strings are templates
        Value::String(value) if value.contains("${") => AttrValue::Expression(value.clone()),
        Value::String(value) => AttrValue::String(value.clone()),
        Value::Array(items) => AttrValue::List(items.iter().map(convert).collect()),
        Value::Object(map) => AttrValue::Object(object_attributes(map)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_str(source: &str) -> Result<FileContent, String> {
        parse(source, Path::new("main.tf.json"))
    }

    #[test]
    fn decodes_backend_and_remote_states() {
        let content = parse_str(
            r#"{
  "terraform": {
    "backend": {
      "s3": {"bucket": "your-bucket", "key": "app/state", "encrypt": true}
    }
  },
  "data": {
    "terraform_remote_state": {
      "network": {"backend": "s3", "config": {"bucket": "your-bucket", "key": "net/state"}},
      "dns": [{"backend": "s3", "config": {"bucket": "your-bucket", "key": "dns/state"}}]
    },
    "aws_region": {"current": {}}
  }
}"#,
        )
        .unwrap();

        let backend = content.backend.expect("backend");
        assert_eq!(backend.backend_type, "s3");
        assert_eq!(backend.config.get("encrypt"), Some(&AttrValue::Bool(true)));

        assert_eq!(content.declared_references, 2);
        let mut names: Vec<&str> = content.references.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["dns", "network"]);
    }

    #[test]
    fn templates_are_expressions() {
        let content = parse_str(
            r#"{"data": {"terraform_remote_state": {"env": {"backend": "s3", "config": {"bucket": "${var.bucket}", "key": "k"}}}}}"#,
        )
        .unwrap();
        assert_eq!(
            content.references[0].config.get("bucket"),
            Some(&AttrValue::Expression("${var.bucket}".into()))
        );
    }

    #[test]
    fn non_object_config_is_rejected() {
        let err = parse_str(
            r#"{"data": {"terraform_remote_state": {"env": {"backend": "s3", "config": ["b"]}}}}"#,
        )
        .unwrap_err();
        assert_eq!(err, "remote state \"env\": config must be an object, got list");
    }

    #[test]
    fn remote_state_that_is_not_an_object_is_rejected() {
        let err = parse_str(
            r#"{"data": {"terraform_remote_state": {"net": "s3://b/net"}}}"#,
        )
        .unwrap_err();
        assert_eq!(err, "remote state \"net\" must be an object, got string");
    }

    #[test]
    fn non_object_block_in_an_array_is_rejected() {
        let err = parse_str(
            r#"{"data": {"terraform_remote_state": {"dns": [1, {"backend": "s3", "config": {"bucket": "b", "key": "dns"}}]}}}"#,
        )
        .unwrap_err();
        assert_eq!(err, "remote state \"dns\" must be an object, got number");
    }

    #[test]
    fn remote_state_section_must_hold_objects() {
        assert!(parse_str(r#"{"data": {"terraform_remote_state": "net"}}"#).is_err());
        assert!(parse_str(r#"{"data": {"terraform_remote_state": [1]}}"#).is_err());
        assert!(parse_str(r#"{"data": "terraform_remote_state"}"#).is_err());
    }

    #[test]
    fn backend_must_be_an_object() {
        let err = parse_str(r#"{"terraform": {"backend": "s3"}}"#).unwrap_err();
        assert_eq!(
            err,
            "\"backend\" must be an object or an array of objects, got string"
        );
        assert!(parse_str(r#"{"terraform": {"backend": {"s3": "b/k"}}}"#).is_err());
        assert!(parse_str(r#"{"terraform": [{"backend": {"s3": {}}}, 2]}"#).is_err());
    }

    #[test]
    fn every_block_of_a_name_is_counted() {
        let content = parse_str(
            r#"{"data": {"terraform_remote_state": {"net": [
                {"backend": "s3", "config": {"bucket": "b", "key": "net"}},
                {"backend": "s3", "config": {"bucket": "b", "key": "net2"}}
            ]}}}"#,
        )
        .unwrap();
        assert_eq!(content.declared_references, 2);
        assert_eq!(content.references.len(), 2);
    }

    #[test]
    fn root_must_be_an_object() {
        assert!(parse_str("[]").is_err());
        assert!(parse_str("{").is_err());
    }
}
