use super::{FileContent, REMOTE_STATE};
use crate::parser::{BackendDeclaration, RemoteStateReference};
use hcl::expr::{Expression, ObjectKey};
use hcl::{Block, Body};
use std::path::Path;
use terradep_state::{AttrValue, Attributes};

/// Extract backend and remote state blocks from a file in HCL native syntax
pub(super) fn parse(source: &str, file: &Path) -> Result<FileContent, String> {
    let body: Body = hcl::parse(source).map_err(|err| err.to_string())?;
    let mut content = FileContent::default();

    for block in body.blocks() {
        match block.identifier() {
            "terraform" => {
                for backend in block
                    .body()
                    .blocks()
                    .filter(|inner| inner.identifier() == "backend")
                {
                    let backend_type = backend
                        .labels()
                        .first()
                        .map(|label| label.as_str().to_string())
                        .ok_or("backend block does not have a type label")?;
                    content.backend = Some(BackendDeclaration {
                        backend_type,
                        config: body_attributes(backend.body())?,
                        file: file.to_path_buf(),
                    });
                }
            }
            "data" => {
                let data_type = block.labels().first().map(|label| label.as_str());
                if data_type != Some(REMOTE_STATE) {
                    continue;
                }
                content.declared_references += 1;
                let reference = remote_state(block, file)?;
                log::debug!(
                    "Decoded remote state {:?} with backend {:?} in {}",
                    reference.name,
                    reference.backend_type,
                    file.display()
                );
                content.references.push(reference);
            }
            _ => {}
        }
    }

    Ok(content)
}

fn remote_state(block: &Block, file: &Path) -> Result<RemoteStateReference, String> {
    let name = block
        .labels()
        .get(1)
        .map(|label| label.as_str())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(format!("block {REMOTE_STATE:?} does not have a name"));
    }

    let mut backend_type = None;
    let mut config = Attributes::new();
    for attr in block.body().attributes() {
        match attr.key() {
            "backend" => match attr.expr() {
                Expression::String(value) => backend_type = Some(value.clone()),
                other => {
                    return Err(format!(
                        "remote state {name:?}: backend must be a string literal, got {}",
                        convert(other)?.describe()
                    ))
                }
            },
            "config" => match convert(attr.expr())
                .map_err(|reason| format!("remote state {name:?}: {reason}"))?
            {
                AttrValue::Object(attrs) => config = attrs,
                other => {
                    return Err(format!(
                        "remote state {name:?}: config must be an object, got {}",
                        other.describe()
                    ))
                }
            },
            _ => {}
        }
    }

    let backend_type =
        backend_type.ok_or_else(|| format!("remote state {name:?}: missing attribute \"backend\""))?;

    Ok(RemoteStateReference {
        name: name.to_string(),
        backend_type,
        config,
        file: file.to_path_buf(),
    })
}

fn body_attributes(body: &Body) -> Result<Attributes, String> {
    body.attributes()
        .map(|attr| -> Result<(String, AttrValue), String> {
            Ok((attr.key().to_string(), convert(attr.expr())?))
        })
        .collect()
}

/// Literal values are kept, everything Terraform has to evaluate becomes an expression.
/// Object keys must be literals.
fn convert(expr: &Expression) -> Result<AttrValue, String> {
    let value = match expr {
        Expression::Null => AttrValue::Null,
        Expression::Bool(value) => AttrValue::Bool(*value),
        Expression::Number(value) => AttrValue::Number(value.to_string()),
        Expression::String(value) => AttrValue::String(value.clone()),
        Expression::Array(items) => {
            AttrValue::List(items.iter().map(convert).collect::<Result<_, _>>()?)
        }
        Expression::Object(object) => AttrValue::Object(
            object
                .iter()
                .map(|(key, value)| -> Result<(String, AttrValue), String> {
                    Ok((object_key(key)?, convert(value)?))
                })
                .collect::<Result<_, _>>()?,
        ),
        other => AttrValue::Expression(render(other)),
    };
    Ok(value)
}

fn object_key(key: &ObjectKey) -> Result<String, String> {
    match key {
        ObjectKey::Identifier(ident) => Ok(ident.as_str().to_string()),
        ObjectKey::Expression(Expression::String(value)) => Ok(value.clone()),
        other => Err(format!(
            "object key must be a literal, got `{}`",
            hcl::format::to_string(other).unwrap_or_else(|_| format!("{other:?}"))
        )),
    }
}

/// Source text of an expression that needs Terraform to evaluate it
fn render(expr: &Expression) -> String {
    hcl::format::to_string(expr).unwrap_or_else(|_| format!("{expr:?}"))
}
