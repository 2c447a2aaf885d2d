use crate::error::{ResolveError, Result};
use crate::registry::StateResolver;
use crate::state::State;
use crate::value::{AttrValue, Attributes};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Terraform backend type handled by [`S3Resolver`]
pub const S3_BACKEND: &str = "s3";

/// Bytes escaped in the key: everything but unreserved characters, `/` and the
/// sub-delimiters URL paths allow
const KEY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Comparison policy of [`S3Resolver`].
///
/// Each enabled attribute becomes part of the canonical state, so states that
/// differ only in that attribute are no longer equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct S3ResolverConfig {
    /// Distinguish states by AWS region (unset region is treated as empty)
    pub region: bool,

    /// Distinguish states by server side encryption (unset is treated as `false`)
    pub encryption: bool,
}

/// [`StateResolver`] for the `s3` backend: `s3://<bucket>/<key>`
#[derive(Debug, Clone, Default)]
pub struct S3Resolver {
    config: S3ResolverConfig,
}

impl S3Resolver {
    pub fn new(config: S3ResolverConfig) -> Self {
        Self { config }
    }

    /// Include the region in the canonical state
    pub fn with_region(mut self) -> Self {
        self.config.region = true;
        self
    }

    /// Include the encryption flag in the canonical state
    pub fn with_encryption(mut self) -> Self {
        self.config.encryption = true;
        self
    }

    pub fn config(&self) -> S3ResolverConfig {
        self.config
    }

    fn canonical(&self, config: &Attributes) -> Result<State> {
        let bucket = required_str(config, "bucket")?;
        let key = required_str(config, "key")?;
        let key = key.trim_start_matches('/');

        // keys in alphabetical order
        let mut query = Vec::new();
        if self.config.encryption {
            let encrypt = optional_bool(config, "encrypt")?.unwrap_or(false);
            query.push(format!("encrypt={encrypt}"));
        }
        if self.config.region {
            let region = optional_str(config, "region")?.unwrap_or_default();
            query.push(format!("region={region}"));
        }

        let key = utf8_percent_encode(key, KEY_ESCAPE);
        let mut canonical = format!("{S3_BACKEND}://{bucket}/{key}");
        if !query.is_empty() {
            canonical.push('?');
            canonical.push_str(&query.join("&"));
        }

        Ok(State::new(canonical))
    }
}

impl StateResolver for S3Resolver {
    fn backend_type(&self) -> &str {
        S3_BACKEND
    }

    fn resolve_own_state(&self, config: &Attributes) -> Result<State> {
        self.canonical(config)
    }

    fn resolve_dependency_state(&self, config: &Attributes) -> Result<State> {
        self.canonical(config)
    }
}

fn required_str<'a>(config: &'a Attributes, attribute: &str) -> Result<&'a str> {
    optional_str(config, attribute)?.ok_or_else(|| ResolveError::missing(S3_BACKEND, attribute))
}

fn optional_str<'a>(config: &'a Attributes, attribute: &str) -> Result<Option<&'a str>> {
    match config.get(attribute) {
        None | Some(AttrValue::Null) => Ok(None),
        Some(AttrValue::String(value)) => Ok(Some(value.as_str())),
        Some(other) => Err(ResolveError::invalid(
            S3_BACKEND,
            attribute,
            "a string literal",
            other.describe(),
        )),
    }
}

fn optional_bool(config: &Attributes, attribute: &str) -> Result<Option<bool>> {
    match config.get(attribute) {
        None | Some(AttrValue::Null) => Ok(None),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            ResolveError::invalid(S3_BACKEND, attribute, "a bool", value.describe())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(pairs: &[(&str, AttrValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    fn full_config(region: &str, encrypt: bool) -> Attributes {
        config(&[
            ("bucket", "your-bucket".into()),
            ("key", "terraform/domain/deployment/tfstate.json".into()),
            ("region", region.into()),
            ("encrypt", encrypt.into()),
            ("dynamodb_table", "locks".into()),
        ])
    }

    #[test]
    fn default_policy_uses_bucket_and_key_only() {
        let resolver = S3Resolver::default();
        let state = resolver
            .resolve_own_state(&full_config("eu-west-3", true))
            .unwrap();
        assert_eq!(
            state.as_str(),
            "s3://your-bucket/terraform/domain/deployment/tfstate.json"
        );

        let other_region = resolver
            .resolve_dependency_state(&full_config("us-east-1", false))
            .unwrap();
        assert_eq!(state, other_region);
    }

    #[test]
    fn region_toggle_makes_regions_distinct() {
        let resolver = S3Resolver::default().with_region();
        let west = resolver
            .resolve_own_state(&full_config("eu-west-3", true))
            .unwrap();
        let east = resolver
            .resolve_own_state(&full_config("us-east-1", true))
            .unwrap();

        assert_ne!(west, east);
        assert_eq!(
            west.as_str(),
            "s3://your-bucket/terraform/domain/deployment/tfstate.json?region=eu-west-3"
        );
    }

    #[test]
    fn encryption_toggle_defaults_to_false() {
        let resolver = S3Resolver::default().with_encryption().with_region();
        let state = resolver
            .resolve_dependency_state(&config(&[("bucket", "b".into()), ("key", "k".into())]))
            .unwrap();
        assert_eq!(state.as_str(), "s3://b/k?encrypt=false&region=");

        let encrypted = resolver
            .resolve_dependency_state(&config(&[
                ("bucket", "b".into()),
                ("key", "k".into()),
                ("encrypt", "true".into()),
            ]))
            .unwrap();
        assert_eq!(encrypted.as_str(), "s3://b/k?encrypt=true&region=");
    }

    #[test]
    fn leading_slash_in_key_is_ignored() {
        let resolver = S3Resolver::default();
        let state = resolver
            .resolve_own_state(&config(&[("bucket", "b".into()), ("key", "/net/state".into())]))
            .unwrap();
        assert_eq!(state.as_str(), "s3://b/net/state");
    }

    #[test]
    fn key_is_escaped_like_a_url_path() {
        let resolver = S3Resolver::default().with_region();
        let state = resolver
            .resolve_own_state(&config(&[
                ("bucket", "b".into()),
                ("key", "env/my app?region=x#1%.tfstate".into()),
                ("region", "eu-west-3".into()),
            ]))
            .unwrap();
        assert_eq!(
            state.as_str(),
            "s3://b/env/my%20app%3Fregion=x%231%25.tfstate?region=eu-west-3"
        );
    }

    #[test]
    fn missing_key_is_reported() {
        let err = S3Resolver::default()
            .resolve_own_state(&config(&[("bucket", "b".into())]))
            .unwrap_err();
        assert_eq!(err, ResolveError::missing("s3", "key"));
    }

    #[test]
    fn interpolated_bucket_is_rejected() {
        let err = S3Resolver::default()
            .resolve_dependency_state(&config(&[
                ("bucket", AttrValue::Expression("var.bucket".into())),
                ("key", "k".into()),
            ]))
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::invalid("s3", "bucket", "a string literal", "expression `var.bucket`")
        );
    }

    #[test]
    fn non_bool_encrypt_is_rejected_only_when_compared() {
        let attrs = config(&[
            ("bucket", "b".into()),
            ("key", "k".into()),
            ("encrypt", AttrValue::Number("1".into())),
        ]);
        assert!(S3Resolver::default().resolve_own_state(&attrs).is_ok());
        assert!(matches!(
            S3Resolver::default().with_encryption().resolve_own_state(&attrs),
            Err(ResolveError::InvalidAttribute { attribute, .. }) if attribute == "encrypt"
        ));
    }
}
