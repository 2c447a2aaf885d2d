use crate::error::{ResolveError, Result};
use crate::s3::S3Resolver;
use crate::state::State;
use crate::value::Attributes;
use std::collections::BTreeMap;
use std::fmt;

/// Backend-specific identity resolution.
///
/// Implementations must be pure: the same input always yields an equal [`State`].
pub trait StateResolver: Send + Sync {
    /// Backend type name this resolver handles (e.g. `"s3"`)
    fn backend_type(&self) -> &str;

    /// Resolve the state declared by `terraform { backend "<type>" { ... } }`
    fn resolve_own_state(&self, config: &Attributes) -> Result<State>;

    /// Resolve the state referenced by a `terraform_remote_state` `config` object
    fn resolve_dependency_state(&self, config: &Attributes) -> Result<State>;
}

/// Registry of resolvers keyed by backend type name
pub struct ResolverRegistry {
    resolvers: BTreeMap<String, Box<dyn StateResolver>>,
}

impl ResolverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            resolvers: BTreeMap::new(),
        }
    }

    /// Register a resolver, replacing any previous one for the same backend type
    pub fn register(&mut self, resolver: impl StateResolver + 'static) -> &mut Self {
        let backend = resolver.backend_type().to_string();
        if self.resolvers.contains_key(&backend) {
            log::debug!("Replacing resolver for backend {backend:?}");
        }
        self.resolvers.insert(backend, Box::new(resolver));
        self
    }

    /// Builder-style variant of [`ResolverRegistry::register`]
    pub fn with(mut self, resolver: impl StateResolver + 'static) -> Self {
        self.register(resolver);
        self
    }

    /// Sorted list of registered backend types
    pub fn supported_backends(&self) -> Vec<String> {
        self.resolvers.keys().cloned().collect()
    }

    pub fn resolve_own_state(&self, backend: &str, config: &Attributes) -> Result<State> {
        self.resolver(backend)?.resolve_own_state(config)
    }

    pub fn resolve_dependency_state(&self, backend: &str, config: &Attributes) -> Result<State> {
        self.resolver(backend)?.resolve_dependency_state(config)
    }

    fn resolver(&self, backend: &str) -> Result<&dyn StateResolver> {
        self.resolvers
            .get(backend)
            .map(|resolver| resolver.as_ref())
            .ok_or_else(|| ResolveError::UnsupportedBackend {
                backend: backend.to_string(),
                supported: self.supported_backends(),
            })
    }
}

impl Default for ResolverRegistry {
    /// Registry with the built-in `s3` resolver using its default comparison policy
    fn default() -> Self {
        Self::new().with(S3Resolver::default())
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("backends", &self.supported_backends())
            .finish()
    }
}
