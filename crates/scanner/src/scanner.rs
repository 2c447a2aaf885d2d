use crate::error::{Result, ScanError};
use crate::options::ScanOptions;
use crate::parser::{DeploymentConfig, DeploymentParser};
use crate::stats::ScanStats;
use crate::terraform::TerraformParser;
use globset::GlobSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use terradep_graph::{DeploymentGraph, DeploymentRecord, GraphBuilder};
use terradep_state::{ResolverRegistry, State};
use walkdir::{DirEntry, WalkDir};

/// Scanner for finding Terraform deployments below a root directory
pub struct Scanner {
    options: ScanOptions,
    exclusions: GlobSet,
    resolvers: ResolverRegistry,
    parser: Box<dyn DeploymentParser>,
}

impl Scanner {
    /// Scanner for Terraform configuration.
    ///
    /// Fails when an exclusion pattern is not a valid glob.
    pub fn new(options: ScanOptions, resolvers: ResolverRegistry) -> Result<Self> {
        let exclusions = options.exclusion_matcher()?;
        Ok(Self {
            options,
            exclusions,
            resolvers,
            parser: Box::new(TerraformParser::new()),
        })
    }

    /// Replace the configuration front end
    pub fn with_parser(mut self, parser: impl DeploymentParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan `root` recursively and build the dependency graph of its deployments
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<DeploymentGraph> {
        let root = root.as_ref();
        let (records, stats) = self.collect(root)?;

        log::info!(
            "Scanned {}: {} directories, {} deployments, {} references, {} modules, {} excluded",
            root.display(),
            stats.directories,
            stats.deployments,
            stats.references,
            stats.modules,
            stats.excluded
        );

        Ok(GraphBuilder::new().build(records)?)
    }

    /// Collect the deployment records below `root` without building a graph
    pub fn collect(&self, root: impl AsRef<Path>) -> Result<(Vec<DeploymentRecord>, ScanStats)> {
        let root = root.as_ref();
        check_root(root)?;

        let mut records = Vec::new();
        let mut stats = ScanStats::new();

        let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;

            // only directories matter
            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.depth() > 0 && self.is_excluded(&entry) {
                log::debug!("Skipping excluded directory {}", entry.path().display());
                stats.excluded += 1;
                walker.skip_current_dir();
                continue;
            }

            stats.directories += 1;
            let path = entry.path();

            if !self.parser.is_config_dir(path) {
                log::debug!("Not a module dir: {}", path.display());
                continue;
            }

            log::debug!("Loading module from path: {}", path.display());
            let Some(config) = self.parser.load_deployment(path)? else {
                log::debug!("Module without backend, not a deployment: {}", path.display());
                stats.modules += 1;
                continue;
            };

            let record = self.resolve(path, config)?;
            stats.add_deployment(record.dependency_states.len());
            records.push(record);

            // deployments are not nested
            walker.skip_current_dir();
        }

        Ok((records, stats))
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| self.exclusions.is_match(name))
    }

    fn resolve(&self, path: &Path, config: DeploymentConfig) -> Result<DeploymentRecord> {
        let resolve_error = |source| ScanError::Resolve {
            path: path.to_path_buf(),
            source,
        };

        let backend = &config.backend;
        let own_state = self
            .resolvers
            .resolve_own_state(&backend.backend_type, &backend.config)
            .map_err(resolve_error)?;

        let dependency_states = config
            .references
            .iter()
            .map(|reference| {
                self.resolvers
                    .resolve_dependency_state(&reference.backend_type, &reference.config)
                    .map_err(resolve_error)
            })
            .collect::<Result<Vec<State>>>()?;

        if dependency_states.len() != config.declared_references {
            return Err(ScanError::IncompleteResolution {
                path: path.to_path_buf(),
                declared: config.declared_references,
                resolved: dependency_states.len(),
            });
        }

        log::debug!(
            "Module {} has state {own_state} and {} dependencies",
            path.display(),
            dependency_states.len()
        );

        Ok(DeploymentRecord::new(path, own_state, dependency_states))
    }
}

fn check_root(root: &Path) -> Result<()> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ScanError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(ScanError::Io {
                path: root.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    Ok(())
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("options", &self.options)
            .field("resolvers", &self.resolvers)
            .finish_non_exhaustive()
    }
}
