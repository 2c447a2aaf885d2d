use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Where the encoded graph goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Lint mode: the graph is built and encoded, then dropped
    Discard,
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Pick the target and check it is usable before any scanning happens.
    ///
    /// An existing file is only replaced with `force`.
    pub fn select(out: Option<PathBuf>, force: bool, dry_run: bool) -> Result<Self> {
        if dry_run {
            return Ok(Self::Discard);
        }
        let Some(path) = out else {
            return Ok(Self::Stdout);
        };
        if path.exists() && !force {
            bail!(
                "output file {} already exists, use --force to overwrite it",
                path.display()
            );
        }
        Ok(Self::File(path))
    }

    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Discard => {
                log::info!("Dry run, discarding {} bytes of output", bytes.len());
                Ok(())
            }
            Self::Stdout => write_stdout(bytes),
            Self::File(path) => {
                let mut file = File::create(path)
                    .with_context(|| format!("failed to create output file {}", path.display()))?;
                file.write_all(bytes)
                    .and_then(|_| file.flush())
                    .with_context(|| format!("failed to write output file {}", path.display()))?;
                log::info!("Graph written to {}", path.display());
                Ok(())
            }
        }
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout.write_all(bytes).and_then(|_| stdout.flush()) {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err).context("failed to write graph to stdout");
    }
    Ok(())
}
