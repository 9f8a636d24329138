use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{CombinationProblem, ConvertedProblem, Domain, DomainKind, MdpError};

/// Compiled output of the combination pipeline, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationBundle {
    pub combination: CombinationProblem,
    /// The split problem the combination was built from.
    pub split: ConvertedProblem,
}

impl CombinationBundle {
    /// Overwrite the deadline of both problems.
    pub fn with_deadline(self, deadline: u32) -> Self {
        Self {
            combination: self.combination.with_deadline(deadline),
            split: self.split.with_deadline(deadline),
        }
    }
}

/// Identity of a cached bundle: domain name, the kind it was declared with,
/// and the size parameters it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    domain: String,
    kind: DomainKind,
    sizes: Vec<u32>,
}

impl CacheKey {
    /// Key for a domain declared as [`DomainKind::Combination`].
    pub fn new(domain: impl Into<String>, sizes: Vec<u32>) -> Self {
        Self {
            domain: domain.into(),
            kind: DomainKind::Combination,
            sizes,
        }
    }

    pub fn with_kind(mut self, kind: DomainKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn for_domain(domain: &Domain) -> Self {
        Self::new(domain.name(), domain.size_params().to_vec()).with_kind(domain.kind())
    }

    /// `<domain>_comb[_<kind>][_<size>...].yaml`; the kind is left out for combination domains.
    pub fn file_name(&self) -> String {
        let mut name = format!("{}_comb", self.domain);
        if self.kind != DomainKind::Combination {
            name.push('_');
            name.push_str(self.kind.as_str());
        }
        for size in &self.sizes {
            name.push('_');
            name.push_str(&size.to_string());
        }
        name.push_str(".yaml");
        name
    }

    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Whether [`load_or_build`] reused a cached bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Load a bundle from YAML on disk.
pub fn load_bundle(path: impl AsRef<Path>) -> Result<CombinationBundle, MdpError> {
    let yaml = fs::read_to_string(path)?;
    let bundle: CombinationBundle = serde_yaml::from_str(&yaml)?;
    Ok(bundle)
}

/// Serialize and write a bundle to YAML, creating parent directories.
pub fn save_bundle(path: impl AsRef<Path>, bundle: &CombinationBundle) -> Result<(), MdpError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(bundle)?;
    fs::write(path, yaml)?;
    Ok(())
}

/// Reuse the bundle cached under `key` in `dir`, or build and cache a fresh one.
///
/// A missing or unreadable cache file is never an error: it is logged and the
/// bundle rebuilt. Saving is best-effort. Either way both problems carry `deadline`.
pub fn load_or_build<F>(
    dir: impl AsRef<Path>,
    key: &CacheKey,
    deadline: u32,
    build: F,
) -> Result<(CombinationBundle, CacheStatus), MdpError>
where
    F: FnOnce() -> Result<CombinationBundle, MdpError>,
{
    let path = key.path(dir.as_ref());

    if path.exists() {
        match load_bundle(&path) {
            Ok(bundle) => {
                info!(path = %path.display(), deadline, "loaded cached combination bundle");
                return Ok((bundle.with_deadline(deadline), CacheStatus::Hit));
            }
            Err(err) => warn!(path = %path.display(), error = %err, "discarding unreadable cache file"),
        }
    } else {
        info!(path = %path.display(), "no cached combination bundle");
    }

    let bundle = build()?;
    if let Err(err) = save_bundle(&path, &bundle) {
        warn!(path = %path.display(), error = %err, "failed to write cache file");
    }
    Ok((bundle.with_deadline(deadline), CacheStatus::Miss))
}
