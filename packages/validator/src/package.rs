//! Loading a package of article XML files from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::article::Article;
use crate::error::{Result, ValidatorError};

/// Articles of one package keyed by file name without extension.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub articles: BTreeMap<String, Article>,
    /// Names of files whose markup could not be parsed.
    pub unparsable: Vec<String>,
}

impl Package {
    /// Build a package from `(name, xml)` pairs.
    ///
    /// Markup that cannot be parsed is recorded in `unparsable` instead of
    /// failing the whole package.
    ///
    /// # Examples
    /// ```
    /// use sps_validator::package::Package;
    ///
    /// let package = Package::from_sources([
    ///     ("a01".to_string(), "<article><front/></article>".to_string()),
    ///     ("a02".to_string(), "<article>".to_string()),
    /// ]);
    /// assert_eq!(package.articles.len(), 1);
    /// assert_eq!(package.unparsable, vec!["a02"]);
    /// ```
    pub fn from_sources(sources: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut package = Self::default();
        for (name, xml) in sources {
            match Article::parse(&name, &xml) {
                Ok(article) => {
                    package.articles.insert(name, article);
                }
                Err(e) => {
                    warn!(name = name.as_str(), error = %e, "Skipping unparsable document");
                    package.unparsable.push(name);
                }
            }
        }
        package
    }

    /// Load every `*.xml` file directly inside `dir`, in name order.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(ValidatorError::InvalidPackagePath(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_xml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
            if path.is_file() && is_xml {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
                continue;
            };
            let xml = fs::read_to_string(&path)?;
            sources.push((name.to_string(), xml));
        }

        let package = Self::from_sources(sources);
        debug!(
            dir = %dir.display(),
            articles = package.articles.len(),
            unparsable = package.unparsable.len(),
            "Loaded package"
        );
        Ok(package)
    }

    pub fn len(&self) -> usize {
        self.articles.len() + self.unparsable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
