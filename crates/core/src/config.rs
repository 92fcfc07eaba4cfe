use crate::models::FoldStyle;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions treated as PHP sources
pub const PHP_EXTENSIONS: &[&str] = &["php", "phtml", "php3", "php4", "php5", "inc"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to build glob pattern: {0}")]
    GlobError(#[from] globset::Error),
    #[error("Failed to parse gitignore: {0}")]
    GitignoreError(#[from] ignore::Error),
    #[error("Failed to parse config file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration for scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Which fold markers to surface
    pub fold_style: FoldStyle,
    /// Additional ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,
    /// Custom ignore file path
    pub ignore_file: Option<PathBuf>,
    /// Include vendor/node_modules in scan
    pub include_deps: bool,
    /// Number of threads (0 = auto)
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            fold_style: FoldStyle::default(),
            ignore_patterns: vec![],
            ignore_file: None,
            include_deps: false,
            threads: 0,
        }
    }
}

/// Optional `.phpfold.toml` at the project root; any field it sets overrides
/// the built-in defaults, and command-line flags override both.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    fold_style: Option<String>,
    ignore_patterns: Option<Vec<String>>,
    ignore_file: Option<PathBuf>,
    include_deps: Option<bool>,
    threads: Option<usize>,
}

impl ScanConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Build a config for `root`, layering in `.phpfold.toml` if present.
    pub fn load(root: PathBuf) -> Result<Self, ConfigError> {
        let mut config = Self::new(root);
        let path = config.root.join(".phpfold.toml");
        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let file: FileConfig =
                toml::from_str(&raw).map_err(|source| ConfigError::ParseError {
                    path: path.clone(),
                    source,
                })?;
            if let Some(style) = file.fold_style.as_deref().and_then(FoldStyle::parse) {
                config.fold_style = style;
            }
            if let Some(patterns) = file.ignore_patterns {
                config.ignore_patterns = patterns;
            }
            if let Some(ignore_file) = file.ignore_file {
                config.ignore_file = Some(ignore_file);
            }
            if let Some(include_deps) = file.include_deps {
                config.include_deps = include_deps;
            }
            if let Some(threads) = file.threads {
                config.threads = threads;
            }
        }
        Ok(config)
    }

    pub fn with_fold_style(mut self, style: FoldStyle) -> Self {
        self.fold_style = style;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_include_deps(mut self, include: bool) -> Self {
        self.include_deps = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Filter for ignoring files and directories
pub struct IgnoreFilter {
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
}

impl IgnoreFilter {
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        // Load .gitignore if present
        let gitignore = if let Some(ref ignore_file) = config.ignore_file {
            let mut builder = GitignoreBuilder::new(&config.root);
            builder.add(ignore_file);
            Some(builder.build()?)
        } else {
            let gitignore_path = config.root.join(".gitignore");
            if gitignore_path.exists() {
                let mut builder = GitignoreBuilder::new(&config.root);
                builder.add(&gitignore_path);
                Some(builder.build()?)
            } else {
                None
            }
        };

        // Build custom ignore globs
        let mut custom_builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            custom_builder.add(Glob::new(pattern)?);
        }
        let custom_globs = custom_builder.build()?;

        // Default ignores (unless include_deps is true)
        let mut default_builder = GlobSetBuilder::new();
        if !config.include_deps {
            default_builder.add(Glob::new("**/vendor/**")?);
            default_builder.add(Glob::new("**/node_modules/**")?);
            default_builder.add(Glob::new("**/.git/**")?);
            default_builder.add(Glob::new("**/cache/**")?);
            default_builder.add(Glob::new("**/storage/framework/**")?);
            default_builder.add(Glob::new("**/.phpunit.cache/**")?);
            default_builder.add(Glob::new("**/.DS_Store")?);
        }
        let default_ignores = default_builder.build()?;

        Ok(Self {
            gitignore,
            custom_globs,
            default_ignores,
        })
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path_str = path.to_string_lossy();

        if self.default_ignores.is_match(&*path_str) {
            return true;
        }
        if self.custom_globs.is_match(&*path_str) {
            return true;
        }
        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Whether a path has a PHP source extension
    pub fn is_php_source(path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_ascii_lowercase();
                PHP_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.fold_style, FoldStyle::MarkBegin);
        assert!(!config.include_deps);
    }

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::new(PathBuf::from("/test"))
            .with_fold_style(FoldStyle::MarkBeginEnd)
            .with_ignore_patterns(vec!["*.blade.php".to_string()])
            .with_include_deps(true)
            .with_threads(4);

        assert_eq!(config.root, PathBuf::from("/test"));
        assert_eq!(config.fold_style, FoldStyle::MarkBeginEnd);
        assert!(config.include_deps);
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn test_php_extension_detection() {
        assert!(IgnoreFilter::is_php_source(Path::new("index.php")));
        assert!(IgnoreFilter::is_php_source(Path::new("view.phtml")));
        assert!(IgnoreFilter::is_php_source(Path::new("legacy.PHP")));
        assert!(!IgnoreFilter::is_php_source(Path::new("app.js")));
        assert!(!IgnoreFilter::is_php_source(Path::new("Makefile")));
    }

    #[test]
    fn test_default_ignores() {
        let config = ScanConfig::default();
        let filter = IgnoreFilter::new(&config).unwrap();
        assert!(filter.should_ignore(Path::new("vendor/autoload.php"), false));
        assert!(filter.should_ignore(Path::new("a/node_modules/b.php"), false));
        assert!(!filter.should_ignore(Path::new("src/index.php"), false));

        let permissive = IgnoreFilter::new(&ScanConfig::default().with_include_deps(true)).unwrap();
        assert!(!permissive.should_ignore(Path::new("vendor/autoload.php"), false));
    }

    #[test]
    fn test_custom_patterns() {
        let config =
            ScanConfig::default().with_ignore_patterns(vec!["**/*.blade.php".to_string()]);
        let filter = IgnoreFilter::new(&config).unwrap();
        assert!(filter.should_ignore(Path::new("resources/views/home.blade.php"), false));
        assert!(!filter.should_ignore(Path::new("src/index.php"), false));
    }

    #[test]
    fn test_load_file_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".phpfold.toml"),
            "fold_style = \"markbeginend\"\nignore_patterns = [\"**/*.blade.php\"]\nthreads = 2\n",
        )
        .unwrap();
        let config = ScanConfig::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.fold_style, FoldStyle::MarkBeginEnd);
        assert_eq!(config.ignore_patterns, vec!["**/*.blade.php".to_string()]);
        assert_eq!(config.threads, 2);
        assert!(!config.include_deps);
    }
}
