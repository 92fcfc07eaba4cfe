use crate::config::{IgnoreFilter, ScanConfig};
use crate::models::{
    FoldKind, FoldMap, FoldRegion, FoldStats, FoldStyle, FoldWidget, ScanMetadata, SourceFile,
};
use crate::modes::{FoldMode, MixedFoldMode, PhpFoldMode};
use crate::session::Session;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("Not a PHP source file: {}", .0.display())]
    UnsupportedFile(PathBuf),
}

/// Walks a project tree and evaluates every row of every PHP source for
/// foldable regions.
pub struct FoldScanner {
    config: ScanConfig,
    ignore_filter: IgnoreFilter,
    mode: MixedFoldMode,
    marker: PhpFoldMode,
}

impl FoldScanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let ignore_filter = IgnoreFilter::new(&config)?;
        Ok(Self {
            config,
            ignore_filter,
            mode: MixedFoldMode::php(),
            marker: PhpFoldMode::new(),
        })
    }

    /// Scan the project and return the fold map
    pub fn scan(&self) -> Result<FoldMap, ScanError> {
        let start = Instant::now();

        let source_files = self.find_source_files();

        let files: Vec<SourceFile> = if self.config.threads == 1 {
            source_files
                .iter()
                .map(|path| self.parse_file(path))
                .collect()
        } else {
            let pool = if self.config.threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.threads)
                    .build()
                    .ok()
            } else {
                None
            };

            match pool {
                Some(pool) => pool.install(|| {
                    source_files
                        .par_iter()
                        .map(|path| self.parse_file(path))
                        .collect()
                }),
                None => source_files
                    .par_iter()
                    .map(|path| self.parse_file(path))
                    .collect(),
            }
        };

        let stats = self.calculate_stats(&files);

        let duration = start.elapsed();
        let metadata = ScanMetadata {
            scan_duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                files.len() as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
            ..Default::default()
        };

        Ok(FoldMap {
            root: self.config.root.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Scan a single file
    pub fn scan_file(&self, path: &Path) -> Result<SourceFile, ScanError> {
        if !IgnoreFilter::is_php_source(path) {
            return Err(ScanError::UnsupportedFile(path.to_path_buf()));
        }
        Ok(self.parse_file(path))
    }

    /// Fold regions of a document already in memory.
    pub fn analyze_source(&self, content: &str) -> Vec<FoldRegion> {
        // Manual style surfaces no automatic widgets at all
        if self.config.fold_style == FoldStyle::Manual {
            return Vec::new();
        }
        let session = Session::from_source(content);
        let mut folds = Vec::new();
        for row in 0..session.row_count() {
            let widget = self.mode.fold_widget(&session, self.config.fold_style, row);
            if widget == FoldWidget::None {
                continue;
            }
            let Some(range) = self
                .mode
                .fold_widget_range(&session, self.config.fold_style, row)
            else {
                continue;
            };
            if !range.is_multi_row() {
                continue;
            }
            let kind = self.classify(&session, row);
            folds.push(FoldRegion::new(row, widget, kind, range));
        }
        folds
    }

    /// What produced the widget on this row. Block comments are checked
    /// before keyword markers so a commented-out `if (..):` inside a comment
    /// fold counts as a comment.
    fn classify(&self, session: &Session, row: usize) -> FoldKind {
        let line = session.line(row).unwrap_or("");
        let trimmed = line.trim_start();
        if trimmed.starts_with("/*") || trimmed.starts_with("*/") || trimmed.starts_with('*') {
            FoldKind::Comment
        } else if self.marker.is_block_marker(line) {
            FoldKind::Keyword
        } else {
            FoldKind::Brace
        }
    }

    fn find_source_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.config.root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if entry.file_type().is_dir() {
                continue;
            }
            if self.ignore_filter.should_ignore(path, false) {
                continue;
            }
            if !IgnoreFilter::is_php_source(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        files
    }

    /// Analyze a single source file; read failures are recorded on the
    /// entry rather than aborting the scan.
    fn parse_file(&self, path: &Path) -> SourceFile {
        let relative_path = path
            .strip_prefix(&self.config.root)
            .unwrap_or(path)
            .to_path_buf();

        match fs::read_to_string(path) {
            Ok(content) => SourceFile {
                path: relative_path,
                absolute_path: path.to_path_buf(),
                folds: self.analyze_source(&content),
                line_count: content.lines().count(),
                parsed: true,
                error: None,
            },
            Err(e) => SourceFile {
                path: relative_path,
                absolute_path: path.to_path_buf(),
                folds: vec![],
                line_count: 0,
                parsed: false,
                error: Some(e.to_string()),
            },
        }
    }

    fn calculate_stats(&self, files: &[SourceFile]) -> FoldStats {
        let mut stats = FoldStats::default();
        stats.total_files = files.len();

        for file in files {
            if file.parsed {
                stats.parsed_files += 1;
            }
            stats.total_lines += file.line_count;
            for fold in &file.folds {
                stats.add_region(fold);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scanner(config: ScanConfig) -> FoldScanner {
        FoldScanner::new(config).unwrap()
    }

    #[test]
    fn test_scanner_creation() {
        assert!(FoldScanner::new(ScanConfig::default()).is_ok());
    }

    #[test]
    fn test_analyze_source_kinds() {
        let s = scanner(ScanConfig::default());
        let folds = s.analyze_source(
            "<?php\nif ($x):\n    work();\nendif;\nfunction f() {\n    g();\n}\n/* note\n   more\n*/\n",
        );
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].kind, FoldKind::Keyword);
        assert_eq!(folds[0].row, 1);
        assert_eq!(folds[1].kind, FoldKind::Brace);
        assert_eq!(folds[2].kind, FoldKind::Comment);
        assert!(folds.iter().all(|f| f.widget == FoldWidget::Start));
    }

    #[test]
    fn test_analyze_source_manual_style() {
        let config = ScanConfig::default().with_fold_style(FoldStyle::Manual);
        let s = scanner(config);
        assert!(s.analyze_source("<?php\nif ($x):\n    work();\nendif;\n").is_empty());
    }

    #[test]
    fn test_markbeginend_adds_end_widgets() {
        let config = ScanConfig::default().with_fold_style(FoldStyle::MarkBeginEnd);
        let s = scanner(config);
        let folds = s.analyze_source("<?php\nif ($x):\n    work();\nendif;\n");
        assert_eq!(folds.len(), 2);
        assert_eq!(folds[0].widget, FoldWidget::Start);
        assert_eq!(folds[1].widget, FoldWidget::End);
        assert_eq!(folds[0].range, folds[1].range);
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.php"),
            "<?php\nif ($x):\n    work();\nendif;\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "if (x):\nendif;\n").unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(
            dir.path().join("vendor/skip.php"),
            "<?php\nif ($x):\nendif;\n",
        )
        .unwrap();

        let map = scanner(ScanConfig::new(dir.path().to_path_buf())).scan().unwrap();
        assert_eq!(map.stats.total_files, 1);
        assert_eq!(map.stats.parsed_files, 1);
        assert_eq!(map.stats.keyword_folds, 1);
        assert_eq!(map.files[0].path, PathBuf::from("a.php"));
        assert!(map.files[0].parsed);
    }

    #[test]
    fn test_scan_file_rejects_non_php() {
        let s = scanner(ScanConfig::default());
        assert!(matches!(
            s.scan_file(Path::new("app.js")),
            Err(ScanError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_missing_file_recorded_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let s = scanner(ScanConfig::new(dir.path().to_path_buf()));
        let file = s.scan_file(&dir.path().join("gone.php")).unwrap();
        assert!(!file.parsed);
        assert!(file.error.is_some());
        assert!(file.folds.is_empty());
    }
}
