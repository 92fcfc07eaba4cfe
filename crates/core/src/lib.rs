//! Phpfold Core Library
//!
//! Fold-region analysis for PHP sources embedded in mixed-language documents
//! (PHP interleaved with HTML, JavaScript, and CSS).
//!
//! # Features
//!
//! - Token-driven matching of PHP's colon/`end*` block syntax (`if (..): ... endif;`)
//! - Generic brace/comment folding as a fallback for everything else
//! - A state-tag router that dispatches rows to the folder owning that region
//! - A line-based tokenizer for building sessions from raw mixed documents
//! - Project scanning with gitignore support, parallel across files
//! - Output in JSON, YAML, or human summary, with an ANSI-colored renderer
//!
//! # Example
//!
//! ```
//! use phpfold_core::{FoldMode, FoldStyle, FoldWidget, MixedFoldMode, Session};
//!
//! let session = Session::from_source("<?php\nif ($x):\n    work();\nendif;\n");
//! let mode = MixedFoldMode::php();
//!
//! assert_eq!(mode.fold_widget(&session, FoldStyle::MarkBegin, 1), FoldWidget::Start);
//! let range = mode.fold_widget_range(&session, FoldStyle::MarkBegin, 1).unwrap();
//! assert_eq!((range.start_row, range.end_row), (1, 3));
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod modes;
pub mod output;
pub mod session;
pub mod token_iterator;
pub mod tokenizer;

// Re-exports for convenience
pub use config::{ConfigError, IgnoreFilter, ScanConfig};
pub use engine::{render_file, render_file_ansi, FoldScanner, Renderer, ScanError};
pub use models::*;
pub use modes::{CstyleFoldMode, FoldMode, MixedFoldMode, PhpFoldMode};
pub use output::{format_output, format_summary, FormatError, OutputFormat};
pub use session::Session;
pub use token_iterator::TokenIterator;
pub use tokenizer::MixedTokenizer;
