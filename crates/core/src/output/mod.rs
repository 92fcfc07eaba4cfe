mod json;
mod yaml;

pub use json::to_json;
pub use yaml::to_yaml;

use crate::models::FoldMap;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
    Ansi,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "json" => Some(OutputFormat::Json),
            "yaml" => Some(OutputFormat::Yaml),
            "summary" => Some(OutputFormat::Summary),
            "ansi" => Some(OutputFormat::Ansi),
            _ => None,
        }
    }
}

/// Format a FoldMap according to the specified format
pub fn format_output(fold_map: &FoldMap, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(fold_map),
        OutputFormat::Yaml => to_yaml(fold_map),
        OutputFormat::Summary => Ok(format_summary(fold_map)),
        OutputFormat::Ansi => Ok(format_summary_ansi(fold_map)),
    }
}

/// Generate a human-readable summary
pub fn format_summary(fold_map: &FoldMap) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Fold Analysis Summary\n\
         =====================\n\
         Root: {}\n\n",
        fold_map.root.display()
    ));

    output.push_str(&format!(
        "Files Scanned: {} ({} parsed)\n",
        fold_map.stats.total_files, fold_map.stats.parsed_files
    ));

    output.push_str(&format!(
        "Total Lines: {} | Foldable Lines: {} ({:.1}%)\n\n",
        fold_map.stats.total_lines,
        fold_map.stats.foldable_lines,
        if fold_map.stats.total_lines > 0 {
            (fold_map.stats.foldable_lines as f64 / fold_map.stats.total_lines as f64) * 100.0
        } else {
            0.0
        }
    ));

    output.push_str(&format!(
        "Total Folds: {}\n\
         - Keyword blocks: {}\n\
         - Brace blocks: {}\n\
         - Comments: {}\n\
         Widgets: {} start, {} end\n\n",
        fold_map.stats.total_folds,
        fold_map.stats.keyword_folds,
        fold_map.stats.brace_folds,
        fold_map.stats.comment_folds,
        fold_map.stats.start_widgets,
        fold_map.stats.end_widgets
    ));

    // Files with the most folds first
    let mut files_by_folds: Vec<_> = fold_map
        .files
        .iter()
        .filter(|f| !f.folds.is_empty())
        .collect();
    files_by_folds.sort_by(|a, b| b.folds.len().cmp(&a.folds.len()));

    if !files_by_folds.is_empty() {
        output.push_str("Top files by folds:\n");
        for file in files_by_folds.iter().take(5) {
            output.push_str(&format!(
                "  {} ({} folds, {} lines)\n",
                file.path.display(),
                file.folds.len(),
                file.line_count
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Scan Duration: {}ms ({:.2} files/sec)\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        fold_map.metadata.scan_duration_ms,
        fold_map.metadata.files_per_second,
        fold_map.metadata.timestamp,
        fold_map.metadata.tool_version
    ));

    output
}

fn format_summary_ansi(fold_map: &FoldMap) -> String {
    let mut output = String::new();

    let bold = "\x1b[1m";
    let reset = "\x1b[0m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let dim = "\x1b[2m";

    output.push_str(&format!(
        "{}{}Fold Analysis Summary{}\n\
         {}====================={}\n\
         {}Root:{} {}\n\n",
        bold,
        cyan,
        reset,
        cyan,
        reset,
        dim,
        reset,
        fold_map.root.display()
    ));

    output.push_str(&format!(
        "{}Files Scanned:{} {} ({} parsed)\n",
        dim, reset, fold_map.stats.total_files, fold_map.stats.parsed_files
    ));

    output.push_str(&format!(
        "{}Total Lines:{} {} | {}Foldable:{} {} ({:.1}%)\n\n",
        dim,
        reset,
        fold_map.stats.total_lines,
        dim,
        reset,
        fold_map.stats.foldable_lines,
        if fold_map.stats.total_lines > 0 {
            (fold_map.stats.foldable_lines as f64 / fold_map.stats.total_lines as f64) * 100.0
        } else {
            0.0
        }
    ));

    output.push_str(&format!(
        "{}Total Folds:{} {}\n\
         {}  Keywords:{} {} | {}Braces:{} {} | {}Comments:{} {}\n\
         {}  Widgets:{} {} start, {} end\n\n",
        dim,
        reset,
        fold_map.stats.total_folds,
        dim,
        reset,
        fold_map.stats.keyword_folds,
        dim,
        reset,
        fold_map.stats.brace_folds,
        dim,
        reset,
        fold_map.stats.comment_folds,
        dim,
        reset,
        fold_map.stats.start_widgets,
        fold_map.stats.end_widgets
    ));

    let mut files_by_folds: Vec<_> = fold_map
        .files
        .iter()
        .filter(|f| !f.folds.is_empty())
        .collect();
    files_by_folds.sort_by(|a, b| b.folds.len().cmp(&a.folds.len()));

    if !files_by_folds.is_empty() {
        output.push_str(&format!("{}Top files by folds:{}\n", dim, reset));
        for file in files_by_folds.iter().take(5) {
            output.push_str(&format!(
                "  {}{}{} ({}{} folds{}, {} lines)\n",
                yellow,
                file.path.display(),
                reset,
                cyan,
                file.folds.len(),
                reset,
                file.line_count
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{}Scan:{} {}ms ({:.2} files/sec)\n",
        dim, reset, fold_map.metadata.scan_duration_ms, fold_map.metadata.files_per_second,
    ));

    output
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
