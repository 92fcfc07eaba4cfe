use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use phpfold_core::{
    format_output, render_file, render_file_ansi, FoldMode, FoldScanner, FoldStyle, MixedFoldMode,
    OutputFormat, ScanConfig, Session,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "phpfold")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fold-region analysis for PHP projects")]
#[command(long_about = "Computes foldable code regions for PHP sources, including PHP embedded in \
    mixed HTML/JS/CSS documents. Understands PHP's alternative block syntax:\n\n\
    - if/elseif/else blocks closed by endif\n\
    - while/for/foreach/switch blocks closed by their end* keyword\n\
    - Brace-delimited blocks and /* */ comments as a fallback\n\n\
    Rows inside <script> and <style> regions fold by brace matching; rows inside \
    PHP regions fold by keyword matching first.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Which fold markers to surface
    #[arg(long, value_enum, default_value_t = FoldStyleArg::Markbegin)]
    pub fold_style: FoldStyleArg,

    /// Additional ignore patterns (gitignore style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Include vendor / node_modules in scan
    #[arg(long)]
    pub include_deps: bool,

    /// Disable colors in ANSI output
    #[arg(long)]
    pub no_color: bool,

    /// Show verbose progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a single file with folds collapsed
    Render {
        /// File to render
        file: PathBuf,

        /// Output with ANSI colors
        #[arg(long)]
        ansi: bool,
    },

    /// List all foldable regions in a file
    List {
        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
        format: OutputFormatArg,
    },

    /// Query the fold widget and range of a single row
    Query {
        /// File to analyze
        file: PathBuf,

        /// Row number (0-based)
        row: usize,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
    Ansi,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
        }
    }
}

#[derive(ValueEnum, Clone, Debug, Default)]
pub enum FoldStyleArg {
    Manual,
    #[default]
    Markbegin,
    Markbeginend,
}

impl From<FoldStyleArg> for FoldStyle {
    fn from(arg: FoldStyleArg) -> Self {
        match arg {
            FoldStyleArg::Manual => FoldStyle::Manual,
            FoldStyleArg::Markbegin => FoldStyle::MarkBegin,
            FoldStyleArg::Markbeginend => FoldStyle::MarkBeginEnd,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match &args.command {
        Some(Commands::Render { file, ansi }) => run_render(file.clone(), *ansi, &args),
        Some(Commands::List { file, format }) => run_list(file.clone(), format.clone(), &args),
        Some(Commands::Query { file, row }) => run_query(file.clone(), *row, &args),
        None => run_scan(&args),
    }
}

fn build_config(args: &Args) -> anyhow::Result<ScanConfig> {
    let mut config = ScanConfig::load(args.path.clone())?
        .with_fold_style(args.fold_style.clone().into())
        .with_include_deps(args.include_deps)
        .with_threads(args.threads);

    // Command-line patterns extend whatever .phpfold.toml set
    if !args.ignore.is_empty() {
        let mut patterns = config.ignore_patterns.clone();
        patterns.extend(args.ignore.iter().cloned());
        config = config.with_ignore_patterns(patterns);
    }
    if let Some(ref ignore_file) = args.ignore_file {
        config = config.with_ignore_file(ignore_file.clone());
    }

    Ok(config)
}

fn run_scan(args: &Args) -> anyhow::Result<()> {
    let config = build_config(args)?;

    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning project...");
        Some(pb)
    } else {
        None
    };

    let scanner = FoldScanner::new(config)?;
    let result = scanner.scan()?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            result.stats.total_files, result.metadata.scan_duration_ms
        ));
    }

    let format: OutputFormat = args.format.clone().into();
    let format = if format == OutputFormat::Ansi && args.no_color {
        OutputFormat::Summary
    } else {
        format
    };
    let output = format_output(&result, format)?;

    if let Some(ref path) = args.output {
        fs::write(path, &output)?;
        if args.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn run_render(file: PathBuf, ansi: bool, args: &Args) -> anyhow::Result<()> {
    let config = ScanConfig::default().with_fold_style(args.fold_style.clone().into());

    let rendered = if ansi || (atty::is(atty::Stream::Stdout) && !args.no_color) {
        render_file_ansi(&file, &config)?
    } else {
        render_file(&file, &config)?
    };

    println!("{}", rendered.content);

    if args.verbose {
        eprintln!(
            "\n--- {} folds applied, {} lines hidden ---",
            rendered.fold_count, rendered.lines_hidden
        );
    }

    Ok(())
}

fn run_list(file: PathBuf, format: OutputFormatArg, args: &Args) -> anyhow::Result<()> {
    let config = ScanConfig::default().with_fold_style(args.fold_style.clone().into());

    let scanner = FoldScanner::new(config)?;
    let source_file = scanner.scan_file(&file)?;

    let output = match format {
        OutputFormatArg::Json => serde_json::to_string_pretty(&source_file)?,
        OutputFormatArg::Yaml => serde_yaml::to_string(&source_file)?,
        OutputFormatArg::Summary | OutputFormatArg::Ansi => {
            let mut out = String::new();
            out.push_str(&format!(
                "File: {}\nLine Count: {}\nFolds: {}\n\n",
                source_file.path.display(),
                source_file.line_count,
                source_file.folds.len()
            ));

            for (i, fold) in source_file.folds.iter().enumerate() {
                out.push_str(&format!(
                    "{}. {} {} (rows {}-{}, {} lines)\n",
                    i + 1,
                    fold.kind.as_str(),
                    fold.widget.as_str(),
                    fold.range.start_row,
                    fold.range.end_row,
                    fold.line_count
                ));
            }

            out
        }
    };

    println!("{}", output);
    Ok(())
}

fn run_query(file: PathBuf, row: usize, args: &Args) -> anyhow::Result<()> {
    let content = fs::read_to_string(&file)?;
    let session = Session::from_source(&content);
    let mode = MixedFoldMode::php();
    let fold_style: FoldStyle = args.fold_style.clone().into();

    let widget = mode.fold_widget(&session, fold_style, row);
    let range = mode.fold_widget_range(&session, fold_style, row);

    let output = serde_json::json!({
        "row": row,
        "widget": widget,
        "range": range,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
