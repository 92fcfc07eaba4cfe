mod renderer;
mod scanner;

pub use renderer::{render_file, render_file_ansi, Renderer};
pub use scanner::{FoldScanner, ScanError};
