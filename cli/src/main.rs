//! unslide CLI - PowerPoint slide rendering tool
//!
//! A command-line tool for rendering PPTX slides to PNG images and for
//! inspecting their render trees.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use unslide::render::{to_json, JsonFormat, Quality, Rasterizer, RenderOptions, SurfaceOrigin};
use unslide::Presentation;

/// PowerPoint slides to PNG, without an office suite
#[derive(Parser)]
#[command(
    name = "unslide",
    author = "iyulab",
    version,
    about = "Render PowerPoint slides to images",
    long_about = "unslide - Render PPTX slides to raster images.\n\n\
                  Parses slide XML, builds a render tree and rasterizes it to PNG."
)]
struct Cli {
    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render slides to PNG files
    Render {
        /// Input file path
        input: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Slides to render, 1-based (e.g. "1,3-5"; default: all)
        #[arg(short, long)]
        slides: Option<String>,

        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Device scale multiplier
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Rendering quality
        #[arg(long, default_value = "balanced")]
        quality: QualityMode,
    },

    /// Print the render tree of a slide as JSON
    Tree {
        /// Input file path
        input: PathBuf,

        /// Slide number, 1-based
        #[arg(short, long, default_value = "1")]
        slide: usize,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show presentation information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Rendering quality tier
#[derive(Clone, ValueEnum)]
enum QualityMode {
    /// Flat fills, no effects
    Low,
    /// Gradients, shadows and anti-aliasing
    Balanced,
    /// Balanced plus bicubic image filtering
    High,
}

impl From<QualityMode> for Quality {
    fn from(mode: QualityMode) -> Self {
        match mode {
            QualityMode::Low => Quality::Low,
            QualityMode::Balanced => Quality::Balanced,
            QualityMode::High => Quality::High,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Render {
            input,
            output,
            slides,
            width,
            height,
            scale,
            quality,
        } => {
            let presentation = Presentation::open(&input)?;
            let selected = match slides {
                Some(spec) => parse_slide_selection(&spec, presentation.slide_count())?,
                None => (0..presentation.slide_count()).collect(),
            };

            let mut options = RenderOptions::new()
                .with_device_scale(scale)
                .with_quality(quality.into())
                .with_origin(SurfaceOrigin::TopLeft);
            if let Some(width) = width {
                options = options.with_width(width);
            }
            if let Some(height) = height {
                options = options.with_height(height);
            }

            fs::create_dir_all(&output)?;
            let stem = input
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();

            let pb = create_spinner("Loading fonts...");
            let rasterizer = Rasterizer::new();
            pb.finish_and_clear();

            let pb = create_progress(selected.len() as u64);
            for index in &selected {
                pb.set_message(format!("Slide {}", index + 1));
                let bitmap = presentation.render_slide(*index, &rasterizer, &options)?;
                let path = output.join(format!("{}-{}.png", stem, index + 1));
                bitmap.save_png(&path)?;
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!(
                "{} Rendered {} slide(s) to {}",
                "✓".green().bold(),
                selected.len(),
                output.display()
            );
        }

        Commands::Tree {
            input,
            slide,
            output,
            compact,
        } => {
            let pb = create_spinner("Building render tree...");

            let presentation = Presentation::open(&input)?;
            let index = slide_index(slide, presentation.slide_count())?;
            let elements = presentation.render_elements(index)?;

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = to_json(&elements, format)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &json)?;

            if let Some(path) = output {
                println!("{} Render tree written: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing presentation...");
            let presentation = Presentation::open(&input)?;
            pb.finish_and_clear();

            let size = presentation.slide_size();
            let (cx, cy) = presentation.slide_size_emu();

            println!("{}", "Presentation Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Slides".bold(), presentation.slide_count());
            println!(
                "{}: {:.1} x {:.1} pt ({} x {} EMU)",
                "Slide size".bold(),
                size.width,
                size.height,
                cx,
                cy
            );
            match presentation.theme() {
                Some(theme) => {
                    println!(
                        "{}: {}",
                        "Theme".bold(),
                        theme.name.as_deref().unwrap_or("(unnamed)")
                    );
                    if let Some(font) = &theme.major_font {
                        println!("{}: {}", "Heading font".bold(), font);
                    }
                    if let Some(font) = &theme.minor_font {
                        println!("{}: {}", "Body font".bold(), font);
                    }
                }
                None => println!("{}: {}", "Theme".bold(), "none".dimmed()),
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "unslide".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Render PowerPoint slides to raster images");
    println!();
    println!("Supported formats: PPTX");
    println!("Repository: https://github.com/iyulab/unslide");
}

/// Zero-based index of a 1-based slide number.
fn slide_index(number: usize, count: usize) -> Result<usize, String> {
    if number == 0 || number > count {
        return Err(format!("slide {number} out of range (1-{count})"));
    }
    Ok(number - 1)
}

/// Parse "1,3-5" into zero-based indices, in the given order.
fn parse_slide_selection(spec: &str, count: usize) -> Result<Vec<usize>, String> {
    let mut indices = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid slide number: {s}"))
        };
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("invalid slide range: {part}"));
                }
                for number in start..=end {
                    indices.push(slide_index(number, count)?);
                }
            }
            None => indices.push(slide_index(parse(part)?, count)?),
        }
    }
    Ok(indices)
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:30.blue} {pos}/{len} {msg}")
            .unwrap(),
    );
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_slide_selection() {
        assert_eq!(parse_slide_selection("1,3-4", 5), Ok(vec![0, 2, 3]));
        assert!(parse_slide_selection("6", 5).is_err());
        assert!(parse_slide_selection("4-2", 5).is_err());
        assert!(parse_slide_selection("x", 5).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::try_parse_from(["unslide", "--log-level", "debug", "version"]).unwrap();
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }
}
