//! # Lamicoid CLI
//!
//! ```bash
//! # SVG drawing of a two-line label
//! lamicoid drawing --text "ROOM 12" --text "Server" --width 100mm --height 1in
//!
//! # Settings document for the configured presets
//! lamicoid settings --job "Door 12"
//!
//! # Generate the print file and send it to the engraver
//! lamicoid print --text "ROOM 12" --variable asset --set asset=P-0042 --ip 10.0.0.5
//!
//! # Engine library version
//! lamicoid engine-version
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use lamicoid::communication::{EpilogEngine, JobDriver};
use lamicoid::designer::{
    Canvas, DrawingOptions, HorizontalAlign, OutlineBoundary, SystemFonts, TextStyle,
    VariableValues, VerticalAlign,
};
use lamicoid::settings::Config;
use lamicoid::{init_logging, stacked_label, LabelRow, MeasurementSystem, Pipeline};
use lamicoid_core::units::parse_length;

/// Lamicoid - label designer and Epilog laser job pipeline
#[derive(Parser, Debug)]
#[command(name = "lamicoid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the SVG drawing of a label
    Drawing {
        #[command(flatten)]
        label: LabelArgs,

        /// Output file (stdout when omitted)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Write the JSON settings document
    Settings {
        /// Job name
        #[arg(long, default_value = "Lamicoid")]
        job: String,

        /// Output file (stdout when omitted)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Generate the print file and send it to the engraver
    Print {
        #[command(flatten)]
        label: LabelArgs,

        /// Engraver IP address (overrides the configuration)
        #[arg(long)]
        ip: Option<String>,

        /// Device model (overrides the configuration)
        #[arg(long)]
        model: Option<String>,

        /// Font file passed to the engine, repeatable
        #[arg(long = "engine-font", value_name = "FILE")]
        engine_fonts: Vec<PathBuf>,

        /// Write the print file here instead of sending it
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Print the engine library version
    EngineVersion,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Outline {
    /// Cut along the content rectangle
    Content,
    /// Cut along the plate edge
    Plate,
}

#[derive(Args, Debug)]
struct LabelArgs {
    /// Job and template name
    #[arg(long, default_value = "Lamicoid")]
    job: String,

    /// Text row, repeatable
    #[arg(long)]
    text: Vec<String>,

    /// Variable row `NAME` or `NAME=DEFAULT`, repeatable
    #[arg(long)]
    variable: Vec<String>,

    /// Variable value `NAME=VALUE`, repeatable
    #[arg(long = "set")]
    values: Vec<String>,

    /// Plate width, e.g. `100`, `100mm`, `4in`, `3 1/2in`
    #[arg(long)]
    width: Option<String>,

    #[arg(long)]
    height: Option<String>,

    #[arg(long)]
    margin: Option<String>,

    #[arg(long)]
    radius: Option<String>,

    #[arg(long)]
    grid: Option<String>,

    #[arg(long, default_value = "Arial")]
    font: String,

    /// Font size in points
    #[arg(long, default_value_t = 12.0)]
    size: f64,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    underline: bool,

    #[arg(long, default_value = "center")]
    align: HorizontalAlign,

    #[arg(long, default_value = "center")]
    valign: VerticalAlign,

    /// Extra font file to search, repeatable
    #[arg(long = "font-file", value_name = "FILE")]
    font_files: Vec<PathBuf>,

    /// Boundary the cut outline traces
    #[arg(long, value_enum, default_value_t = Outline::Content)]
    outline: Outline,
}

fn split_pair(input: &str) -> (String, Option<String>) {
    match input.split_once('=') {
        Some((name, value)) => (name.trim().to_string(), Some(value.to_string())),
        None => (input.trim().to_string(), None),
    }
}

fn length(input: Option<&str>, fallback: f64, system: MeasurementSystem) -> anyhow::Result<f64> {
    match input {
        Some(text) => parse_length(text, system)
            .map_err(|e| anyhow::anyhow!("Invalid length '{}': {}", text, e)),
        None => Ok(fallback),
    }
}

impl LabelArgs {
    fn canvas(&self, config: &Config) -> anyhow::Result<Canvas> {
        let defaults = &config.canvas;
        let system = defaults.measurement_system;
        Ok(Canvas::new(
            length(self.width.as_deref(), defaults.width_mm, system)?,
            length(self.height.as_deref(), defaults.height_mm, system)?,
            length(self.radius.as_deref(), defaults.corner_radius_mm, system)?,
            length(self.margin.as_deref(), defaults.margin_mm, system)?,
            length(self.grid.as_deref(), defaults.grid_spacing_mm, system)?,
        ))
    }

    fn rows(&self) -> Vec<LabelRow> {
        let mut rows: Vec<LabelRow> = self.text.iter().cloned().map(LabelRow::Text).collect();
        for entry in &self.variable {
            let (name, default) = split_pair(entry);
            rows.push(LabelRow::Variable {
                name,
                default: default.unwrap_or_default(),
            });
        }
        rows
    }

    fn values(&self) -> anyhow::Result<VariableValues> {
        let mut values = VariableValues::new();
        for entry in &self.values {
            match split_pair(entry) {
                (name, Some(value)) if !name.is_empty() => {
                    values.insert(name, value);
                }
                _ => anyhow::bail!("Expected NAME=VALUE, got '{}'", entry),
            }
        }
        Ok(values)
    }

    fn style(&self) -> TextStyle {
        TextStyle {
            font_family: self.font.clone(),
            size_pt: self.size,
            bold: self.bold,
            underline: self.underline,
            h_align: self.align,
            v_align: self.valign,
            ..TextStyle::default()
        }
    }

    fn fonts(&self) -> anyhow::Result<SystemFonts> {
        let mut fonts = SystemFonts::new();
        for path in &self.font_files {
            fonts
                .load_font_file(path)
                .with_context(|| format!("Failed to load font {}", path.display()))?;
        }
        Ok(fonts)
    }

    fn options(&self) -> DrawingOptions {
        DrawingOptions {
            outline: match self.outline {
                Outline::Plate => OutlineBoundary::Plate,
                Outline::Content => OutlineBoundary::Content,
            },
            ..DrawingOptions::default()
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_or_default()?,
    };
    Ok(config)
}

fn write_output(path: Option<&Path>, content: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;

    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => std::io::stdout().write_all(content)?,
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    tracing::debug!(
        "lamicoid {} (built {})",
        lamicoid::VERSION,
        lamicoid::BUILD_DATE
    );

    match cli.command {
        Commands::Drawing { label, output } => {
            let fonts = label.fonts()?;
            let template = stacked_label(
                &label.job,
                label.canvas(&config)?,
                &label.rows(),
                &label.style(),
            );
            let svg = Pipeline::new(&config, &fonts)
                .with_options(label.options())
                .drawing(&template, &label.values()?)?;
            write_output(output.as_deref(), svg.as_bytes())?;
        }
        Commands::Settings { job, output } => {
            let fonts = SystemFonts::empty();
            let json = Pipeline::new(&config, &fonts).settings(&job)?;
            write_output(output.as_deref(), json.as_bytes())?;
        }
        Commands::Print {
            label,
            ip,
            model,
            engine_fonts,
            save,
        } => {
            if let Some(ip) = ip {
                config.laser.ip_address = ip;
            }
            if let Some(model) = model {
                config.laser.device_model = model;
            }
            config.validate()?;

            let engine_font_data = engine_fonts
                .iter()
                .map(|path| {
                    std::fs::read(path)
                        .with_context(|| format!("Failed to read font {}", path.display()))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            let fonts = label.fonts()?;
            let template = stacked_label(
                &label.job,
                label.canvas(&config)?,
                &label.rows(),
                &label.style(),
            );
            let engine =
                EpilogEngine::load_with_override(config.laser.engine_library.as_deref())?;
            let driver = JobDriver::new(engine);
            let pipeline = Pipeline::new(&config, &fonts).with_options(label.options());

            let print_file = pipeline
                .generate_async(&driver, &template, &label.values()?, &engine_font_data)
                .await?;

            match save {
                Some(path) => {
                    write_output(Some(&path), &print_file)?;
                    tracing::info!(
                        "Saved {} byte print file to {}",
                        print_file.len(),
                        path.display()
                    );
                }
                None => pipeline.dispatch(driver.engine(), &print_file)?,
            }
        }
        Commands::EngineVersion => {
            let engine =
                EpilogEngine::load_with_override(config.laser.engine_library.as_deref())?;
            let version = JobDriver::new(engine)
                .api_version()
                .context("Engine did not report a version")?;
            println!("{}", version);
        }
    }

    Ok(())
}
