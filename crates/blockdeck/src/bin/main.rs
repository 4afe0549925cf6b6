//! BlockDeck CLI

use anyhow::{Context, Result, anyhow};
use blockdeck::output::LogFormat;
use blockdeck::prelude::*;
use blockdeck_parser::detect_image_strict;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// BlockDeck - slide and gallery views for H2-block notes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format (json, human)
    #[arg(long, global = true, default_value = "human", env = "BLOCKDECK_FORMAT")]
    format: OutputFormat,

    /// Log format (human, json). Logs always go to stderr
    #[arg(long, global = true, default_value = "human", env = "BLOCKDECK_LOG_FORMAT")]
    log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RowsArgs {
    /// Rows JSON file (array of objects, or {"fields": [...], "rows": [...]})
    #[arg(short, long, env = "BLOCKDECK_ROWS")]
    rows: PathBuf,

    /// Field order, overriding the order found in the rows file
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,
}

impl RowsArgs {
    fn load(&self) -> Result<RowSet> {
        let set = RowSet::load(&self.rows)
            .with_context(|| format!("Failed to load rows from {}", self.rows.display()))?;
        if self.fields.is_empty() {
            Ok(set)
        } else {
            Ok(set.with_fields(self.fields.clone()))
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build slide pages for every row
    Pages {
        #[command(flatten)]
        input: RowsArgs,

        /// Template configuration (YAML or JSON)
        #[arg(short, long, env = "BLOCKDECK_CONFIG")]
        config: Option<PathBuf>,

        /// Override the configured mode (single, split)
        #[arg(short, long)]
        mode: Option<SlideMode>,
    },

    /// Build gallery cards for every row
    Gallery {
        #[command(flatten)]
        input: RowsArgs,

        /// Card title template (defaults to the first field)
        #[arg(long)]
        title: Option<String>,

        /// Card body template
        #[arg(long)]
        body: Option<String>,

        /// Field holding the cover image (defaults to the first image-like field)
        #[arg(long)]
        cover: Option<String>,
    },

    /// Render a title and body template against every row
    Render {
        #[command(flatten)]
        input: RowsArgs,

        /// Title template, e.g. "{name}"
        #[arg(long, default_value = "")]
        title: String,

        /// Body template; use \n for line breaks
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Detect and normalize image references
    Detect {
        /// Text to inspect
        #[arg(required = true)]
        texts: Vec<String>,

        /// Only accept text that is a single image reference
        #[arg(long, action = clap::ArgAction::SetTrue)]
        strict: bool,
    },

    /// Print the effective template configuration
    Config {
        /// Field order used to derive the base configuration
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Rows file to take the field order from
        #[arg(short, long, env = "BLOCKDECK_ROWS")]
        rows: Option<PathBuf>,

        /// Configuration to sanitize on top of the base configuration
        #[arg(short, long, env = "BLOCKDECK_CONFIG")]
        config: Option<PathBuf>,

        /// Override the mode
        #[arg(short, long)]
        mode: Option<SlideMode>,

        /// Write the effective configuration here (.json for JSON, YAML otherwise)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose)?;

    log::info!("BlockDeck v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Output format: {} | Log format: {}", cli.format, cli.log_format);

    let output = match cli.command {
        Command::Pages {
            input,
            config,
            mode,
        } => run_pages(&input, config.as_deref(), mode, cli.format)?,
        Command::Gallery {
            input,
            title,
            body,
            cover,
        } => run_gallery(&input, title, body, cover, cli.format)?,
        Command::Render { input, title, body } => run_render(&input, &title, &body, cli.format)?,
        Command::Detect { texts, strict } => run_detect(&texts, strict, cli.format),
        Command::Config {
            fields,
            rows,
            config,
            mode,
            output,
        } => run_config(
            fields,
            rows.as_deref(),
            config.as_deref(),
            mode,
            output.as_deref(),
            cli.format,
        )?,
    };

    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn init_logging(format: LogFormat, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    match format {
        LogFormat::Human => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .format_timestamp_millis()
                .target(env_logger::Target::Stderr)
                .try_init()
                .context("Failed to initialize logger")?;
        }
        LogFormat::Json => {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize JSON logger: {}", e))?;
        }
    }
    Ok(())
}

/// Base configuration for the fields, with an optional file sanitized on top
fn resolve_config(
    fields: &[String],
    reserved: &ReservedFields,
    path: Option<&Path>,
) -> Result<(SlideTemplateConfig, SanitizeReport)> {
    let defaults = SlideDefaults::from_fields(fields, reserved).base_config();
    let Some(path) = path else {
        return Ok((defaults, SanitizeReport::default()));
    };
    let (config, report) = SlideTemplateConfig::load(path, &defaults)
        .with_context(|| format!("Failed to load template configuration from {}", path.display()))?;
    if !report.is_clean() {
        log::info!(
            "Configuration {} needed {} corrections",
            path.display(),
            report.issues.len()
        );
    }
    Ok((config, report))
}

fn run_pages(
    input: &RowsArgs,
    config_path: Option<&Path>,
    mode: Option<SlideMode>,
    format: OutputFormat,
) -> Result<String> {
    let set = input.load()?;
    let reserved = ReservedFields::standard();
    let (mut config, _) = resolve_config(&set.fields, &reserved, config_path)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }

    let pages = build_slide_pages(&set.rows, &set.fields, &config, &reserved);
    log::info!(
        "{} rows -> {} pages ({} mode)",
        set.rows.len(),
        pages.len(),
        config.mode.as_str()
    );
    Ok(ResponseFormatter::pages(&pages, format))
}

fn run_gallery(
    input: &RowsArgs,
    title: Option<String>,
    body: Option<String>,
    cover: Option<String>,
    format: OutputFormat,
) -> Result<String> {
    let set = input.load()?;
    let reserved = ReservedFields::standard();
    let defaults = SlideDefaults::from_fields(&set.fields, &reserved);
    let mut template = GalleryTemplate::from_defaults(&defaults);
    if let Some(title) = title {
        template.text.title_template = unescape_newlines(&title);
    }
    if let Some(body) = body {
        template.text.body_template = unescape_newlines(&body);
    }
    if let Some(cover) = cover {
        template.cover = ImageSource::Field(cover);
    }

    let cards = build_gallery_cards(&set.rows, &set.fields, &template, &reserved);
    Ok(ResponseFormatter::cards(&cards, format))
}

fn run_render(input: &RowsArgs, title: &str, body: &str, format: OutputFormat) -> Result<String> {
    let set = input.load()?;
    let reserved = ReservedFields::standard();
    let template = TextTemplate::new(unescape_newlines(title), unescape_newlines(body));

    let resolved: Vec<ResolvedSlideContent> = set
        .rows
        .iter()
        .map(|row| {
            resolve_slide_content(&SlideContentRequest::new(
                row,
                &set.fields,
                &template,
                &reserved,
            ))
        })
        .collect();

    Ok(match format {
        OutputFormat::Json => ResponseFormatter::json(&resolved),
        OutputFormat::Human => resolved
            .iter()
            .enumerate()
            .map(|(index, content)| {
                format!(
                    "--- Row {} ---\n{}",
                    index + 1,
                    ResponseFormatter::content(&content.title, &content.blocks)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn run_detect(texts: &[String], strict: bool, format: OutputFormat) -> String {
    let results: Vec<_> = texts
        .iter()
        .map(|text| {
            let token = if strict {
                Some(text.trim().to_string())
            } else {
                extract_first_image_token(text)
            };
            let kind = token.as_deref().and_then(classify_image_token);
            let embed = if strict {
                detect_image_strict(text)
            } else {
                detect_image(text)
            };
            json!({
                "input": text,
                "token": if embed.is_some() { token } else { None },
                "kind": if embed.is_some() { kind } else { None },
                "embed": embed,
            })
        })
        .collect();

    match format {
        OutputFormat::Json => ResponseFormatter::json(&results),
        OutputFormat::Human => results
            .iter()
            .map(|r| match r["embed"].as_str() {
                Some(embed) => format!("{} -> {}", r["input"].as_str().unwrap_or_default(), embed),
                None => format!("{} -> (no image)", r["input"].as_str().unwrap_or_default()),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn run_config(
    fields: Vec<String>,
    rows: Option<&Path>,
    config_path: Option<&Path>,
    mode: Option<SlideMode>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let fields = match rows {
        Some(path) if fields.is_empty() => {
            RowSet::load(path)
                .with_context(|| format!("Failed to load rows from {}", path.display()))?
                .fields
        }
        _ => fields,
    };
    let reserved = ReservedFields::standard();
    let (mut config, report) = resolve_config(&fields, &reserved, config_path)?;
    if let Some(mode) = mode {
        config.mode = mode;
    }

    if let Some(path) = output {
        config
            .save(path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        log::info!("Configuration written to {}", path.display());
    }

    match format {
        OutputFormat::Json => Ok(ResponseFormatter::json(&json!({
            "config": config,
            "issues": report.issues,
        }))),
        OutputFormat::Human => {
            let mut text = serde_yaml::to_string(&serde_json::to_value(&config)?)
                .context("Failed to render configuration")?;
            for issue in &report.issues {
                let label = match issue.severity {
                    Severity::Info => "note",
                    Severity::Warning => "warning",
                };
                text.push_str(&format!("# {}: {}: {}\n", label, issue.path, issue.message));
            }
            Ok(text)
        }
    }
}

/// Turn literal `\n` sequences typed on the command line into line breaks
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
