//! Output formatting for the command line.

use blockdeck_core::BodyBlock;
use blockdeck_slides::{GalleryCard, PageKind, SlidePage};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Readable page-by-page listing
    #[default]
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: json, human",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Human => write!(f, "human"),
        }
    }
}

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// Structured JSON lines on stderr
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Unknown log format '{}'. Valid options: human, json",
                s
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Formatter for pages, cards and other command results
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Pretty JSON for any serializable result
    pub fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    pub fn pages(pages: &[SlidePage], format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::json(pages),
            OutputFormat::Human => Self::pages_human(pages),
        }
    }

    pub fn cards(cards: &[GalleryCard], format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::json(cards),
            OutputFormat::Human => Self::cards_human(cards),
        }
    }

    fn pages_human(pages: &[SlidePage]) -> String {
        let mut output = String::new();
        for (number, page) in pages.iter().enumerate() {
            let kind = match page.kind {
                PageKind::Text => "text",
                PageKind::Image => "image",
            };
            let branch = if page.selection.has_image() {
                "with image"
            } else {
                "without image"
            };
            let _ = writeln!(
                output,
                "--- Page {} (row {}, {}, {}) ---",
                number + 1,
                page.row_index + 1,
                kind,
                branch
            );
            Self::write_title(&mut output, &page.title);
            Self::write_blocks(&mut output, &page.blocks);
            output.push('\n');
        }
        if output.is_empty() {
            output.push_str("No pages\n");
        }
        output
    }

    fn cards_human(cards: &[GalleryCard]) -> String {
        let mut output = String::new();
        for card in cards {
            let _ = writeln!(output, "--- Card {} ---", card.row_index + 1);
            if let Some(cover) = &card.cover {
                let _ = writeln!(output, "Cover: {}", cover);
            }
            Self::write_title(&mut output, &card.title);
            Self::write_blocks(&mut output, &card.blocks);
            output.push('\n');
        }
        if output.is_empty() {
            output.push_str("No cards\n");
        }
        output
    }

    /// Title and body of a single resolved row
    pub fn content(title: &str, blocks: &[BodyBlock]) -> String {
        let mut output = String::new();
        Self::write_title(&mut output, title);
        Self::write_blocks(&mut output, blocks);
        output
    }

    fn write_title(output: &mut String, title: &str) {
        if !title.is_empty() {
            let _ = writeln!(output, "# {}", title);
        }
    }

    fn write_blocks(output: &mut String, blocks: &[BodyBlock]) {
        for block in blocks {
            match block {
                BodyBlock::Text { text } => {
                    let _ = writeln!(output, "  {}", text);
                }
                BodyBlock::Image { markdown } => {
                    let _ = writeln!(output, "  [image] {}", markdown);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_content_human() {
        let text = ResponseFormatter::content(
            "Alpha",
            &[BodyBlock::text("Intro"), BodyBlock::image("![[a.png]]")],
        );
        assert_eq!(text, "# Alpha\n  Intro\n  [image] ![[a.png]]\n");
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(
            ResponseFormatter::pages(&[], OutputFormat::Human),
            "No pages\n"
        );
        assert_eq!(ResponseFormatter::cards(&[], OutputFormat::Json), "[]");
    }
}
