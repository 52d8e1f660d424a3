//! Command-line interface for the `markstyle` binary
//!
//! Loads a markdown file, styles it through the coordinator and reports the
//! resulting attribute runs.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;

use crate::attributes::{Attributes, StyledSpan};
use crate::config::EngineConfig;
use crate::coordinator::StylingStats;
use crate::storage::{AttributedText, TextStorage};
use crate::style::{FontFamily, FontWeight};

/// Style a markdown file and print its attribute runs
#[derive(Parser, Debug)]
#[command(name = "markstyle", version, about = "Incremental markdown styling inspector")]
pub struct CliArgs {
    /// Markdown file to style
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Style profile id (overrides the config file)
    #[arg(long, value_name = "ID")]
    pub profile: Option<String>,

    /// Config file to use instead of ~/.config/markstyle/config.yaml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Lines per chunk for progressive styling
    #[arg(long, value_name = "N")]
    pub chunk_lines: Option<usize>,

    /// Documents at least this many code units long are styled in chunks
    #[arg(long, value_name = "N")]
    pub threshold: Option<usize>,

    /// Font file used for sans-serif line metrics
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Print spans as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything `main` needs after argument and config resolution
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub file: PathBuf,
    pub engine: EngineConfig,
    pub font: Option<PathBuf>,
    pub json: bool,
}

impl CliArgs {
    /// Resolve the config file and apply command-line overrides
    pub fn into_config(self) -> anyhow::Result<RunConfig> {
        let mut engine = match &self.config {
            Some(path) => EngineConfig::load_from(path)?,
            None => EngineConfig::load(),
        };

        if let Some(profile) = self.profile {
            engine.style = profile;
        }
        if let Some(lines) = self.chunk_lines {
            if lines == 0 {
                bail!("--chunk-lines must be at least 1");
            }
            engine.scheduling.lines_per_chunk = lines;
        }
        if let Some(threshold) = self.threshold {
            engine.scheduling.chunk_threshold = threshold;
        }

        Ok(RunConfig {
            file: self.file,
            engine,
            font: self.font,
            json: self.json,
        })
    }
}

#[derive(Debug, Serialize)]
struct SpanReport<'a> {
    start: usize,
    end: usize,
    text: String,
    attributes: &'a Attributes,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    stats: StylingStats,
    spans: Vec<SpanReport<'a>>,
}

/// Format the styled runs of `storage`, one per line or as JSON
pub fn report(storage: &AttributedText, stats: StylingStats, json: bool) -> anyhow::Result<String> {
    let runs = storage.runs();
    if json {
        let spans = runs
            .iter()
            .map(|run| SpanReport {
                start: run.range.start,
                end: run.range.end,
                text: storage.text_in(run.range.clone()).unwrap_or_default(),
                attributes: &run.attributes,
            })
            .collect();
        return serde_json::to_string_pretty(&Report { stats, spans })
            .context("Failed to serialize spans");
    }

    let mut out = String::new();
    for run in &runs {
        let text = storage.text_in(run.range.clone()).unwrap_or_default();
        out.push_str(&format!(
            "{:>6}..{:<6} {:<40} {:?}\n",
            run.range.start,
            run.range.end,
            summarize(run),
            text
        ));
    }
    out.push_str(&format!(
        "{} runs, {} full passes, {} chunks\n",
        runs.len(),
        stats.full_passes,
        stats.chunks_applied
    ));
    Ok(out)
}

/// Compact one-column description of a run's attributes
fn summarize(span: &StyledSpan) -> String {
    let attrs = &span.attributes;
    let mut parts = Vec::new();
    if let Some(font) = attrs.font {
        let family = match font.family {
            FontFamily::SansSerif => "sans",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "mono",
        };
        let mut desc = format!("{}{}", family, font.size);
        if font.weight == FontWeight::Bold {
            desc.push_str(" bold");
        }
        if font.italic {
            desc.push_str(" italic");
        }
        parts.push(desc);
    }
    if let Some(color) = attrs.foreground {
        parts.push(color.to_hex());
    }
    if let Some(color) = attrs.background {
        parts.push(format!("bg:{}", color.to_hex()));
    }
    if let Some(para) = attrs.paragraph {
        if para.head_indent > 0.0 {
            parts.push(format!("indent:{}", para.head_indent));
        }
    }
    if attrs.underline.is_some() {
        parts.push("underline".to_string());
    }
    if attrs.link.is_some() {
        parts.push("link".to_string());
    }
    parts.join(" ")
}
