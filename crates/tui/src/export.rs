use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracetree_core::svg::render_svg;
use tracetree_core::views::text_tree::render_text_tree;
use tracetree_core::{ChartConfig, ProcessNode, render_chart};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Interactive terminal chart
    Tui,
    /// Standalone SVG chart
    Svg,
    /// Indented process tree
    Text,
    /// Laid-out chart as JSON
    Json,
}

/// Settings for the non-interactive formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Bar column width in pixels.
    pub width: f64,
    /// Use the light SVG palette.
    pub light: bool,
}

/// Write `tree` in one of the non-interactive formats.
pub fn export(
    format: Format,
    tree: &ProcessNode,
    options: ExportOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let width = options.width;
    match format {
        Format::Tui => anyhow::bail!("the terminal viewer is not an export format"),
        Format::Text => out.write_all(render_text_tree(tree).as_bytes())?,
        Format::Svg => {
            let chart = render_chart(tree, width)?;
            let svg = render_svg(&chart, &ChartConfig::default(), !options.light);
            out.write_all(svg.as_bytes())?;
        }
        Format::Json => {
            let chart = render_chart(tree, width)?;
            serde_json::to_writer_pretty(&mut *out, &chart).context("failed to encode chart")?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}
