//! SVG renderer: converts a chart's `RenderCommand` list into a standalone
//! SVG document. Bars carry their elapsed time as a `<title>` tooltip.

use std::fmt::Write;

use tracetree_protocol::{RenderCommand, TextAlign, ThemeToken};

use crate::config::ChartConfig;
use crate::views::chart::{Chart, render_commands};

/// Render a chart as an SVG document string.
pub fn render_svg(chart: &Chart, config: &ChartConfig, dark: bool) -> String {
    let commands = render_commands(chart, config);
    svg_document(
        &commands,
        chart.width_px(config),
        chart.height_px(config),
        dark,
    )
}

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
pub fn svg_document(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, dark),
    );

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                row,
                tooltip,
            } => {
                let fill = resolve_color(*color, dark);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}""#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(bc) = border_color {
                    let _ = write!(svg, r#" stroke="{}""#, resolve_color(*bc, dark));
                }
                if let Some(row) = row {
                    let _ = write!(svg, r#" data-row="{row}""#);
                }
                svg.push('>');
                if let Some(tooltip) = tooltip {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(tooltip));
                }
                svg.push_str("</rect>");
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                );
            }
            RenderCommand::BeginGroup { id, .. } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::Border | ThemeToken::PanelBorder => "#303030",
            ThemeToken::RowEven => "#1e1e2e",
            ThemeToken::RowOdd => "#181825",
            ThemeToken::LabelText | ThemeToken::PanelText | ThemeToken::HeaderText => "#ececec",
            ThemeToken::BarFill => "#448aff",
            ThemeToken::BarBorder => "#2962ff",
            ThemeToken::BarText => "#ffffff",
            ThemeToken::PanelBackground | ThemeToken::HeaderBackground => "#313244",
            ThemeToken::PanelKey | ThemeToken::TextMuted => "#9e9e9e",
            ThemeToken::ErrorText => "#f44336",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::Border | ThemeToken::PanelBorder => "#dee2e6",
            ThemeToken::RowEven => "#f8f9fa",
            ThemeToken::RowOdd => "#eef0f2",
            ThemeToken::LabelText | ThemeToken::PanelText | ThemeToken::HeaderText => "#1a1a2e",
            ThemeToken::BarFill => "#457b9d",
            ThemeToken::BarBorder => "#1d3557",
            ThemeToken::BarText => "#ffffff",
            ThemeToken::PanelBackground | ThemeToken::HeaderBackground => "#e9ecef",
            ThemeToken::PanelKey | ThemeToken::TextMuted => "#666677",
            ThemeToken::ErrorText => "#e63946",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessNode;
    use crate::model::process::from_epoch_millis;
    use crate::views::chart::render_chart;

    fn chart(argv0: &str) -> Chart {
        let tree = ProcessNode {
            pid: 1,
            cmdline: vec![argv0.to_string()],
            started: from_epoch_millis(0.0).expect("timestamp in range"),
            ended: from_epoch_millis(1234.0).expect("timestamp in range"),
            children: vec![],
        };
        render_chart(&tree, 400.0).expect("chart")
    }

    #[test]
    fn basic_svg_output() {
        let svg = render_svg(&chart("/usr/bin/make"), &ChartConfig::default(), true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">make</text>"));
        assert!(svg.contains("<title>1.234s</title>"));
        assert!(svg.contains(r#"data-row="0""#));
        assert!(svg.contains("#448aff"));
    }

    #[test]
    fn escapes_xml_entities() {
        let svg = render_svg(&chart("a<b>&c"), &ChartConfig::default(), false);
        assert!(svg.contains("a&lt;b&gt;&amp;c"));
    }

    #[test]
    fn viewbox_covers_labels_and_bars() {
        let cfg = ChartConfig::default();
        let svg = render_svg(&chart("x"), &cfg, true);
        let expected = format!(
            r#"viewBox="0 0 {} {}""#,
            cfg.label_width_px + 400.0,
            cfg.row_height_px
        );
        assert!(svg.contains(&expected));
    }
}
