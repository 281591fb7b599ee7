use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracetree_core::PanelState;
use tracetree_core::views::chart::bar_rect;
use tracetree_protocol::ThemeToken;

use crate::app::{App, LABEL_COLUMNS, Status};

const BAR_CHAR: char = '█';

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background | ThemeToken::RowEven | ThemeToken::PanelBackground => Color::Black,
        ThemeToken::RowOdd => Color::Rgb(20, 20, 28),
        ThemeToken::Border | ThemeToken::PanelBorder => Color::DarkGray,
        ThemeToken::LabelText | ThemeToken::PanelText | ThemeToken::HeaderText => Color::White,
        ThemeToken::BarFill => Color::Rgb(68, 138, 255),
        ThemeToken::BarBorder => Color::Blue,
        ThemeToken::BarText => Color::White,
        ThemeToken::PanelKey | ThemeToken::TextMuted => Color::Gray,
        ThemeToken::HeaderBackground => Color::DarkGray,
        ThemeToken::ErrorText => Color::LightRed,
    }
}

fn style(fg: ThemeToken, bg: ThemeToken) -> Style {
    Style::default()
        .fg(theme_to_color(fg))
        .bg(theme_to_color(bg))
}

/// Run the interactive viewer until the user quits.
pub fn run(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        let size = terminal.size()?;
        app.resize(size.width, size.height);
        app.poll_loads();
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
    Ok(())
}

/// Draw one frame: header, visible chart rows, the detail panel and the
/// status line.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.height == 0 || area.width == 0 {
        return;
    }

    let header_area = Rect::new(0, 0, area.width, 1);
    let header = Paragraph::new(format!(
        " tracetree | {} processes | ↑↓ scroll | click bar for details | d demo | r reload | q quit ",
        app.surface().rows().len()
    ))
    .style(style(ThemeToken::HeaderText, ThemeToken::HeaderBackground));
    frame.render_widget(header, header_area);

    let chart_area = Rect::new(0, 1, area.width, area.height.saturating_sub(2));
    frame.render_widget(
        Block::default().style(style(ThemeToken::LabelText, ThemeToken::Background)),
        chart_area,
    );
    draw_rows(frame, app, chart_area);
    draw_panel(frame, app, chart_area);

    if area.height >= 2 {
        let status_area = Rect::new(0, area.height - 1, area.width, 1);
        let (text, fg) = match app.status() {
            Status::Idle => (
                "no profile loaded: press d for the demo".to_string(),
                ThemeToken::TextMuted,
            ),
            Status::Loading(source) => (format!("loading {source}…"), ThemeToken::TextMuted),
            Status::Showing(source) => (source.clone(), ThemeToken::TextMuted),
            Status::Failed(message) => (message.clone(), ThemeToken::ErrorText),
        };
        frame.render_widget(
            Paragraph::new(format!(" {text}"))
                .style(style(fg, ThemeToken::HeaderBackground)),
            status_area,
        );
    }
}

fn draw_rows(frame: &mut Frame, app: &App, area: Rect) {
    let surface = app.surface();
    let config = surface.config();
    let label_width = usize::from(LABEL_COLUMNS.saturating_sub(1));
    let buf = frame.buffer_mut();

    for (line, row) in surface
        .rows()
        .iter()
        .skip(app.scroll())
        .take(usize::from(area.height))
        .enumerate()
    {
        let y = area.y + line as u16;
        let bg = if row.index % 2 == 0 {
            ThemeToken::RowEven
        } else {
            ThemeToken::RowOdd
        };
        let row_style = style(ThemeToken::LabelText, bg);
        buf.set_style(Rect::new(area.x, y, area.width, 1), row_style);

        let label: String = row.label.chars().take(label_width).collect();
        buf.set_string(area.x, y, label, row_style);

        // A cell belongs to the bar when its centre does, matching the click
        // hit-test in `App::cell_to_point`.
        let rect = bar_rect(row, config);
        // Bars starting before the root are clipped at the label column.
        let first = (rect.x - 0.5).ceil().max(config.label_width_px) as u16;
        let end = ((rect.x + rect.w - 0.5).ceil().max(0.0) as u16).min(area.width);
        if first >= end {
            continue;
        }
        let bar_style = style(ThemeToken::BarFill, bg);
        for x in first..end {
            buf[(area.x + x, y)].set_char(BAR_CHAR).set_style(bar_style);
        }

        let cells = usize::from(end - first);
        let tooltip = &row.bar.tooltip;
        if tooltip.chars().count() + 2 <= cells {
            let text_style = Style::default()
                .fg(theme_to_color(ThemeToken::BarText))
                .bg(theme_to_color(ThemeToken::BarFill));
            buf.set_string(area.x + first + 1, y, tooltip, text_style);
        }
    }
}

fn draw_panel(frame: &mut Frame, app: &App, area: Rect) {
    let PanelState::Visible { content, .. } = app.surface().panel() else {
        return;
    };
    let Some((column, row)) = app.panel_cell() else {
        return;
    };

    let fields = content.panel_fields();
    let key_width = fields.iter().map(|f| f.key.len()).max().unwrap_or(0);
    let lines: Vec<Line> = fields
        .iter()
        .map(|f| {
            Line::from(vec![
                Span::styled(
                    format!("{:<key_width$} ", f.key),
                    Style::default()
                        .fg(theme_to_color(ThemeToken::PanelKey))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    f.value.clone(),
                    Style::default().fg(theme_to_color(ThemeToken::PanelText)),
                ),
            ])
        })
        .collect();

    let content_width = lines.iter().map(Line::width).max().unwrap_or(0);
    let width = (content_width as u16).saturating_add(2).min(area.width);
    let height = (lines.len() as u16).saturating_add(2).min(area.height);

    // Open below-right of the click, shifted back inside the chart area.
    let x = (area.x + column + 1).min(area.x + area.width - width);
    let y = (row + 1).min(area.y + area.height - height).max(area.y);
    let popup = Rect::new(x, y, width, height);

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" pid {} ", content.row.pid))
                .border_style(Style::default().fg(theme_to_color(ThemeToken::PanelBorder)))
                .style(Style::default().bg(theme_to_color(ThemeToken::PanelBackground))),
        ),
        popup,
    );
}
