//! Terminal rendering of charts
//!
//! Charts are drawn on the alternate screen and stay up until the user
//! presses `q` or `Esc`.

use std::io::{self, Stdout};
use std::time::Duration;

use is_terminal::IsTerminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols;
use ratatui::text::Line;
use ratatui::widgets::{
    Axis, BarChart, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Paragraph,
};
use ratatui::{Frame, Terminal};

use super::{ChartKind, ChartSpec};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Show the charts and block until dismissed.
///
/// Returns `false` without touching the terminal when stdout is not
/// interactive.
pub fn show_charts(charts: &[ChartSpec]) -> io::Result<bool> {
    if charts.iter().all(ChartSpec::is_empty) {
        return Ok(false);
    }
    if !io::stdout().is_terminal() {
        log::info!("stdout is not a terminal, skipping {} chart(s)", charts.len());
        return Ok(false);
    }

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, charts);
    restore_terminal(&mut terminal)?;
    result.map(|_| true)
}

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        disable_raw_mode()?;
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn run(terminal: &mut Term, charts: &[ChartSpec]) -> io::Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, charts))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    return Ok(());
                }
            }
        }
    }
}

/// Stack the charts vertically with a one-line hint at the bottom
pub fn draw(frame: &mut Frame, charts: &[ChartSpec]) {
    let mut constraints: Vec<Constraint> = charts
        .iter()
        .map(|_| Constraint::Ratio(1, charts.len() as u32))
        .collect();
    constraints.push(Constraint::Length(1));

    let areas = Layout::vertical(constraints).split(frame.area());
    for (chart, area) in charts.iter().zip(areas.iter()) {
        match chart.kind {
            ChartKind::Bar => draw_bar(frame, chart, *area),
            ChartKind::Line => draw_line(frame, chart, *area),
        }
    }

    let hint = Paragraph::new(Line::from("Press q or Esc to close").dim());
    frame.render_widget(hint, areas[areas.len() - 1]);
}

fn chart_block(chart: &ChartSpec) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(Line::from(chart.title.clone()).bold())
}

fn draw_bar(frame: &mut Frame, chart: &ChartSpec, area: Rect) {
    let data = chart.bar_data();
    // Fit all bars on screen, one column of gap between them
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / data.len().max(1)).saturating_sub(1).clamp(1, 12) as u16;

    let widget = BarChart::default()
        .block(chart_block(chart))
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .label_style(Style::default().add_modifier(Modifier::ITALIC));

    frame.render_widget(widget, area);
}

fn draw_line(frame: &mut Frame, chart: &ChartSpec, area: Rect) {
    let data = chart.line_data();
    let x_max = (data.len().saturating_sub(1)).max(1) as f64;
    let y_max = chart.max_value().max(1.0) * 1.1;

    let series = ChartDataset::default()
        .name(chart.y_label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&data);

    let x_labels: Vec<Line> = match (chart.points.first(), chart.points.last()) {
        (Some(first), Some(last)) if chart.points.len() > 1 => {
            vec![Line::from(first.0.clone()), Line::from(last.0.clone())]
        }
        (Some(only), _) => vec![Line::from(only.0.clone())],
        _ => Vec::new(),
    };
    let y_labels = vec![
        Line::from("0"),
        Line::from(format!("{:.0}", y_max / 2.0)),
        Line::from(format!("{:.0}", y_max)),
    ];

    let widget = Chart::new(vec![series])
        .block(chart_block(chart))
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Summary;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_draws_both_chart_kinds() {
        let mut by_product = Summary::new("Product", "TotalRevenue");
        by_product.groups = vec![("A".to_string(), 20.0), ("B".to_string(), 0.0)];
        let mut monthly = Summary::new("Month", "TotalRevenue");
        monthly.groups = vec![("January".to_string(), 20.0), ("May".to_string(), 12.0)];

        let charts = vec![
            ChartSpec::bar("Total Revenue by Product", &by_product),
            ChartSpec::line("Monthly Sales Trend", &monthly),
        ];

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| draw(frame, &charts)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Total Revenue by Product"));
        assert!(screen.contains("Monthly Sales Trend"));
        assert!(screen.contains("Press q or Esc to close"));
    }

    #[test]
    fn test_nothing_to_show() {
        assert!(!show_charts(&[]).unwrap());
    }
}
