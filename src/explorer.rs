//! Terminal report explorer using ratatui
//!
//! The left panel holds the report controls (zone multi-select, solo zone,
//! growth multi-select, year slider). The right side shows the chart for
//! the focused control, or the latitude band map when the year slider has
//! focus. Everything is recomputed from the loaded table on each redraw.

use std::error::Error;
use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
};
use plotters::style::RGBColor;
use tracing::{info, warn};

use crate::bands::{band_colors, color_at_latitude, BandColor};
use crate::charts::{self, series_color, y_bounds, ChartOutcome, ChartSpec};
use crate::colormap::{denormalize, Colormap, Rgb8};
use crate::config::ReportConfig;
use crate::report::render_report;
use crate::selection::ReportSelection;
use crate::table::{ColumnKey, ObservationTable};

/// Which control has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Trend,
    Solo,
    Growth,
    Year,
}

impl Focus {
    fn name(&self) -> &'static str {
        match self {
            Focus::Trend => "Zone trends",
            Focus::Solo => "Single zone",
            Focus::Growth => "Growth",
            Focus::Year => "Year",
        }
    }

    fn next(&self) -> Focus {
        match self {
            Focus::Trend => Focus::Solo,
            Focus::Solo => Focus::Growth,
            Focus::Growth => Focus::Year,
            Focus::Year => Focus::Trend,
        }
    }

    fn prev(&self) -> Focus {
        match self {
            Focus::Trend => Focus::Year,
            Focus::Solo => Focus::Trend,
            Focus::Growth => Focus::Solo,
            Focus::Year => Focus::Growth,
        }
    }
}

/// What the right-hand side shows
#[derive(Clone, Debug, PartialEq)]
enum View {
    Chart(ChartSpec),
    Warning(String),
    Map(Vec<BandColor>),
}

fn term_color(c: Rgb8) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Black or white text, whichever reads better on `bg`
fn contrast_fg(bg: Rgb8) -> Color {
    let luma = 0.299 * bg.r as f64 + 0.587 * bg.g as f64 + 0.114 * bg.b as f64;
    if luma > 140.0 {
        Color::Black
    } else {
        Color::White
    }
}

/// Explorer state
struct Explorer<'a> {
    table: &'a ObservationTable,
    selection: ReportSelection,
    defaults: ReportSelection,
    config: ReportConfig,
    cmap: Colormap,
    focus: Focus,
    /// Cursor row inside the focused option list
    cursor: usize,
    show_help: bool,
    /// Message to display temporarily
    message: Option<String>,
}

impl<'a> Explorer<'a> {
    fn new(table: &'a ObservationTable, selection: ReportSelection, config: ReportConfig) -> Self {
        Explorer {
            table,
            defaults: selection.clone(),
            selection,
            config,
            cmap: Colormap::balance(),
            focus: Focus::Trend,
            cursor: 0,
            show_help: false,
            message: None,
        }
    }

    fn options(&self) -> &[ColumnKey] {
        match self.focus {
            Focus::Trend => self.selection.trend.options(),
            Focus::Solo => self.selection.solo.options(),
            Focus::Growth => self.selection.growth.options(),
            Focus::Year => &[],
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.cursor = match focus {
            Focus::Solo => self.selection.solo.index(),
            _ => 0,
        };
    }

    fn move_cursor(&mut self, delta: i32) {
        match self.focus {
            Focus::Year => {
                self.selection.year.step(-delta);
            }
            Focus::Solo => {
                self.selection.solo.step(delta);
                self.cursor = self.selection.solo.index();
            }
            Focus::Trend | Focus::Growth => {
                let n = self.options().len() as i32;
                if n > 0 {
                    self.cursor = (self.cursor as i32 + delta).clamp(0, n - 1) as usize;
                }
            }
        }
    }

    /// Space/Enter on the focused control
    fn activate(&mut self) {
        match self.focus {
            Focus::Trend => self.selection.trend.toggle(self.cursor),
            Focus::Growth => self.selection.growth.toggle(self.cursor),
            Focus::Solo | Focus::Year => {}
        }
    }

    fn clear_focused(&mut self) {
        match self.focus {
            Focus::Trend => self.selection.trend.clear(),
            Focus::Growth => self.selection.growth.clear(),
            Focus::Solo | Focus::Year => {}
        }
    }

    fn step_year(&mut self, delta: i32) {
        let year = self.selection.year.step(delta);
        self.message = Some(format!("Year: {}", year));
    }

    fn reset(&mut self) {
        self.selection = self.defaults.clone();
        self.set_focus(self.focus);
        self.message = Some("Selections reset to defaults".to_string());
    }

    fn export(&mut self) {
        match render_report(self.table, &self.selection, &self.config, None) {
            Ok(outcome) => {
                info!("Explorer export wrote {} files", outcome.files.len());
                self.message = Some(format!(
                    "Exported {} files to {}",
                    outcome.files.len(),
                    self.config.output_dir.display()
                ));
            }
            Err(e) => {
                warn!("Explorer export failed: {}", e);
                self.message = Some(format!("Export failed: {}", e));
            }
        }
    }

    fn current_view(&self) -> View {
        let outcome = match self.focus {
            Focus::Trend => charts::trend_chart(&self.selection.trend),
            Focus::Solo => ChartOutcome::Chart(charts::solo_chart(self.selection.solo.selected())),
            Focus::Growth => charts::growth_chart(&self.selection.growth),
            Focus::Year => {
                return View::Map(band_colors(self.table, self.selection.year.value(), &self.cmap));
            }
        };
        match outcome {
            ChartOutcome::Chart(spec) => View::Chart(spec),
            ChartOutcome::Warning(msg) => View::Warning(msg),
        }
    }

    /// Render the control panel on the left
    fn render_controls(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.focus.name()))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        if self.focus == Focus::Year {
            let (min, max) = self.selection.year.bounds();
            let lines = [
                format!("Year: {}", self.selection.year.value()),
                format!("Range: {}-{}", min, max),
                String::new(),
                "Left/Right  -/+ 1 year".to_string(),
                "PgUp/PgDn   -/+ 10 years".to_string(),
            ];
            for (i, line) in lines.iter().enumerate() {
                if i as u16 >= inner.height {
                    break;
                }
                buf.set_string(inner.x, inner.y + i as u16, line, Style::default().fg(Color::White));
            }
            return;
        }

        let options = self.options();
        let visible = inner.height as usize;
        let start = self.cursor.saturating_sub(visible.saturating_sub(1));

        for (row, (i, key)) in options.iter().enumerate().skip(start).take(visible).enumerate() {
            let marker = match self.focus {
                Focus::Solo if self.selection.solo.selected() == *key => "(*)",
                Focus::Solo => "( )",
                Focus::Trend if self.selection.trend.is_selected(*key) => "[x]",
                Focus::Growth if self.selection.growth.is_selected(*key) => "[x]",
                _ => "[ ]",
            };
            let style = if i == self.cursor {
                Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let line = format!("{} {}", marker, key.name());
            buf.set_string(inner.x, inner.y + row as u16, line, style);
        }
    }

    /// Per series, the runs of consecutive values; missing cells split a run
    fn series_runs(&self, spec: &ChartSpec) -> Vec<Vec<Vec<(f64, f64)>>> {
        spec.series.iter().map(|s| self.table.segments(s.key)).collect()
    }

    fn render_chart(&self, spec: &ChartSpec, area: Rect, buf: &mut Buffer) {
        // One dataset per run so missing values leave a gap
        let series_runs = self.series_runs(spec);
        let mut datasets = Vec::new();
        for (i, (series, runs)) in spec.series.iter().zip(&series_runs).enumerate() {
            let RGBColor(r, g, b) = series_color(i);
            for (j, run) in runs.iter().enumerate() {
                let mut dataset = Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Rgb(r, g, b)))
                    .data(run);
                if j == 0 {
                    dataset = dataset.name(series.label.clone());
                }
                datasets.push(dataset);
            }
        }

        let (first, last) = self.table.year_range();
        let (y_min, y_max) = y_bounds(self.table, spec);
        let mid = (first + last) / 2;

        let chart = Chart::new(datasets)
            .block(Block::default().title(format!(" {} ", spec.title)).borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .title(spec.x_label.clone())
                    .bounds([first as f64, last as f64])
                    .labels(vec![first.to_string(), mid.to_string(), last.to_string()]),
            )
            .y_axis(
                Axis::default()
                    .title(spec.y_label.clone())
                    .bounds([y_min, y_max])
                    .labels(vec![
                        format!("{:.2}", y_min),
                        format!("{:.2}", (y_min + y_max) / 2.0),
                        format!("{:.2}", y_max),
                    ]),
            );
        chart.render(area, buf);
    }

    fn render_warning(&self, msg: &str, area: Rect, buf: &mut Buffer) {
        let para = Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().title(" Warning ").borders(Borders::ALL));
        para.render(area, buf);
    }

    /// Band map: one terminal row per latitude step, plus a colorbar
    fn render_band_map(&self, bands: &[BandColor], area: Rect, buf: &mut Buffer) {
        let year = self.selection.year.value();
        let block = Block::default()
            .title(format!(" Accumulated temperature, {} ", year))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 10 {
            return;
        }

        let map_rows = inner.height - 2;
        let blank = " ".repeat(inner.width as usize);
        let mut labelled = Vec::new();

        for row in 0..map_rows {
            let lat = 90.0 - (row as f64 + 0.5) / map_rows as f64 * 180.0;
            let Some(band) = color_at_latitude(bands, lat) else {
                continue;
            };
            let style = Style::default().bg(term_color(band.color)).fg(contrast_fg(band.color));
            let y = inner.y + row;
            buf.set_string(inner.x, y, &blank, style);

            if !labelled.contains(&band.zone) {
                labelled.push(band.zone);
                let value = if band.missing {
                    "missing".to_string()
                } else {
                    format!("{:+.2}°C", band.value)
                };
                let label = format!(" {:<8} {}", band.zone.column_name(), value);
                buf.set_string(inner.x, y, label, style);
            }
        }

        // Colorbar over the full color domain
        let bar_y = inner.y + inner.height - 1;
        for col in 0..inner.width {
            let t = (col as f64 + 0.5) / inner.width as f64;
            let c = self.cmap.sample(t);
            buf.set_string(inner.x + col, bar_y, " ", Style::default().bg(term_color(c)));
        }
        let left = format!("{:.0}", denormalize(0.0));
        let right = format!("+{:.0}", denormalize(1.0));
        let caption = "Temperature Variation (°C)";
        let label_style = Style::default().fg(Color::White);
        buf.set_string(inner.x, bar_y - 1, &left, label_style);
        let cap_x = inner.x + inner.width.saturating_sub(caption.chars().count() as u16) / 2;
        buf.set_string(cap_x, bar_y - 1, caption, label_style);
        let right_x = inner.x + inner.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, bar_y - 1, &right, label_style);
    }

    /// Render help overlay
    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let help_text = [
            "=== Zonal Anomaly Explorer ===",
            "",
            "Controls:",
            "  Tab / Shift-Tab - Next/previous control",
            "  Up/Down         - Move in list",
            "  Space / Enter   - Toggle zone",
            "  C               - Clear focused selection",
            "",
            "Year:",
            "  Left/Right      - Previous/next year",
            "  PgUp/PgDn       - Back/forward 10 years",
            "",
            "Other:",
            "  R - Reset selections",
            "  E - Export full report",
            "  ? - Toggle this help",
            "  Q / Esc - Quit",
            "",
            "Press any key to close",
        ];

        let width = 46;
        let height = help_text.len() as u16 + 2;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let help_area = Rect::new(x, y, width.min(area.width), height.min(area.height));

        Clear.render(help_area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::DarkGray));
        let inner = block.inner(help_area);
        block.render(help_area, buf);

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            buf.set_string(inner.x, inner.y + i as u16, line, Style::default().fg(Color::White));
        }
    }

    fn status_line(&self) -> String {
        let msg_str = self.message.as_ref().map(|m| format!(" | {}", m)).unwrap_or_default();
        format!(
            " {} | Year {} | Tab:Control  Space:Toggle  </>:Year  E:Export  ?:Help  Q:Quit{}",
            self.focus.name(),
            self.selection.year.value(),
            msg_str,
        )
    }

    fn draw(&self, frame: &mut Frame) {
        let size = frame.area();
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(1)])
            .split(main_chunks[0]);

        let buf = frame.buffer_mut();
        self.render_controls(content_chunks[0], buf);
        match self.current_view() {
            View::Chart(spec) => self.render_chart(&spec, content_chunks[1], buf),
            View::Warning(msg) => self.render_warning(&msg, content_chunks[1], buf),
            View::Map(bands) => self.render_band_map(&bands, content_chunks[1], buf),
        }

        let status = Paragraph::new(self.status_line())
            .style(Style::default().bg(Color::DarkGray).fg(Color::White));
        frame.render_widget(status, main_chunks[1]);

        if self.show_help {
            self.render_help(main_chunks[0], frame.buffer_mut());
        }
    }

    /// Apply one key press; returns false when the explorer should quit
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            self.show_help = false;
            return true;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.set_focus(self.focus.next()),
            KeyCode::BackTab => self.set_focus(self.focus.prev()),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter => self.activate(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.clear_focused(),
            KeyCode::Left | KeyCode::Char('h') => self.step_year(-1),
            KeyCode::Right | KeyCode::Char('l') => self.step_year(1),
            KeyCode::PageUp => self.step_year(-10),
            KeyCode::PageDown => self.step_year(10),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            _ => {}
        }
        true
    }
}

/// Run the explorer until the user quits
pub fn run_explorer(
    table: &ObservationTable,
    selection: ReportSelection,
    config: ReportConfig,
) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut explorer = Explorer::new(table, selection, config);
    info!("Explorer started");

    loop {
        terminal.draw(|f| explorer.draw(f))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Clear message after the next key press
                explorer.message = None;
                if !explorer.handle_key(key.code) {
                    break;
                }
            }
        }
    }

    // Cleanup
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("Explorer closed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;
    use crate::zones::Zone;

    fn explorer(table: &ObservationTable) -> Explorer<'_> {
        let selection = ReportSelection::defaults(table).unwrap();
        Explorer::new(table, selection, ReportConfig::default())
    }

    #[test]
    fn test_focus_cycles() {
        let table = sample_table();
        let mut ex = explorer(&table);
        for expected in [Focus::Solo, Focus::Growth, Focus::Year, Focus::Trend] {
            ex.handle_key(KeyCode::Tab);
            assert_eq!(ex.focus, expected);
        }
        ex.handle_key(KeyCode::BackTab);
        assert_eq!(ex.focus, Focus::Year);
    }

    #[test]
    fn test_toggle_until_empty_shows_warning() {
        let table = sample_table();
        let mut ex = explorer(&table);
        ex.handle_key(KeyCode::Char('c'));
        assert_eq!(ex.current_view(), View::Warning(charts::TREND_WARNING.to_string()));

        ex.handle_key(KeyCode::Down);
        ex.handle_key(KeyCode::Char(' '));
        match ex.current_view() {
            View::Chart(spec) => assert_eq!(spec.keys(), vec![ColumnKey::raw(Zone::NHem)]),
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_year_keys_stay_in_range() {
        let table = sample_table();
        let mut ex = explorer(&table);
        assert_eq!(ex.selection.year.value(), 1883);
        ex.handle_key(KeyCode::PageUp);
        assert_eq!(ex.selection.year.value(), 1880);
        ex.handle_key(KeyCode::Right);
        assert_eq!(ex.selection.year.value(), 1881);

        ex.set_focus(Focus::Year);
        ex.handle_key(KeyCode::Up);
        assert_eq!(ex.selection.year.value(), 1882);
        match ex.current_view() {
            View::Map(bands) => assert!(bands.iter().all(|b| !b.missing)),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_solo_follows_cursor_and_reset_restores() {
        let table = sample_table();
        let mut ex = explorer(&table);
        ex.set_focus(Focus::Solo);
        ex.handle_key(KeyCode::Down);
        ex.handle_key(KeyCode::Down);
        assert_eq!(ex.selection.solo.selected(), ColumnKey::raw(Zone::SHem));
        assert_eq!(ex.cursor, 2);

        ex.handle_key(KeyCode::Char('r'));
        assert_eq!(ex.selection.solo.selected(), ColumnKey::raw(Zone::Glob));
        assert_eq!(ex.cursor, 0);
    }

    #[test]
    fn test_quit_and_help() {
        let table = sample_table();
        let mut ex = explorer(&table);
        assert!(ex.handle_key(KeyCode::Char('?')));
        assert!(ex.show_help);
        // Any key closes help, including q
        assert!(ex.handle_key(KeyCode::Char('q')));
        assert!(!ex.show_help);
        assert!(!ex.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_chart_runs_split_at_missing_cells() {
        let mut csv = String::from(crate::table::tests::HEADER);
        csv.push('\n');
        csv.push_str("2000,.40,.5,.3,.6,.4,.2,1.1,.7,.5,.4,.4,.2,.1,.3\n");
        csv.push_str("2001,.50,.6,.4,.7,.5,.3,1.2,.8,.6,.5,.5,.3,.2,***\n");
        csv.push_str("2002,.60,.7,.5,.8,.6,.4,1.3,.9,.7,.6,.6,.4,.3,.5\n");
        let table = ObservationTable::from_reader(csv.as_bytes()).unwrap();
        let mut ex = explorer(&table);
        ex.selection.solo.set(ColumnKey::raw(Zone::S90To64)).unwrap();
        ex.set_focus(Focus::Solo);

        let spec = match ex.current_view() {
            View::Chart(spec) => spec,
            other => panic!("expected chart, got {:?}", other),
        };
        let runs = ex.series_runs(&spec);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0], vec![vec![(2000.0, 0.3)], vec![(2002.0, 0.5)]]);

        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ex.draw(f)).unwrap();
    }

    #[test]
    fn test_draw_into_test_backend() {
        let table = sample_table();
        let mut ex = explorer(&table);
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|f| ex.draw(f)).unwrap();
        ex.set_focus(Focus::Year);
        terminal.draw(|f| ex.draw(f)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("64N-90N"));
        assert!(content.contains("Temperature Variation"));
    }
}
