//! Ratatui-based terminal UI.
//!
//! The TUI shows the property details form, a "Calculate Price" control, the
//! estimated price, three insight tiles and a price-vs-area curve for the
//! current inputs.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::estimate::{Estimate, price_curve, run_estimate};
use crate::domain::SQFT_BOUNDS;
use crate::error::{AppError, EXIT_IO};
use crate::form::{Field, InputForm};
use crate::models::store::LoadedModel;
use crate::report::{
    DATA_SOURCE, PAGE_DESCRIPTION, PAGE_TITLE, format_inference_error, format_price_lakhs,
    format_price_million, metric_tiles,
};

mod plotters_chart;

use plotters_chart::PriceCurveChart;

/// Points sampled along the area axis for the price curve.
const CURVE_POINTS: usize = 64;

/// Row index of the "Calculate Price" control (after the four fields).
const CALCULATE_ROW: usize = Field::ALL.len();

/// Start the TUI with an already-loaded model.
pub fn run(model: Arc<LoadedModel>) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(model);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_IO, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_IO, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    model: Arc<LoadedModel>,
    form: InputForm,
    selected_row: usize,
    /// Text being typed into the selected numeric field.
    edit_buffer: Option<String>,
    status: String,
    estimate: Option<Estimate>,
    curve: Option<Vec<(f64, f64)>>,
}

impl App {
    fn new(model: Arc<LoadedModel>) -> Self {
        let form = InputForm::new(model.locations.clone());
        Self {
            model,
            form,
            selected_row: 0,
            edit_buffer: None,
            status: "Enter your requirements, then Calculate Price.".to_string(),
            estimate: None,
            curve: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_IO, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_IO, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_IO, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn selected_field(&self) -> Option<Field> {
        Field::ALL.get(self.selected_row).copied()
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.edit_buffer.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row < CALCULATE_ROW {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => match self.selected_field() {
                None => self.calculate(),
                Some(Field::Location) => self.adjust(1),
                Some(_) => {
                    self.edit_buffer = Some(String::new());
                    self.status = "Type a value. Enter to apply, Esc to cancel.".to_string();
                }
            },
            KeyCode::Char('c') => self.calculate(),
            KeyCode::Char('s') => self.save_estimate(),
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if matches!(self.selected_field(), Some(f) if f != Field::Location) {
                    self.edit_buffer = Some(ch.to_string());
                    self.status = "Type a value. Enter to apply, Esc to cancel.".to_string();
                }
            }
            _ => {}
        }

        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.edit_buffer.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.edit_buffer = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.clone();
                self.edit_buffer = None;
                if let Some(field) = self.selected_field() {
                    if self.form.set_from_text(field, &text) {
                        self.inputs_changed();
                        self.status = format!("{}: {}", field.label(), self.form.value_text(field));
                    } else {
                        self.status = format!("Invalid number '{}'.", text.trim());
                    }
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                buffer.push(c);
            }
            _ => {}
        }
    }

    fn adjust(&mut self, delta: i32) {
        let Some(field) = self.selected_field() else {
            return;
        };
        self.form.step(field, delta);
        self.inputs_changed();
        self.status = format!("{}: {}", field.label(), self.form.value_text(field));
    }

    /// Any input change invalidates the shown estimate.
    fn inputs_changed(&mut self) {
        self.estimate = None;
        self.curve = None;
    }

    fn calculate(&mut self) {
        let request = match self.form.request() {
            Ok(r) => r,
            Err(e) => {
                self.status = format!("Invalid input: {e}");
                return;
            }
        };

        let estimate = run_estimate(&request, &self.model);
        self.curve = match &estimate.outcome {
            Ok(_) => price_curve(&request, &self.model, SQFT_BOUNDS.min, SQFT_BOUNDS.max, CURVE_POINTS).ok(),
            Err(_) => None,
        };
        self.status = match &estimate.outcome {
            Ok(report) => format!("Estimated {}", format_price_lakhs(report.price)),
            Err(err) => format_inference_error(err),
        };
        self.estimate = Some(estimate);
    }

    fn save_estimate(&mut self) {
        let Some(estimate) = &self.estimate else {
            self.status = "Nothing to save yet: Calculate Price first.".to_string();
            return;
        };
        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = PathBuf::from(format!("estimate_{ts}.json"));
        self.status = match crate::io::export::write_estimate_json(&path, estimate) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Save failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(9),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_insights(frame, chunks[2]);
        self.draw_chart(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                PAGE_TITLE,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(PAGE_DESCRIPTION, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_estimate(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::with_capacity(CALCULATE_ROW + 1);
        for (row, field) in Field::ALL.iter().enumerate() {
            let value = match (&self.edit_buffer, row == self.selected_row) {
                (Some(buf), true) => format!("{buf}_"),
                _ => self.form.value_text(*field),
            };
            let range = field
                .bounds()
                .map(|b| format!("  ({:.0}-{:.0})", b.min, b.max))
                .unwrap_or_default();
            items.push(ListItem::new(format!("{:<26} {value}{range}", field.label())));
        }
        items.push(ListItem::new(Span::styled(
            "[ Calculate Price ]",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        )));

        let list = List::new(items)
            .block(Block::default().title("Property Details").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, area, &mut state);

        if let Some(field) = self.selected_field() {
            let hint = Paragraph::new(field.help()).style(Style::default().fg(Color::DarkGray));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_estimate(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price Estimate").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(estimate) = &self.estimate else {
            let msg = Paragraph::new("Press Calculate Price")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, inner);
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        for advisory in &estimate.advisories {
            lines.push(Line::from(Span::styled(
                format!("⚠ {advisory}"),
                Style::default().fg(Color::Yellow),
            )));
        }

        match &estimate.outcome {
            Ok(report) => {
                lines.push(Line::from(Span::styled(
                    "Estimated Price",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    format_price_lakhs(report.price),
                    Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!("({})", format_price_million(report))));
            }
            Err(err) => {
                lines.push(Line::from(Span::styled(
                    format_inference_error(err),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(p, inner);
    }

    fn draw_insights(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(area);

        let report = self.estimate.as_ref().and_then(|e| e.report());
        let tiles = report.map(metric_tiles);

        let labels = ["Price per Sq.ft", "Price per BHK", "Area per BHK"];
        for (idx, rect) in chunks.iter().enumerate() {
            let (title, value) = match &tiles {
                Some(tiles) => (tiles[idx].label, tiles[idx].value.clone()),
                None => (labels[idx], "-".to_string()),
            };
            let p = Paragraph::new(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center)
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Price Insights").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (Some(curve), Some(estimate)) = (&self.curve, &self.estimate) else {
            return;
        };
        let marker = estimate
            .report()
            .map(|r| (estimate.request.total_sqft(), r.price));

        let x_bounds = [SQFT_BOUNDS.min, SQFT_BOUNDS.max];
        let y_bounds = curve_y_bounds(curve);

        let widget = PriceCurveChart {
            curve,
            marker,
            x_bounds,
            y_bounds,
            x_label: "area (sq.ft)",
            y_label: "price (lakhs)",
            fmt_x: fmt_axis_sqft,
            fmt_y: fmt_axis_lakhs,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  0-9/Enter type  c calculate  s save  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::styled(DATA_SOURCE, Style::default().fg(Color::DarkGray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Y bounds for the curve with a little padding.
fn curve_y_bounds(curve: &[(f64, f64)]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in curve {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 0.0 };
        return [mid - 1.0, mid + 1.0];
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

fn fmt_axis_sqft(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_lakhs(v: f64) -> String {
    format!("{v:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocationSet;
    use crate::models::pipeline::{FeatureFrame, InferenceError, Pipeline};

    struct Constant(f64);

    impl Pipeline for Constant {
        fn predict(&self, frame: &FeatureFrame) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![self.0; frame.n_rows()?])
        }
    }

    struct Failing;

    impl Pipeline for Failing {
        fn predict(&self, _frame: &FeatureFrame) -> Result<Vec<f64>, InferenceError> {
            Err(InferenceError::Other("bad input".to_string()))
        }
    }

    fn app(pipeline: impl Pipeline + 'static) -> App {
        App::new(Arc::new(LoadedModel {
            pipeline: Arc::new(pipeline),
            locations: LocationSet::default(),
        }))
    }

    #[test]
    fn calculate_row_runs_estimate_and_curve() {
        let mut app = app(Constant(75.3));
        for _ in 0..CALCULATE_ROW {
            app.handle_key(KeyCode::Down);
        }
        assert!(!app.handle_key(KeyCode::Enter));

        let estimate = app.estimate.as_ref().unwrap();
        assert_eq!(estimate.report().unwrap().price, 75.3);
        assert_eq!(app.curve.as_ref().unwrap().len(), CURVE_POINTS);
        assert_eq!(app.status, "Estimated ₹ 75.30 Lakhs");
    }

    #[test]
    fn changing_inputs_clears_estimate() {
        let mut app = app(Constant(50.0));
        app.handle_key(KeyCode::Char('c'));
        assert!(app.estimate.is_some());

        app.handle_key(KeyCode::Right);
        assert_eq!(app.form.location(), "Electronic City");
        assert!(app.estimate.is_none());
        assert!(app.curve.is_none());
    }

    #[test]
    fn typed_value_is_applied_to_selected_field() {
        let mut app = app(Constant(50.0));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char('1'));
        app.handle_key(KeyCode::Char('5'));
        app.handle_key(KeyCode::Char('0'));
        app.handle_key(KeyCode::Char('0'));
        // 'q' is ignored while editing.
        assert!(!app.handle_key(KeyCode::Char('q')));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.form.total_sqft(), 1500.0);
        assert!(app.edit_buffer.is_none());
    }

    #[test]
    fn inference_failure_keeps_form_usable() {
        let mut app = app(Failing);
        app.handle_key(KeyCode::Char('c'));
        assert!(app.estimate.as_ref().unwrap().outcome.is_err());
        assert!(app.curve.is_none());
        assert_eq!(app.status, "Error making prediction: bad input");

        app.handle_key(KeyCode::Char('c'));
        assert!(app.estimate.is_some());
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn curve_bounds_pad_flat_curves() {
        assert_eq!(curve_y_bounds(&[(100.0, 5.0), (200.0, 5.0)]), [4.0, 6.0]);
        let b = curve_y_bounds(&[(100.0, 0.0), (200.0, 100.0)]);
        assert!(b[0] < 0.0 && b[1] > 100.0);
    }
}
