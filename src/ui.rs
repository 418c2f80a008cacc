use anyhow::Result;
use carbon_footprint::{
    ActivityQuantities, Country, EnergySource, FootprintInput, FootprintResult, FootprintService,
    Priority, Recommendation, RegionEmission,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

/// Monthly activity of the household shown in the detail panel
pub fn sample_household() -> ActivityQuantities {
    ActivityQuantities {
        car_km: 800.0,
        bus_km: 60.0,
        train_km: 100.0,
        flight_km: 100.0,
        heating_kwh: 600.0,
        electricity_kwh: 300.0,
        water_m3: 10.0,
        meat_kg: 4.0,
        dairy_kg: 3.0,
        vegetables_kg: 12.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Countries,
    Statistics,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Countries => Page::Statistics,
            Page::Statistics => Page::Countries,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Countries => "Countries",
            Page::Statistics => "Statistics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    IntensityDesc,
    IntensityAsc,
}

impl SortOrder {
    pub fn next(&self) -> Self {
        match self {
            SortOrder::Name => SortOrder::IntensityDesc,
            SortOrder::IntensityDesc => SortOrder::IntensityAsc,
            SortOrder::IntensityAsc => SortOrder::Name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SortOrder::Name => "name",
            SortOrder::IntensityDesc => "intensity ↓",
            SortOrder::IntensityAsc => "intensity ↑",
        }
    }
}

pub struct App {
    pub service: FootprintService,
    pub countries: Vec<Country>,
    pub regions: Vec<RegionEmission>,
    pub energy_sources: Vec<EnergySource>,
    pub state: TableState,
    pub current_page: Page,
    pub sort: SortOrder,
    pub show_detail: bool,
}

impl App {
    pub fn new(service: FootprintService) -> Result<Self> {
        let countries = service.countries()?;
        let stats = service.statistics()?;

        let mut state = TableState::default();
        if !countries.is_empty() {
            state.select(Some(0));
        }

        Ok(Self {
            service,
            countries,
            regions: stats.regions,
            energy_sources: stats.energy_sources,
            state,
            current_page: Page::Countries,
            sort: SortOrder::Name,
            show_detail: false,
        })
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_country(&self) -> Option<&Country> {
        self.state.selected().and_then(|i| self.countries.get(i))
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        match self.sort {
            SortOrder::Name => self.countries.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::IntensityDesc => self
                .countries
                .sort_by(|a, b| b.co2_intensity.total_cmp(&a.co2_intensity)),
            SortOrder::IntensityAsc => self
                .countries
                .sort_by(|a, b| a.co2_intensity.total_cmp(&b.co2_intensity)),
        }
        if !self.countries.is_empty() {
            self.state.select(Some(0));
        }
    }

    /// Footprint of the sample household in the selected country
    pub fn selected_footprint(&self) -> Option<(FootprintResult, Vec<Recommendation>)> {
        let country = self.selected_country()?;
        let input = FootprintInput::new(&country.code, sample_household());
        let result = self.service.calculate(&input).ok()?;
        let recommendations = self.service.recommendations(&result.category_totals());
        Some((result, recommendations))
    }

    pub fn next(&mut self) {
        let len = self.countries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.countries.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => app.current_page = app.current_page.next(),
                KeyCode::Char('s') => app.cycle_sort(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.countries.is_empty() {
                        app.state.select(Some(app.countries.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Countries if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);

            render_countries(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Countries => render_countries(f, chunks[1], app),
        Page::Statistics => render_statistics(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn intensity_color(intensity: f64) -> Color {
    if intensity > 0.5 {
        Color::Red
    } else if intensity > 0.2 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Countries, Page::Statistics].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("🌍 {} countries", app.countries.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_countries(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Code", "Country", "Region", "kg CO₂/kWh"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.countries.iter().map(|c| {
        Row::new(vec![
            Cell::from(c.code.clone()),
            Cell::from(c.name.clone()),
            Cell::from(c.region.clone()),
            Cell::from(format!("{:.3}", c.co2_intensity))
                .style(Style::default().fg(intensity_color(c.co2_intensity))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(24),
            Constraint::Length(16),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Countries (sorted by {}) ", app.sort.label())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![];

    match (app.selected_country(), app.selected_footprint()) {
        (Some(country), Some((result, recommendations))) => {
            lines.push(Line::from(Span::styled(
                format!("{} ({})", country.name, country.code),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from("Sample household, kg CO₂ per month:"));
            lines.push(Line::from(format!("  🚗 Transport  {:>9.1}", result.transport.total)));
            lines.push(Line::from(format!("  🏠 Housing    {:>9.1}", result.habitat.total)));
            lines.push(Line::from(format!("  🍽️  Food       {:>9.1}", result.food.total)));
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "Annual: {:.0} kg ({:+.1}% vs global)",
                result.totals.annual, result.totals.vs_global_pct
            )));
            lines.push(Line::from(format!(
                "≈ {:.1} trees · {:.1} flights",
                result.totals.trees_needed, result.totals.flights_equivalent
            )));
            lines.push(Line::from(""));

            for rec in recommendations {
                let color = match rec.priority {
                    Priority::High => Color::Red,
                    Priority::Medium => Color::Yellow,
                    Priority::Low => Color::Green,
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("[{}] ", rec.priority.as_str()), Style::default().fg(color)),
                    Span::raw(rec.category),
                ]));
                lines.push(Line::from(format!("  {}", rec.suggestion)));
            }
        }
        _ => lines.push(Line::from("No country selected")),
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false });

    f.render_widget(panel, area);
}

fn render_statistics(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let region_rows = app.regions.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.region.clone()),
            Cell::from(r.country_count.to_string()),
            Cell::from(format!("{:.3}", r.avg_intensity))
                .style(Style::default().fg(intensity_color(r.avg_intensity))),
            Cell::from(format!("{:.3}", r.min_intensity)),
            Cell::from(format!("{:.3}", r.max_intensity)),
        ])
    });
    let regions = Table::new(
        region_rows,
        [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Region", "Countries", "Avg", "Min", "Max"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" 📍 Regions "));

    let source_rows = app.energy_sources.iter().map(|s| {
        Row::new(vec![
            Cell::from(s.name.clone()),
            Cell::from(format!("{:.3}", s.co2_per_kwh))
                .style(Style::default().fg(intensity_color(s.co2_per_kwh))),
            Cell::from(s.description.clone()),
        ])
    });
    let sources = Table::new(
        source_rows,
        [
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["Source", "kg/kWh", "Description"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" ⚡ Energy sources "));

    f.render_widget(regions, chunks[0]);
    f.render_widget(sources, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.countries.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details | "),
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(" Sort | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_footprint::{AppConfig, SqliteRepository};
    use std::sync::Arc;

    fn app() -> App {
        let repo = Arc::new(SqliteRepository::in_memory().unwrap());
        App::new(FootprintService::new(repo, AppConfig::default())).unwrap()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        let len = app.countries.len();

        app.previous();
        assert_eq!(app.state.selected(), Some(len - 1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_sort_by_intensity() {
        let mut app = app();
        app.cycle_sort();

        assert_eq!(app.sort, SortOrder::IntensityDesc);
        assert!(app
            .countries
            .windows(2)
            .all(|w| w[0].co2_intensity >= w[1].co2_intensity));
    }

    #[test]
    fn test_selected_footprint() {
        let app = app();
        let (result, recommendations) = app.selected_footprint().unwrap();

        assert!(result.totals.annual > 0.0);
        assert!(!recommendations.is_empty());
    }
}
