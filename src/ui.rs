use crate::calendar::{group_by_date, CalendarMonth};
use crate::config::Config;
use crate::error::SubscriptionError;
use crate::form::{FormField, SubscriptionForm};
use crate::projector::{next_payment, BillingEvent};
use crate::store::SubscriptionStore;
use crate::subscription::Frequency;
use anyhow::Result;
use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Calendar,
    Subscriptions,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Calendar => Page::Subscriptions,
            Page::Subscriptions => Page::Calendar,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous and next coincide
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Calendar => "Calendar",
            Page::Subscriptions => "Subscriptions",
        }
    }
}

/// The "Add Subscription" dialog.
#[derive(Debug, Clone)]
pub struct Modal {
    pub form: SubscriptionForm,
    pub focus: FormField,
    pub error: Option<SubscriptionError>,
}

impl Modal {
    pub fn new(today: NaiveDate) -> Self {
        Modal {
            form: SubscriptionForm::new(today),
            focus: FormField::Name,
            error: None,
        }
    }
}

pub struct App {
    pub store: SubscriptionStore,
    pub config: Config,
    pub current_page: Page,
    pub month: CalendarMonth,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub modal: Option<Modal>,
    pub table_state: TableState,
    pub status: Option<String>,
}

impl App {
    pub fn new(store: SubscriptionStore, config: Config, today: NaiveDate) -> Self {
        let mut table_state = TableState::default();
        if !store.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            store,
            config,
            current_page: Page::Calendar,
            month: CalendarMonth::containing(today),
            selected_date: today,
            today,
            modal: None,
            table_state,
            status: None,
        }
    }

    /// Current projection of the whole store.
    ///
    /// Records in the store were validated on creation, so projection does
    /// not fail in practice; if it ever does the calendar shows nothing.
    pub fn events(&self) -> Vec<BillingEvent<'_>> {
        match self.store.project() {
            Ok(events) => events,
            Err(err) => {
                error!("Projection failed: {}", err);
                Vec::new()
            }
        }
    }

    pub fn open_modal(&mut self) {
        self.modal = Some(Modal::new(self.today));
        self.status = None;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Validate the open form. On success the record is stored and the
    /// dialog closes; on failure the dialog stays open with the error and
    /// focus on the offending field.
    pub fn submit_modal(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        match self.store.submit(&modal.form, &self.config.currency_symbol) {
            Ok(record) => {
                let start = record.start_date();
                self.status = Some(format!("Added {}", record.name()));
                self.modal = None;
                self.select_date(start);
                if self.table_state.selected().is_none() {
                    self.table_state.select(Some(0));
                }
            }
            Err(err) => {
                if let Some(field) = err.field().and_then(FormField::from_key) {
                    modal.focus = field;
                }
                modal.error = Some(err);
            }
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.month = CalendarMonth::containing(date);
    }

    pub fn move_selection(&mut self, days: i64) {
        let magnitude = Days::new(days.unsigned_abs());
        let moved = if days >= 0 {
            self.selected_date.checked_add_days(magnitude)
        } else {
            self.selected_date.checked_sub_days(magnitude)
        };
        if let Some(date) = moved {
            self.select_date(date);
        }
    }

    /// Same day next month, clamped to the month end.
    pub fn next_month(&mut self) {
        if let Some(date) = self.selected_date.checked_add_months(Months::new(1)) {
            self.select_date(date);
        }
    }

    pub fn previous_month(&mut self) {
        if let Some(date) = self.selected_date.checked_sub_months(Months::new(1)) {
            self.select_date(date);
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Apply one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('a') => self.open_modal(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::BackTab => self.previous_page(),
            _ => match self.current_page {
                Page::Calendar => self.handle_calendar_key(key),
                Page::Subscriptions => self.handle_table_key(key),
            },
        }

        false
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_selection(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(7),
            KeyCode::Char('n') | KeyCode::PageDown => self.next_month(),
            KeyCode::Char('p') | KeyCode::PageUp => self.previous_month(),
            KeyCode::Char('t') => self.select_date(self.today),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.store.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.store.is_empty() {
                    self.table_state.select(Some(self.store.len() - 1));
                }
            }
            KeyCode::Enter => {
                let start = self
                    .table_state
                    .selected()
                    .and_then(|i| self.store.list().get(i))
                    .map(|record| record.start_date());
                if let Some(start) = start {
                    self.select_date(start);
                    self.current_page = Page::Calendar;
                }
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.close_modal();
                return;
            }
            KeyCode::Enter => {
                self.submit_modal();
                return;
            }
            _ => {}
        }

        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    modal.focus = modal.focus.previous();
                } else {
                    modal.focus = modal.focus.next();
                }
            }
            KeyCode::BackTab | KeyCode::Up => modal.focus = modal.focus.previous(),
            KeyCode::Left if modal.focus == FormField::Frequency => {
                modal.form.cycle_frequency(false)
            }
            KeyCode::Right if modal.focus == FormField::Frequency => {
                modal.form.cycle_frequency(true)
            }
            KeyCode::Char(' ') if modal.focus == FormField::Frequency => {
                modal.form.cycle_frequency(true)
            }
            KeyCode::Backspace => modal.form.pop_char(modal.focus),
            KeyCode::Char(c) => modal.form.push_char(modal.focus, c),
            _ => {}
        }
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
        error!("UI loop failed: {}", err);
        println!("Error: {:?}", err);
    }

    info!("UI closed with {} subscriptions", app.store.len());
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
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
        Page::Calendar => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(70), // Month grid
                    Constraint::Percentage(30), // Selected day
                ])
                .split(chunks[1]);

            render_calendar(f, content_chunks[0], app);
            render_day_panel(f, content_chunks[1], app);
        }
        Page::Subscriptions => render_subscriptions(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if let Some(modal) = &app.modal {
        let area = f.size();
        render_modal(f, area, modal, &app.config.currency_symbol);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Calendar, Page::Subscriptions];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Subscriptions: {}", app.store.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!(
            "≈ {}{:.2}/month",
            app.config.currency_symbol,
            app.store.monthly_total()
        ),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Subscription Calendar "),
    );

    f.render_widget(header, area);
}

fn render_calendar(f: &mut Frame, area: Rect, app: &App) {
    let events = app.events();
    let by_date = group_by_date(&events);
    let weeks = app.month.weeks(app.config.week_start);

    let header_cells = app.config.week_start.headers().into_iter().map(|h| {
        Cell::from(h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    // Borders take 2 rows, the weekday header 1
    let row_height = (area.height.saturating_sub(3) / weeks.len().max(1) as u16).max(1);
    let cell_width = (area.width.saturating_sub(2) / 7).max(4) as usize;

    let rows = weeks.iter().map(|week| {
        let cells = week.iter().map(|date| {
            let day_events = by_date.get(date).map(Vec::as_slice).unwrap_or(&[]);

            let mut day_style = if !app.month.contains(*date) {
                Style::default().fg(Color::DarkGray)
            } else if !day_events.is_empty() {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            if *date == app.today {
                day_style = day_style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
            }
            if *date == app.selected_date {
                day_style = day_style.add_modifier(Modifier::REVERSED);
            }

            let mut lines = vec![Line::from(Span::styled(format!("{:>2}", date.day()), day_style))];

            let room = usize::from(row_height.saturating_sub(1));
            if room > 0 && !day_events.is_empty() {
                if day_events.len() <= room {
                    lines.extend(day_events.iter().map(|event| {
                        Line::from(Span::styled(
                            truncate(event.subscription.name(), cell_width),
                            Style::default().fg(Color::Cyan),
                        ))
                    }));
                } else {
                    lines.extend(day_events.iter().take(room - 1).map(|event| {
                        Line::from(Span::styled(
                            truncate(event.subscription.name(), cell_width),
                            Style::default().fg(Color::Cyan),
                        ))
                    }));
                    lines.push(Line::from(Span::styled(
                        format!("+{} more", day_events.len() - (room - 1)),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }

            Cell::from(lines)
        });

        Row::new(cells).height(row_height)
    });

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", app.month.title())),
        );

    f.render_widget(table, area);
}

fn render_day_panel(f: &mut Frame, area: Rect, app: &App) {
    let events = app.events();
    let day_events: Vec<&BillingEvent> = events
        .iter()
        .filter(|event| event.date == app.selected_date)
        .collect();

    let title = format!(" {} ", app.selected_date.format("%a %b %-d, %Y"));

    let mut content = vec![Line::from("")];

    if day_events.is_empty() {
        content.push(Line::from(Span::styled(
            "  No payments due",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    for event in day_events {
        let sub = event.subscription;
        content.push(Line::from(vec![
            Span::styled("  ● ", Style::default().fg(Color::Cyan)),
            Span::styled(
                sub.name().to_string(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]));
        content.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(sub.price().to_string(), Style::default().fg(Color::Green)),
            Span::raw(" · "),
            Span::raw(sub.frequency().label()),
            Span::styled(
                format!(" · #{}", event.index),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        if let Some(logo) = sub.logo() {
            content.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    truncate(logo.as_str(), area.width.saturating_sub(6) as usize),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
        content.push(Line::from(""));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(panel, area);
}

fn render_subscriptions(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Name", "Price", "Frequency", "Start", "Next Payment", "Logo"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let today = app.today;
    let rows = app.store.list().iter().map(|sub| {
        let next = next_payment(sub, today)
            .map(|date| date.to_string())
            .unwrap_or_else(|| "—".to_string());

        let cells = vec![
            Cell::from(truncate(sub.name(), 30)),
            Cell::from(sub.price().to_string()).style(Style::default().fg(Color::Green)),
            Cell::from(sub.frequency().label()),
            Cell::from(sub.start_date().to_string()),
            Cell::from(next).style(Style::default().fg(Color::Cyan)),
            Cell::from(truncate(sub.logo().map(|l| l.as_str()).unwrap_or(""), 30)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Subscriptions "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw("|"));
    }

    status_spans.push(Span::raw(" "));
    status_spans.push(Span::styled("a", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Add | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    match app.current_page {
        Page::Calendar => {
            status_spans.push(Span::styled("←↑↓→", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Day | "));
            status_spans.push(Span::styled("n/p", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Month | "));
            status_spans.push(Span::styled("t", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Today | "));
        }
        Page::Subscriptions => {
            status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Nav | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Show | "));
        }
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_modal(f: &mut Frame, area: Rect, modal: &Modal, currency_symbol: &str) {
    let area = centered_rect(60, 70, area);

    let mut content = vec![Line::from("")];

    for field in FormField::ALL {
        let focused = field == modal.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        content.push(Line::from(Span::styled(format!("  {}", field.label()), label_style)));

        let value = modal.form.value(field);
        let shown = match field {
            FormField::Frequency => match value.parse::<Frequency>() {
                Ok(freq) => format!("◀ {} ▶", freq.label()),
                Err(_) => format!("◀ {} ▶", value),
            },
            FormField::Price => format!("{} {}", currency_symbol, value),
            FormField::Logo if value.is_empty() && !focused => "(path to an image file)".to_string(),
            _ => value.to_string(),
        };
        let cursor = if focused && field != FormField::Frequency { "▏" } else { "" };
        let value_style = if focused {
            Style::default().fg(Color::White).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White)
        };
        content.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{}{}", shown, cursor), value_style),
        ]));
        content.push(Line::from(""));
    }

    if let Some(err) = &modal.error {
        content.push(Line::from(Span::styled(
            format!("  ✗ {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(""));
    }

    content.push(Line::from(vec![
        Span::styled("  Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Add Subscription | "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" Cancel | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Next field"),
    ]));

    let dialog = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Add New Subscription "),
    );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 1 {
        s.chars().take(max_len).collect()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{Price, Subscription};
    use ratatui::backend::TestBackend;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app() -> App {
        App::new(SubscriptionStore::new(), Config::default(), date("2024-01-10"))
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_add_subscription_through_modal() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.modal.is_some());

        type_text(&mut app, "Netflix");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "15.99");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.modal.is_none());
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.list()[0].name(), "Netflix");
        assert_eq!(app.store.list()[0].start_date(), date("2024-01-10"));
        assert_eq!(app.store.list()[0].frequency(), Frequency::Monthly);
        assert_eq!(app.events().len(), 13);
        assert_eq!(app.status.as_deref(), Some("Added Netflix"));
    }

    #[test]
    fn test_rejected_modal_stays_open() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Gym");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "-3");
        app.handle_key(key(KeyCode::Enter));

        let modal = app.modal.as_ref().unwrap();
        assert_eq!(
            modal.error,
            Some(SubscriptionError::NegativePrice("-3".to_string()))
        );
        assert_eq!(modal.focus, FormField::Price);
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_modal_escape_discards_form() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "q");
        app.handle_key(key(KeyCode::Esc));

        assert!(app.modal.is_none());
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_modal_typing_q_does_not_quit() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.modal.as_ref().unwrap().form.name, "q");
    }

    #[test]
    fn test_modal_frequency_select() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(app.modal.as_ref().unwrap().focus, FormField::Frequency);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.modal.as_ref().unwrap().form.frequency, "yearly");
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.modal.as_ref().unwrap().form.frequency, "weekly");

        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.modal.as_ref().unwrap().focus, FormField::StartDate);
    }

    #[test]
    fn test_calendar_navigation() {
        let mut app = app();
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected_date, date("2024-01-11"));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_date, date("2024-01-04"));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_date, date("2023-12-28"));
        assert_eq!(app.month, CalendarMonth::new(2023, 12).unwrap());

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.selected_date, date("2024-01-28"));
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.selected_date, date("2024-01-10"));
    }

    #[test]
    fn test_next_month_clamps_day() {
        let mut app = app();
        app.select_date(date("2024-01-31"));
        app.next_month();
        assert_eq!(app.selected_date, date("2024-02-29"));
    }

    #[test]
    fn test_page_switching_and_quit() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_page, Page::Subscriptions);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.current_page, Page::Calendar);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_table_navigation_wraps() {
        let mut store = SubscriptionStore::new();
        for name in ["A", "B", "C"] {
            store.append(
                Subscription::new(name, Price::from_cents(100, "$"), date("2024-03-05"), Frequency::Weekly)
                    .unwrap(),
            );
        }
        let mut app = App::new(store, Config::default(), date("2024-01-10"));
        app.current_page = Page::Subscriptions;

        assert_eq!(app.table_state.selected(), Some(0));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.table_state.selected(), Some(2));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.table_state.selected(), Some(0));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.current_page, Page::Calendar);
        assert_eq!(app.selected_date, date("2024-03-05"));
    }

    #[test]
    fn test_render_calendar_page() {
        let mut store = SubscriptionStore::new();
        store.append(
            Subscription::new("Netflix", Price::from_cents(1599, "$"), date("2024-01-10"), Frequency::Monthly)
                .unwrap(),
        );
        let mut app = App::new(store, Config::default(), date("2024-01-10"));

        let text = screen(&mut app);
        assert!(text.contains("January 2024"));
        assert!(text.contains("Netflix"));
        assert!(text.contains("$15.99"));
    }

    #[test]
    fn test_render_modal_and_subscriptions_page() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('a')));
        let text = screen(&mut app);
        assert!(text.contains("Add New Subscription"));
        assert!(text.contains("Billing Frequency"));

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Tab));
        let text = screen(&mut app);
        assert!(text.contains("Next Payment"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Netflix", 10), "Netflix");
        assert_eq!(truncate("Netflix Premium", 8), "Netflix…");
        assert_eq!(truncate("Netflix", 1), "N");
    }
}
