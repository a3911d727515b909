use crate::codec::{self, ExportFormat};
use crate::db::KeyValueStore;
use crate::entry::{Entry, EntryDraft};
use crate::error::{ImportError, StoreError};
use crate::presets::{format_date, local_today, QuickRange};
use crate::query::{format_hours, summarize, FilterCriteria, Summary};
use crate::store::EntryStore;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;

const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Ro,
    Date,
    Description,
    Hours,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Ro => FormField::Date,
            FormField::Date => FormField::Description,
            FormField::Description => FormField::Hours,
            FormField::Hours => FormField::Ro,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Ro => FormField::Hours,
            FormField::Date => FormField::Ro,
            FormField::Description => FormField::Date,
            FormField::Hours => FormField::Description,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::Ro => "RO",
            FormField::Date => "Date",
            FormField::Description => "Description",
            FormField::Hours => "Hours Flagged",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormTarget {
    Add,
    Edit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub target: FormTarget,
    pub draft: EntryDraft,
    pub focus: FormField,
}

impl FormState {
    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Ro => &mut self.draft.ro,
            FormField::Date => &mut self.draft.date,
            FormField::Description => &mut self.draft.description,
            FormField::Hours => &mut self.draft.hours,
        }
    }

    fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Ro => &self.draft.ro,
            FormField::Date => &self.draft.date,
            FormField::Description => &self.draft.description,
            FormField::Hours => &self.draft.hours,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    Search,
    EditBound(Bound, String),
    Form(FormState),
    ConfirmClear,
    ImportPath(String),
}

pub struct App<S: KeyValueStore> {
    pub store: EntryStore<S>,
    pub criteria: FilterCriteria,
    pub summary: Summary,
    pub state: TableState,
    pub mode: Mode,
    pub status: Option<String>,
    pub export_dir: PathBuf,
    pinned_today: Option<NaiveDate>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: EntryStore<S>, export_dir: PathBuf) -> Self {
        let mut app = Self {
            store,
            criteria: FilterCriteria::default(),
            summary: Summary::default(),
            state: TableState::default(),
            mode: Mode::Normal,
            status: None,
            export_dir,
            pinned_today: None,
        };
        app.refresh();
        app
    }

    /// Pin "today" (quick ranges, form defaults, import fallback)
    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    /// Read the clock on every use; the UI may stay open past midnight
    fn today(&self) -> NaiveDate {
        self.pinned_today.unwrap_or_else(local_today)
    }

    fn today_str(&self) -> String {
        format_date(self.today())
    }

    /// Recompute view + totals and keep the selection in range
    pub fn refresh(&mut self) {
        self.summary = summarize(self.store.entries(), &self.criteria);

        let len = self.summary.view.len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.state.selected().and_then(|i| self.summary.view.get(i))
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn next(&mut self) {
        let len = self.summary.view.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.summary.view.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.summary.view.len();
        if len == 0 {
            return;
        }
        let i = self
            .state
            .selected()
            .map_or(0, |i| (i + PAGE_STEP).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.summary.view.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(PAGE_STEP));
        self.state.select(Some(i));
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    pub fn apply_quick_range(&mut self, range: QuickRange) {
        let bounds = range.resolve(self.today());
        self.criteria.from = bounds.from;
        self.criteria.to = bounds.to;
        self.status = Some(format!("Range: {}", range.label()));
        self.refresh();
    }

    pub fn open_add_form(&mut self) {
        self.mode = Mode::Form(FormState {
            target: FormTarget::Add,
            draft: EntryDraft::new("", self.today_str(), "", ""),
            focus: FormField::Ro,
        });
    }

    pub fn open_edit_form(&mut self) {
        let form = self.selected_entry().map(|entry| FormState {
            target: FormTarget::Edit(entry.id.clone()),
            draft: EntryDraft::from_entry(entry),
            focus: FormField::Ro,
        });

        if let Some(form) = form {
            self.mode = Mode::Form(form);
        }
    }

    fn submit_form(&mut self, mut form: FormState) {
        match form.target.clone() {
            FormTarget::Add => match self.store.create(&form.draft) {
                Ok(entry) => {
                    self.status = Some(format!(
                        "Added {} ({} hrs)",
                        entry.ro,
                        format_hours(entry.hours)
                    ));
                    // Ready for the next job on the same day
                    form.draft.ro.clear();
                    form.draft.description.clear();
                    form.draft.hours.clear();
                    form.focus = FormField::Hours;
                    self.mode = Mode::Form(form);
                }
                Err(e) => {
                    self.status = Some(e.to_string());
                    self.mode = Mode::Form(form);
                }
            },
            FormTarget::Edit(id) => match self.store.update(&id, &form.draft) {
                Ok(entry) => {
                    self.status = Some(format!("Saved {}", entry.ro));
                    self.mode = Mode::Normal;
                }
                Err(e @ StoreError::NotFound(_)) => {
                    self.status = Some(e.to_string());
                    self.mode = Mode::Normal;
                }
                Err(e) => {
                    self.status = Some(e.to_string());
                    self.mode = Mode::Form(form);
                }
            },
        }
        self.refresh();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_entry().map(|e| e.id.clone()) else {
            return;
        };

        self.status = Some(match self.store.delete(&id) {
            Ok(()) => "Entry deleted".to_string(),
            Err(e) => e.to_string(),
        });
        self.refresh();
    }

    pub fn confirm_clear_all(&mut self) {
        self.status = Some(match self.store.clear_all() {
            Ok(()) => "All entries deleted".to_string(),
            Err(e) => e.to_string(),
        });
        self.refresh();
    }

    /// CSV covers the filtered view; JSON covers everything
    pub fn export(&mut self, format: ExportFormat) {
        let contents = match format {
            ExportFormat::Csv => Ok(codec::to_csv(&self.summary.view)),
            ExportFormat::Json => codec::to_json(self.store.entries()),
        };

        let result = contents
            .and_then(|text| codec::write_export(&self.export_dir, format, &text, Utc::now()));

        self.status = Some(match result {
            Ok(path) => format!("Exported {}", path.display()),
            Err(e) => {
                error!("Export failed: {:#}", e);
                format!("Export failed: {}", e)
            }
        });
    }

    pub fn import_from(&mut self, path: &Path) {
        let today = self.today_str();
        let result = codec::read_import(path)
            .map_err(|e| {
                error!("Import read failed: {:#}", e);
                StoreError::Import(ImportError::ParseFailure(e.to_string()))
            })
            .and_then(|text| self.store.import_json(&text, &today));

        self.status = Some(match result {
            Ok(count) => format!("Imported {} entries", count),
            Err(e) => {
                error!("Import failed: {}", e);
                e.to_string()
            }
        });
        self.refresh();
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);

        match mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::EditBound(bound, text) => self.handle_bound_key(key, bound, text),
            Mode::Form(form) => self.handle_form_key(key, form),
            Mode::ConfirmClear => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.confirm_clear_all();
                } else {
                    self.status = Some("Clear all cancelled".to_string());
                }
            }
            Mode::ImportPath(mut text) => match key.code {
                KeyCode::Enter => self.import_from(Path::new(text.trim())),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    text.pop();
                    self.mode = Mode::ImportPath(text);
                }
                KeyCode::Char(c) => {
                    text.push(c);
                    self.mode = Mode::ImportPath(text);
                }
                _ => self.mode = Mode::ImportPath(text),
            },
        }

        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('f') => {
                self.mode = Mode::EditBound(Bound::From, self.criteria.from.clone())
            }
            KeyCode::Char('t') => self.mode = Mode::EditBound(Bound::To, self.criteria.to.clone()),
            KeyCode::Char('1') => self.apply_quick_range(QuickRange::Today),
            KeyCode::Char('2') => self.apply_quick_range(QuickRange::ThisWeek),
            KeyCode::Char('3') => self.apply_quick_range(QuickRange::ThisMonth),
            KeyCode::Char('0') => self.apply_quick_range(QuickRange::Clear),
            KeyCode::Char('x') => self.export(ExportFormat::Csv),
            KeyCode::Char('J') => self.export(ExportFormat::Json),
            KeyCode::Char('i') => self.mode = Mode::ImportPath(String::new()),
            KeyCode::Char('X') => {
                if !self.store.is_empty() {
                    self.mode = Mode::ConfirmClear;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home if !self.summary.view.is_empty() => self.state.select(Some(0)),
            KeyCode::End if !self.summary.view.is_empty() => {
                self.state.select(Some(self.summary.view.len() - 1))
            }
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => return,
            KeyCode::Esc => {
                self.criteria.query.clear();
                self.refresh();
                return;
            }
            KeyCode::Backspace => {
                self.criteria.query.pop();
            }
            KeyCode::Char(c) => self.criteria.query.push(c),
            _ => {}
        }
        self.refresh();
        self.mode = Mode::Search;
    }

    fn handle_bound_key(&mut self, key: KeyEvent, bound: Bound, mut text: String) {
        match key.code {
            KeyCode::Enter => {
                let text = text.trim().to_string();
                match bound {
                    Bound::From => self.criteria.from = text,
                    Bound::To => self.criteria.to = text,
                }
                self.refresh();
            }
            KeyCode::Esc => {}
            KeyCode::Backspace => {
                text.pop();
                self.mode = Mode::EditBound(bound, text);
            }
            KeyCode::Char(c) => {
                text.push(c);
                self.mode = Mode::EditBound(bound, text);
            }
            _ => self.mode = Mode::EditBound(bound, text),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, mut form: FormState) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => return self.submit_form(form),
            KeyCode::Tab => form.focus = form.focus.next(),
            KeyCode::BackTab => form.focus = form.focus.previous(),
            KeyCode::Backspace => {
                form.field_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.field_mut().push(c)
            }
            _ => {}
        }
        self.mode = Mode::Form(form);
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Totals
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Entries
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_totals(f, chunks[0], app);
    render_filters(f, chunks[1], app);
    render_table(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);

    if let Mode::Form(form) = &app.mode {
        render_form(f, centered(f.size(), 60, 12), form);
    }
}

fn label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn key_style() -> Style {
    Style::default().fg(Color::Yellow)
}

fn render_totals<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let line = Line::from(vec![
        Span::styled(" All Time: ", label_style()),
        Span::raw(format_hours(app.summary.total_all)),
        Span::raw("  |  "),
        Span::styled("Filtered: ", label_style()),
        Span::styled(format_hours(app.summary.total_filtered), Style::default().fg(Color::Green)),
        Span::raw("  |  "),
        Span::styled("Entries: ", label_style()),
        Span::raw(app.summary.count.to_string()),
    ]);

    let header = Paragraph::new(vec![line]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Flat Rate Hour Tracker "),
    );

    f.render_widget(header, area);
}

fn render_filters<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let editing = |active: bool| {
        if active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let (from, from_active) = match &app.mode {
        Mode::EditBound(Bound::From, text) => (text.as_str(), true),
        _ => (app.criteria.from.as_str(), false),
    };
    let (to, to_active) = match &app.mode {
        Mode::EditBound(Bound::To, text) => (text.as_str(), true),
        _ => (app.criteria.to.as_str(), false),
    };

    let line = Line::from(vec![
        Span::styled(" Search: ", label_style()),
        Span::styled(
            format!("{:<20}", app.criteria.query),
            editing(app.mode == Mode::Search),
        ),
        Span::styled("  From: ", label_style()),
        Span::styled(format!("{:<10}", from), editing(from_active)),
        Span::styled("  To: ", label_style()),
        Span::styled(format!("{:<10}", to), editing(to_active)),
    ]);

    let filters = Paragraph::new(vec![line]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filter & Export "),
    );

    f.render_widget(filters, area);
}

fn render_table<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Entries ");

    if app.summary.view.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No entries yet. Add your first job.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header_cells = ["RO", "Date", "Description", "Hours"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.summary.view.iter().map(|entry| {
        Row::new(vec![
            Cell::from(entry.ro.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(entry.date.clone()),
            Cell::from(truncate(&entry.description, 48)),
            Cell::from(format!("{:>8}", format_hours(entry.hours))),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut spans = Vec::new();

    match &app.mode {
        Mode::ConfirmClear => {
            spans.push(Span::styled(
                " Delete all entries? ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("y", key_style()));
            spans.push(Span::raw(" confirm, any other key cancels"));
        }
        Mode::ImportPath(text) => {
            spans.push(Span::styled(" Import JSON file: ", label_style()));
            spans.push(Span::raw(text.clone()));
            spans.push(Span::styled("_", key_style()));
        }
        _ => {
            if let Some(status) = &app.status {
                spans.push(Span::styled(
                    format!(" {} ", status),
                    Style::default().fg(Color::Green),
                ));
                spans.push(Span::raw("|"));
            }
            for (key, action) in [
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("/", "Search"),
                ("f/t", "From/To"),
                ("1/2/3/0", "Today/Week/Month/Clear"),
                ("x", "CSV"),
                ("J", "JSON"),
                ("i", "Import"),
                ("X", "Clear All"),
                ("q", "Quit"),
            ] {
                spans.push(Span::styled(format!(" {}", key), key_style()));
                spans.push(Span::raw(format!(" {} ", action)));
            }
        }
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_form(f: &mut Frame, area: Rect, form: &FormState) {
    let title = match form.target {
        FormTarget::Add => " Add Job ",
        FormTarget::Edit(_) => " Edit Entry ",
    };

    let mut content = vec![Line::from("")];
    for field in [FormField::Ro, FormField::Date, FormField::Description, FormField::Hours] {
        let focused = field == form.focus;
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(vec![
            Span::styled(if focused { " → " } else { "   " }, key_style()),
            Span::styled(format!("{:<14}", field.label()), label_style()),
            Span::styled(form.value(field).to_string(), value_style),
        ]));
        content.push(Line::from(""));
    }
    content.push(Line::from(Span::styled(
        "   Tab next field | Enter save | Esc close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(Clear, area);
    f.render_widget(panel, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemorySlot, STORAGE_KEY};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: KeyValueStore>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
    }

    fn test_app(dir: &Path) -> App<MemorySlot> {
        App::new(EntryStore::load(MemorySlot::new()), dir.to_path_buf()).with_today(wednesday())
    }

    fn seeded_app(dir: &Path) -> App<MemorySlot> {
        let mut app = test_app(dir);
        for (ro, date, desc, hours) in [
            ("RO1", "2024-05-08", "brake pads", "1.5"),
            ("RO2", "2024-05-02", "oil change", "0.3"),
            ("RO3", "2024-04-20", "timing belt", "4.2"),
        ] {
            app.store.create(&EntryDraft::new(ro, date, desc, hours)).unwrap();
        }
        app.refresh();
        app
    }

    #[test]
    fn test_unpinned_today_follows_the_clock() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(EntryStore::load(MemorySlot::new()), dir.path().to_path_buf());

        assert_eq!(app.today(), local_today());

        app.open_add_form();
        match &app.mode {
            Mode::Form(form) => assert_eq!(form.draft.date, format_date(local_today())),
            other => panic!("expected form, got {:?}", other),
        }
    }

    #[test]
    fn test_add_entry_through_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "RO77");
        app.handle_key(key(KeyCode::Tab)); // date keeps today's default
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "alignment");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "1.2");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.store.len(), 1);
        let entry = &app.store.entries()[0];
        assert_eq!(entry.ro, "RO77");
        assert_eq!(entry.date, "2024-05-08");
        assert_eq!(entry.hours, 1.2);

        // Form stays open, reset for the next job, date kept
        match &app.mode {
            Mode::Form(form) => {
                assert_eq!(form.draft.ro, "");
                assert_eq!(form.draft.hours, "");
                assert_eq!(form.draft.date, "2024-05-08");
                assert_eq!(form.focus, FormField::Hours);
            }
            other => panic!("expected form, got {:?}", other),
        }
        assert_eq!(app.summary.count, 1);
    }

    #[test]
    fn test_form_validation_error_keeps_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Enter));

        assert!(app.store.is_empty());
        assert_eq!(app.status.as_deref(), Some("RO is required"));
        assert!(matches!(app.mode, Mode::Form(_)));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_edit_selected_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());
        let id = app.selected_entry().unwrap().id.clone();

        app.handle_key(key(KeyCode::Char('e')));
        app.handle_key(key(KeyCode::BackTab)); // hours
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut app, "2");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.store.get(&id).unwrap().hours, 2.0);
    }

    #[test]
    fn test_search_filters_live() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "OIL");
        assert_eq!(app.summary.count, 1);
        assert_eq!(app.summary.view[0].ro, "RO2");

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.summary.count, 3);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_quick_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.criteria.from, "2024-05-08");
        assert_eq!(app.summary.count, 1);

        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.criteria.from, "2024-05-06");
        assert_eq!(app.summary.count, 1);

        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.criteria.from, "2024-05-01");
        assert_eq!(app.summary.count, 2);
        assert!((app.summary.total_filtered - 1.8).abs() < 1e-9);
        assert!((app.summary.total_all - 6.0).abs() < 1e-9);

        app.handle_key(key(KeyCode::Char('0')));
        assert!(app.criteria.is_unfiltered());
        assert_eq!(app.summary.count, 3);
    }

    #[test]
    fn test_manual_bound() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Char('t')));
        type_text(&mut app, "2024-05-01");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.criteria.to, "2024-05-01");
        assert_eq!(app.summary.count, 1);
    }

    #[test]
    fn test_delete_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char('d')));

        let ros: Vec<&str> = app.summary.view.iter().map(|e| e.ro.as_str()).collect();
        assert_eq!(ros, vec!["RO1", "RO3"]);
    }

    #[test]
    fn test_clear_all_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Char('X')));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.store.len(), 3);

        app.handle_key(key(KeyCode::Char('X')));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.store.is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_export_then_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        app.handle_key(key(KeyCode::Char('J')));
        app.handle_key(key(KeyCode::Char('x')));

        let mut json_path = None;
        let mut csv_count = 0;
        for item in std::fs::read_dir(dir.path()).unwrap() {
            let path = item.unwrap().path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("json") => json_path = Some(path),
                Some("csv") => csv_count += 1,
                _ => {}
            }
        }
        assert_eq!(csv_count, 1);
        let json_path = json_path.unwrap();

        let mut fresh = test_app(dir.path());
        fresh.handle_key(key(KeyCode::Char('i')));
        type_text(&mut fresh, json_path.to_str().unwrap());
        fresh.handle_key(key(KeyCode::Enter));

        assert_eq!(fresh.store.entries(), app.store.entries());
        assert_eq!(fresh.status.as_deref(), Some("Imported 3 entries"));
    }

    #[test]
    fn test_failed_import_reports_single_message() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"entries\": []}").unwrap();

        let mut app = seeded_app(dir.path());
        app.import_from(&bad);
        assert_eq!(
            app.status.as_deref(),
            Some("Import failed. Provide a JSON export from this app.")
        );

        app.import_from(&dir.path().join("missing.json"));
        assert_eq!(
            app.status.as_deref(),
            Some("Import failed. Provide a JSON export from this app.")
        );
        assert_eq!(app.store.len(), 3);
    }

    #[test]
    fn test_navigation_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded_app(dir.path());

        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(2));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_quit_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());

        assert!(app.handle_key(key(KeyCode::Char('q'))));

        app.handle_key(key(KeyCode::Char('/')));
        assert!(!app.handle_key(key(KeyCode::Char('q'))));
        assert_eq!(app.criteria.query, "q");
    }

    #[test]
    fn test_mutations_reach_the_slot() {
        let dir = tempfile::tempdir().unwrap();
        let app = seeded_app(dir.path());

        let slot = app.store.into_slot();
        let json = slot.read(STORAGE_KEY).unwrap().unwrap();
        let saved: Vec<Entry> = serde_json::from_str(&json).unwrap();
        assert_eq!(saved.len(), 3);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }
}
