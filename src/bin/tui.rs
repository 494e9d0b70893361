//! Folio TUI - terminal front end for searching and reading books
//!
//! Type a query, browse the result grid and open a book in the reader.
//! Searches and loads run on spawned tasks over shared controllers; the
//! interface redraws from controller snapshots, so loading states show up
//! while requests are in flight.

use color_eyre::{eyre::Result, install};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio::{
    cache::{ContentCache, FileStore},
    catalogs::GoogleBooksCatalog,
    config::{self, Settings},
    prelude::*,
    theme::{self, ThemeState},
    tui::{
        GridState, Palette, centered_rect, error_message, format_book_title, format_description,
        info_message, page_indicator, page_lines, truncate_text,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Wrap,
        block::{Position, Title},
    },
};
use std::{collections::HashMap, fs::OpenOptions, io, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn};

const CARD_WIDTH: u16 = 32;
const CARD_HEIGHT: u16 = 6;
const LOG_FILE_NAME: &str = "folio-tui.log";

#[derive(Debug)]
enum AppEvent {
    SearchFinished(SearchOutcome),
    ReaderSettled(ReaderState),
    Description { book_id: String, text: String },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modal {
    None,
    Reader,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StatusType {
    Info,
    Error,
}

struct App {
    should_quit: bool,
    modal: Modal,

    search_query: String,
    input_active: bool,
    grid: GridState,
    results: Vec<Book>,
    descriptions: HashMap<String, String>,

    catalog: Arc<dyn Catalog>,
    search: Arc<SearchController>,
    reader: Arc<ReaderController>,
    theme: &'static ThemeState,

    status_message: String,
    status_type: StatusType,

    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    fn new(settings: &Settings, store: Arc<FileStore>) -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        let catalog: Arc<dyn Catalog> = Arc::new(GoogleBooksCatalog::from_settings(settings));
        let search = SearchController::new(catalog.clone()).with_limit(settings.max_results);
        let reader = ReaderController::new(catalog.clone(), ContentCache::new(store.clone()));
        let theme = theme::init(store);

        Self {
            should_quit: false,
            modal: Modal::None,

            search_query: String::new(),
            input_active: true,
            grid: GridState::new(3),
            results: Vec::new(),
            descriptions: HashMap::new(),

            status_message: format!("Searching {} - type a query and press Enter", catalog.name()),
            status_type: StatusType::Info,

            catalog,
            search: Arc::new(search),
            reader: Arc::new(reader),
            theme,

            event_sender,
            event_receiver,
        }
    }

    fn palette(&self) -> Palette {
        Palette::for_theme(self.theme.current())
    }

    fn set_status(&mut self, message: impl Into<String>, status_type: StatusType) {
        self.status_message = message.into();
        self.status_type = status_type;
    }

    fn selected_book(&self) -> Option<Book> {
        self.grid
            .selected()
            .and_then(|index| self.results.get(index))
            .cloned()
    }

    fn handle_key_event(&mut self, key: KeyCode) {
        match self.modal {
            Modal::Reader => self.handle_reader_keys(key),
            Modal::Help => self.modal = Modal::None,
            Modal::None if self.input_active => self.handle_input_keys(key),
            Modal::None => self.handle_grid_keys(key),
        }
    }

    fn handle_input_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => self.search_query.push(c),
            KeyCode::Backspace => {
                self.search_query.pop();
            }
            KeyCode::Enter => {
                self.input_active = false;
                self.perform_search();
            }
            KeyCode::Esc | KeyCode::Tab | KeyCode::Down => self.input_active = false,
            _ => {}
        }
    }

    fn handle_grid_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('s') | KeyCode::Tab => self.input_active = true,
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('d') => self.load_description(),
            KeyCode::Char('?') => self.modal = Modal::Help,
            KeyCode::Left | KeyCode::Char('h') => self.grid.move_left(),
            KeyCode::Right | KeyCode::Char('l') => self.grid.move_right(),
            KeyCode::Down | KeyCode::Char('j') => self.grid.move_down(),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.grid.position().0 == 0 {
                    self.input_active = true;
                } else {
                    self.grid.move_up();
                }
            }
            KeyCode::Enter => self.open_reader(),
            _ => {}
        }
    }

    fn handle_reader_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.reader.close();
                self.modal = Modal::None;
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => {
                self.reader.next_page();
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
                self.reader.previous_page();
            }
            KeyCode::Home => self.reader.go_to_page(0),
            KeyCode::End => self.reader.go_to_page(usize::MAX),
            KeyCode::Char('t') => self.toggle_theme(),
            _ => {}
        }
    }

    fn perform_search(&mut self) {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            return;
        }

        self.set_status(format!("Searching for \"{}\"...", query), StatusType::Info);
        let search = self.search.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let outcome = search.submit(&query).await;
            let _ = sender.send(AppEvent::SearchFinished(outcome));
        });
    }

    fn open_reader(&mut self) {
        let Some(book) = self.selected_book() else {
            return;
        };

        self.modal = Modal::Reader;
        let reader = self.reader.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let state = reader.select(Some(book)).await;
            let _ = sender.send(AppEvent::ReaderSettled(state));
        });
    }

    fn load_description(&mut self) {
        let Some(book) = self.selected_book() else {
            return;
        };
        if book.description.is_some() || self.descriptions.contains_key(&book.id) {
            return;
        }

        self.set_status(format!("Loading description of {}...", book.title), StatusType::Info);
        let catalog = self.catalog.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match catalog.fetch_description(&book.id).await {
                Ok(text) => AppEvent::Description {
                    book_id: book.id,
                    text,
                },
                Err(e) => AppEvent::Error(format!("Could not load description: {}", e)),
            };
            let _ = sender.send(event);
        });
    }

    fn toggle_theme(&mut self) {
        match self.theme.toggle() {
            Ok(theme) => self.set_status(format!("Theme: {}", theme), StatusType::Info),
            Err(e) => {
                warn!(error = %e, "failed to persist theme");
                self.set_status(format!("Theme not saved: {}", e), StatusType::Error);
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SearchFinished(outcome) => match outcome {
                SearchOutcome::Applied(count) => {
                    self.refresh_results();
                    self.set_status(format!("Found {} books", count), StatusType::Info);
                }
                SearchOutcome::Empty => {
                    self.refresh_results();
                    self.set_status("No books found", StatusType::Info);
                }
                SearchOutcome::Failed(message) => {
                    self.refresh_results();
                    self.set_status(format!("Search failed: {}", message), StatusType::Error);
                }
                SearchOutcome::Ignored | SearchOutcome::Superseded => {}
            },
            AppEvent::ReaderSettled(state) => match state {
                ReaderState::Ready { book, content } => self.set_status(
                    format!("{} - {} pages", book.title, content.len()),
                    StatusType::Info,
                ),
                ReaderState::Failed { message, .. } => self.set_status(message, StatusType::Error),
                _ => {}
            },
            AppEvent::Description { book_id, text } => {
                self.descriptions.insert(book_id, text);
                self.set_status("Description loaded", StatusType::Info);
            }
            AppEvent::Error(message) => self.set_status(message, StatusType::Error),
        }
    }

    fn refresh_results(&mut self) {
        self.results = self.search.results();
        self.grid.set_len(self.results.len());
    }
}

// Rendering implementation
impl App {
    fn render(&mut self, f: &mut Frame) {
        let palette = self.palette();
        let size = f.size();
        f.render_widget(Block::default().style(palette.base()), size);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Min(0),    // Result grid
                Constraint::Length(3), // Status bar
            ])
            .split(size);

        self.render_search_input(f, chunks[0], &palette);
        self.render_results(f, chunks[1], &palette);
        self.render_status_bar(f, chunks[2], &palette);

        match self.modal {
            Modal::Reader => self.render_reader(f, &palette),
            Modal::Help => self.render_help(f, &palette),
            Modal::None => {}
        }
    }

    fn render_search_input(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let border_style = if self.input_active {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.muted)
        };

        let mut spans = vec![Span::raw(self.search_query.clone())];
        if self.input_active {
            spans.push(Span::styled("_", Style::default().fg(palette.accent)));
        }
        if self.search.is_loading() {
            spans.push(Span::styled("  searching...", Style::default().fg(palette.muted)));
        }

        let input = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(" Search ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        );
        f.render_widget(input, area);
    }

    fn render_results(&mut self, f: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .title(format!(" Results ({}) ", self.results.len()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.muted));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.results.is_empty() {
            let hint = Paragraph::new("No results. Press / to search, ? for help.")
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center);
            f.render_widget(hint, inner);
            return;
        }

        self.grid
            .set_columns(usize::from((inner.width / CARD_WIDTH).max(1)));
        let columns = self.grid.columns();
        let visible_rows = usize::from((inner.height / CARD_HEIGHT).max(1));
        let (selected_row, _) = self.grid.position();
        let first_row = selected_row.saturating_sub(visible_rows - 1);

        for (index, book) in self.results.iter().enumerate() {
            let (row, column) = (index / columns, index % columns);
            if row < first_row || row >= first_row + visible_rows {
                continue;
            }

            let card = Rect {
                x: inner.x + column as u16 * CARD_WIDTH,
                y: inner.y + (row - first_row) as u16 * CARD_HEIGHT,
                width: CARD_WIDTH.min(inner.width),
                height: CARD_HEIGHT.min(inner.height),
            };
            self.render_card(f, card, book, self.grid.selected() == Some(index), palette);
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, book: &Book, selected: bool, palette: &Palette) {
        let width = usize::from(area.width.saturating_sub(2));
        let description = book
            .description
            .as_deref()
            .or_else(|| self.descriptions.get(&book.id).map(String::as_str));

        let mut lines = vec![format_book_title(book, palette)];
        lines.extend(
            format_description(description, width, palette)
                .into_iter()
                .take(usize::from(CARD_HEIGHT) - 3),
        );

        let border_style = if selected {
            palette.selected()
        } else {
            Style::default().fg(palette.muted)
        };
        let card = Paragraph::new(lines).block(
            Block::default()
                .title(truncate_text(&book.title, width))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(card, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let line = match self.status_type {
            StatusType::Info => info_message(&self.status_message, palette),
            StatusType::Error => error_message(&self.status_message, palette),
        };
        let status = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted)),
        );
        f.render_widget(status, area);
    }

    fn render_reader(&self, f: &mut Frame, palette: &Palette) {
        let area = centered_rect(85, 85, f.size());
        f.render_widget(Clear, area);

        let state = self.reader.state();
        let title = state
            .book()
            .map(|book| format!(" {} ", book.title))
            .unwrap_or_default();
        let footer = self
            .reader
            .position()
            .map(|(current, total)| page_indicator(current, total))
            .unwrap_or_default();

        let block = Block::default()
            .title(title)
            .title(
                Title::from(format!(" {} | ←/→ pages, Esc close ", footer))
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(palette.accent))
            .style(palette.base());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let lines: Vec<Line> = match &state {
            ReaderState::Ready { .. } => self
                .reader
                .rendered_page()
                .map(|page| page_lines(&page, usize::from(inner.width.saturating_sub(2))))
                .unwrap_or_default(),
            ReaderState::Failed { message, .. } => vec![error_message(message, palette)],
            ReaderState::Idle { .. } | ReaderState::Loading { .. } => vec![Line::from(Span::styled(
                "Loading...",
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            ))],
            ReaderState::Closed => Vec::new(),
        };

        let body = Paragraph::new(lines).wrap(Wrap { trim: false });
        f.render_widget(body, inner);
    }

    fn render_help(&self, f: &mut Frame, palette: &Palette) {
        let area = centered_rect(50, 60, f.size());
        f.render_widget(Clear, area);

        let help = [
            ("/ s Tab", "Edit search query"),
            ("Enter", "Search / open selected book"),
            ("Arrows hjkl", "Move in the result grid"),
            ("d", "Load description of selected book"),
            ("←/→", "Turn pages in the reader"),
            ("Esc", "Close reader"),
            ("t", "Toggle light/dark theme"),
            ("q", "Quit"),
        ];
        let lines: Vec<Line> = help
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<12}", key),
                        Style::default()
                            .fg(palette.accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*action),
                ])
            })
            .collect();

        let dialog = Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(palette.base()),
        );
        f.render_widget(dialog, area);
    }
}

fn init_logging(settings: &Settings) -> Result<()> {
    let dir = settings.resolved_cache_dir();
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;

    tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install()?;

    let settings = config::load_settings();
    init_logging(&settings)?;
    let store = Arc::new(FileStore::open(settings.resolved_cache_dir())?);
    info!(cache_dir = %store.root().display(), "starting folio-tui");

    let mut app = App::new(&settings, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key.code);
                }
            }
        }

        while let Ok(app_event) = app.event_receiver.try_recv() {
            app.handle_app_event(app_event);
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
