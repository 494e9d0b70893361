//! TUI utilities and shared types for the Folio terminal user interface.
//!
//! This module provides the pieces of the `folio-tui` binary that do not need
//! a terminal: result grid navigation, the palette for each theme and the
//! formatting of books and sanitized pages into styled lines.
//!
//! # Features
//!
//! This module is only available when the `tui` feature is enabled.
//!
//! # Examples
//!
//! ```rust,no_run
//! use folio::prelude::*;
//! use folio::tui::{GridState, Palette, format_book_title};
//!
//! let book = Book {
//!     id: "abc123".to_string(),
//!     title: "Dune".to_string(),
//!     authors: Some(vec!["Frank Herbert".to_string()]),
//!     description: None,
//!     thumbnail_url: None,
//!     preview_url: None,
//!     fully_viewable: false,
//! };
//!
//! let palette = Palette::for_theme(Theme::Dark);
//! let line = format_book_title(&book, &palette);
//!
//! let mut grid = GridState::new(3);
//! grid.set_len(7);
//! grid.move_down();
//! assert_eq!(grid.selected(), Some(3));
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::{
    net::html::{self, SafeHtml},
    theme::Theme,
    types::Book,
};

/// Selection state of the result grid.
///
/// Items are laid out row by row, `columns` per row. Movement never leaves
/// the grid; moving down from the last full row lands on the last item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    columns: usize,
    len: usize,
    selected: usize,
}

impl GridState {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            len: 0,
            selected: 0,
        }
    }

    /// Replaces the number of items and resets the selection to the first.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected = 0;
    }

    /// Changes the column count, keeping the selected item.
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the selected item, `None` for an empty grid.
    pub fn selected(&self) -> Option<usize> {
        (self.len > 0).then_some(self.selected)
    }

    /// Row and column of the selected item.
    pub fn position(&self) -> (usize, usize) {
        (self.selected / self.columns, self.selected % self.columns)
    }

    /// Number of rows needed for all items.
    pub fn rows(&self) -> usize {
        self.len.div_ceil(self.columns)
    }

    pub fn move_left(&mut self) {
        if self.selected % self.columns > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_right(&mut self) {
        let at_row_end = self.selected % self.columns == self.columns - 1;
        if !at_row_end && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected >= self.columns {
            self.selected -= self.columns;
        }
    }

    pub fn move_down(&mut self) {
        if self.len == 0 {
            return;
        }
        let (row, _) = self.position();
        if row + 1 < self.rows() {
            self.selected = (self.selected + self.columns).min(self.len - 1);
        }
    }
}

/// Colors used to draw the interface in one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub accent: Color,
    pub muted: Color,
    pub highlight: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                accent: Color::Blue,
                muted: Color::Gray,
                highlight: Color::LightBlue,
                error: Color::Red,
            },
            Theme::Dark => Self {
                background: Color::Black,
                text: Color::White,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                highlight: Color::Blue,
                error: Color::LightRed,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.text)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }
}

/// Formats a book's title and authors for a result card.
pub fn format_book_title(book: &Book, palette: &Palette) -> Line<'static> {
    let mut spans = vec![Span::styled(
        book.title.clone(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    )];

    let authors = book.authors_line();
    if !authors.is_empty() {
        spans.push(Span::raw(" by "));
        spans.push(Span::styled(authors, Style::default().fg(palette.muted)));
    }

    if book.fully_viewable {
        spans.push(Span::styled(
            " [full view]",
            Style::default().fg(palette.accent),
        ));
    }

    Line::from(spans)
}

/// Formats a (possibly HTML) description as wrapped plain lines.
///
/// The description is sanitized before any of its text is used.
pub fn format_description(
    description: Option<&str>,
    width: usize,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let text = description
        .map(|raw| html::to_inline_text(&html::sanitize(raw)))
        .filter(|text| !text.is_empty());

    match text {
        Some(text) => wrap_text(&text, width).into_iter().map(Line::from).collect(),
        None => vec![Line::from(Span::styled(
            crate::catalog::NO_DESCRIPTION,
            Style::default().fg(palette.muted),
        ))],
    }
}

/// Renders a sanitized page as wrapped lines for the reader view.
pub fn page_lines(page: &SafeHtml, width: usize) -> Vec<Line<'static>> {
    html::to_text(page)
        .iter()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                wrap_text(line, width)
            }
        })
        .map(Line::from)
        .collect()
}

/// "Page 2 of 5" for a zero-based position.
pub fn page_indicator(current: usize, total: usize) -> String {
    format!("Page {} of {}", current + 1, total)
}

/// Greedy word wrap on whitespace. Words longer than `width` are kept whole.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + 1;
        if !current.is_empty() && needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Truncates text to `width` characters, ending in "..." when cut.
pub fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else if width > 3 {
        let kept: String = text.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        text.chars().take(width).collect()
    }
}

/// Creates a styled status message for TUI display.
pub fn create_status_message(prefix: &str, message: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}:", prefix),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(message.to_string(), Style::default().fg(color)),
    ])
}

pub fn error_message(message: &str, palette: &Palette) -> Line<'static> {
    create_status_message("Error", message, palette.error)
}

pub fn info_message(message: &str, palette: &Palette) -> Line<'static> {
    create_status_message("Info", message, palette.accent)
}

/// A rectangle of the given percentage size centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
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
