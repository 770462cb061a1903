use anyhow::Result;
use clap::Parser;
use config::PathManager;
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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame, Terminal,
};
use roster_core::{
    FormFlow, FormPhase, PhotonClient, QueryAction, Roster, SuggestionProvider, UserStore,
    DEFAULT_AVATAR,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(not(debug_assertions))]
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Contact roster TUI with address autocomplete")]
struct Args {
    /// Override the data directory (users file and logs)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

const CARD_HEIGHT: u16 = 5;
const MAX_VISIBLE_SUGGESTIONS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormField {
    Name,
    Title,
    Location,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Title,
            FormField::Title => FormField::Location,
            FormField::Location => FormField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Location,
            FormField::Title => FormField::Name,
            FormField::Location => FormField::Title,
        }
    }
}

struct App {
    roster: Roster,
    store: UserStore,
    provider: SuggestionProvider,
    form: FormFlow,
    name_input: Input,
    title_input: Input,
    location_input: Input,
    focus: FormField,
    cursor: usize,
    suggestion_cursor: usize,
    status_message: Option<String>,
}

impl App {
    fn new(store: UserStore) -> Self {
        let roster = Roster::from_users(store.load());
        let provider = SuggestionProvider::new(Arc::new(PhotonClient::new()));

        App {
            roster,
            store,
            provider,
            form: FormFlow::new(),
            name_input: Input::default(),
            title_input: Input::default(),
            location_input: Input::default(),
            focus: FormField::Name,
            cursor: 0,
            suggestion_cursor: 0,
            status_message: None,
        }
    }

    fn persist(&self) {
        self.store.save(self.roster.users());
    }

    /// Marshal provider deliveries onto the UI update path. Called once per
    /// frame; the last delivery drained wins.
    fn check_provider_events(&mut self) {
        while let Some(list) = self.provider.try_recv() {
            self.form.set_suggestions(list);
            self.suggestion_cursor = 0;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.cursor >= self.roster.len() {
            self.cursor = self.roster.len().saturating_sub(1);
        }
    }

    fn open_form(&mut self) {
        self.form.open();
        self.name_input.reset();
        self.title_input.reset();
        self.location_input.reset();
        self.focus = FormField::Name;
        self.suggestion_cursor = 0;
    }

    fn dismiss_form(&mut self) {
        self.form.dismiss();
        self.name_input.reset();
        self.title_input.reset();
        self.location_input.reset();
    }

    fn submit_form(&mut self) {
        let user = self.form.submit(
            self.name_input.value(),
            self.title_input.value(),
            self.location_input.value(),
        );
        if let Some(user) = user {
            self.status_message = Some(format!("Added {}", user.name));
            self.roster.append(user);
            self.persist();
            self.name_input.reset();
            self.title_input.reset();
            self.location_input.reset();
            self.cursor = self.roster.len() - 1;
        }
    }

    fn delete_at_cursor(&mut self) {
        let Some(user) = self.roster.users().get(self.cursor) else {
            return;
        };
        let (id, name) = (user.id, user.name.clone());
        if self.roster.remove(id) {
            self.persist();
            self.status_message = Some(format!("Deleted {}", name));
            self.clamp_cursor();
        }
    }

    fn toggle_select_at_cursor(&mut self) {
        if let Some(user) = self.roster.users().get(self.cursor) {
            self.roster.toggle_select(user.id);
        }
    }

    /// Route a location-field change through the form flow. A pick's
    /// programmatic assignment is reported here too and gets suppressed.
    fn apply_location_change(&mut self) {
        match self.form.location_changed(self.location_input.value()) {
            QueryAction::Refresh(query) => self.provider.update(query),
            QueryAction::Suppressed => {}
        }
        self.suggestion_cursor = 0;
    }

    fn pick_suggestion(&mut self) {
        if let Some(value) = self.form.pick(self.suggestion_cursor) {
            self.location_input = Input::from(value);
            self.apply_location_change();
        }
    }

    /// Handle a key event - returns false if should quit
    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }
        self.status_message = None;

        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            return false;
        }

        match self.form.phase() {
            FormPhase::Closed => self.handle_list_key(key),
            _ => self.handle_form_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Char('a') => self.open_form(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.roster.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_select_at_cursor(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_at_cursor(),
            _ => {}
        }
        true
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> bool {
        let showing = self.form.phase() == FormPhase::ShowingSuggestions;

        match key.code {
            KeyCode::Esc => self.dismiss_form(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up if showing && self.focus == FormField::Location => {
                self.suggestion_cursor = self.suggestion_cursor.saturating_sub(1);
            }
            KeyCode::Down if showing && self.focus == FormField::Location => {
                if self.suggestion_cursor + 1 < self.form.suggestions().len() {
                    self.suggestion_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if showing && self.focus == FormField::Location {
                    self.pick_suggestion();
                } else {
                    self.submit_form();
                }
            }
            _ => {
                let event = Event::Key(key);
                match self.focus {
                    FormField::Name => {
                        self.name_input.handle_event(&event);
                    }
                    FormField::Title => {
                        self.title_input.handle_event(&event);
                    }
                    FormField::Location => {
                        let before = self.location_input.value().to_string();
                        self.location_input.handle_event(&event);
                        if self.location_input.value() != before {
                            self.apply_location_change();
                        }
                    }
                }
            }
        }
        true
    }
}

fn avatar_glyph(avatar: &str) -> &'static str {
    match avatar {
        DEFAULT_AVATAR => "◉",
        _ => "○",
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Card list
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_cards(f, app, chunks[0]);
    render_status_bar(f, app, chunks[1]);

    if app.form.is_open() {
        render_form(f, app, area);
    }
}

fn render_cards(f: &mut Frame, app: &App, area: Rect) {
    let list_block = Block::default().borders(Borders::ALL).title("Roster");
    let inner = list_block.inner(area);
    f.render_widget(list_block, area);

    if app.roster.is_empty() {
        let hint = Paragraph::new("No users yet — press 'a' to add one")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hint, inner);
        return;
    }

    // Keep the cursor row visible: scroll by whole cards.
    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let first = if app.cursor < visible {
        0
    } else {
        app.cursor + 1 - visible
    };

    for (row, user) in app.roster.users().iter().enumerate().skip(first).take(visible) {
        let card_area = Rect {
            x: inner.x,
            y: inner.y + ((row - first) as u16) * CARD_HEIGHT,
            width: inner.width,
            height: CARD_HEIGHT.min(inner.height.saturating_sub(((row - first) as u16) * CARD_HEIGHT)),
        };
        if card_area.height == 0 {
            break;
        }

        let is_selected = app.roster.is_selected(user.id);
        let at_cursor = row == app.cursor;

        let border_style = if is_selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if at_cursor {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let marker = if at_cursor { "▸ " } else { "" };
        let card = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{}{} {}", marker, avatar_glyph(&user.avatar_system_image), user.name),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                user.title.clone(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                format!("⌖ {}", user.localisation),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );

        f.render_widget(card, card_area);
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.form.is_open() {
        let submit_hint = if FormFlow::can_submit(
            app.name_input.value(),
            app.title_input.value(),
            app.location_input.value(),
        ) {
            "enter add"
        } else {
            "enter add (fill all fields)"
        };
        format!(" esc cancel · tab next field · {} ", submit_hint)
    } else {
        let selected = app
            .roster
            .selected()
            .and_then(|id| app.roster.users().iter().find(|u| u.id == id))
            .map(|u| format!(" · selected: {}", u.name))
            .unwrap_or_default();
        format!(
            " {} users{} | a add · enter select · d delete · q quit ",
            app.roster.len(),
            selected
        )
    };

    let status_bar =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_bar, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let showing = app.form.phase() == FormPhase::ShowingSuggestions;
    let suggestion_rows = app.form.suggestions().len().min(MAX_VISIBLE_SUGGESTIONS) as u16;
    let suggestions_height = if showing { suggestion_rows + 2 } else { 0 };

    let width = area.width.saturating_sub(4).min(60).max(20);
    let height = (3 * 3 + suggestions_height + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    f.render_widget(Clear, popup);
    let form_block = Block::default().borders(Borders::ALL).title("New user");
    let inner = form_block.inner(popup);
    f.render_widget(form_block, popup);

    let mut constraints = vec![
        Constraint::Length(3), // Name
        Constraint::Length(3), // Title
        Constraint::Length(3), // Location
    ];
    if showing {
        constraints.push(Constraint::Length(suggestions_height));
    }
    let fields = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let render_field = |f: &mut Frame, rect: Rect, label: &str, input: &Input, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widget = Paragraph::new(input.value()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(label),
        );
        f.render_widget(widget, rect);
        if focused {
            f.set_cursor_position((rect.x + input.visual_cursor() as u16 + 1, rect.y + 1));
        }
    };

    render_field(f, fields[0], "Name", &app.name_input, app.focus == FormField::Name);
    render_field(f, fields[1], "Title", &app.title_input, app.focus == FormField::Title);
    render_field(
        f,
        fields[2],
        "Location",
        &app.location_input,
        app.focus == FormField::Location,
    );

    if showing {
        let items: Vec<ListItem> = app
            .form
            .suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut spans = vec![Span::raw(s.title.clone())];
                if !s.subtitle.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", s.subtitle),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                let style = if i == app.suggestion_cursor {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(spans)).style(style)
            })
            .collect();

        let suggestions = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Suggestions (↑↓ + enter)"),
        );
        f.render_widget(suggestions, fields[3]);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(dir) = args.data_dir {
        PathManager::set_data_dir(dir);
    }

    // Setup file-based logging
    // In dev mode, use local ./roster.log that gets recreated on each run
    // In release mode, use the platform log directory with daily rotation
    #[cfg(debug_assertions)]
    let log_file = {
        let path = PathBuf::from("./roster.log");
        let _ = std::fs::remove_file(&path);
        std::fs::File::create(&path)?
    };
    #[cfg(debug_assertions)]
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    #[cfg(not(debug_assertions))]
    let (non_blocking, _guard) = {
        let log_dir = PathManager::logs_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine a log directory"))?;
        std::fs::create_dir_all(&log_dir)?;
        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "roster.log");
        tracing_appender::non_blocking(file_appender)
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Starting roster TUI");

    PathManager::ensure_dirs_exist()?;
    let users_path = PathManager::users_file_path()
        .ok_or_else(|| anyhow::anyhow!("could not determine a data directory"))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(UserStore::new(users_path));
    let mut should_quit = false;

    while !should_quit {
        terminal.draw(|f| ui(f, &mut app))?;

        app.check_provider_events();

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                should_quit = !app.handle_key_event(key);
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
