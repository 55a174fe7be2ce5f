use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState, Tabs, Wrap}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}, text::{Line, Span}};

use taskboard::{
    application::{task_service::{TaskService, TaskServiceImpl}, theme::ThemePreference},
    config::AppConfig,
    domain::{
        query::{Controls, PageContext, View},
        store::KeyValueStore,
        task::{format_due_date, Confirmation, CreateTask, EditTask, Task, TaskId, Theme},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    let (service, theme_pref) = taskboard::bootstrap(&config).await?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service, theme_pref).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, PartialEq, Eq)]
enum Pending { Delete(TaskId), ClearAll }

#[derive(Clone, PartialEq, Eq)]
enum Mode { View, Search, Create, Edit(TaskId), Confirm(Pending) }

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Title, Description, Due, Priority }

impl ActiveField {
    fn next(self) -> Self {
        match self { Self::Title => Self::Description, Self::Description => Self::Due, Self::Due => Self::Priority, Self::Priority => Self::Title }
    }

    fn label(self) -> &'static str {
        match self { Self::Title => "Title", Self::Description => "Desc", Self::Due => "Due (YYYY-MM-DD)", Self::Priority => "Priority (low/medium/high)" }
    }
}

#[derive(Default)]
struct Draft { title: String, description: String, due: String, priority: String }

impl Draft {
    fn field_mut(&mut self, field: ActiveField) -> &mut String {
        match field {
            ActiveField::Title => &mut self.title,
            ActiveField::Description => &mut self.description,
            ActiveField::Due => &mut self.due,
            ActiveField::Priority => &mut self.priority,
        }
    }

    /// An edit with no title is cancelled before it reaches the service.
    fn blank_title_message(&self) -> Option<&'static str> {
        self.title.trim().is_empty().then_some("Edit cancelled: title was empty.")
    }

    fn from_task(t: &Task) -> Self {
        Self { title: t.title.clone(), description: t.description.clone(), due: t.due_date.clone().unwrap_or_default(), priority: t.priority.as_str().to_string() }
    }
}

struct Palette { accent: Color, fg: Color, bg: Color, muted: Color, overdue: Color }

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette { accent: Color::Cyan, fg: Color::White, bg: Color::Black, muted: Color::DarkGray, overdue: Color::LightRed },
        Theme::Light => Palette { accent: Color::Blue, fg: Color::Black, bg: Color::White, muted: Color::Gray, overdue: Color::Red },
    }
}

struct App<S: KeyValueStore> {
    service: TaskServiceImpl<S>,
    theme_pref: ThemePreference<S>,
    theme: Theme,
    page: PageContext,
    controls: Controls,
    view: View,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    field: ActiveField,
    draft: Draft,
    flash: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    async fn refresh(&mut self) -> Result<()> {
        self.view = self.service.view(self.page, &self.controls).await?;
        // Clamp selection within view bounds
        let len = self.view.tasks.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
        Ok(())
    }

    fn selected_task(&self) -> Option<&Task> { self.view.tasks.get(self.selected) }

    fn start_draft(&mut self, mode: Mode, draft: Draft) {
        self.mode = mode;
        self.field = ActiveField::Title;
        self.draft = draft;
    }

    async fn submit_draft(&mut self) -> Result<()> {
        let draft = std::mem::take(&mut self.draft);
        match std::mem::replace(&mut self.mode, Mode::View) {
            Mode::Create => {
                let input = CreateTask { title: draft.title.clone(), description: Some(draft.description.clone()), due_date: Some(draft.due.clone()), priority: Some(draft.priority.clone()) };
                if self.service.add(input).await?.is_none() {
                    self.flash = Some("Please enter a task title.".into());
                    self.mode = Mode::Create;
                    self.draft = draft;
                    return Ok(());
                }
            }
            Mode::Edit(id) => match draft.blank_title_message() {
                Some(reason) => self.flash = Some(reason.into()),
                None => {
                    let input = EditTask { title: Some(draft.title), description: Some(draft.description), due_date: Some(draft.due), priority: Some(draft.priority) };
                    if self.service.edit(id, input).await?.is_none() {
                        self.flash = Some("Edit cancelled: the task no longer exists.".into());
                    }
                }
            },
            _ => {}
        }
        self.refresh().await
    }

    async fn resolve_confirm(&mut self, pending: Pending, accepted: bool) -> Result<()> {
        let confirm = Confirmation::from(accepted);
        match pending {
            Pending::Delete(id) => { self.service.delete(id, confirm).await?; }
            Pending::ClearAll => { self.service.clear_all(confirm).await?; }
        }
        self.mode = Mode::View;
        self.refresh().await
    }
}

async fn run_app<S: KeyValueStore>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: TaskServiceImpl<S>, theme_pref: ThemePreference<S>) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let theme = theme_pref.load().await?;
    let view = service.view(PageContext::All, &Controls::default()).await?;
    let mut app = App {
        service, theme_pref, theme, page: PageContext::All, controls: Controls::default(), view, selected: 0, last_tick: Instant::now(),
        mode: Mode::View, list_state: ListState::default(), field: ActiveField::Title, draft: Draft::default(), flash: None,
    };
    app.refresh().await?;

    loop {
        let colors = palette(app.theme);
        let base = Style::default().fg(colors.fg).bg(colors.bg);
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let pages = [PageContext::All, PageContext::Pending, PageContext::Completed];
            let tabs = Tabs::new(pages.iter().enumerate().map(|(i, p)| format!("{} {}", i + 1, p.label())).collect::<Vec<_>>())
                .select(pages.iter().position(|p| *p == app.page).unwrap_or(0))
                .style(base)
                .highlight_style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL).title(format!("taskboard [{}]", app.theme.label())));
            f.render_widget(tabs, chunks[0]);

            let status = if app.page == PageContext::All { app.controls.status_filter.label() } else { "-" };
            let controls_line = format!(
                "{}  |  search: \"{}\"  status: {}  sort: {}",
                app.view.stats, app.controls.search_query, status, app.controls.sort_key.label(),
            );
            let header = Paragraph::new(controls_line)
                .style(base)
                .block(Block::default().borders(Borders::ALL).title("Enter/space toggle  n new  e edit  d delete  C clear  / search  f filter  s sort  t theme  q quit"));
            f.render_widget(header, chunks[1]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[2]);

            let today = Local::now().date_naive();
            let list_items: Vec<ListItem> = if app.view.tasks.is_empty() {
                vec![ListItem::new(Span::styled("Nothing to show", Style::default().fg(colors.muted)))]
            } else {
                app.view.tasks.iter().map(|t| {
                    let mark = if t.completed { "[x]" } else { "[ ]" };
                    let mut spans = vec![Span::raw(format!("{} {} ", mark, t.title)), Span::styled(format!("({})", t.priority.label()), Style::default().fg(colors.muted))];
                    if t.is_overdue(today) { spans.push(Span::styled(" overdue", Style::default().fg(colors.overdue))); }
                    ListItem::new(Line::from(spans))
                }).collect()
            };
            // Keep list_state selection in sync with current index
            if app.view.tasks.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .style(base)
                .block(Block::default().borders(Borders::ALL).title(format!("tasks [{}]", app.page.label())))
                .highlight_style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            // Details pane for selected item
            let detail = match app.selected_task() {
                Some(t) => {
                    let desc = if t.description.is_empty() { "(no description)" } else { t.description.as_str() };
                    format!(
                        "Title:\n{}\n\nStatus: {}\nPriority: {}\nDue: {}\n\nDescription:\n{}",
                        t.title, t.status_label(), t.priority.label(), format_due_date(t.due_date.as_deref()), desc,
                    )
                }
                None => String::new(),
            };
            let details = Paragraph::new(detail)
                .style(base)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match &app.mode {
                Mode::View => app.flash.clone().unwrap_or_else(|| format!("DATABASE_URL={}", std::env::var("DATABASE_URL").unwrap_or_default())),
                Mode::Search => format!("Search: {}_  |  (Enter to keep, Esc to clear)", app.controls.search_query),
                Mode::Create | Mode::Edit(_) => {
                    let value = match app.field {
                        ActiveField::Title => &app.draft.title,
                        ActiveField::Description => &app.draft.description,
                        ActiveField::Due => &app.draft.due,
                        ActiveField::Priority => &app.draft.priority,
                    };
                    let flash = app.flash.as_deref().map(|m| format!("  |  {m}")).unwrap_or_default();
                    format!("{}: {}_  |  (Tab to switch, Enter to save, Esc to cancel){}", app.field.label(), value, flash)
                }
                Mode::Confirm(Pending::Delete(_)) => "Delete this task? (y/n)".to_string(),
                Mode::Confirm(Pending::ClearAll) => "Clear ALL tasks? (y/n)".to_string(),
            };
            let footer_title = match &app.mode {
                Mode::View => "info", Mode::Search => "search", Mode::Create => "create", Mode::Edit(_) => "edit", Mode::Confirm(_) => "confirm",
            };
            let footer = Paragraph::new(footer_text)
                .style(base)
                .block(Block::default().borders(Borders::ALL).title(footer_title));
            f.render_widget(footer, chunks[3]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode.clone() {
                    Mode::View => {
                        app.flash = None;
                        match key.code {
                            KeyCode::Char('q') => break,
                            KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                            KeyCode::Down => { if app.selected + 1 < app.view.tasks.len() { app.selected += 1; } }
                            KeyCode::Enter | KeyCode::Char(' ') => {
                                if let Some(id) = app.selected_task().map(|t| t.id.clone()) {
                                    app.service.toggle_complete(id).await?;
                                    app.refresh().await?;
                                }
                            }
                            KeyCode::Char('n') => app.start_draft(Mode::Create, Draft { priority: "medium".into(), ..Draft::default() }),
                            KeyCode::Char('e') => {
                                if let Some(t) = app.selected_task() {
                                    let (id, draft) = (t.id.clone(), Draft::from_task(t));
                                    app.start_draft(Mode::Edit(id), draft);
                                }
                            }
                            KeyCode::Char('d') => {
                                if let Some(id) = app.selected_task().map(|t| t.id.clone()) { app.mode = Mode::Confirm(Pending::Delete(id)); }
                            }
                            KeyCode::Char('C') => app.mode = Mode::Confirm(Pending::ClearAll),
                            KeyCode::Char('/') => app.mode = Mode::Search,
                            KeyCode::Char('f') if app.page == PageContext::All => {
                                app.controls.status_filter = app.controls.status_filter.next();
                                app.refresh().await?;
                            }
                            KeyCode::Char('s') => {
                                app.controls.sort_key = app.controls.sort_key.next();
                                app.refresh().await?;
                            }
                            KeyCode::Char(c @ '1'..='3') => {
                                app.page = match c { '1' => PageContext::All, '2' => PageContext::Pending, _ => PageContext::Completed };
                                app.selected = 0;
                                app.refresh().await?;
                            }
                            KeyCode::Char('t') => app.theme = app.theme_pref.toggle().await?,
                            _ => {}
                        }
                    }
                    Mode::Search => match key.code {
                        KeyCode::Enter => app.mode = Mode::View,
                        KeyCode::Esc => { app.controls.search_query.clear(); app.mode = Mode::View; app.refresh().await?; }
                        KeyCode::Backspace => { app.controls.search_query.pop(); app.refresh().await?; }
                        KeyCode::Char(c) => { app.controls.search_query.push(c); app.refresh().await?; }
                        _ => {}
                    },
                    Mode::Create | Mode::Edit(_) => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft = Draft::default(); app.flash = None; }
                        KeyCode::Enter => app.submit_draft().await?,
                        KeyCode::Backspace => { app.draft.field_mut(app.field).pop(); }
                        KeyCode::Char(c) => app.draft.field_mut(app.field).push(c),
                        KeyCode::Tab => app.field = app.field.next(),
                        _ => {}
                    },
                    Mode::Confirm(pending) => {
                        let accepted = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                        app.resolve_confirm(pending, accepted).await?;
                    }
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_cancels_edit_locally() {
        let draft = Draft { title: "   ".into(), ..Draft::default() };
        assert_eq!(draft.blank_title_message(), Some("Edit cancelled: title was empty."));
        let draft = Draft { title: "Report".into(), ..Draft::default() };
        assert_eq!(draft.blank_title_message(), None);
    }
}
