use crate::app::{App, AppEvent, InputMode, ListView};
use crate::filters::StatusFilter;
use crate::form::{ActiveInput, TaskForm};
use crate::models::{Task, MAX_PRIORITY};
use chrono::{DateTime, NaiveDateTime};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((r.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn priority_color(priority: u8) -> Color {
    if priority >= 8 {
        Color::Red
    } else if priority >= 5 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Renders a server timestamp for humans. Accepts RFC 3339 or a naive ISO 8601
/// timestamp; anything else is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(key, Style::default().fg(Color::Red))
}

fn get_legend(input_mode: InputMode) -> Text<'static> {
    match input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            key_span(" q "),
            Span::raw(": Quit "),
            key_span(" j/k "),
            Span::raw(": Move "),
            key_span(" a "),
            Span::raw(": Add "),
            key_span(" e "),
            Span::raw(": Edit "),
            key_span(" x "),
            Span::raw(": Toggle Done "),
            key_span(" d "),
            Span::raw(": Delete "),
            key_span(" 1/2/3 "),
            Span::raw(": All/Done/Undone "),
            key_span(" s "),
            Span::raw(": Sort "),
            key_span(" / "),
            Span::raw(": Search "),
            key_span(" r "),
            Span::raw(": Refresh "),
            key_span(" Enter "),
            Span::raw(": Details "),
        ])),
        InputMode::Search => Text::from(Line::from(vec![
            key_span(" Enter/Esc "),
            Span::raw(": Done Searching "),
            key_span(" Backspace "),
            Span::raw(": Delete Character "),
        ])),
        InputMode::Form => Text::from(Line::from(vec![
            key_span(" Enter "),
            Span::raw(": Submit "),
            key_span(" Tab "),
            Span::raw(": Next Field "),
            key_span(" ←/→ "),
            Span::raw(": Priority "),
            key_span(" Esc "),
            Span::raw(": Cancel "),
        ])),
    }
}

fn render_toolbar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30),
            Constraint::Min(10),
            Constraint::Length(26),
        ])
        .split(area);

    let tabs = Tabs::new(StatusFilter::ALL.iter().map(|s| s.title()))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .select(app.filters.status.index())
        .highlight_style(
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );
    f.render_widget(tabs, chunks[0]);

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search_text = if app.filters.search.is_empty() && app.input_mode != InputMode::Search {
        Span::styled("Search tasks...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.filters.search.as_str())
    };
    let search = Paragraph::new(Line::from(search_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(search_style),
    );
    f.render_widget(search, chunks[1]);

    let sort_style = match app.filters.sort.query_value() {
        Some(_) => Style::default().fg(Color::Blue),
        None => Style::default().fg(Color::DarkGray),
    };
    let sort = Paragraph::new(Span::styled(app.filters.sort.label(), sort_style))
        .block(Block::default().borders(Borders::ALL).title("Sort"));
    f.render_widget(sort, chunks[2]);
}

fn task_item(task: &Task) -> ListItem<'_> {
    let title_style = if task.is_done {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let marker = if task.is_done {
        Span::styled("[x] ", Style::default().fg(Color::Green))
    } else {
        Span::raw("[ ] ")
    };
    ListItem::new(Line::from(vec![
        marker,
        Span::styled(
            format!("{:>2} ", task.priority),
            Style::default()
                .fg(Color::Black)
                .bg(priority_color(task.priority)),
        ),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ]))
}

fn render_task_list(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "Tasks ({})",
        app.filters.status.title()
    ));

    match app.list_view() {
        ListView::Tasks => {
            let items: Vec<ListItem> = app.tasks.iter().map(task_item).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, area, &mut app.state);
        }
        view => {
            let mut lines = Vec::new();
            match view {
                ListView::Loading => lines.push(Line::from("Loading tasks...")),
                ListView::Failed => lines.push(Line::from(Span::styled(
                    "Could not load tasks. Press r to retry.",
                    Style::default().fg(Color::Red),
                ))),
                ListView::Empty { hint } => {
                    lines.push(Line::from("No tasks found"));
                    if hint {
                        lines.push(Line::from(Span::styled(
                            "Try changing your filters",
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
                ListView::Tasks => {}
            }
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(paragraph, area);
        }
    }
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let detail_block = Block::default().borders(Borders::ALL).title("Task Details");

    let Some(detail) = &app.task_detail else {
        let paragraph = Paragraph::new("Press Enter to view task details")
            .block(detail_block)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(detail.title.as_str(), bold)),
        Line::from(vec![
            Span::styled("Status: ", bold),
            Span::raw(if detail.is_done { "Done" } else { "Undone" }),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", bold),
            Span::styled(
                detail.priority.to_string(),
                Style::default().fg(priority_color(detail.priority)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Created: ", bold),
            Span::raw(format_timestamp(&detail.created_at)),
        ]),
        Line::from(vec![
            Span::styled("Updated: ", bold),
            Span::raw(
                detail
                    .updated_at
                    .as_deref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "Never".to_string()),
            ),
        ]),
        Line::from(Span::styled("Description: ", bold)),
    ];

    match detail.description.as_deref() {
        Some(desc) if !desc.trim().is_empty() => {
            lines.extend(desc.lines().map(|l| Line::from(l.to_string())));
        }
        _ => lines.push(Line::from("No description")),
    }

    let paragraph = Paragraph::new(lines)
        .block(detail_block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn field_style(form: &TaskForm, input: ActiveInput) -> Style {
    if form.active_input == input {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Sixty percent of the available width, at least 30 columns, never wider than `width`.
fn form_width(width: u16) -> u16 {
    let scaled = (u32::from(width) * 60 / 100) as u16;
    scaled.max(30).min(width)
}

fn render_form(f: &mut Frame, form: &TaskForm, area: Rect) {
    let popup_width = form_width(area.width);
    let popup_height = if form.error.is_some() { 14 } else { 12 };
    let popup_area = centered_rect_absolute(popup_width, popup_height.min(area.height), area);

    let popup_block = Block::default()
        .title(format!("{} (Press Enter to Submit)", form.heading()))
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));
    let inner = popup_block.inner(popup_area);

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block, popup_area);

    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ];
    if form.error.is_some() {
        constraints.insert(0, Constraint::Length(2));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut idx = 0;
    if let Some(error) = &form.error {
        let message = Paragraph::new(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(message, chunks[0]);
        idx = 1;
    }

    let title = Paragraph::new(form.title.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Title *")
                .border_style(field_style(form, ActiveInput::Title)),
        );
    f.render_widget(title, chunks[idx]);

    let description = Paragraph::new(form.description.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Description")
                .border_style(field_style(form, ActiveInput::Description)),
        );
    f.render_widget(description, chunks[idx + 1]);

    let filled = form.priority as usize;
    let slider = format!(
        "Low (1) [{}{}] High ({})  {}",
        "#".repeat(filled),
        "-".repeat(MAX_PRIORITY as usize - filled),
        MAX_PRIORITY,
        form.priority
    );
    let priority = Paragraph::new(Span::styled(
        slider,
        Style::default().fg(priority_color(form.priority)),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Priority: {}", form.priority))
            .border_style(field_style(form, ActiveInput::Priority)),
    );
    f.render_widget(priority, chunks[idx + 2]);
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let mut constraints = vec![Constraint::Length(3)];
    let banner = app.error.clone().or_else(|| app.notice.clone());
    if banner.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0));
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(constraints)
        .split(f.area());

    render_toolbar(f, app, chunks[0]);

    let mut next = 1;
    if let Some(message) = banner {
        let banner = Paragraph::new(Span::styled(
            message,
            Style::default().fg(Color::White).bg(Color::Red),
        ));
        f.render_widget(banner, chunks[1]);
        next = 2;
    }
    let body_chunk = chunks[next];
    let footer_chunk = chunks[next + 1];

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(body_chunk);
    render_task_list(f, app, body[0]);
    render_detail(f, app, body[1]);

    if let Some(form) = &app.form {
        render_form(f, form, body_chunk);
    }

    let legend = Paragraph::new(get_legend(app.input_mode))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, footer_chunk);
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut events: UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        terminal.draw(|f| draw(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_input(key).await {
                    return Ok(());
                }
            }
        }
    }
}
