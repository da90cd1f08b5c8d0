use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::api::LeadApi;
use crate::app::{App, Popup};
use crate::editor::{Field, LeadEditor};
use crate::theme::Theme;

// Set once at startup from config; falls back to the built-in palette
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("theme already initialized");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

const EDITOR_WIDTH: u16 = 64;
// 5 inputs of 3 rows, error line, buttons, border
const EDITOR_HEIGHT: u16 = 5 * 3 + 1 + 3 + 2;

pub fn draw<A: LeadApi>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Info line
            Constraint::Min(4),     // Leads box
            Constraint::Length(1),  // Footer
        ])
        .split(f.area());

    draw_info_line(f, app, chunks[0]);
    draw_leads_box(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    match app.popup {
        Popup::None => {}
        Popup::Editor => draw_editor(f, &app.editor),
        Popup::Help => draw_help_popup(f),
    }
}

/// Where the editor modal is drawn for a given terminal area. Clicks
/// outside it count as backdrop clicks.
pub fn editor_area(area: Rect) -> Rect {
    centered_fixed(EDITOR_WIDTH, EDITOR_HEIGHT, area)
}

fn draw_info_line<A: LeadApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    // Priority: error > status message > ready
    let line = if !app.error_message.is_empty() {
        Line::from(vec![
            Span::styled("󰅚 ", Style::default().fg(danger())),
            Span::styled(app.error_message.as_str(), Style::default().fg(danger())),
        ])
    } else if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(warning())))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_leads_box<A: LeadApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let is_active = app.popup == Popup::None;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(" Leads ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if !app.loaded {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Loading...", Style::default().fg(text_dim()))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let header_row = Row::new(vec![
        Span::styled("First Name", Style::default().fg(header())),
        Span::styled("Last Name", Style::default().fg(header())),
        Span::styled("Company", Style::default().fg(header())),
        Span::styled("Email", Style::default().fg(header())),
        Span::styled("Note", Style::default().fg(header())),
        Span::styled("Last Updated", Style::default().fg(header())),
        Span::styled("Actions", Style::default().fg(header())),
    ]);

    let rows: Vec<Row> = app
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let row_style = if i == app.selected && is_active {
                Style::default().bg(bg_selected()).fg(text())
            } else {
                Style::default()
            };

            Row::new(vec![
                Span::styled(row.first_name, Style::default().fg(text())),
                Span::styled(row.last_name, Style::default().fg(text())),
                Span::styled(row.company, Style::default().fg(text())),
                Span::styled(row.email, Style::default().fg(text())),
                Span::styled(row.note, Style::default().fg(text_dim())),
                Span::styled(row.updated, Style::default().fg(text_dim())),
                // Inert for now
                Span::styled("[Update] [Delete]", Style::default().fg(inactive())),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(12),
        Constraint::Percentage(12),
        Constraint::Percentage(14),
        Constraint::Percentage(18),
        Constraint::Percentage(16),
        Constraint::Length(12),
        Constraint::Length(17),
    ];

    let table = Table::new(rows, widths)
        .header(header_row)
        .block(block);

    // Selection drives the scroll offset so the selected lead is always on screen
    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer<A: LeadApi>(f: &mut Frame, app: &App<A>, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(accent()));
    let label = |l: &'static str| Span::styled(l, Style::default().fg(text_dim()));

    let spans = match app.popup {
        Popup::Editor => vec![
            key("Tab"), label(" next field │ "),
            key("Enter"), label(" next/save │ "),
            key("F2"), label(" save │ "),
            key("Esc"), label(" cancel"),
        ],
        _ => vec![
            key("j/k"), label(" nav │ "),
            key("n"), label(" new lead │ "),
            key("R"), label(" reload │ "),
            key("?"), label(" help │ "),
            key("q"), label(" quit"),
        ],
    };

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_editor(f: &mut Frame, editor: &LeadEditor) {
    let popup_area = editor_area(f.area());

    f.render_widget(Clear, popup_area);

    let title = match &editor.target {
        Some(id) => format!(" 󰙍 Update Lead #{} ", id),
        None => " 󰙍 Create Lead ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    f.render_widget(block, popup_area);

    let mut constraints: Vec<Constraint> = Field::ALL.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));  // Error line
    constraints.push(Constraint::Length(3));  // Buttons

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(popup_area);

    for (i, field) in Field::ALL.into_iter().enumerate() {
        let focused = editor.focus == field;
        let border = if focused { accent() } else { inactive() };
        let cursor = if focused { "_" } else { "" };
        let title = if field.looks_required() {
            format!(" {} * ", field.label())
        } else {
            format!(" {} ", field.label())
        };

        let input = Paragraph::new(format!("{}{}", editor.form.get(field), cursor))
            .style(Style::default().fg(text()))
            .block(
                Block::default()
                    .title(Span::styled(title, Style::default().fg(if focused { accent() } else { header() })))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
        f.render_widget(input, inner[i]);
    }

    let error = Paragraph::new(Span::styled(editor.error_message.as_str(), Style::default().fg(danger())))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(error, inner[Field::ALL.len()]);

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled("  [ ", Style::default().fg(text_dim())),
        Span::styled("F2 = Save", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
        Span::styled(" ]  [ ", Style::default().fg(text_dim())),
        Span::styled("Esc = Cancel", Style::default().fg(danger())),
        Span::styled(" ]  ", Style::default().fg(text_dim())),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(inactive())),
    );
    f.render_widget(buttons, inner[Field::ALL.len() + 1]);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };
    let binding = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Leads ═══"),
        binding("  ↑/↓ j/k   ", "Move up/down in the list"),
        binding("  n         ", "Create a new lead"),
        binding("  R         ", "Reload leads from the server"),
        binding("  q         ", "Quit"),
        Line::from(""),
        section("═══ Lead Form ═══"),
        binding("  Tab/↓     ", "Next field"),
        binding("  S-Tab/↑   ", "Previous field"),
        binding("  Enter     ", "Next field, saves on Note"),
        binding("  F2        ", "Save"),
        binding("  Esc/click ", "Cancel (click outside the form)"),
        Line::from(""),
        section("═══ Command Line ═══"),
        binding("  leadbook --list            ", "Print leads as JSON"),
        binding("  leadbook --login <EMAIL>   ", "Store an API token"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 leadbook Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed-size rect centered in `r`, shrunk to fit small terminals
fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Lead, LeadId};
    use crate::api::models::parse_timestamp;
    use crate::app::LOAD_FAILED;
    use crate::editor::tests::FakeApi;
    use crate::editor::CREATE_FAILED;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use reqwest::StatusCode;

    fn render<A: LeadApi>(app: &App<A>) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(140, 32)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn count(lines: &[String], needle: &str) -> usize {
        lines.iter().filter(|l| l.contains(needle)).count()
    }

    fn lead(id: i64, first: &str, last: &str) -> Lead {
        Lead {
            id: LeadId::Number(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            company: Some("Acme".to_string()),
            email: None,
            note: Some("warm".to_string()),
            date_last_updated: parse_timestamp("2024-01-02T10:00:00").unwrap(),
        }
    }

    #[test]
    fn test_placeholder_before_first_load() {
        let app = App::new(FakeApi::default(), "tok");

        let lines = render(&app);

        assert_eq!(count(&lines, "Loading..."), 1);
        assert_eq!(count(&lines, "First Name"), 0);
    }

    #[tokio::test]
    async fn test_failed_first_load_shows_error_and_placeholder() {
        let api = FakeApi::default();
        api.push_list(Err(StatusCode::UNAUTHORIZED));
        let mut app = App::new(api, "tok");
        app.load_leads().await;

        let lines = render(&app);

        assert_eq!(count(&lines, LOAD_FAILED), 1);
        assert_eq!(count(&lines, "Loading..."), 1);
    }

    #[tokio::test]
    async fn test_empty_list_renders_header_only() {
        let api = FakeApi::default();
        api.push_list(Ok(Vec::new()));
        let mut app = App::new(api, "tok");
        app.load_leads().await;

        let lines = render(&app);

        assert_eq!(count(&lines, "Last Updated"), 1);
        assert_eq!(count(&lines, "[Update]"), 0);
        assert_eq!(count(&lines, "Loading..."), 0);
    }

    #[tokio::test]
    async fn test_one_row_per_lead_with_formatted_date() {
        let api = FakeApi::default();
        api.push_list(Ok(vec![lead(1, "Ada", "Lovelace"), lead(2, "Alan", "Turing")]));
        let mut app = App::new(api, "tok");
        app.load_leads().await;

        let lines = render(&app);

        assert_eq!(count(&lines, "[Update] [Delete]"), 2);
        assert_eq!(count(&lines, "Jan 2nd 24"), 2);
        let ada = lines.iter().find(|l| l.contains("Ada")).unwrap();
        assert!(ada.contains("Lovelace"));
        assert!(ada.contains("Acme"));
        assert!(ada.contains("warm"));
    }

    #[tokio::test]
    async fn test_editor_shows_fields_and_create_error() {
        let api = FakeApi::default();
        api.push_create(Err(StatusCode::INTERNAL_SERVER_ERROR));
        let mut app = App::new(api, "tok");
        app.open_create_editor();
        app.editor.update_field(Field::Company, "Initech");
        app.handle_key(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE)).await;

        let lines = render(&app);

        assert_eq!(count(&lines, "Create Lead"), 1);
        assert_eq!(count(&lines, "First Name *"), 1);
        assert_eq!(count(&lines, "Initech"), 1);
        assert_eq!(count(&lines, CREATE_FAILED), 1);
    }

    #[tokio::test]
    async fn test_selected_lead_past_viewport_is_scrolled_into_view() {
        let api = FakeApi::default();
        let leads = (0..50).map(|i| lead(i, &format!("Person{}", i), "Doe")).collect();
        api.push_list(Ok(leads));
        let mut app = App::new(api, "tok");
        app.load_leads().await;

        // Wraps from the first lead to the last
        app.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)).await;
        assert_eq!(app.selected, 49);

        let lines = render(&app);

        assert_eq!(count(&lines, "Person49"), 1);
        assert_eq!(count(&lines, "Last Updated"), 1);
        assert_eq!(count(&lines, "Person0 "), 0);
    }

    #[test]
    fn test_editor_title_follows_editor_target() {
        let mut app = App::new(FakeApi::default(), "tok");
        app.open_create_editor();
        assert_eq!(count(&render(&app), "Create Lead"), 1);

        app.editor.open(Some(LeadId::Number(4)));
        let lines = render(&app);

        assert_eq!(count(&lines, "Update Lead #4"), 1);
        assert_eq!(count(&lines, "Create Lead"), 0);
    }

    #[test]
    fn test_editor_area_is_centered_and_clamped() {
        let area = editor_area(Rect::new(0, 0, 100, 40));
        assert_eq!((area.x, area.width, area.height), (18, EDITOR_WIDTH, EDITOR_HEIGHT));

        let small = editor_area(Rect::new(0, 0, 30, 10));
        assert_eq!(small, Rect::new(0, 0, 30, 10));
    }
}
