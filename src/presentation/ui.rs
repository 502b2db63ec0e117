use crate::application::{App, AppMode};
use crate::domain::{FieldName, FieldValue};
use super::view::ResultView;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match ResultView::build(app.result.as_ref()) {
        Some(view) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[1]);
            render_form(f, app, body[0]);
            render_result(f, &view, body[1]);
        }
        None => render_form(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::Choosing => render_choice_popup(f, app),
        AppMode::Alert => render_alert_popup(f, app),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut text = "Race Strategy Prediction".to_string();
    if app.is_submitting() {
        text.push_str(" | Requesting prediction...");
    }
    let header = Paragraph::new(text).style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_field_name();

    let rows: Vec<Row> = FieldName::ALL
        .iter()
        .map(|&name| {
            let marker = if name.is_required() { " *" } else { "" };
            let value = app.fields.get(name);
            let shown = if name == selected && app.mode == AppMode::Editing {
                format!("{}_", app.input)
            } else {
                placeholder(name, value)
            };

            let value_style = match value {
                FieldValue::Unparsed(_) => Style::default().fg(Color::Red),
                FieldValue::Empty => Style::default().fg(Color::DarkGray),
                _ => Style::default(),
            };
            let row_style = if name == selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}{}", name.label(), marker)).style(Style::default().fg(Color::Yellow)),
                Cell::from(shown).style(value_style),
            ])
            .style(row_style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(36), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title("Race Conditions"))
        .column_spacing(1);

    f.render_widget(table, area);
}

fn placeholder(name: FieldName, value: &FieldValue) -> String {
    match (value, name) {
        (FieldValue::Empty, FieldName::Track) => "Select Track".to_string(),
        (FieldValue::Empty, FieldName::Team) => "Select Team".to_string(),
        (FieldValue::Empty, FieldName::Driver) => "Select Driver".to_string(),
        _ => value.display(),
    }
}

fn render_result(f: &mut Frame, view: &ResultView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Prediction Result");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(view.info.len() as u16),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let info: Vec<Line> = view
        .info
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(value.clone()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(info), chunks[0]);

    let total = Paragraph::new(view.total_pitstops.clone())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Total Pit Stops"));
    f.render_widget(total, chunks[2]);

    if let Some(stops) = &view.stops {
        let header = Row::new(vec!["Pit Stop Lap", "Tyre Compound"])
            .style(Style::default().fg(Color::Yellow));
        let rows: Vec<Row> = stops
            .iter()
            .map(|stop| Row::new(vec![stop.lap.clone(), stop.tire.clone()]))
            .collect();
        let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(10)])
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Pit Stop Lap"))
            .column_spacing(1);
        f.render_widget(table, chunks[3]);
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "↑↓: field | Enter: edit | Ctrl+S/F5: submit | Ctrl+E: export CSV | Ctrl+Y: copy | F1/?: help | q: quit".to_string()
            }
        }
        AppMode::Editing => format!(
            "{}: {} (Enter to apply, Esc to cancel)",
            app.selected_field_name().label(),
            app.input
        ),
        AppMode::Choosing => "↑↓: choose | Enter: select | Esc: cancel".to_string(),
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::Alert => "Enter/Esc: dismiss".to_string(),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Choosing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
            AppMode::Alert => Style::default().fg(Color::Red),
        });
    f.render_widget(input, area);
}

fn centered_rect(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - height_pct) / 2),
            Constraint::Percentage(height_pct),
            Constraint::Percentage((100 - height_pct) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_pct) / 2),
            Constraint::Percentage(width_pct),
            Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(rows[1])[1]
}

fn render_choice_popup(f: &mut Frame, app: &App) {
    let name = app.selected_field_name();
    let popup_area = centered_rect(f.area(), 50, 60);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = app
        .options
        .for_field(name)
        .iter()
        .map(|option| ListItem::new(option.as_str()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("Select {}", name.label())))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    let mut state = ListState::default().with_selected(Some(app.choice_index));
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn render_alert_popup(f: &mut Frame, app: &App) {
    let Some(notification) = &app.notification else {
        return;
    };
    let popup_area = centered_rect(f.area(), 60, 40);
    f.render_widget(Clear, popup_area);

    let alert = Paragraph::new(notification.body.clone())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(notification.title.clone())
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(alert, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let popup_area = centered_rect(f.area(), 80, 80);

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"RACE STRATEGY PREDICTION

=== FORM ===
Fields marked * are required before a prediction can be requested:
track, year, team, driver, air and track temperature, rainfall.
The remaining fields are model parameters with sensible defaults.

Track, team and driver are picked from the reference lists.
Numeric fields accept any text; values that are not numbers are kept
as typed and reported when you submit.

=== SUBMITTING ===
Ctrl+S or F5    Request a prediction for the current form
                Only one request runs at a time
                Failures open an alert; the last result stays on screen

=== RESULT ===
The result panel echoes track, year, team and driver, shows the total
number of pit stops and lists each stop lap with its tyre compound in
the order the service returned them.

Ctrl+E          Export the pit stop table to a CSV file
Ctrl+Y          Copy a text summary of the strategy to the clipboard

=== NAVIGATION ===
↑↓ or k/j       Move between fields
Enter/F2        Edit the selected field (or open its option list)
Esc             Cancel editing
F1 or ?         Show this help
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#.to_string()
}
