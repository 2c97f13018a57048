//! UI rendering module.
//!
//! Screen composition with ratatui: tab bar, the three main views, the log
//! panel, and the overlays (forms, feature details, dialogs, help).

use chrono::{Datelike, Months, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, LogLevel, Tab};
use crate::forms::{ActiveForm, FeatureWizard, FormField, ProductForm, WizardStep};
use crate::models::{self, FeatureDto, FeatureStatus};
use crate::roadmap::period::span_days;
use crate::theme::{colors, status_color, status_icon, styles};
use crate::timeline::{TimelineStatusWidget, TimelineWidget};

/// Width of the label column in forms
const LABEL_WIDTH: u16 = 14;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background
    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status line
            Constraint::Length(5), // Log area
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_line(frame, app, chunks[2]);
    render_logs(frame, app, chunks[3]);

    // Overlays
    if app.feature_details.is_some() && app.input_mode == InputMode::Normal {
        render_details_overlay(frame, app, area);
    }

    if app.form.is_some() {
        render_form_modal(frame, app, area);
    }

    if app.confirm_dialog.is_some() {
        render_confirm_dialog(frame, app, area);
    }

    if app.error_popup.is_some() {
        render_error_popup(frame, app, area);
    }

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let style = if *tab == app.active_tab {
                styles::tab_active()
            } else {
                styles::tab_inactive()
            };
            Line::from(Span::styled(format!(" {} {} ", i + 1, tab.name()), style))
        })
        .collect();

    // Highlight the active tab
    let selected = Tab::all()
        .iter()
        .position(|tab| *tab == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" Produtivo ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .select(selected)
        .style(styles::text())
        .highlight_style(styles::tab_active())
        .divider(Span::styled(" | ", styles::border_dim()));

    frame.render_widget(tabs, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.active_tab {
        Tab::Products => render_products_view(frame, app, area),
        Tab::Roadmap => render_roadmap_view(frame, app, area),
        Tab::Features => render_features_view(frame, app, area),
    }
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(format!(" {}", app.status_text()))
        .style(Style::default().fg(colors::FG_DIM).bg(colors::BG_MEDIUM));
    frame.render_widget(status, area);
}

// ============================================
// Roadmap
// ============================================

fn render_roadmap_view(frame: &mut Frame, app: &App, area: Rect) {
    // Side panel only on wide terminals
    let show_panel = area.width >= 100;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if show_panel {
            [Constraint::Percentage(70), Constraint::Percentage(30)]
        } else {
            [Constraint::Percentage(100), Constraint::Length(0)]
        })
        .split(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(columns[0]);

    let title = match app.selected_product() {
        Some(product) => format!(" Roadmap: {} ", product.display_name()),
        None => " Roadmap: all products ".to_string(),
    };

    // Timeline and its status line
    let features = app.scoped_features();
    let timeline = TimelineWidget::new(features, &app.timeline_state)
        .title(title)
        .today(app.today());
    frame.render_widget(timeline, rows[0]);
    frame.render_widget(
        TimelineStatusWidget::new(features, &app.timeline_state),
        rows[1],
    );

    if show_panel {
        let feature = app
            .timeline_state
            .selected_feature
            .and_then(|id| app.feature(id));
        render_feature_panel(frame, app, feature, columns[1]);
    }
}

fn progress_bar(pct: u8, width: usize) -> String {
    let filled = pct as usize * width / 100;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Detail lines for one feature (side panel and overlay)
fn feature_lines<'a>(app: &'a App, feature: &'a FeatureDto) -> Vec<Line<'a>> {
    let today = app.today();
    let color = status_color(feature.status);

    // Title, product and status
    let mut lines = vec![
        Line::from(Span::styled(
            feature.display_title(),
            Style::default()
                .fg(colors::FG_PRIMARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(Span::styled(
            app.product_name(feature.product_id),
            styles::info(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Status:   "),
            Span::styled(
                format!("{} {}", status_icon(feature.status), feature.status),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    // Schedule and deadline
    match feature.schedule() {
        Some((start, end)) => {
            let days = span_days(start, end);
            lines.push(Line::from(vec![
                Span::raw("Start:    "),
                Span::styled(start.format("%Y-%m-%d").to_string(), styles::text_hint()),
            ]));
            lines.push(Line::from(vec![
                Span::raw("End:      "),
                Span::styled(end.format("%Y-%m-%d").to_string(), styles::text_hint()),
                Span::styled(format!("  ({} days)", days), styles::text_dim()),
            ]));

            let (deadline, style) = if feature.status == FeatureStatus::Done {
                ("Completed".to_string(), styles::success())
            } else if feature.is_overdue(today) {
                (
                    format!("{} days OVERDUE", (today - end).num_days()),
                    styles::error(),
                )
            } else if start > today {
                (
                    format!("starts in {} days", (start - today).num_days()),
                    styles::text_dim(),
                )
            } else {
                (
                    format!("{} days left", (end - today).num_days()),
                    styles::info(),
                )
            };
            lines.push(Line::from(vec![
                Span::raw("Deadline: "),
                Span::styled(deadline, style),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            "Not scheduled: add start and end dates to place it on the roadmap",
            Style::default().fg(colors::YELLOW),
        ))),
    }

    if let Some(pct) = feature.progress_pct() {
        lines.push(Line::from(vec![
            Span::raw("Progress: "),
            Span::styled(format!("{:>3}% ", pct), styles::text()),
            Span::styled(progress_bar(pct, 16), Style::default().fg(color)),
        ]));
    }

    if let Some(description) = feature.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(description, styles::text_dim())));
    }

    lines
}

fn render_feature_panel(frame: &mut Frame, app: &App, feature: Option<&FeatureDto>, area: Rect) {
    let block = Block::default()
        .title(" Feature ")
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_MEDIUM));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match feature {
        Some(feature) => {
            let mut lines = feature_lines(app, feature);
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter details · s status · e edit · d delete",
                styles::text_hint(),
            )));
            let details = Paragraph::new(lines).wrap(Wrap { trim: true });
            frame.render_widget(details, inner.inner(ratatui::layout::Margin::new(1, 1)));
        }
        // Empty state, vertically centered
        None => {
            let msg = vec![
                Line::from("No feature selected"),
                Line::from(""),
                Line::from(Span::styled("Use j/k to walk the bars", styles::text_dim())),
            ];
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Min(1)])
                .split(inner);
            frame.render_widget(Paragraph::new(msg).alignment(Alignment::Center), halves[1]);
        }
    }
}

fn render_details_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(feature) = app.feature_details.and_then(|id| app.feature(id)) else {
        return;
    };

    let popup_area = centered_rect(60, 16, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = feature_lines(app, feature);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "s: cycle status · e: edit · d: delete · Esc: close",
        styles::text_hint(),
    )));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Feature Details ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border_focused())
                .style(Style::default().bg(colors::BG_MEDIUM)),
        );
    frame.render_widget(paragraph, popup_area);
}

// ============================================
// Lists
// ============================================

/// Features of a product as (done, total)
fn feature_counts(features: &[FeatureDto], product_id: uuid::Uuid) -> (usize, usize) {
    let owned = features.iter().filter(|f| f.product_id == product_id);
    let (done, total) = owned.fold((0, 0), |(done, total), f| {
        (done + usize::from(f.status == FeatureStatus::Done), total + 1)
    });
    (done, total)
}

fn render_products_view(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let is_selected = i == app.product_selected;
            let style = if is_selected {
                styles::selected()
            } else {
                styles::text()
            };

            // Done / total progress, coloured by completion
            let (done, total) = feature_counts(&app.features, product.id);
            let bar = if total > 0 {
                progress_bar((done * 100 / total) as u8, 5)
            } else {
                "[░░░░░]".to_string()
            };
            let progress_style = if is_selected {
                style
            } else if total == 0 {
                styles::text_dim()
            } else if done == total {
                styles::success()
            } else if done * 2 >= total {
                Style::default().fg(colors::YELLOW)
            } else {
                Style::default().fg(colors::ORANGE)
            };

            let scope_marker = if app.selected_product == Some(product.id) {
                "● "
            } else {
                "  "
            };

            let content = Line::from(vec![
                Span::styled(scope_marker, Style::default().fg(colors::YELLOW)),
                Span::styled(format!("{:24}", product.display_name()), style),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(
                    format!("{:36}", product.description.as_deref().unwrap_or("-")),
                    if is_selected { style } else { styles::text_dim() },
                ),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(bar, progress_style),
                Span::raw(" "),
                Span::styled(format!("{}/{} done", done, total), progress_style),
            ]);

            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Products · Enter: scope roadmap · Esc: all ")
                .title_style(styles::title_accent())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_DARK)),
        )
        .style(styles::text());

    frame.render_widget(list, area);

    if app.products.is_empty() {
        render_empty_state(frame, area, "No products yet (c to create)", app.is_loading);
    }
}

fn render_features_view(frame: &mut Frame, app: &App, area: Rect) {
    let today = app.today();
    let features = app.scoped_features();

    let items: Vec<ListItem> = features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let is_selected = i == app.feature_selected;
            let style = if is_selected {
                styles::selected()
            } else {
                styles::text()
            };
            let status_style = if is_selected {
                style
            } else {
                Style::default().fg(status_color(feature.status))
            };

            // Overdue schedules in red, missing ones in yellow
            let schedule = match feature.schedule() {
                Some((start, end)) => format!("{} → {}", start.format("%d/%m/%y"), end.format("%d/%m/%y")),
                None => "unscheduled".to_string(),
            };
            let schedule_style = if is_selected {
                style
            } else if feature.is_overdue(today) {
                styles::error()
            } else if feature.is_scheduled() {
                styles::text_dim()
            } else {
                Style::default().fg(colors::YELLOW)
            };

            let progress = feature
                .progress_pct()
                .map(|pct| format!("{:>3}%", pct))
                .unwrap_or_else(|| "   -".to_string());

            let content = Line::from(vec![
                Span::styled(
                    format!(" {} {:8}", status_icon(feature.status), feature.status),
                    status_style,
                ),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(format!("{:32}", feature.display_title()), style),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(format!("{:21}", schedule), schedule_style),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(progress, if is_selected { style } else { styles::text() }),
                Span::styled(" │ ", styles::border_dim()),
                Span::styled(
                    app.product_name(feature.product_id),
                    if is_selected { style } else { styles::text_hint() },
                ),
            ]);

            ListItem::new(content)
        })
        .collect();

    let title = match app.selected_product() {
        Some(product) => format!(" Features: {} ", product.display_name()),
        None => " Features: all products ".to_string(),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_accent())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_DARK)),
        )
        .style(styles::text());

    frame.render_widget(list, area);

    if features.is_empty() {
        render_empty_state(frame, area, "No features yet (c to create)", app.is_loading);
    }
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    // Newest entries first, as many as fit
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let (prefix, color) = match entry.level {
                LogLevel::Info => ("i", colors::BLUE),
                LogLevel::Success => ("+", colors::GREEN),
                LogLevel::Warning => ("!", colors::YELLOW),
                LogLevel::Error => ("x", colors::RED),
            };

            ListItem::new(Line::from(vec![
                Span::styled(entry.timestamp.format("%H:%M:%S ").to_string(), styles::text_hint()),
                Span::styled(format!("[{}] ", prefix), Style::default().fg(color)),
                Span::styled(entry.message.as_str(), styles::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" System Log ")
            .title_style(Style::default().fg(colors::FG_DIM))
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_DARK)),
    );

    frame.render_widget(list, area);
}

fn render_empty_state(frame: &mut Frame, area: Rect, message: &str, is_loading: bool) {
    let text = if is_loading { "Loading..." } else { message };

    let paragraph = Paragraph::new(text)
        .style(styles::text_dim())
        .alignment(Alignment::Center);

    let inner = Block::default().borders(Borders::ALL).inner(area);
    if inner.is_empty() {
        return;
    }
    let y = inner.y + inner.height / 2;
    let centered = Rect::new(inner.x, y, inner.width, 1);

    frame.render_widget(paragraph, centered);
}

// ============================================
// Forms
// ============================================

fn render_form_modal(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    // fields * 3 + step line + spacer + buttons + error + margins + borders
    let (title, field_count, has_steps) = match form {
        ActiveForm::Product(product) => (product.title().to_string(), 2, false),
        ActiveForm::Feature(wizard) => (
            wizard.heading(),
            wizard.fields().iter().filter(|f| !f.is_button()).count() as u16,
            true,
        ),
    };
    let popup_height = field_count * 3 + u16::from(has_steps) * 2 + 7;
    let popup_area = centered_rect(60, popup_height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(title)
        .title_style(styles::title())
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .style(Style::default().bg(colors::BG_MEDIUM));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    match form {
        ActiveForm::Product(product) => render_product_form(frame, product, inner),
        ActiveForm::Feature(wizard) => render_feature_wizard(frame, wizard, inner),
    }

    // Validation error on the bottom row
    if let Some(error) = form.error() {
        let error_area = Rect::new(inner.x, inner.y + inner.height.saturating_sub(1), inner.width, 1);
        let error_text = Paragraph::new(error)
            .style(styles::error())
            .alignment(Alignment::Center);
        frame.render_widget(error_text, error_area);
    }

    // Calendar beside the modal while a date field has focus
    if let ActiveForm::Feature(wizard) = form {
        if wizard.current_field().is_date_picker() {
            let value = wizard.value(wizard.current_field());
            render_mini_calendar(frame, &value, app.today(), area, popup_area);
        }
    }
}

/// Field rows, then a spacer and the button row
fn form_rows(area: Rect, fields: usize) -> Vec<Rect> {
    let mut constraints = vec![Constraint::Length(3); fields];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(1));
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area)
        .to_vec()
}

fn render_product_form(frame: &mut Frame, form: &ProductForm, area: Rect) {
    let inputs: Vec<FormField> = form
        .fields()
        .iter()
        .copied()
        .filter(|f| !f.is_button())
        .collect();
    let rows = form_rows(area, inputs.len());
    let focused = form.current_field();

    for (field, row) in inputs.iter().zip(&rows) {
        render_text_field(frame, field.label(), form.value(*field), focused == *field, *row);
    }

    let buttons: Vec<FormField> = form.fields().iter().copied().filter(|f| f.is_button()).collect();
    render_form_buttons(frame, &buttons, focused, rows[inputs.len() + 1]);
}

fn render_feature_wizard(frame: &mut Frame, wizard: &FeatureWizard, area: Rect) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    // Step indicator
    let steps: Vec<Span> = WizardStep::all()
        .iter()
        .flat_map(|step| {
            let style = if *step == wizard.step {
                styles::title_accent()
            } else if step.index() < wizard.step.index() {
                styles::success()
            } else {
                styles::text_hint()
            };
            let marker = if step.index() < wizard.step.index() { "✓" } else { "●" };
            [
                Span::styled(format!(" {} {} ", marker, step.name()), style),
                Span::styled("─", styles::border_dim()),
            ]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(steps)).alignment(Alignment::Center),
        Rect::new(sections[0].x, sections[0].y + 1, sections[0].width, 1),
    );

    // Input fields of the current step
    let inputs: Vec<FormField> = wizard
        .fields()
        .iter()
        .copied()
        .filter(|f| !f.is_button())
        .collect();
    let rows = form_rows(sections[1], inputs.len());
    let focused = wizard.current_field();

    for (field, row) in inputs.iter().zip(&rows) {
        let value = wizard.value(*field);
        let is_focused = focused == *field;
        if field.is_date_picker() {
            render_date_picker_field(frame, field.label(), &value, is_focused, *row);
        } else if field.is_selector() {
            let color = status_color(wizard.status);
            render_selector_field(frame, field.label(), &value, color, is_focused, *row);
        } else {
            render_text_field(frame, field.label(), &value, is_focused, *row);
        }
    }

    // Review: one-line summary of what will be saved
    if wizard.step == WizardStep::Review {
        let summary = match wizard.build_update() {
            Ok(dto) => match (dto.start_date, dto.end_date) {
                (Some(start), Some(end)) => format!(
                    "\"{}\" · {} → {} · {}%",
                    dto.title,
                    start,
                    end,
                    dto.progress.unwrap_or(0)
                ),
                _ => format!("\"{}\" · unscheduled", dto.title),
            },
            Err(e) => e.to_string(),
        };
        if let Some(row) = rows.get(inputs.len()) {
            frame.render_widget(
                Paragraph::new(summary)
                    .style(styles::text_dim())
                    .alignment(Alignment::Center),
                *row,
            );
        }
    }

    // Buttons
    let buttons: Vec<FormField> = wizard.fields().iter().copied().filter(|f| f.is_button()).collect();
    render_form_buttons(frame, &buttons, focused, rows[inputs.len() + 1]);
}

fn field_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(10)])
        .split(area)
}

fn render_label(frame: &mut Frame, label: &str, area: Rect) {
    let label_text = Paragraph::new(format!("{}: ", label))
        .style(styles::form_label())
        .alignment(Alignment::Right);
    frame.render_widget(label_text, Rect::new(area.x, area.y + 1, area.width, 1));
}

fn input_block(is_focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(if is_focused {
            styles::border_focused()
        } else {
            styles::border_dim()
        })
}

fn input_style(is_focused: bool) -> Style {
    if is_focused {
        styles::form_input_focused()
    } else {
        styles::form_input()
    }
}

fn render_text_field(frame: &mut Frame, label: &str, value: &str, is_focused: bool, area: Rect) {
    let chunks = field_chunks(area);
    render_label(frame, label, chunks[0]);

    let cursor = if is_focused { "█" } else { "" };
    let input = Paragraph::new(format!(" {}{}", value, cursor))
        .style(input_style(is_focused))
        .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_date_picker_field(
    frame: &mut Frame,
    label: &str,
    value: &str,
    is_focused: bool,
    area: Rect,
) {
    let chunks = field_chunks(area);
    render_label(frame, label, chunks[0]);

    let hint = if is_focused { " ◀-7 ▲+1 ▼-1 +7▶" } else { "" };
    let shown = if value.is_empty() { "(none)" } else { value };
    let valid = value.is_empty() || models::parse_date(value).is_some();
    let style = if valid {
        input_style(is_focused)
    } else {
        input_style(is_focused).fg(colors::RED)
    };

    let input = Paragraph::new(format!(" {}{}", shown, hint))
        .style(style)
        .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_selector_field(
    frame: &mut Frame,
    label: &str,
    value: &str,
    color: Color,
    is_focused: bool,
    area: Rect,
) {
    let chunks = field_chunks(area);
    render_label(frame, label, chunks[0]);

    let arrows = if is_focused { " ◀▶" } else { "" };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {}", value), input_style(is_focused).fg(color)),
        Span::styled(arrows, input_style(is_focused)),
    ]))
    .style(input_style(is_focused))
    .block(input_block(is_focused));
    frame.render_widget(input, chunks[1]);
}

fn render_form_buttons(frame: &mut Frame, buttons: &[FormField], focused: FormField, area: Rect) {
    let mut constraints = vec![Constraint::Fill(1)];
    for _ in buttons {
        constraints.push(Constraint::Length(12));
        constraints.push(Constraint::Length(2));
    }
    constraints.push(Constraint::Fill(1));

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, button) in buttons.iter().enumerate() {
        let style = match (*button == focused, button) {
            (true, FormField::CancelButton) => styles::button_danger(),
            (true, _) => styles::button_focused(),
            (false, _) => styles::button(),
        };
        let widget = Paragraph::new(format!("[ {} ]", button.label()))
            .style(style)
            .alignment(Alignment::Center);
        frame.render_widget(widget, chunks[1 + i * 2]);
    }
}

// ============================================
// Dialogs
// ============================================

fn render_confirm_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dialog) = &app.confirm_dialog else {
        return;
    };

    let popup_area = centered_rect(45, 10, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .title_style(Style::default().fg(colors::RED).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::RED))
        .style(Style::default().bg(colors::BG_MEDIUM));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Message
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Buttons
        ])
        .margin(1)
        .split(inner);

    let message = Paragraph::new(dialog.message.as_str())
        .style(styles::text())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    frame.render_widget(message, chunks[0]);

    // Buttons: No on the left, Yes on the right
    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(10),
            Constraint::Percentage(10),
            Constraint::Length(10),
            Constraint::Percentage(25),
        ])
        .split(chunks[2]);

    let no_style = if !dialog.yes_focused {
        styles::button_focused()
    } else {
        styles::button()
    };
    let no_btn = Paragraph::new("[ No ]")
        .style(no_style)
        .alignment(Alignment::Center);
    frame.render_widget(no_btn, button_chunks[1]);

    let yes_style = if dialog.yes_focused {
        styles::button_danger()
    } else {
        styles::button()
    };
    let yes_btn = Paragraph::new("[ Yes ]")
        .style(yes_style)
        .alignment(Alignment::Center);
    frame.render_widget(yes_btn, button_chunks[3]);
}

fn render_error_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(popup) = &app.error_popup else {
        return;
    };

    let popup_width = (area.width * 60 / 100).clamp(30, 60);
    let popup_area = centered_rect(popup_width, 7, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", popup.title))
        .title_style(
            Style::default()
                .fg(Color::White)
                .bg(colors::RED)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::RED))
        .style(Style::default().bg(colors::BG_ERROR));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = Paragraph::new(popup.message.as_str())
        .style(styles::text())
        .wrap(Wrap { trim: true });
    frame.render_widget(text, inner);

    // Dismiss hint on the bottom border
    let hint = Paragraph::new("Press ESC or ENTER to dismiss")
        .style(styles::text_hint())
        .alignment(Alignment::Center);
    let hint_area = Rect::new(
        popup_area.x,
        popup_area.y + popup_area.height.saturating_sub(1),
        popup_area.width,
        1,
    );
    frame.render_widget(hint, hint_area);
}

fn help_section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(colors::PURPLE)
            .add_modifier(Modifier::BOLD),
    ))
}

fn help_line<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", keys), Style::default().fg(colors::BLUE)),
        Span::raw(action),
    ])
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 33, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(colors::BLUE)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        help_section("Navigation"),
        help_line("Tab / 1-3", "Switch tabs"),
        help_line("j/k Up/Down", "Move in lists / walk roadmap bars"),
        help_line("Enter", "Scope to product / feature details"),
        Line::from(""),
        help_section("Roadmap"),
        help_line("h/l Left/Right", "Previous / next period"),
        help_line("+ / -", "Zoom in / out (week … year)"),
        help_line("t", "Back to today"),
        help_line("PgUp / PgDn", "Scroll lanes"),
        help_line("s", "Cycle feature status"),
        Line::from(""),
        help_section("CRUD Operations"),
        help_line("c / n", "Create product or feature"),
        help_line("e", "Edit selected item"),
        help_line("d / Delete", "Delete selected item"),
        Line::from(""),
        help_section("Form Editing"),
        help_line("Tab", "Move to next field"),
        help_line("Up/Down", "Date picker: +/-1 day"),
        help_line("Left/Right", "Date: +/-7 days, status: cycle"),
        help_line("Enter", "Next field / press button"),
        help_line("Esc", "Cancel / Close form"),
        Line::from(""),
        help_section("General"),
        help_line("r", "Refresh data"),
        help_line("q / Ctrl+C", "Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .style(styles::text());

    frame.render_widget(paragraph, popup_area);
}

/// Helper to create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Mini calendar next to the form for the focused date field
fn render_mini_calendar(
    frame: &mut Frame,
    date_str: &str,
    today: NaiveDate,
    screen_area: Rect,
    form_area: Rect,
) {
    // Parse the date string; unreadable input shows the current month
    let date = models::parse_date(date_str).unwrap_or(today);

    let cal_width = 24;
    let cal_height = 10;

    // Right of the form if it fits, else left, else centered
    let cal_x = if form_area.x + form_area.width + cal_width + 2 < screen_area.width {
        form_area.x + form_area.width + 1
    } else if form_area.x >= cal_width + 2 {
        form_area.x - cal_width - 1
    } else {
        (screen_area.width.saturating_sub(cal_width)) / 2
    };

    let cal_y = form_area.y + 2;
    let cal_area = Rect::new(
        cal_x,
        cal_y.min(screen_area.height.saturating_sub(cal_height)),
        cal_width.min(screen_area.width),
        cal_height.min(screen_area.height),
    );

    frame.render_widget(Clear, cal_area);

    // Month grid bounds; December of the last representable year has no
    // following month, but has 31 days
    let first_of_month = date.with_day(1).unwrap_or(date);
    let days_in_month = first_of_month
        .checked_add_months(Months::new(1))
        .map(|next| (next - first_of_month).num_days() as u32)
        .unwrap_or(31);
    let first_weekday = first_of_month.weekday().num_days_from_monday() as usize;

    // Header: month name and weekday row
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{:^22}", date.format("%B %Y").to_string()),
            Style::default()
                .fg(colors::BLUE)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(" Mo Tu We Th Fr ", styles::text_dim()),
            Span::styled("Sa ", Style::default().fg(colors::BLUE)),
            Span::styled("Su", Style::default().fg(colors::RED)),
        ]),
    ];

    // Build week rows
    let mut day = 1u32;
    for week in 0..6 {
        if day > days_in_month {
            break;
        }
        let mut spans = vec![Span::raw(" ")];

        for weekday in 0..7 {
            if (week == 0 && weekday < first_weekday) || day > days_in_month {
                spans.push(Span::raw("   "));
                continue;
            }

            let this_day = first_of_month.with_day(day).unwrap_or(first_of_month);
            let style = if this_day == date {
                styles::selected()
            } else if this_day == today {
                Style::default()
                    .fg(colors::YELLOW)
                    .add_modifier(Modifier::BOLD)
            } else if weekday == 5 {
                Style::default().fg(colors::BLUE)
            } else if weekday == 6 {
                Style::default().fg(colors::RED)
            } else {
                styles::text()
            };

            spans.push(Span::styled(format!("{:2} ", day), style));
            day += 1;
        }

        lines.push(Line::from(spans));
    }

    let calendar = Paragraph::new(lines).block(
        Block::default()
            .title(" Calendar ")
            .title_style(styles::title())
            .borders(Borders::ALL)
            .border_style(styles::border_focused())
            .style(Style::default().bg(colors::BG_MEDIUM)),
    );

    frame.render_widget(calendar, cal_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::api::ApiMessage;
    use crate::models::ProductDto;
    use ratatui::{backend::TestBackend, Terminal};
    use uuid::Uuid;

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app_with_data() -> App {
        let mut app = App::default();
        let product = ProductDto {
            id: Uuid::from_u128(1),
            name: Some("Atlas".into()),
            description: Some("Core platform".into()),
            created_at: None,
        };
        let today = app.today();
        let feature = FeatureDto {
            id: Uuid::from_u128(2),
            product_id: product.id,
            title: Some("Onboarding".into()),
            description: None,
            status: FeatureStatus::Doing,
            start_date: Some(today),
            end_date: Some(today + Duration::days(5)),
            progress: Some(30),
        };
        app.handle_api_message(ApiMessage::ProductsLoaded(vec![product]));
        app.handle_api_message(ApiMessage::FeaturesLoaded(vec![feature]));
        app
    }

    #[test]
    fn test_roadmap_tab_shows_feature_bar() {
        let app = app_with_data();
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("Produtivo"));
        assert!(screen.contains("Onboarding"));
        assert!(screen.contains("System Log"));
    }

    #[test]
    fn test_products_tab_lists_products() {
        let mut app = app_with_data();
        app.active_tab = Tab::Products;
        let screen = draw(&app, 120, 30);
        assert!(screen.contains("Atlas"));
        assert!(screen.contains("0/1 done"));
    }

    #[test]
    fn test_wizard_modal_renders_step() {
        let mut app = app_with_data();
        app.active_tab = Tab::Features;
        app.open_create_form();
        let screen = draw(&app, 120, 40);
        assert!(screen.contains("New Feature"));
        assert!(screen.contains("Details"));
        assert!(screen.contains("Title"));
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let app = app_with_data();
        draw(&app, 20, 8);
    }
}
