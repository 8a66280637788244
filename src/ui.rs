use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders, Paragraph, Wrap,
    },
};
use crate::app::{App, InputMode};
use crate::auth::{AuthField, AuthMode};
use crate::chat::ChatRole;
use crate::navigation::{NavLink, Page};
use crate::viewer::Model;
use crate::workout::{PlanDisplay, GENERATING_TEXT};

const PLACEHOLDER: &str = "--";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    app.get_started_area = None;
    match app.current_page() {
        Some(Page::Landing) => render_landing(app, frame, body_area),
        Some(Page::Dashboard) => render_dashboard(app, frame, body_area),
        Some(Page::Coach) => render_coach(app, frame, body_area),
        Some(Page::Login) => render_login(app, frame, body_area),
        None => {}
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let brand = " GymER ";
    let mut spans = vec![Span::styled(brand, Style::default().fg(Color::Cyan).bold())];
    let mut x = area.x + brand.len() as u16;

    app.nav_areas.clear();
    for link in NavLink::header() {
        let label = format!(" [{}] {} ", link.shortcut(), link.label());
        let width = label.chars().count() as u16;
        let style = if app.navigator.is_active(link) {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        app.nav_areas.push((link, Rect::new(x, area.y, width, 1)));
        spans.push(Span::styled(label, style));
        x += width;
    }

    if let Some(email) = &app.signed_in_as {
        spans.push(Span::styled(format!("  {}", email), Style::default().fg(Color::Green)));
    }
    spans.push(Span::styled(
        format!("  v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = app
        .current_page()
        .map(|p| format!(" {} ", p.title().to_uppercase()))
        .unwrap_or_default();

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = match (app.current_page(), app.input_mode) {
        (Some(Page::Landing), _) => vec![("Enter", "get started"), ("q", "quit")],
        (Some(Page::Dashboard), InputMode::Normal) => {
            vec![("i", "edit focus"), ("g", "generate plan"), ("q", "quit")]
        }
        (Some(Page::Dashboard), InputMode::Editing) => {
            vec![("Enter", "generate"), ("Esc", "stop typing")]
        }
        (Some(Page::Coach), InputMode::Normal) => {
            vec![("i", "type"), ("j/k", "scroll"), ("q", "quit")]
        }
        (Some(Page::Coach), InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
        (Some(Page::Login), InputMode::Normal) => vec![
            ("Enter", "edit"),
            ("←/→", "log in / sign up"),
            ("Tab", "next field"),
            ("q", "quit"),
        ],
        (Some(Page::Login), InputMode::Editing) => vec![
            ("Enter", "submit"),
            ("Tab", "next field"),
            ("Esc", "stop typing"),
        ],
        (None, _) => vec![("q", "quit")],
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_landing(app: &mut App, frame: &mut Frame, area: Rect) {
    let [intro_area, models_area] = Layout::vertical([
        Constraint::Length(8),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "Your AI coach that reads your body first",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            "Sleep, heart rate and stress shape every workout GymER builds for you.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(Paragraph::new(intro).alignment(Alignment::Center), intro_area);

    // Call-to-action button
    let button_width = 17.min(intro_area.width);
    let button_area = Rect::new(
        intro_area.x + (intro_area.width.saturating_sub(button_width)) / 2,
        intro_area.y + 4,
        button_width,
        3.min(intro_area.height.saturating_sub(4)),
    );
    let button = Paragraph::new(NavLink::GetStarted.label())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bold())
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)));
    frame.render_widget(button, button_area);
    app.get_started_area = Some(button_area);

    let [body_area, skeleton_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(models_area);

    let body_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Body ");
    let skeleton_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Skeleton ");

    app.viewer.on_resize(body_block.inner(body_area), skeleton_block.inner(skeleton_area));

    render_model(frame, body_area, body_block, &app.viewer.body, false, Color::Blue);
    render_model(frame, skeleton_area, skeleton_block, &app.viewer.skeleton, true, Color::Gray);
}

fn render_model(frame: &mut Frame, area: Rect, block: Block, model: &Model, wireframe: bool, color: Color) {
    let rings = model.projected_rings();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-0.6, 0.6])
        .y_bounds([-0.6, 0.6])
        .paint(|ctx| {
            for ring in &rings {
                if wireframe {
                    for (i, &(x1, y1)) in ring.iter().enumerate() {
                        let (x2, y2) = ring[(i + 1) % ring.len()];
                        ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
                    }
                } else {
                    ctx.draw(&Points { coords: ring.as_slice(), color });
                }
            }
        });

    frame.render_widget(canvas, area);
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [metrics_area, input_area, plan_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    // Values stay blank until someone signs in
    let cards = match &app.displayed_metrics {
        Some(m) => [
            ("Sleep Quality", m.sleep_quality.clone()),
            ("Heart Rate", m.heart_rate.clone()),
            ("Stress Level", m.stress_level.clone()),
        ],
        None => [
            ("Sleep Quality", PLACEHOLDER.to_string()),
            ("Heart Rate", PLACEHOLDER.to_string()),
            ("Stress Level", PLACEHOLDER.to_string()),
        ],
    };
    let card_areas: [Rect; 3] = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(metrics_area);

    for ((title, value), card_area) in cards.into_iter().zip(card_areas) {
        let card = Paragraph::new(Line::from(Span::styled(value, Style::default().fg(Color::Yellow).bold())))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} ", title)),
            );
        frame.render_widget(card, card_area);
    }

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Workout focus (e.g. legs, upper body, cardio) ");
    // Typing always happens at the end of the focus text
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = scroll_input(
        &app.workout_focus,
        app.workout_focus.chars().count(),
        inner_width,
    );

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    let plan_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Your Recommendation ");

    let plan_text = match app.planner.display() {
        PlanDisplay::Idle => Text::from(Span::styled(
            "Press 'g' to generate a plan for today.",
            Style::default().fg(Color::DarkGray),
        )),
        PlanDisplay::Generating => {
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Text::from(Span::styled(
                format!("{}{}", GENERATING_TEXT.trim_end_matches('.'), dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
        PlanDisplay::Ready(plan) => Text::from(
            plan.paragraphs
                .iter()
                .map(|p| Line::from(p.as_str()))
                .collect::<Vec<_>>(),
        ),
        PlanDisplay::Failed(message) => Text::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )),
    };

    let plan = Paragraph::new(plan_text)
        .block(plan_block)
        .wrap(Wrap { trim: false });
    frame.render_widget(plan, plan_area);
}

fn render_coach(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" AI Coach ");

    let chat_text = if app.chat.history().is_empty() {
        Text::from(Span::styled(
            "Ask me about workouts, nutrition or sleep...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.chat.history() {
            let (label, color) = match msg.role {
                ChatRole::User => ("You:", Color::Cyan),
                ChatRole::Assistant => ("Coach:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(msg.content.as_str()));
            lines.push(Line::default());
        }

        if app.chat.is_waiting() {
            lines.push(Line::from(Span::styled(
                "Coach:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(" Message ");

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = scroll_input(&app.chat_input, app.chat_cursor, inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if editing {
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

/// Horizontal scrolling keeps the cursor visible in a one-line input.
/// Returns the visible slice and the cursor column within it.
fn scroll_input(text: &str, cursor_pos: usize, inner_width: usize) -> (String, u16) {
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = text
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    (visible_text, (cursor_pos - scroll_offset) as u16)
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

fn render_login(app: &mut App, frame: &mut Frame, area: Rect) {
    let form_width = 50.min(area.width);
    let form_area = Rect::new(
        area.x + (area.width.saturating_sub(form_width)) / 2,
        area.y,
        form_width,
        area.height,
    );

    let form = &app.auth;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", form.mode.title()));
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let tab_style = |mode: AuthMode| {
        if form.mode == mode {
            Style::default().bg(Color::Blue).fg(Color::White).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let tabs = Line::from(vec![
        Span::styled(" Log In ", tab_style(AuthMode::Login)),
        Span::raw("  "),
        Span::styled(" Sign Up ", tab_style(AuthMode::Signup)),
    ]);

    let editing = app.input_mode == InputMode::Editing;
    let mut lines = vec![tabs, Line::default()];
    let mut cursor = None;

    for field in form.fields() {
        let (label, value) = match field {
            AuthField::Email => ("Email", form.email.clone()),
            AuthField::Password => ("Password", mask(&form.password)),
            AuthField::ConfirmPassword => ("Confirm Password", mask(&form.confirm_password)),
        };
        let focused = form.focus() == Some(field);
        let label_style = if focused {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(label, label_style)));

        if focused && editing {
            cursor = Some((
                inner.x + 2 + value.chars().count() as u16,
                inner.y + lines.len() as u16,
            ));
        }
        lines.push(Line::from(vec![Span::raw("> "), Span::styled(value, Style::default().fg(Color::Cyan))]));
        lines.push(Line::default());
    }

    lines.push(Line::from(Span::styled(
        format!("[ {} ]", form.mode.button_text()),
        Style::default().fg(Color::White).bg(Color::Blue).bold(),
    )));

    if let Some(error) = &form.error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}
