/*
 * This file is part of Fanpanel.
 *
 * Copyright (C) 2025 Fanpanel contributors
 *
 * Fanpanel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fanpanel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fanpanel. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::form::{Field, FieldKind, Form};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, BorderType, Clear, Paragraph, Wrap},
    Frame,
};
use ratatui::layout::Rect;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Helper function to create a centered rectangle for popups
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

fn popup_frame(f: &mut Frame, title: &str, color: Color, size: Rect) -> [Rect; 2] {
    let popup_area = centered_rect(50, 30, size);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    f.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);
    [chunks[0], chunks[1]]
}

/// Render an informational notice
pub fn render_message_popup(f: &mut Frame, title: &str, text: &str, size: Rect) {
    let [body, footer] = popup_frame(f, title, Color::Yellow, size);

    let message = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(message, body);

    let instructions = Paragraph::new("Press Enter to dismiss")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(instructions, footer);
}

/// Render a yes/no confirmation
pub fn render_confirm_popup(f: &mut Frame, title: &str, text: &str, size: Rect) {
    let [body, footer] = popup_frame(f, title, Color::Cyan, size);

    let message = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(message, body);

    let instructions = Paragraph::new("Enter/y: confirm, Esc/n: cancel")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    f.render_widget(instructions, footer);
}

/// Busy indicator with a rotating glyph.
pub fn render_spinner(f: &mut Frame, text: &str, area: Rect) {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let glyph = SPINNER[(millis / 150) as usize % SPINNER.len()];
    let spinner = Paragraph::new(format!("{} {}", glyph, text))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    f.render_widget(spinner, rows[1]);
}

fn field_value(field: &Field, editing: Option<&str>) -> String {
    if let Some(buffer) = editing {
        return format!("{}_", buffer);
    }
    let value = field.display_value();
    match &field.kind {
        FieldKind::Select { .. } if field.editable() => format!("< {} >", value),
        FieldKind::Number { min: Some(min), max: Some(max), .. } if field.editable() => {
            format!("{}  ({}-{})", value, min, max)
        }
        _ => value,
    }
}

/// Draws a form as `label: value` rows, with the comment of the selected
/// field underneath.
pub fn render_form(f: &mut Frame, form: &Form, focused: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(area);

    let width = form.fields.iter().map(|fd| fd.label.chars().count()).max().unwrap_or(0);
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = focused && i == form.selected;
            let editing = if selected { form.edit_buffer.as_deref() } else { None };
            let marker = if selected { "> " } else { "  " };
            let mut style = Style::default();
            if !field.editable() {
                style = style.fg(Color::DarkGray);
            }
            if selected {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(format!("{}{:<width$}  ", marker, field.label, width = width), style),
                Span::styled(field_value(field, editing), style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some(field) = form.selected_field().filter(|_| focused) {
        let comment = Paragraph::new(field.comment.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray));
        f.render_widget(comment, chunks[1]);
    }
}
