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

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, TableState},
    Frame,
};

use super::ui_components::{centered_rect, render_form, render_spinner};
use crate::chart::{ChartSpec, Series};
use crate::panels::monitor::MonitorView;
use crate::panels::{FansPanel, JournalPanel, MonitorPanel, SettingsPanel};

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {} ", title))
}

fn button(key: &str, label: &str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("[{}] {}  ", key, label), style)
}

fn split_footer(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

// ===== Monitor =====
pub fn render_monitor(f: &mut Frame, panel: &MonitorPanel, area: Rect) {
    match panel.view() {
        MonitorView::Form => render_monitor_form(f, panel, area),
        MonitorView::Graph => render_monitor_graph(f, panel, area),
    }
}

fn render_monitor_form(f: &mut Frame, panel: &MonitorPanel, area: Rect) {
    let block = panel_block("Monitor");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let (body, footer) = split_footer(inner);

    match panel.form() {
        Some(form) => render_form(f, form, true, body),
        None if panel.no_fans() => {
            f.render_widget(
                Paragraph::new("No fans configured. Add one on the Fans tab.").alignment(Alignment::Center),
                body,
            );
        }
        None => render_spinner(f, "Loading...", body),
    }

    let buttons = Line::from(vec![
        button("g", "Graph", true),
        button("s", "Start logging", panel.start_enabled()),
        button("x", "Stop logging", panel.stop_enabled()),
    ]);
    f.render_widget(Paragraph::new(buttons), footer);
}

fn render_monitor_graph(f: &mut Frame, panel: &MonitorPanel, area: Rect) {
    let title = panel.chart().map(|c| c.title.as_str()).unwrap_or("Monitor - Graph");
    let block = panel_block(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let (body, footer) = split_footer(inner);

    if panel.graph_loading() {
        render_spinner(f, "Loading log data...", body);
    } else {
        match panel.chart() {
            Some(spec) => render_chart(f, spec, body),
            None => f.render_widget(
                Paragraph::new("No log data available").alignment(Alignment::Center),
                body,
            ),
        }
    }

    let buttons = Line::from(vec![
        button("g", "Monitor", true),
        button("r", "Refresh", !panel.graph_loading()),
        button("s", "Start logging", panel.start_enabled()),
        button("x", "Stop logging", panel.stop_enabled()),
    ]);
    f.render_widget(Paragraph::new(buttons), footer);
}

/// Two charts stacked on a shared time axis: temperature on top, fan speed below.
fn render_chart(f: &mut Frame, spec: &ChartSpec, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    render_series(f, spec, &spec.temp, Color::Red, rows[0]);
    render_series(f, spec, &spec.ctrl, Color::Blue, rows[1]);
}

fn render_series(f: &mut Frame, spec: &ChartSpec, series: &Series, color: Color, area: Rect) {
    let x_bounds = [spec.scale.min as f64, spec.scale.max.max(spec.scale.min + 1) as f64];
    let x_labels: Vec<Span> = spec.scale.ticks().into_iter().map(|t| Span::raw(t.to_string())).collect();
    let y_bounds = series.bounds();
    let y_labels: Vec<Span> = [y_bounds[0], (y_bounds[0] + y_bounds[1]) / 2.0, y_bounds[1]]
        .iter()
        .map(|v| Span::raw(format!("{:.0}", v)))
        .collect();

    let dataset = Dataset::default()
        .name(series.label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&series.points);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(spec.x_title)
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(series.label.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

// ===== Fans =====
pub fn render_fans(f: &mut Frame, panel: &FansPanel, area: Rect) {
    let block = panel_block("Fans");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let (body, footer) = split_footer(inner);

    if let Some(text) = panel.busy() {
        render_spinner(f, text, body);
    } else if panel.loading() && panel.ctrls().is_empty() {
        render_spinner(f, "Loading...", body);
    } else {
        let header = Row::new(vec!["Friendly name", "Control", "Device", "Logger"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = panel
            .ctrls()
            .iter()
            .map(|(key, c)| {
                Row::new(vec![
                    Cell::from(c.name.clone()),
                    Cell::from(key.clone()),
                    Cell::from(c.device.clone()),
                    Cell::from(if c.default { "yes" } else { "" }),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [Constraint::Percentage(30), Constraint::Percentage(30), Constraint::Percentage(25), Constraint::Percentage(15)],
        )
        .header(header)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
        let mut state = TableState::default();
        if !panel.ctrls().is_empty() {
            state.select(Some(panel.selected()));
        }
        f.render_stateful_widget(table, body, &mut state);
    }

    let idle = panel.busy().is_none();
    let footer_line = Line::from(vec![
        button("a", "Add", idle),
        button("Enter", "Edit", idle && !panel.ctrls().is_empty()),
        button("d", "Actions", idle && !panel.ctrls().is_empty()),
    ]);
    f.render_widget(Paragraph::new(footer_line), footer);

    if panel.menu_open() {
        let menu_area = centered_rect(20, 20, area);
        f.render_widget(Clear, menu_area);
        let menu = Paragraph::new(vec![
            Line::from(Span::styled("> Delete", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled("Esc: close", Style::default().fg(Color::Gray))),
        ])
        .block(panel_block("Actions"));
        f.render_widget(menu, menu_area);
    }

    if let Some(dialog) = panel.dialog() {
        let dialog_area = centered_rect(80, 85, area);
        f.render_widget(Clear, dialog_area);
        let block = panel_block(&dialog.title).border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(dialog_area);
        f.render_widget(block, dialog_area);
        let (body, footer) = split_footer(inner);
        render_form(f, &dialog.form, true, body);
        f.render_widget(
            Paragraph::new("Ctrl-S/F2: save | Esc: close")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            footer,
        );
    }
}

// ===== Settings =====
pub fn render_settings(f: &mut Frame, panel: &SettingsPanel, area: Rect) {
    let block = panel_block("Settings");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let (body, footer) = split_footer(inner);

    match (panel.placeholder(), panel.form()) {
        (Some(text), _) => render_spinner(f, text, body),
        (None, Some(form)) => render_form(f, form, true, body),
        (None, None) if panel.no_fans() => {
            f.render_widget(
                Paragraph::new("No fans configured. Add one on the Fans tab.").alignment(Alignment::Center),
                body,
            );
        }
        (None, None) => render_spinner(f, "Loading...", body),
    }

    let footer_line = Line::from(vec![button("u", "Update", panel.can_commit())]);
    f.render_widget(Paragraph::new(footer_line), footer);
}

// ===== Journal =====
pub fn render_journal(f: &mut Frame, panel: &JournalPanel, area: Rect) {
    let block = panel_block("Log");
    let inner = block.inner(area);
    f.render_widget(block, area);
    let (body, footer) = split_footer(inner);

    if panel.loading() {
        render_spinner(f, "Loading...", body);
    } else {
        let header = Row::new(vec!["Date", "App", "Message"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = panel
            .lines()
            .iter()
            .skip(panel.offset())
            .map(|l| Row::new(vec![l.date.clone(), l.app.clone(), l.log.trim().to_string()]))
            .collect();
        let table = Table::new(rows, [Constraint::Length(16), Constraint::Length(14), Constraint::Min(10)])
            .header(header);
        f.render_widget(table, body);
    }

    let footer_line = Line::from(vec![
        button("r", "Refresh", !panel.loading()),
        Span::styled(
            format!("{} line(s)", panel.lines().len()),
            Style::default().fg(Color::Gray),
        ),
    ]);
    f.render_widget(Paragraph::new(footer_line), footer);
}
