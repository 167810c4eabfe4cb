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

mod ui_components;
mod ui_panels;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};

use crate::app::App;
use crate::panels::{Panel, PanelId, Popup};

pub use ui_components::centered_rect;

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(size);

    // header tabs
    let titles: Vec<Line> = PanelId::ALL
        .iter()
        .enumerate()
        .map(|(i, id)| Line::from(format!(" {} {} ", i + 1, id.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active().index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" FanControl "),
        )
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    match &app.panel {
        Panel::Monitor(p) => ui_panels::render_monitor(f, p, chunks[1]),
        Panel::Fans(p) => ui_panels::render_fans(f, p, chunks[1]),
        Panel::Settings(p) => ui_panels::render_settings(f, p, chunks[1]),
        Panel::Journal(p) => ui_panels::render_journal(f, p, chunks[1]),
    }

    // status line
    let mut status = app.status.clone();
    if app.busy() {
        status = format!("{} | working ({})", status, app.in_flight);
    }
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Gray)),
        chunks[2],
    );

    match app.popup() {
        Some(Popup::Message { title, text }) => ui_components::render_message_popup(f, title, text, size),
        Some(Popup::Confirm { title, text, .. }) => ui_components::render_confirm_popup(f, title, text, size),
        None => {}
    }
}
