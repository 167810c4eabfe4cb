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

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::form::Form;
use crate::handlers::*;
use crate::panels::{MonitorPanel, Panel, PanelId, Popup};
use crate::panels::monitor::MonitorView;

/// Main event handler that processes keyboard input. Returns `true` to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> anyhow::Result<bool> {
    let KeyEvent { code, modifiers, kind, .. } = key_event;
    if kind == KeyEventKind::Release {
        return Ok(false);
    }

    // Popups first (highest priority)
    if handle_popup_events(app, code) {
        return Ok(false);
    }

    // Dialogs, dropdowns and text edits owned by the panel
    if app.panel.captures_input() {
        handle_modal_events(app, code, modifiers);
        return Ok(false);
    }

    if let Some(quit) = handle_global_events(app, code, modifiers) {
        return Ok(quit);
    }

    match app.active() {
        PanelId::Monitor => handle_monitor_events(app, code),
        PanelId::Fans => handle_fans_events(app, code),
        PanelId::Settings => handle_settings_events(app, code),
        PanelId::Journal => handle_journal_events(app, code),
    }
    Ok(false)
}

fn handle_popup_events(app: &mut App, code: KeyCode) -> bool {
    match app.popup() {
        None => false,
        Some(Popup::Message { .. }) => {
            if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                dismiss_popup(app);
            }
            true
        }
        Some(Popup::Confirm { .. }) => {
            match code {
                KeyCode::Enter | KeyCode::Char('y') => confirm_popup(app),
                KeyCode::Esc | KeyCode::Char('n') => dismiss_popup(app),
                _ => {}
            }
            true
        }
    }
}

fn handle_modal_events(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if let Panel::Fans(p) = &app.panel {
        if p.menu_open() {
            match code {
                KeyCode::Enter => fans_delete(app),
                KeyCode::Esc => fans_close_menu(app),
                _ => {}
            }
            return;
        }
        let editing = p.dialog().is_some_and(|d| d.form.is_editing());
        if !editing {
            match code {
                KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => return fans_submit(app),
                KeyCode::F(2) => return fans_submit(app),
                KeyCode::Esc => return fans_close_dialog(app),
                _ => {}
            }
        }
    }
    handle_form_keys(app, code);
}

/// Generic form navigation and editing.
fn handle_form_keys(app: &mut App, code: KeyCode) {
    let editing = current_form(app).is_some_and(Form::is_editing);
    if editing {
        match code {
            KeyCode::Enter => edit_form(app, Form::activate),
            KeyCode::Esc => {
                form_cancel(app);
            }
            KeyCode::Backspace => form_backspace(app),
            KeyCode::Char(c) => form_input(app, c),
            _ => {}
        }
        return;
    }
    match code {
        KeyCode::Up => form_move(app, -1),
        KeyCode::Down => form_move(app, 1),
        KeyCode::Left => edit_form(app, |f| f.cycle(-1)),
        KeyCode::Right => edit_form(app, |f| f.cycle(1)),
        KeyCode::Char(' ') => edit_form(app, Form::toggle),
        KeyCode::Enter => edit_form(app, Form::activate),
        _ => {}
    }
}

fn current_form(app: &App) -> Option<&Form> {
    match &app.panel {
        Panel::Monitor(p) => p.form(),
        Panel::Settings(p) => p.form(),
        Panel::Fans(p) => p.dialog().map(|d| &d.form),
        Panel::Journal(_) => None,
    }
}

/// Tab switching and quit. `None` when the key is not global.
fn handle_global_events(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<bool> {
    match code {
        KeyCode::Char('q') => Some(true),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(true),
        KeyCode::Tab => {
            next_panel(app);
            Some(false)
        }
        KeyCode::BackTab => {
            prev_panel(app);
            Some(false)
        }
        KeyCode::Char(c @ '1'..='4') => {
            let n = c.to_digit(10).unwrap_or(1) as usize;
            if let Some(id) = PanelId::from_number(n) {
                switch_panel(app, id);
            }
            Some(false)
        }
        _ => None,
    }
}

fn monitor(app: &App) -> Option<&MonitorPanel> {
    match &app.panel {
        Panel::Monitor(p) => Some(p),
        _ => None,
    }
}

fn handle_monitor_events(app: &mut App, code: KeyCode) {
    let in_graph = monitor(app).is_some_and(|p| p.view() == MonitorView::Graph);
    match code {
        KeyCode::Char('g') => monitor_toggle_graph(app),
        KeyCode::Char('r') if in_graph => monitor_refresh_graph(app),
        KeyCode::Char('s') => monitor_start_logging(app),
        KeyCode::Char('x') => monitor_stop_logging(app),
        _ if !in_graph => handle_form_keys(app, code),
        _ => {}
    }
}

fn handle_fans_events(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => fans_move(app, -1),
        KeyCode::Down => fans_move(app, 1),
        KeyCode::Enter => fans_edit(app),
        KeyCode::Char('a') => fans_add(app),
        KeyCode::Char('d') => fans_open_menu(app),
        _ => {}
    }
}

fn handle_settings_events(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('u') => settings_commit(app),
        _ => handle_form_keys(app, code),
    }
}

fn handle_journal_events(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('r') => journal_refresh(app),
        KeyCode::Up => journal_scroll(app, -1),
        KeyCode::Down => journal_scroll(app, 1),
        KeyCode::PageUp => journal_scroll(app, -10),
        KeyCode::PageDown => journal_scroll(app, 10),
        _ => {}
    }
}
