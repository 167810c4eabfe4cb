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

use std::sync::mpsc::TryRecvError;
use std::time::Instant;

use crate::{
    app::App,
    form::{FieldChange, Form},
    panels::{Outbox, Panel, PanelCompletion, PanelId, Popup},
};

pub const ALERT_TITLE: &str = "FanControl command failed";

fn with_panel<F>(app: &mut App, f: F)
where
    F: FnOnce(&mut Panel, &mut Outbox),
{
    let mut out = Outbox::default();
    f(&mut app.panel, &mut out);
    app.dispatch(out);
}

// ===== Tabs =====
pub fn switch_panel(app: &mut App, id: PanelId) {
    if app.active() == id {
        return;
    }
    app.panel.deactivate();
    app.origin += 1;
    app.panel = Panel::open(id, &app.options);
    with_panel(app, |panel, out| panel.activate(out));
}

pub fn next_panel(app: &mut App) {
    let id = app.active().next();
    switch_panel(app, id);
}

pub fn prev_panel(app: &mut App) {
    let id = app.active().prev();
    switch_panel(app, id);
}

// ===== Popups =====
pub fn dismiss_popup(app: &mut App) {
    if !app.popups.is_empty() {
        app.popups.remove(0);
    }
}

pub fn confirm_popup(app: &mut App) {
    if !matches!(app.popups.first(), Some(Popup::Confirm { .. })) {
        return;
    }
    if let Popup::Confirm { action, .. } = app.popups.remove(0) {
        with_panel(app, |panel, out| panel.on_confirm(action, out));
    }
}

// ===== Completions =====
pub fn handle_completion(app: &mut App, completion: PanelCompletion) {
    app.in_flight = app.in_flight.saturating_sub(1);
    if completion.needs_alert() {
        let alert = Popup::message(ALERT_TITLE, completion.alert_text());
        // a failing poll must not stack identical alerts
        if !app.popups.contains(&alert) {
            app.popups.push(alert);
        }
    }
    if completion.origin != app.origin || completion.reply.panel() != app.active() {
        return;
    }
    with_panel(app, |panel, out| panel.on_completion(completion, out));
}

/// Applies every completion that has arrived. Returns how many were handled.
pub fn drain_completions(app: &mut App) -> usize {
    let mut handled = 0;
    loop {
        match app.completions.try_recv() {
            Ok(completion) => {
                handle_completion(app, completion);
                handled += 1;
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    handled
}

/// Drives the monitor timer. Polling is paused while a popup is shown.
pub fn tick(app: &mut App, now: Instant) {
    if app.popup().is_some() {
        return;
    }
    with_panel(app, |panel, out| panel.tick(now, out));
}

// ===== Forms =====
/// Applies `edit` to the form of the active panel and routes the resulting
/// change notification back to its owner.
pub fn edit_form<F>(app: &mut App, edit: F)
where
    F: FnOnce(&mut Form) -> Option<FieldChange>,
{
    with_panel(app, |panel, out| match panel {
        Panel::Monitor(p) => {
            if let Some(change) = p.form_mut().and_then(edit) {
                p.field_changed(change, out);
            }
        }
        Panel::Settings(p) => {
            if let Some(change) = p.form_mut().and_then(edit) {
                p.field_changed(change);
            }
        }
        Panel::Fans(p) => {
            if let Some(dialog) = p.dialog_mut() {
                if let Some(change) = edit(&mut dialog.form) {
                    dialog.field_changed(change);
                }
            }
        }
        Panel::Journal(_) => {}
    });
}

pub fn form_move(app: &mut App, delta: i32) {
    edit_form(app, |form| {
        form.move_selection(delta);
        None
    });
}

pub fn form_input(app: &mut App, c: char) {
    edit_form(app, |form| {
        form.input_char(c);
        None
    });
}

pub fn form_backspace(app: &mut App) {
    edit_form(app, |form| {
        form.backspace();
        None
    });
}

/// Esc inside a form. Returns whether an edit was cancelled.
pub fn form_cancel(app: &mut App) -> bool {
    let mut cancelled = false;
    edit_form(app, |form| {
        cancelled = form.cancel_edit();
        None
    });
    cancelled
}

// ===== Monitor =====
pub fn monitor_toggle_graph(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Monitor(p) = panel {
            p.toggle_graph(out);
        }
    });
}

pub fn monitor_refresh_graph(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Monitor(p) = panel {
            p.refresh_graph(out);
        }
    });
}

pub fn monitor_start_logging(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Monitor(p) = panel {
            p.start_logging(out);
        }
    });
}

pub fn monitor_stop_logging(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Monitor(p) = panel {
            p.stop_logging(out);
        }
    });
}

// ===== Fans =====
pub fn fans_move(app: &mut App, delta: i32) {
    if let Panel::Fans(p) = &mut app.panel {
        p.move_selection(delta);
    }
}

pub fn fans_add(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Fans(p) = panel {
            p.start_add(out);
        }
    });
}

pub fn fans_edit(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Fans(p) = panel {
            p.start_edit(out);
        }
    });
}

pub fn fans_open_menu(app: &mut App) {
    if let Panel::Fans(p) = &mut app.panel {
        p.open_menu();
    }
}

pub fn fans_close_menu(app: &mut App) {
    if let Panel::Fans(p) = &mut app.panel {
        p.close_menu();
    }
}

pub fn fans_delete(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Fans(p) = panel {
            p.request_delete(out);
        }
    });
}

pub fn fans_submit(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Fans(p) = panel {
            p.submit(out);
        }
    });
}

pub fn fans_close_dialog(app: &mut App) {
    if let Panel::Fans(p) = &mut app.panel {
        p.close_dialog();
    }
}

// ===== Settings =====
pub fn settings_commit(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Settings(p) = panel {
            p.commit(out);
        }
    });
}

// ===== Journal =====
pub fn journal_refresh(app: &mut App) {
    with_panel(app, |panel, out| {
        if let Panel::Journal(p) = panel {
            p.refresh(out);
        }
    });
}

pub fn journal_scroll(app: &mut App, delta: i32) {
    if let Panel::Journal(p) = &mut app.panel {
        p.scroll(delta);
    }
}
