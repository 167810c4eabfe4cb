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

//! Panel identifiers and the controllers behind each tab.
//!
//! Panels never touch the bridge directly. They push requests and popups into
//! an [`Outbox`] that the app drains after every call, and they receive the
//! matching completions through [`Panel::on_completion`].

pub mod fans;
pub mod journal;
pub mod monitor;
pub mod settings;

use std::time::{Duration, Instant};

use crate::bridge::{Completion, Request};

pub use fans::{FansPanel, FansReply};
pub use journal::{JournalPanel, JournalReply};
pub use monitor::{MonitorPanel, MonitorReply};
pub use settings::{SettingsPanel, SettingsReply};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Monitor,
    Fans,
    Settings,
    Journal,
}

impl PanelId {
    /// Tab order.
    pub const ALL: [PanelId; 4] = [PanelId::Monitor, PanelId::Fans, PanelId::Settings, PanelId::Journal];

    /// Exact, case-sensitive lookup by tab key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "monitor" => Some(PanelId::Monitor),
            "fans" => Some(PanelId::Fans),
            "settings" => Some(PanelId::Settings),
            "log" => Some(PanelId::Journal),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            PanelId::Monitor => "monitor",
            PanelId::Fans => "fans",
            PanelId::Settings => "settings",
            PanelId::Journal => "log",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelId::Monitor => "Monitor",
            PanelId::Fans => "Fans",
            PanelId::Settings => "Settings",
            PanelId::Journal => "Log",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&p| p == self).unwrap_or(0)
    }

    /// Panel for a `1`-based tab number.
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Reply token attached to every request, routed back with its completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Monitor(MonitorReply),
    Fans(FansReply),
    Settings(SettingsReply),
    Journal(JournalReply),
}

impl Reply {
    pub fn panel(&self) -> PanelId {
        match self {
            Reply::Monitor(_) => PanelId::Monitor,
            Reply::Fans(_) => PanelId::Fans,
            Reply::Settings(_) => PanelId::Settings,
            Reply::Journal(_) => PanelId::Journal,
        }
    }
}

pub type PanelRequest = Request<Reply>;
pub type PanelCompletion = Completion<Reply>;

/// Body and exit status of a finished call, as seen by a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub output: String,
    pub status: i32,
}

impl Response {
    pub fn ok(&self) -> bool {
        self.status == 0
    }
}

/// Something a panel asks the user before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    SaveFan,
    DeleteFan { key: String },
    UpdateSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    /// Informational notice, dismissed with Enter or Esc.
    Message { title: String, text: String },
    Confirm { title: String, text: String, action: ConfirmAction },
}

impl Popup {
    pub fn message(title: impl Into<String>, text: impl Into<String>) -> Self {
        Popup::Message { title: title.into(), text: text.into() }
    }

    pub fn confirm(title: impl Into<String>, text: impl Into<String>, action: ConfirmAction) -> Self {
        Popup::Confirm { title: title.into(), text: text.into(), action }
    }

    pub fn title(&self) -> &str {
        match self {
            Popup::Message { title, .. } | Popup::Confirm { title, .. } => title,
        }
    }
}

/// Side effects produced by a panel call.
#[derive(Debug, Default)]
pub struct Outbox {
    pub requests: Vec<PanelRequest>,
    pub popups: Vec<Popup>,
}

impl Outbox {
    pub fn request(&mut self, request: PanelRequest) {
        self.requests.push(request);
    }

    pub fn popup(&mut self, popup: Popup) {
        self.popups.push(popup);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.popups.is_empty()
    }
}

/// Settings panels need at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    pub refresh: Duration,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self { refresh: Duration::from_millis(1000) }
    }
}

pub enum Panel {
    Monitor(MonitorPanel),
    Fans(FansPanel),
    Settings(SettingsPanel),
    Journal(JournalPanel),
}

impl Panel {
    /// A fresh controller for one activation of `id`.
    pub fn open(id: PanelId, options: &PanelOptions) -> Self {
        match id {
            PanelId::Monitor => Panel::Monitor(MonitorPanel::new(options.refresh)),
            PanelId::Fans => Panel::Fans(FansPanel::new()),
            PanelId::Settings => Panel::Settings(SettingsPanel::new()),
            PanelId::Journal => Panel::Journal(JournalPanel::new()),
        }
    }

    pub fn id(&self) -> PanelId {
        match self {
            Panel::Monitor(_) => PanelId::Monitor,
            Panel::Fans(_) => PanelId::Fans,
            Panel::Settings(_) => PanelId::Settings,
            Panel::Journal(_) => PanelId::Journal,
        }
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        match self {
            Panel::Monitor(p) => p.activate(out),
            Panel::Fans(p) => p.activate(out),
            Panel::Settings(p) => p.activate(out),
            Panel::Journal(p) => p.activate(out),
        }
    }

    pub fn deactivate(&mut self) {
        if let Panel::Monitor(p) = self {
            p.deactivate();
        }
    }

    pub fn tick(&mut self, now: Instant, out: &mut Outbox) {
        if let Panel::Monitor(p) = self {
            p.tick(now, out);
        }
    }

    pub fn on_completion(&mut self, completion: PanelCompletion, out: &mut Outbox) {
        let Completion { reply, output, status, .. } = completion;
        let response = Response { output, status };
        match (self, reply) {
            (Panel::Monitor(p), Reply::Monitor(r)) => p.on_reply(r, response, out),
            (Panel::Fans(p), Reply::Fans(r)) => p.on_reply(r, response, out),
            (Panel::Settings(p), Reply::Settings(r)) => p.on_reply(r, response, out),
            (Panel::Journal(p), Reply::Journal(r)) => p.on_reply(r, response),
            _ => {}
        }
    }

    pub fn on_confirm(&mut self, action: ConfirmAction, out: &mut Outbox) {
        match (self, action) {
            (Panel::Fans(p), ConfirmAction::SaveFan) => p.confirm_save(out),
            (Panel::Fans(p), ConfirmAction::DeleteFan { key }) => p.confirm_delete(&key, out),
            (Panel::Settings(p), ConfirmAction::UpdateSettings) => p.confirm_update(out),
            _ => {}
        }
    }

    /// Whether the panel holds a modal of its own (dialog, dropdown or text edit).
    pub fn captures_input(&self) -> bool {
        match self {
            Panel::Monitor(p) => p.form().is_some_and(|f| f.is_editing()),
            Panel::Fans(p) => p.dialog().is_some() || p.menu_open(),
            Panel::Settings(p) => p.form().is_some_and(|f| f.is_editing()),
            Panel::Journal(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_is_exact() {
        assert_eq!(PanelId::from_key("monitor"), Some(PanelId::Monitor));
        assert_eq!(PanelId::from_key("fans"), Some(PanelId::Fans));
        assert_eq!(PanelId::from_key("settings"), Some(PanelId::Settings));
        assert_eq!(PanelId::from_key("log"), Some(PanelId::Journal));
        assert_eq!(PanelId::from_key("Monitor"), None);
        assert_eq!(PanelId::from_key("fancontrol-monitor"), None);
        assert_eq!(PanelId::from_key("fan"), None);
    }

    #[test]
    fn test_key_roundtrips_for_every_panel() {
        for id in PanelId::ALL {
            assert_eq!(PanelId::from_key(id.key()), Some(id));
        }
    }

    #[test]
    fn test_tab_navigation_wraps() {
        assert_eq!(PanelId::Monitor.prev(), PanelId::Journal);
        assert_eq!(PanelId::Journal.next(), PanelId::Monitor);
        assert_eq!(PanelId::Fans.next(), PanelId::Settings);
        assert_eq!(PanelId::from_number(2), Some(PanelId::Fans));
        assert_eq!(PanelId::from_number(0), None);
        assert_eq!(PanelId::from_number(5), None);
    }

    #[test]
    fn test_open_builds_matching_panel() {
        let options = PanelOptions::default();
        for id in PanelId::ALL {
            assert_eq!(Panel::open(id, &options).id(), id);
        }
    }

    #[test]
    fn test_completion_for_other_panel_is_ignored() {
        let mut panel = Panel::open(PanelId::Journal, &PanelOptions::default());
        let mut out = Outbox::default();
        panel.on_completion(
            Completion {
                tool: crate::bridge::Tool::Config,
                reply: Reply::Fans(FansReply::List),
                origin: 1,
                output: "{}".into(),
                status: 0,
                error: None,
            },
            &mut out,
        );
        assert!(out.is_empty());
    }
}
