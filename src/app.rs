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

use std::sync::mpsc::Receiver;

use crate::bridge::{Bridge, Completion};
use crate::panels::{Outbox, Panel, PanelId, PanelOptions, Popup, Reply};

pub const DEFAULT_STATUS: &str =
    "Tab/1-4: switch | ↑/↓: move | ←/→: change | Enter: edit | q: quit";

pub struct App {
    pub bridge: Bridge<Reply>,
    pub completions: Receiver<Completion<Reply>>,
    pub options: PanelOptions,
    pub panel: Panel,
    /// Activation counter; completions from older activations are dropped.
    pub origin: u64,
    /// Queued popups, the first one is shown.
    pub popups: Vec<Popup>,
    /// Calls submitted but not yet completed, across all activations.
    pub in_flight: usize,
    pub status: String,
}

impl App {
    /// Builds the app on the monitor tab. Nothing is fetched until
    /// [`App::start`].
    pub fn new(bridge: Bridge<Reply>, completions: Receiver<Completion<Reply>>, options: PanelOptions) -> Self {
        Self {
            bridge,
            completions,
            panel: Panel::open(PanelId::Monitor, &options),
            options,
            origin: 1,
            popups: Vec::new(),
            in_flight: 0,
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn start(&mut self) {
        let mut out = Outbox::default();
        self.panel.activate(&mut out);
        self.dispatch(out);
    }

    pub fn active(&self) -> PanelId {
        self.panel.id()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popups.first()
    }

    /// Submits a panel's requests under the current origin and queues its popups.
    pub fn dispatch(&mut self, out: Outbox) {
        let Outbox { requests, popups } = out;
        for request in requests {
            self.in_flight += 1;
            self.bridge.submit(request, self.origin);
        }
        self.popups.extend(popups);
    }

    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }
}
