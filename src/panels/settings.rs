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

//! Settings tab: global fancontrol settings with a pending-change set.

use serde_json::{json, Map, Value};

use crate::bridge::Request;
use crate::diff::build_opts;
use crate::form::{Field, FieldChange, FieldKind, Form, SelectOption};
use crate::logger;
use crate::model::{default_control, has_marked_default, parse_controls, FanControls, GlobalSettings};

use super::{ConfirmAction, Outbox, Popup, Reply, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsReply {
    Controls,
    General,
    Saved,
}

fn config(reply: SettingsReply, args: &[&str]) -> Request<Reply> {
    Request::config(Reply::Settings(reply), args)
}

pub struct SettingsPanel {
    ctrls: FanControls,
    reference: GlobalSettings,
    form: Option<Form>,
    /// Fields that differ from the last fetched settings.
    update: Map<String, Value>,
    /// Placeholder text shown until the next fetch completes.
    placeholder: Option<String>,
    no_fans: bool,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self {
            ctrls: FanControls::new(),
            reference: GlobalSettings::default(),
            form: None,
            update: Map::new(),
            placeholder: None,
            no_fans: false,
        }
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        self.fetch(out);
    }

    fn fetch(&mut self, out: &mut Outbox) {
        self.update.clear();
        out.request(config(SettingsReply::Controls, &["fns"]));
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut()
    }

    pub fn update(&self) -> &Map<String, Value> {
        &self.update
    }

    pub fn can_commit(&self) -> bool {
        !self.update.is_empty()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// The last fetch found no fan definitions, so no form was built.
    pub fn no_fans(&self) -> bool {
        self.no_fans
    }

    pub fn field_changed(&mut self, _change: FieldChange) {
        self.recompute();
    }

    fn recompute(&mut self) {
        if let Some(form) = self.form.as_ref() {
            self.update = build_opts(&form.values(), &self.reference.0, &[]);
        }
    }

    /// `u`: ask before sending the pending changes.
    pub fn commit(&mut self, out: &mut Outbox) {
        if self.form.is_none() || self.placeholder.is_some() {
            return;
        }
        if self.update.is_empty() {
            out.popup(Popup::message("No settings changed", "No update required!"));
            return;
        }
        let text = if self.update.contains_key("interval") {
            "Are you sure to update settings and restart fancontrol services?"
        } else {
            "Are you sure to update settings?"
        };
        out.popup(Popup::confirm("Update settings", text, ConfirmAction::UpdateSettings));
    }

    pub fn confirm_update(&mut self, out: &mut Outbox) {
        if self.update.is_empty() {
            return;
        }
        let payload = std::mem::take(&mut self.update);
        logger::log_event("settings_saved", json!({ "fields": payload.keys().collect::<Vec<_>>() }));
        self.form = None;
        self.placeholder = Some("Updating settings...".to_string());
        out.request(config(SettingsReply::Saved, &["set"]).with_payload(payload));
    }

    pub fn on_reply(&mut self, reply: SettingsReply, response: Response, out: &mut Outbox) {
        match reply {
            SettingsReply::Controls => {
                self.ctrls = parse_controls(&response.output);
                out.request(config(SettingsReply::General, &["gen"]));
            }
            SettingsReply::General => {
                self.reference = GlobalSettings::parse(&response.output);
                self.placeholder = None;
                if self.ctrls.is_empty() {
                    self.form = None;
                    self.update.clear();
                    self.no_fans = true;
                    out.popup(Popup::message("No valid fans found", "Please add fans first"));
                } else {
                    self.no_fans = false;
                    self.build_form();
                }
            }
            SettingsReply::Saved => self.fetch(out),
        }
    }

    fn build_form(&mut self) {
        self.update.clear();
        let options = self
            .ctrls
            .iter()
            .map(|(key, c)| SelectOption::new(key.clone(), if c.name.is_empty() { key.clone() } else { c.name.clone() }))
            .collect();
        let logger = default_control(&self.ctrls).unwrap_or_default().to_string();
        let settings = &self.reference;

        self.form = Some(Form::new(vec![
            Field::new("logger", "Fan control name", Value::String(logger.clone()), FieldKind::Select { options })
                .notify()
                .comment("Fan control as default for monitor and logger"),
            Field::new("loggerinterval", "Logger interval [s]", json!(settings.logger_interval()), FieldKind::bounded(0.0, 86400.0))
                .notify()
                .comment("Defines the interval between log samples in seconds. (default = 60 seconds)"),
            Field::new("farenheit", "Farenheit", json!(settings.farenheit()), FieldKind::Boolean)
                .notify()
                .comment("Display the temperature in °F. Default is false (temperature is displayed in °C)."),
            Field::new("interval", "Control interval [s]", json!(settings.interval()), FieldKind::bounded(0.0, 60.0))
                .notify()
                .comment("Defines the interval for the fan controller. (default = 10 seconds)"),
        ]));

        if !has_marked_default(&self.ctrls) && !logger.is_empty() {
            self.update.insert("logger".into(), Value::String(logger));
        }
    }
}
