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

//! Fans tab: the fan definition table and the add/edit dialog.

use serde_json::{json, Map, Value};

use crate::bridge::Request;
use crate::diff::{build_opts, normalize};
use crate::form::{Field, FieldChange, FieldKind, Form, SelectOption};
use crate::logger;
use crate::model::{new_fan_record, parse_controls, parse_fan_record, FanControls, Snapshot};
use crate::sensors::{available_pwms, name_taken, resolve_rpm};

use super::{ConfirmAction, Outbox, Popup, Reply, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FansReply {
    List,
    /// Snapshot for a dialog. `key` is the fan being edited.
    Snapshot { key: Option<String> },
    Record { key: String },
    Saved,
    Deleted,
}

/// Open add/edit dialog.
#[derive(Debug, Clone)]
pub struct FanDialog {
    pub title: String,
    /// Control key of the fan being edited, `None` when adding.
    pub key: Option<String>,
    pub form: Form,
    snapshot: Snapshot,
    reference: Option<Map<String, Value>>,
    /// Validated change waiting for confirmation.
    pending: Option<(String, Map<String, Value>)>,
}

impl FanDialog {
    fn build(snapshot: Snapshot, key: Option<String>, record: Option<Map<String, Value>>) -> Self {
        let data = record.clone().unwrap_or_else(new_fan_record);
        let unit = if snapshot.farenheit { "°F" } else { "°C" };

        let pwm_keys = available_pwms(&snapshot.pwms, &snapshot.ctrls, key.as_deref());
        let pwm_options: Vec<SelectOption> = pwm_keys
            .iter()
            .map(|k| SelectOption::new(k.clone(), snapshot.pwms.get(k).cloned().unwrap_or_default()))
            .collect();
        let rpm_options = labelled(&snapshot.rpms);
        let temp_options = labelled(&snapshot.temps);

        let default_pwm = key.clone().or_else(|| pwm_keys.first().cloned()).unwrap_or_default();
        // a recorded input only counts while the sensor is still offered
        let default_rpm = non_empty(data.get("fan"))
            .filter(|fan| snapshot.rpms.contains_key(fan))
            .or_else(|| {
                pwm_keys
                    .first()
                    .and_then(|pwm| resolve_rpm(snapshot.rpms.keys(), pwm))
                    .map(str::to_string)
            })
            .or_else(|| snapshot.rpms.keys().next().cloned())
            .unwrap_or_default();
        let default_temp = non_empty(data.get("temp"))
            .filter(|temp| snapshot.temps.contains_key(temp))
            .or_else(|| snapshot.temps.keys().next().cloned())
            .unwrap_or_default();

        let number = |param: &str, label: String, max: f64, comment: &str| {
            let value = data.get(param).cloned().unwrap_or(Value::from(0));
            Field::new(param, label, value, FieldKind::bounded(0.0, max)).comment(comment)
        };

        let form = Form::new(vec![
            Field::new("warning", "Caution", json!("Edit settings at own risk!"), FieldKind::Text)
                .readonly(true)
                .comment("Preferably use pwmconfig on commandline to setup fans."),
            Field::new("name", "Friendly name", data.get("name").cloned().unwrap_or(json!("")), FieldKind::Text)
                .comment("Enter a friendly name for this fan"),
            Field::new("pwm", "Fan PWM control", Value::String(default_pwm), FieldKind::Select { options: pwm_options })
                .notify()
                .comment("Select fan PWM control to use"),
            Field::new("fan", "Fan RPM input", Value::String(default_rpm), FieldKind::Select { options: rpm_options })
                .comment("Select fan RPM input to use"),
            Field::new("temp", "Temperature input", Value::String(default_temp), FieldKind::Select { options: temp_options })
                .comment("Select temperature input to use for fan control"),
            number("mintemp", format!("Minimum temperature [{}]", unit), 250.0,
                "The temperature below which the fan gets switched to minimum speed."),
            number("maxtemp", format!("Maximum temperature [{}]", unit), 250.0,
                "The temperature over which the fan gets switched to maximum speed."),
            number("minstart", "Minimum start PWM".into(), 255.0,
                "Sets the minimum speed at which the fan begins spinning."),
            number("minstop", "Minimum stop PWM".into(), 255.0,
                "The minimum speed at which the fan still spins."),
            number("minpwm", "Minimum PWM".into(), 255.0,
                "The PWM value to use when the temperature is below mintemp. Default = 0 (stopped fan)."),
            number("maxpwm", "Maximum PWM".into(), 255.0,
                "The PWM value to use when the temperature is over maxtemp. Default = 255 (full speed)."),
        ]);

        let title = match key.as_deref() {
            None => "Add fan".to_string(),
            Some(k) => match snapshot.ctrls.get(k).map(|c| c.name.as_str()) {
                Some(name) if !name.is_empty() => format!("Edit fan: {} [{}]", name, k),
                _ => format!("Edit fan: {}", k),
            },
        };

        Self { title, key, form, snapshot, reference: record, pending: None }
    }

    pub fn is_edit(&self) -> bool {
        self.key.is_some()
    }

    /// Picks the RPM input that matches a newly chosen PWM control.
    pub fn field_changed(&mut self, change: FieldChange) {
        if change.param != "pwm" {
            return;
        }
        let pwm = normalize(&change.value);
        if let Some(rpm) = resolve_rpm(self.snapshot.rpms.keys(), &pwm) {
            let rpm = Value::String(rpm.to_string());
            self.form.update_data([("fan".to_string(), rpm)]);
        }
    }

    /// Checks the dialog and returns the control key and payload to send, or
    /// the notice explaining why nothing will be sent.
    pub fn validate(&self) -> Result<(String, Map<String, Value>), Popup> {
        let values = self.form.values();
        let pwm = values.get("pwm").map(normalize).unwrap_or_default();
        if pwm.is_empty() {
            return Err(Popup::message("Empty fan", "Please enter a valid name for the fan"));
        }
        let name = values.get("name").map(normalize).unwrap_or_default();
        if name_taken(&name, &self.snapshot.ctrls, self.key.as_deref()) {
            return Err(Popup::message(
                format!("Existing fan name {} [{}]", name, pwm),
                "Please enter a unique name for the fan",
            ));
        }
        let empty = Map::new();
        let reference = self.reference.as_ref().unwrap_or(&empty);
        let opts = build_opts(&values, reference, &["pwm"]);
        if opts.is_empty() {
            return Err(Popup::message("No changes to fan", "fan not edited"));
        }
        Ok((pwm, opts))
    }

    fn name(&self) -> String {
        self.form.value("name").map(normalize).unwrap_or_default()
    }
}

fn labelled(map: &std::collections::BTreeMap<String, String>) -> Vec<SelectOption> {
    map.iter().map(|(k, v)| SelectOption::new(k.clone(), v.clone())).collect()
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value.map(normalize).filter(|s| !s.is_empty())
}

const LOADING: &str = "Loading...";

fn config(reply: FansReply, args: &[&str]) -> Request<Reply> {
    Request::config(Reply::Fans(reply), args)
}

pub struct FansPanel {
    ctrls: FanControls,
    selected: usize,
    /// Spinner text while a mutating call is outstanding.
    busy: Option<String>,
    loading: bool,
    menu_open: bool,
    dialog: Option<FanDialog>,
    /// Snapshot fetched for an edit, waiting for the fan record.
    staged: Option<Snapshot>,
}

impl Default for FansPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl FansPanel {
    pub fn new() -> Self {
        Self {
            ctrls: FanControls::new(),
            selected: 0,
            busy: None,
            loading: false,
            menu_open: false,
            dialog: None,
            staged: None,
        }
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        self.refresh(out);
    }

    fn refresh(&mut self, out: &mut Outbox) {
        self.loading = true;
        out.request(config(FansReply::List, &["fns"]));
    }

    pub fn ctrls(&self) -> &FanControls {
        &self.ctrls
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn busy(&self) -> Option<&str> {
        self.busy.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn dialog(&self) -> Option<&FanDialog> {
        self.dialog.as_ref()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut FanDialog> {
        self.dialog.as_mut()
    }

    fn selected_key(&self) -> Option<String> {
        self.ctrls.keys().nth(self.selected).cloned()
    }

    fn idle(&self) -> bool {
        self.busy.is_none() && self.dialog.is_none()
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.ctrls.is_empty() {
            return;
        }
        let last = self.ctrls.len() as i32 - 1;
        self.selected = (self.selected as i32 + delta).clamp(0, last) as usize;
    }

    /// Fetches the sensor inventory for a new fan. The panel stays busy
    /// until the dialog opens.
    pub fn start_add(&mut self, out: &mut Outbox) {
        if self.idle() {
            self.busy = Some(LOADING.to_string());
            out.request(config(FansReply::Snapshot { key: None }, &["all"]));
        }
    }

    pub fn start_edit(&mut self, out: &mut Outbox) {
        if !self.idle() {
            return;
        }
        if let Some(key) = self.selected_key() {
            self.busy = Some(LOADING.to_string());
            out.request(config(FansReply::Snapshot { key: Some(key) }, &["all"]));
        }
    }

    pub fn open_menu(&mut self) {
        if self.idle() && !self.ctrls.is_empty() {
            self.menu_open = true;
        }
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// "Delete" from the row dropdown.
    pub fn request_delete(&mut self, out: &mut Outbox) {
        self.menu_open = false;
        let Some(key) = self.selected_key() else {
            return;
        };
        let name = self.ctrls.get(&key).map(|c| c.name.clone()).unwrap_or_default();
        out.popup(Popup::confirm(
            format!("Delete {}", name),
            format!(
                "Are you sure to delete {} [{}]? This item will be deleted from database!",
                name, key
            ),
            ConfirmAction::DeleteFan { key },
        ));
    }

    pub fn confirm_delete(&mut self, key: &str, out: &mut Outbox) {
        self.busy = Some("Deleting...".to_string());
        logger::log_event("fan_deleted", json!({ "key": key }));
        out.request(config(FansReply::Deleted, &["del", key]));
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Validates the dialog and asks for confirmation.
    pub fn submit(&mut self, out: &mut Outbox) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match dialog.validate() {
            Ok(pending) => {
                let fan = format!("{} [{}]", dialog.name(), pending.0);
                let (title, verb) = if dialog.is_edit() { ("Edit", "edit") } else { ("Add", "add") };
                out.popup(Popup::confirm(
                    format!("{} fan {}", title, fan),
                    format!("Are you sure to {} {} as fan?", verb, fan),
                    ConfirmAction::SaveFan,
                ));
                dialog.pending = Some(pending);
            }
            Err(notice) => out.popup(notice),
        }
    }

    pub fn confirm_save(&mut self, out: &mut Outbox) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        let Some((pwm, opts)) = dialog.pending.take() else {
            self.dialog = Some(dialog);
            return;
        };
        self.busy = Some(if dialog.is_edit() { "Editing..." } else { "Adding..." }.to_string());
        logger::log_event("fan_saved", json!({ "key": pwm, "fields": opts.keys().collect::<Vec<_>>() }));
        out.request(config(FansReply::Saved, &["set", &pwm]).with_payload(opts));
    }

    pub fn on_reply(&mut self, reply: FansReply, response: Response, out: &mut Outbox) {
        match reply {
            FansReply::List => {
                self.loading = false;
                self.busy = None;
                self.ctrls = parse_controls(&response.output);
                if self.selected >= self.ctrls.len() {
                    self.selected = self.ctrls.len().saturating_sub(1);
                }
            }
            FansReply::Snapshot { key: None } => {
                let snapshot = Snapshot::parse(&response.output);
                self.busy = None;
                self.dialog = Some(FanDialog::build(snapshot, None, None));
            }
            FansReply::Snapshot { key: Some(key) } => {
                self.staged = Some(Snapshot::parse(&response.output));
                out.request(config(FansReply::Record { key: key.clone() }, &["get", &key]));
            }
            FansReply::Record { key } => {
                let snapshot = self.staged.take().unwrap_or_default();
                let record = parse_fan_record(&response.output);
                self.busy = None;
                self.dialog = Some(FanDialog::build(snapshot, Some(key), Some(record)));
            }
            FansReply::Saved | FansReply::Deleted => self.refresh(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn ok(output: &str) -> Response {
        Response { output: output.to_string(), status: 0 }
    }

    fn listed() -> FansPanel {
        let mut panel = FansPanel::new();
        let mut out = Outbox::default();
        panel.activate(&mut out);
        panel.on_reply(FansReply::List, ok(FNS_JSON), &mut out);
        panel
    }

    fn add_dialog() -> FansPanel {
        let mut panel = listed();
        let mut out = Outbox::default();
        panel.start_add(&mut out);
        panel.on_reply(FansReply::Snapshot { key: None }, ok(ALL_JSON), &mut out);
        panel
    }

    fn edit_dialog() -> FansPanel {
        let mut panel = listed();
        let mut out = Outbox::default();
        panel.start_edit(&mut out);
        assert_eq!(out.requests[0].args, vec!["all"]);
        panel.on_reply(FansReply::Snapshot { key: Some("hwmon0/pwm1".into()) }, ok(ALL_JSON), &mut out);
        assert_eq!(out.requests[1].args, vec!["get", "hwmon0/pwm1"]);
        panel.on_reply(FansReply::Record { key: "hwmon0/pwm1".into() }, ok(FAN_RECORD_JSON), &mut out);
        panel
    }

    fn set_field(panel: &mut FansPanel, param: &str, value: Value) {
        let dialog = panel.dialog_mut().unwrap();
        dialog.form.update_data([(param.to_string(), value)]);
    }

    #[test]
    fn test_list_is_sorted_by_key() {
        let panel = listed();
        let keys: Vec<_> = panel.ctrls().keys().cloned().collect();
        assert_eq!(keys, vec!["hwmon0/pwm1", "hwmon0/pwm2"]);
        assert!(!panel.loading());
    }

    #[test]
    fn test_add_dialog_offers_only_unused_pwms() {
        let panel = add_dialog();
        let dialog = panel.dialog().unwrap();
        assert_eq!(dialog.title, "Add fan");
        let FieldKind::Select { options } = &dialog.form.field("pwm").unwrap().kind else {
            panic!("pwm is a select");
        };
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["hwmon0/pwm3"]);
        // RPM resolved from the first available PWM
        assert_eq!(dialog.form.value("fan"), Some(&json!("hwmon0/fan3_input")));
        assert_eq!(dialog.form.value("mintemp"), Some(&json!(45)));
    }

    #[test]
    fn test_edit_dialog_keeps_own_pwm_selectable() {
        let panel = edit_dialog();
        let dialog = panel.dialog().unwrap();
        assert_eq!(dialog.title, "Edit fan: CPU [hwmon0/pwm1]");
        assert_eq!(dialog.form.value("pwm"), Some(&json!("hwmon0/pwm1")));
        let FieldKind::Select { options } = &dialog.form.field("pwm").unwrap().kind else {
            panic!("pwm is a select");
        };
        assert!(options.iter().any(|o| o.value == "hwmon0/pwm1"));
        assert!(!options.iter().any(|o| o.value == "hwmon0/pwm2"));
        assert_eq!(dialog.form.value("fan"), Some(&json!("hwmon0/fan1_input")));
        // filled in by the record parser
        assert_eq!(dialog.form.value("maxpwm"), Some(&json!(255)));
    }

    #[test]
    fn test_edit_drops_inputs_no_longer_offered() {
        let mut panel = listed();
        let mut out = Outbox::default();
        panel.start_edit(&mut out);
        panel.on_reply(FansReply::Snapshot { key: Some("hwmon0/pwm1".into()) }, ok(ALL_JSON), &mut out);
        let record = r#"{"name": "CPU", "fan": "hwmon5/fan9_input", "temp": "hwmon5/temp9_input"}"#;
        panel.on_reply(FansReply::Record { key: "hwmon0/pwm1".into() }, ok(record), &mut out);

        let dialog = panel.dialog().unwrap();
        assert_eq!(dialog.form.value("fan"), Some(&json!("hwmon0/fan1_input")));
        assert_eq!(dialog.form.value("temp"), Some(&json!("hwmon0/temp1_input")));
    }

    #[test]
    fn test_dialog_fetch_blocks_repeated_opens() {
        let mut panel = listed();
        let mut out = Outbox::default();
        panel.start_add(&mut out);
        assert_eq!(panel.busy(), Some("Loading..."));
        panel.start_add(&mut out);
        panel.start_edit(&mut out);
        assert_eq!(out.requests.len(), 1);

        panel.on_reply(FansReply::Snapshot { key: None }, ok(ALL_JSON), &mut out);
        assert_eq!(panel.busy(), None);
        assert!(panel.dialog().is_some());

        let mut panel = listed();
        panel.start_edit(&mut out);
        assert_eq!(panel.busy(), Some("Loading..."));
        panel.on_reply(FansReply::Snapshot { key: Some("hwmon0/pwm1".into()) }, ok(ALL_JSON), &mut out);
        // still waiting for the record
        assert_eq!(panel.busy(), Some("Loading..."));
        assert!(panel.dialog().is_none());
        panel.on_reply(FansReply::Record { key: "hwmon0/pwm1".into() }, ok(FAN_RECORD_JSON), &mut out);
        assert_eq!(panel.busy(), None);
        assert!(panel.dialog().is_some());
    }

    #[test]
    fn test_pwm_change_resolves_rpm() {
        let mut panel = edit_dialog();
        let dialog = panel.dialog_mut().unwrap();
        dialog.field_changed(FieldChange { param: "pwm".into(), value: json!("hwmon0/pwm3") });
        assert_eq!(dialog.form.value("fan"), Some(&json!("hwmon0/fan3_input")));
        // no match leaves the choice alone
        dialog.field_changed(FieldChange { param: "pwm".into(), value: json!("hwmon9/pwm7") });
        assert_eq!(dialog.form.value("fan"), Some(&json!("hwmon0/fan3_input")));
    }

    #[test]
    fn test_duplicate_name_rejected_on_add() {
        let mut panel = add_dialog();
        set_field(&mut panel, "name", json!("CPU"));
        let mut out = Outbox::default();
        panel.submit(&mut out);
        assert_eq!(
            out.popups,
            vec![Popup::message(
                "Existing fan name CPU [hwmon0/pwm3]",
                "Please enter a unique name for the fan"
            )]
        );
        assert!(out.requests.is_empty());
    }

    #[test]
    fn test_unchanged_edit_reports_no_changes() {
        let mut panel = edit_dialog();
        let mut out = Outbox::default();
        panel.submit(&mut out);
        assert_eq!(out.popups, vec![Popup::message("No changes to fan", "fan not edited")]);
    }

    #[test]
    fn test_empty_pwm_rejected() {
        let mut panel = add_dialog();
        set_field(&mut panel, "pwm", json!(""));
        let mut out = Outbox::default();
        panel.submit(&mut out);
        assert_eq!(out.popups, vec![Popup::message("Empty fan", "Please enter a valid name for the fan")]);
    }

    #[test]
    fn test_edit_keeping_name_sends_only_changes() {
        let mut panel = edit_dialog();
        set_field(&mut panel, "maxtemp", json!(70));
        let mut out = Outbox::default();
        panel.submit(&mut out);
        assert_eq!(
            out.popups,
            vec![Popup::confirm(
                "Edit fan CPU [hwmon0/pwm1]",
                "Are you sure to edit CPU [hwmon0/pwm1] as fan?",
                ConfirmAction::SaveFan,
            )]
        );

        panel.confirm_save(&mut out);
        assert_eq!(panel.busy(), Some("Editing..."));
        assert!(panel.dialog().is_none());
        let request = &out.requests[0];
        assert_eq!(request.args, vec!["set", "hwmon0/pwm1"]);
        let payload = request.payload.as_ref().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["maxtemp"], json!(70));

        panel.on_reply(FansReply::Saved, ok(""), &mut out);
        assert_eq!(out.requests[1].args, vec!["fns"]);
    }

    #[test]
    fn test_add_sends_full_record() {
        let mut panel = add_dialog();
        set_field(&mut panel, "name", json!("Rear"));
        let mut out = Outbox::default();
        panel.submit(&mut out);
        assert_eq!(
            out.popups,
            vec![Popup::confirm(
                "Add fan Rear [hwmon0/pwm3]",
                "Are you sure to add Rear [hwmon0/pwm3] as fan?",
                ConfirmAction::SaveFan,
            )]
        );
        panel.confirm_save(&mut out);
        assert_eq!(panel.busy(), Some("Adding..."));
        let request = &out.requests[0];
        assert_eq!(request.args, vec!["set", "hwmon0/pwm3"]);
        let payload = request.payload.as_ref().unwrap();
        assert_eq!(payload["name"], json!("Rear"));
        assert!(!payload.contains_key("pwm"));
        assert!(!payload.contains_key("warning"));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut panel = listed();
        let mut out = Outbox::default();
        panel.open_menu();
        assert!(panel.menu_open());
        panel.request_delete(&mut out);
        assert!(!panel.menu_open());
        assert!(out.requests.is_empty());
        assert_eq!(
            out.popups,
            vec![Popup::confirm(
                "Delete CPU",
                "Are you sure to delete CPU [hwmon0/pwm1]? This item will be deleted from database!",
                ConfirmAction::DeleteFan { key: "hwmon0/pwm1".into() },
            )]
        );

        panel.confirm_delete("hwmon0/pwm1", &mut out);
        assert_eq!(panel.busy(), Some("Deleting..."));
        assert_eq!(out.requests[0].args, vec!["del", "hwmon0/pwm1"]);

        // busy panels ignore new actions
        panel.start_add(&mut out);
        assert_eq!(out.requests.len(), 1);

        panel.on_reply(FansReply::Deleted, ok(""), &mut out);
        assert_eq!(out.requests[1].args, vec!["fns"]);
        panel.on_reply(FansReply::List, ok(r#"{"hwmon0/pwm2": {"name": "Case"}}"#), &mut out);
        assert_eq!(panel.busy(), None);
        assert_eq!(panel.selected(), 0);
    }
}
