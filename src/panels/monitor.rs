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

//! Monitor tab: live readings of one fan plus the logger graph.

use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::bridge::Request;
use crate::chart::{build_chart, ChartSpec};
use crate::form::{Field, FieldChange, FieldKind, Form, SelectOption};
use crate::logger;
use crate::model::{default_control, parse_controls, FanControls, LiveValues, LoggerDump};

use super::{Outbox, Popup, Reply, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorReply {
    Controls,
    /// Live values for the form. `initial` builds the form instead of patching it.
    Live { initial: bool },
    LoggerStatus,
    LoggerStart,
    LoggerStop,
    Graph,
}

/// Recurring poll schedule. Owned by the panel and cancelled when it goes
/// inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTimer {
    pub interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_due: None }
    }

    /// Arms the timer. A running timer keeps its schedule.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True once per elapsed interval; reschedules itself when it fires.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if now >= at => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorView {
    Form,
    Graph,
}

pub struct MonitorPanel {
    timer: RefreshTimer,
    view: MonitorView,
    ctrls: FanControls,
    ctrl: Option<String>,
    form: Option<Form>,
    /// A live poll is outstanding.
    polling: bool,
    no_fans: bool,
    start_enabled: bool,
    stop_enabled: bool,
    chart: Option<ChartSpec>,
    graph_loading: bool,
}

fn config(reply: MonitorReply, args: &[&str]) -> Request<Reply> {
    Request::config(Reply::Monitor(reply), args)
}

fn logger_cli(reply: MonitorReply, args: &[&str]) -> Request<Reply> {
    Request::logger(Reply::Monitor(reply), args)
}

impl MonitorPanel {
    pub fn new(refresh: Duration) -> Self {
        Self {
            timer: RefreshTimer::new(refresh),
            view: MonitorView::Form,
            ctrls: FanControls::new(),
            ctrl: None,
            form: None,
            polling: false,
            no_fans: false,
            start_enabled: false,
            stop_enabled: false,
            chart: None,
            graph_loading: false,
        }
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        out.request(config(MonitorReply::Controls, &["fns"]));
        out.request(logger_cli(MonitorReply::LoggerStatus, &["status"]));
    }

    pub fn deactivate(&mut self) {
        self.timer.cancel();
    }

    pub fn view(&self) -> MonitorView {
        self.view
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.form.as_mut()
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        self.chart.as_ref()
    }

    pub fn graph_loading(&self) -> bool {
        self.graph_loading
    }

    pub fn no_fans(&self) -> bool {
        self.no_fans
    }

    pub fn timer(&self) -> &RefreshTimer {
        &self.timer
    }

    pub fn start_enabled(&self) -> bool {
        self.start_enabled
    }

    pub fn stop_enabled(&self) -> bool {
        self.stop_enabled
    }

    pub fn ctrl(&self) -> Option<&str> {
        self.ctrl.as_deref()
    }

    pub fn tick(&mut self, now: Instant, out: &mut Outbox) {
        if self.view != MonitorView::Form || self.form.is_none() || self.polling {
            return;
        }
        if self.timer.due(now) {
            self.poll(out);
        }
    }

    fn poll(&mut self, out: &mut Outbox) {
        if let Some(ctrl) = self.ctrl.as_deref() {
            out.request(config(MonitorReply::Live { initial: false }, &[ctrl]));
            self.polling = true;
        }
    }

    /// The fan selector changed.
    pub fn field_changed(&mut self, change: FieldChange, out: &mut Outbox) {
        if change.param != "ctrl" {
            return;
        }
        if let Value::String(ctrl) = change.value {
            self.ctrl = Some(ctrl);
            if !self.polling {
                self.poll(out);
            }
        }
    }

    pub fn toggle_graph(&mut self, out: &mut Outbox) {
        match self.view {
            MonitorView::Form => {
                self.timer.cancel();
                self.view = MonitorView::Graph;
                self.fetch_graph(out);
            }
            MonitorView::Graph => {
                self.view = MonitorView::Form;
                if self.form.is_some() {
                    self.timer.start(Instant::now());
                }
            }
        }
    }

    pub fn refresh_graph(&mut self, out: &mut Outbox) {
        if self.view == MonitorView::Graph {
            self.fetch_graph(out);
        }
    }

    fn fetch_graph(&mut self, out: &mut Outbox) {
        self.graph_loading = true;
        out.request(logger_cli(MonitorReply::Graph, &[]));
    }

    pub fn start_logging(&mut self, out: &mut Outbox) {
        if self.start_enabled {
            out.request(logger_cli(MonitorReply::LoggerStart, &["start"]));
        }
    }

    pub fn stop_logging(&mut self, out: &mut Outbox) {
        if self.stop_enabled {
            out.request(logger_cli(MonitorReply::LoggerStop, &["stop"]));
        }
    }

    pub fn on_reply(&mut self, reply: MonitorReply, response: Response, out: &mut Outbox) {
        match reply {
            MonitorReply::Controls => self.on_controls(&response, out),
            MonitorReply::Live { initial: true } => self.build_form(&response),
            MonitorReply::Live { initial: false } => self.patch_form(&response),
            MonitorReply::LoggerStatus => {
                self.start_enabled = !response.ok();
                self.stop_enabled = response.ok();
            }
            MonitorReply::LoggerStart => {
                if response.ok() {
                    self.start_enabled = false;
                    self.stop_enabled = true;
                    logger::log_event("logger_toggle", json!({ "running": true }));
                }
            }
            MonitorReply::LoggerStop => {
                if response.ok() {
                    self.start_enabled = true;
                    self.stop_enabled = false;
                    logger::log_event("logger_toggle", json!({ "running": false }));
                }
            }
            MonitorReply::Graph => {
                self.graph_loading = false;
                self.chart = response
                    .ok()
                    .then(|| build_chart(&LoggerDump::parse(&response.output)));
            }
        }
    }

    fn on_controls(&mut self, response: &Response, out: &mut Outbox) {
        self.ctrls = parse_controls(&response.output);
        match default_control(&self.ctrls) {
            Some(ctrl) => {
                let ctrl = ctrl.to_string();
                out.request(config(MonitorReply::Live { initial: true }, &[&ctrl]));
                self.ctrl = Some(ctrl);
                self.no_fans = false;
            }
            None => {
                self.no_fans = true;
                out.popup(Popup::message("No valid fans found", "Please add fans first"));
            }
        }
    }

    fn build_form(&mut self, response: &Response) {
        let live = LiveValues::parse(&response.output);
        let unit = if live.farenheit { "°F" } else { "°C" };
        let options = self
            .ctrls
            .iter()
            .map(|(key, c)| {
                let label = if c.name.is_empty() { key.clone() } else { c.name.clone() };
                SelectOption::new(key.clone(), label)
            })
            .collect();
        let current = self.ctrl.clone().unwrap_or_default();
        let reading = |param: &str, label: String, value: Value, kind: FieldKind, comment: String| {
            Field::new(param, label, value, kind).readonly(true).comment(comment)
        };

        self.form = Some(Form::new(vec![
            Field::new("ctrl", "Fan control", Value::String(current), FieldKind::Select { options })
                .readonly(self.ctrls.len() <= 1)
                .notify()
                .comment("Fan control to monitor (see settings for logger)"),
            reading(
                "temp",
                format!("Temperature [{}]", unit),
                live.temp,
                FieldKind::unbounded(),
                format!("Current system temperature in {}.", unit),
            ),
            reading("rpm", "Fan speed [RPM]".into(), live.rpm, FieldKind::unbounded(), "Current fan speed in RPM.".into()),
            reading("pwm", "Fan control [PWM]".into(), live.pwm, FieldKind::unbounded(), "Current fan control in PWM.".into()),
            reading("alarm", "Alarm".into(), live.alarm, FieldKind::Text, "Current alarm status.".into()),
        ]));
        if self.view == MonitorView::Form {
            self.timer.start(Instant::now());
        }
    }

    fn patch_form(&mut self, response: &Response) {
        self.polling = false;
        // keep the last readings when a poll fails
        if !response.ok() {
            return;
        }
        let live = LiveValues::parse(&response.output);
        // reply for a fan that is no longer selected
        if !live.ctrl.is_empty() && self.ctrl.as_deref() != Some(live.ctrl.as_str()) {
            return;
        }
        if let Some(form) = self.form.as_mut() {
            form.update_data([
                ("temp".to_string(), live.temp),
                ("rpm".to_string(), live.rpm),
                ("pwm".to_string(), live.pwm),
                ("alarm".to_string(), live.alarm),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Tool;
    use crate::test_utils::*;

    fn ok(output: &str) -> Response {
        Response { output: output.to_string(), status: 0 }
    }

    fn failed() -> Response {
        Response { output: "[]".to_string(), status: 1 }
    }

    fn opened() -> MonitorPanel {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.activate(&mut out);
        panel.on_reply(MonitorReply::Controls, ok(FNS_JSON), &mut out);
        panel.on_reply(MonitorReply::Live { initial: true }, ok(LIVE_JSON), &mut out);
        panel
    }

    #[test]
    fn test_activate_requests_fans_and_logger_status() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.activate(&mut out);
        assert_eq!(out.requests.len(), 2);
        assert_eq!(out.requests[0].args, vec!["fns"]);
        assert_eq!(out.requests[1].tool, Tool::Logger);
        assert_eq!(out.requests[1].args, vec!["status"]);
    }

    #[test]
    fn test_controls_request_live_values_for_default_fan() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.on_reply(MonitorReply::Controls, ok(FNS_JSON), &mut out);
        assert_eq!(out.requests[0].args, vec!["hwmon0/pwm2"]);
        assert_eq!(panel.ctrl(), Some("hwmon0/pwm2"));
    }

    #[test]
    fn test_no_fans_shows_notice() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.on_reply(MonitorReply::Controls, failed(), &mut out);
        assert!(panel.no_fans());
        assert!(out.requests.is_empty());
        assert_eq!(out.popups, vec![Popup::message("No valid fans found", "Please add fans first")]);
    }

    #[test]
    fn test_form_has_readonly_readings_and_starts_timer() {
        let panel = opened();
        let form = panel.form().unwrap();
        assert_eq!(form.field("temp").unwrap().label, "Temperature [°C]");
        assert!(form.field("temp").unwrap().readonly);
        assert!(!form.field("ctrl").unwrap().readonly);
        assert_eq!(form.value("rpm"), Some(&json!(1200)));
        assert!(panel.timer().is_running());
    }

    #[test]
    fn test_single_fan_selector_is_readonly() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.on_reply(
            MonitorReply::Controls,
            ok(r#"{"hwmon0/pwm1": {"name": "CPU", "device": "nct6775", "default": false}}"#),
            &mut out,
        );
        panel.on_reply(MonitorReply::Live { initial: true }, ok(LIVE_JSON), &mut out);
        assert!(panel.form().unwrap().field("ctrl").unwrap().readonly);
    }

    #[test]
    fn test_tick_polls_once_while_outstanding() {
        let mut panel = opened();
        let mut out = Outbox::default();
        let later = Instant::now() + Duration::from_secs(2);
        panel.tick(later, &mut out);
        assert_eq!(out.requests.len(), 1);
        panel.tick(later + Duration::from_secs(2), &mut out);
        assert_eq!(out.requests.len(), 1);

        panel.on_reply(MonitorReply::Live { initial: false }, ok(LIVE_PATCH_JSON), &mut out);
        panel.tick(later + Duration::from_secs(4), &mut out);
        assert_eq!(out.requests.len(), 2);
    }

    #[test]
    fn test_patch_only_touches_readings() {
        let mut panel = opened();
        let mut out = Outbox::default();
        panel.tick(Instant::now() + Duration::from_secs(2), &mut out);
        panel.on_reply(MonitorReply::Live { initial: false }, ok(LIVE_PATCH_JSON), &mut out);
        let form = panel.form().unwrap();
        assert_eq!(form.value("temp"), Some(&json!(47.5)));
        assert_eq!(form.value("alarm"), Some(&json!("Warning")));
        assert_eq!(form.value("ctrl"), Some(&json!("hwmon0/pwm2")));
        assert_eq!(form.fields.len(), 5);
    }

    #[test]
    fn test_failed_poll_keeps_last_readings() {
        let mut panel = opened();
        let mut out = Outbox::default();
        let later = Instant::now() + Duration::from_secs(2);
        panel.tick(later, &mut out);
        panel.on_reply(MonitorReply::Live { initial: false }, failed(), &mut out);
        let form = panel.form().unwrap();
        assert_eq!(form.value("temp"), Some(&json!(45.5)));
        assert_eq!(form.value("rpm"), Some(&json!(1200)));
        assert_eq!(form.value("alarm"), Some(&json!("Ok")));

        // the poll is no longer outstanding
        panel.tick(later + Duration::from_secs(2), &mut out);
        assert_eq!(out.requests.len(), 2);
    }

    #[test]
    fn test_deactivate_cancels_timer() {
        let mut panel = opened();
        panel.deactivate();
        assert!(!panel.timer().is_running());
        let mut out = Outbox::default();
        panel.tick(Instant::now() + Duration::from_secs(10), &mut out);
        assert!(out.requests.is_empty());
    }

    #[test]
    fn test_timer_start_is_idempotent() {
        let now = Instant::now();
        let mut timer = RefreshTimer::new(Duration::from_secs(1));
        timer.start(now);
        timer.start(now + Duration::from_millis(900));
        assert!(timer.due(now + Duration::from_secs(1)));
        assert!(!timer.due(now + Duration::from_millis(1500)));
    }

    #[test]
    fn test_logger_buttons_follow_status() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.on_reply(MonitorReply::LoggerStatus, failed(), &mut out);
        assert!(panel.start_enabled());
        assert!(!panel.stop_enabled());

        panel.start_logging(&mut out);
        assert_eq!(out.requests[0].args, vec!["start"]);
        panel.on_reply(MonitorReply::LoggerStart, ok(""), &mut out);
        assert!(!panel.start_enabled());
        assert!(panel.stop_enabled());

        // start is disabled now
        panel.start_logging(&mut out);
        assert_eq!(out.requests.len(), 1);
    }

    #[test]
    fn test_failed_start_keeps_buttons() {
        let mut panel = MonitorPanel::new(Duration::from_millis(1000));
        let mut out = Outbox::default();
        panel.on_reply(MonitorReply::LoggerStatus, failed(), &mut out);
        panel.on_reply(MonitorReply::LoggerStart, failed(), &mut out);
        assert!(panel.start_enabled());
        assert!(!panel.stop_enabled());
    }

    #[test]
    fn test_graph_toggle_fetches_dump_and_stops_polling() {
        let mut panel = opened();
        let mut out = Outbox::default();
        panel.toggle_graph(&mut out);
        assert_eq!(panel.view(), MonitorView::Graph);
        assert!(!panel.timer().is_running());
        assert_eq!(out.requests[0].tool, Tool::Logger);
        assert!(out.requests[0].args.is_empty());

        panel.on_reply(MonitorReply::Graph, ok(LOGGER_DUMP_JSON), &mut out);
        let chart = panel.chart().unwrap();
        assert_eq!(chart.scale.max, 2);

        panel.refresh_graph(&mut out);
        assert_eq!(out.requests.len(), 2);

        panel.toggle_graph(&mut out);
        assert_eq!(panel.view(), MonitorView::Form);
        assert!(panel.timer().is_running());
    }

    #[test]
    fn test_selector_change_polls_new_fan() {
        let mut panel = opened();
        let mut out = Outbox::default();
        panel.field_changed(
            FieldChange { param: "ctrl".into(), value: json!("hwmon0/pwm1") },
            &mut out,
        );
        assert_eq!(panel.ctrl(), Some("hwmon0/pwm1"));
        assert_eq!(out.requests[0].args, vec!["hwmon0/pwm1"]);
    }

    #[test]
    fn test_stale_fan_reply_is_ignored() {
        let mut panel = opened();
        let mut out = Outbox::default();
        panel.field_changed(
            FieldChange { param: "ctrl".into(), value: json!("hwmon0/pwm1") },
            &mut out,
        );
        // LIVE_PATCH_JSON reports hwmon0/pwm2
        panel.on_reply(MonitorReply::Live { initial: false }, ok(LIVE_PATCH_JSON), &mut out);
        assert_eq!(panel.form().unwrap().value("temp"), Some(&json!(45.5)));
    }
}
