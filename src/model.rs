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

//! JSON shapes produced by the fancontrol CLI and logger.
//!
//! The tools are loosely typed: numbers sometimes arrive as strings and a
//! failed call hands back `[]` where an object was expected. Every parser here
//! degrades to empty data instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parses tool output, treating anything that is not valid JSON as `null`.
pub fn parse_output(text: &str) -> Value {
    serde_json::from_str(text.trim()).unwrap_or(Value::Null)
}

/// Parses tool output as a JSON object. Arrays, scalars and invalid JSON
/// become an empty map.
pub fn parse_object(text: &str) -> Map<String, Value> {
    match parse_output(text) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn from_object<T: for<'de> Deserialize<'de> + Default>(text: &str) -> T {
    serde_json::from_value(Value::Object(parse_object(text))).unwrap_or_default()
}

/// One entry of `fns` (and of `ctrls` in the `all` snapshot).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FanControl {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub default: bool,
}

/// Fan definitions keyed by control key (e.g. `hwmon0/pwm1`), in key order.
pub type FanControls = BTreeMap<String, FanControl>;

pub fn parse_controls(text: &str) -> FanControls {
    parse_object(text)
        .into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<FanControl>(value)
                .ok()
                .map(|ctrl| (key, ctrl))
        })
        .collect()
}

/// Control key of the fan marked `default`, else the first one.
pub fn default_control(ctrls: &FanControls) -> Option<&str> {
    ctrls
        .iter()
        .find(|(_, c)| c.default)
        .or_else(|| ctrls.iter().next())
        .map(|(k, _)| k.as_str())
}

/// Whether any fan carries the `default` marker.
pub fn has_marked_default(ctrls: &FanControls) -> bool {
    ctrls.values().any(|c| c.default)
}

/// Full snapshot returned by `all`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub farenheit: bool,
    #[serde(default, deserialize_with = "lenient_map")]
    pub ctrls: FanControls,
    #[serde(default, deserialize_with = "lenient_map")]
    pub temps: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub rpms: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub pwms: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn parse(text: &str) -> Self {
        from_object(text)
    }
}

// An empty list stands in for an empty mapping in the tools' output.
fn lenient_map<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: for<'a> Deserialize<'a>,
{
    let value = Value::deserialize(deserializer)?;
    let out = match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| serde_json::from_value::<V>(v).ok().map(|v| (k, v)))
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(out)
}

/// Live readings returned by `<config-cli> <controlKey>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveValues {
    #[serde(default)]
    pub ctrl: String,
    #[serde(default)]
    pub farenheit: bool,
    #[serde(default)]
    pub temp: Value,
    #[serde(default)]
    pub rpm: Value,
    #[serde(default)]
    pub pwm: Value,
    #[serde(default)]
    pub alarm: Value,
}

impl LiveValues {
    pub fn parse(text: &str) -> Self {
        from_object(text)
    }
}

/// Global settings returned by `gen`. Kept as a raw map because it doubles
/// as the reference record for the settings diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings(pub Map<String, Value>);

impl GlobalSettings {
    pub fn parse(text: &str) -> Self {
        Self(parse_object(text))
    }

    pub fn logger_interval(&self) -> i64 {
        self.int("loggerinterval")
    }

    pub fn interval(&self) -> i64 {
        self.int("interval")
    }

    pub fn farenheit(&self) -> bool {
        match self.0.get("farenheit") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            _ => false,
        }
    }

    pub fn logger(&self) -> Option<&str> {
        self.0.get("logger").and_then(Value::as_str)
    }

    fn int(&self, key: &str) -> i64 {
        match self.0.get(key) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Record returned by `get <controlKey>`, with the optional PWM bounds filled in.
pub fn parse_fan_record(text: &str) -> Map<String, Value> {
    let mut record = parse_object(text);
    record.entry("minpwm").or_insert(Value::from(0));
    record.entry("maxpwm").or_insert(Value::from(255));
    record
}

/// Starting values for a fan that does not exist yet.
pub fn new_fan_record() -> Map<String, Value> {
    let mut record = Map::new();
    record.insert("name".into(), Value::from(""));
    record.insert("fan".into(), Value::from(""));
    record.insert("temp".into(), Value::from(""));
    record.insert("mintemp".into(), Value::from(45));
    record.insert("maxtemp".into(), Value::from(60));
    record.insert("minstart".into(), Value::from(50));
    record.insert("minstop".into(), Value::from(30));
    record.insert("minpwm".into(), Value::from(0));
    record.insert("maxpwm".into(), Value::from(255));
    record
}

/// One logged sample. The logger writes CSV and re-emits the columns as
/// strings, so every field accepts either a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogSample {
    #[serde(default, deserialize_with = "lenient_int")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub rpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub pwm: Option<f64>,
    #[serde(default)]
    pub alarm: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggerSettings {
    #[serde(default)]
    pub fancontrol: Option<String>,
    #[serde(default)]
    pub farenheit: Option<bool>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub interval: Option<i64>,
}

/// Output of the logger when called without arguments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggerDump {
    #[serde(default)]
    pub settings: LoggerSettings,
    #[serde(default)]
    pub data: Vec<LogSample>,
}

impl LoggerDump {
    pub fn parse(text: &str) -> Self {
        from_object(text)
    }
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_float(&s),
        _ => None,
    })
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(&s),
        _ => None,
    })
}

/// Integer prefix of `s` after trimming, so `"1700000000.5"` reads as `1700000000`.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Longest float prefix of `s` after trimming (`"45.5C"` reads as `45.5`).
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let ok = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (c == '.' && !seen_dot);
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    s[..end].parse().ok()
}

/// One line of `<config-cli> log`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JournalLine {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub log: String,
}

pub fn parse_journal(text: &str) -> Vec<JournalLine> {
    match parse_output(text) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    }
}
