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

//! Sensor-key helpers for the fan edit dialog.
//!
//! Keys look like `hwmon2/pwm3` or `hwmon2/fan3_input`: the first path
//! segment names the bus and the trailing segment carries the channel.

use std::collections::BTreeMap;

use crate::model::FanControls;

/// Digits of the trailing segment of a PWM key (`hwmon2/pwm3` -> `3`).
fn pwm_channel(segment: &str) -> String {
    segment.chars().filter(char::is_ascii_digit).collect()
}

/// Digits of the part before the first `_` of an RPM key's trailing segment
/// (`fan3_input` -> `3`).
fn rpm_channel(segment: &str) -> String {
    let head = segment.split('_').next().unwrap_or("");
    head.chars().filter(char::is_ascii_digit).collect()
}

/// Finds the RPM input that belongs to `pwm`: same bus, same channel number.
/// When several inputs match the last one in key order wins.
pub fn resolve_rpm<'a, I>(rpm_keys: I, pwm: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let parts: Vec<&str> = pwm.split('/').collect();
    let bus = parts.first().copied().unwrap_or("");
    let channel = pwm_channel(parts.last().copied().unwrap_or(""));

    let mut found = None;
    for key in rpm_keys {
        let fan_parts: Vec<&str> = key.split('/').collect();
        let fan_bus = fan_parts.first().copied().unwrap_or("");
        let fan_channel = rpm_channel(fan_parts.last().copied().unwrap_or(""));
        if fan_channel == channel && fan_bus == bus {
            found = Some(key.as_str());
        }
    }
    found
}

/// PWM keys not yet bound to a fan definition. `editing` stays selectable.
pub fn available_pwms(
    pwms: &BTreeMap<String, String>,
    ctrls: &FanControls,
    editing: Option<&str>,
) -> Vec<String> {
    pwms.keys()
        .filter(|key| !ctrls.contains_key(key.as_str()) || Some(key.as_str()) == editing)
        .cloned()
        .collect()
}

/// Whether another fan definition already uses `name` (exact match).
pub fn name_taken(name: &str, ctrls: &FanControls, editing: Option<&str>) -> bool {
    ctrls
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != editing)
        .any(|(_, ctrl)| ctrl.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FanControl;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ctrls(list: &[(&str, &str)]) -> FanControls {
        list.iter()
            .map(|(k, n)| {
                (
                    k.to_string(),
                    FanControl { name: n.to_string(), device: "nct6775".into(), default: false },
                )
            })
            .collect()
    }

    #[test]
    fn test_resolve_rpm_matches_bus_and_channel() {
        let rpms = keys(&["hwmon2/fan3_input", "hwmon3/fan3_input", "hwmon2/fan4_input"]);
        assert_eq!(resolve_rpm(&rpms, "hwmon2/pwm3"), Some("hwmon2/fan3_input"));
    }

    #[test]
    fn test_resolve_rpm_rejects_other_bus_or_channel() {
        let rpms = keys(&["hwmon3/fan3_input", "hwmon2/fan4_input"]);
        assert_eq!(resolve_rpm(&rpms, "hwmon2/pwm3"), None);
    }

    #[test]
    fn test_resolve_rpm_uses_digits_before_underscore_only() {
        // "fan1_input2" has channel 1 on the RPM side, not 12
        let rpms = keys(&["hwmon0/fan1_input2"]);
        assert_eq!(resolve_rpm(&rpms, "hwmon0/pwm1"), Some("hwmon0/fan1_input2"));
        assert_eq!(resolve_rpm(&rpms, "hwmon0/pwm12"), None);
    }

    #[test]
    fn test_resolve_rpm_last_match_wins() {
        let rpms = keys(&["hwmon0/fan1_input", "hwmon0/xfan1_min"]);
        assert_eq!(resolve_rpm(&rpms, "hwmon0/pwm1"), Some("hwmon0/xfan1_min"));
    }

    #[test]
    fn test_available_pwms_excludes_used_but_keeps_edited() {
        let pwms: BTreeMap<String, String> = [
            ("hwmon0/pwm1", "nct:pwm1"),
            ("hwmon0/pwm2", "nct:pwm2"),
            ("hwmon0/pwm3", "nct:pwm3"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let used = ctrls(&[("hwmon0/pwm1", "CPU"), ("hwmon0/pwm2", "Case")]);

        assert_eq!(available_pwms(&pwms, &used, None), keys(&["hwmon0/pwm3"]));
        assert_eq!(
            available_pwms(&pwms, &used, Some("hwmon0/pwm2")),
            keys(&["hwmon0/pwm2", "hwmon0/pwm3"])
        );
    }

    #[test]
    fn test_name_taken_ignores_edited_fan() {
        let used = ctrls(&[("hwmon0/pwm1", "CPU"), ("hwmon0/pwm2", "Case")]);
        assert!(name_taken("CPU", &used, None));
        assert!(name_taken("CPU", &used, Some("hwmon0/pwm2")));
        assert!(!name_taken("CPU", &used, Some("hwmon0/pwm1")));
        assert!(!name_taken("cpu", &used, None));
    }
}
