/*
 * Test utilities and fixtures for Fanpanel
 *
 * Canned output of the fancontrol CLI and logger, shared by the unit tests
 * of the panels, the chart builder and the app.
 */

use std::sync::mpsc;
use std::sync::Arc;

use crate::app::App;
use crate::bridge::{Bridge, Completion, MockCommandRunner, RawOutput, ToolPaths};
use crate::panels::{PanelOptions, Reply};

/// `fns`: two fans, the second marked default.
pub const FNS_JSON: &str = r#"{
    "hwmon0/pwm1": {"name": "CPU", "device": "nct6775", "default": false},
    "hwmon0/pwm2": {"name": "Case", "device": "nct6775", "default": true}
}"#;

/// `all`: fans plus the sensor inventory.
pub const ALL_JSON: &str = r#"{
    "farenheit": false,
    "ctrls": {
        "hwmon0/pwm1": {"name": "CPU", "device": "nct6775", "default": false},
        "hwmon0/pwm2": {"name": "Case", "device": "nct6775", "default": true}
    },
    "temps": {"hwmon0/temp1_input": "nct6775:SYSTIN", "hwmon0/temp2_input": "nct6775:CPUTIN"},
    "rpms": {
        "hwmon0/fan1_input": "nct6775:fan1",
        "hwmon0/fan2_input": "nct6775:fan2",
        "hwmon0/fan3_input": "nct6775:fan3"
    },
    "pwms": {
        "hwmon0/pwm1": "nct6775:pwm1",
        "hwmon0/pwm2": "nct6775:pwm2",
        "hwmon0/pwm3": "nct6775:pwm3"
    }
}"#;

/// `get hwmon0/pwm1`, without the optional PWM bounds.
pub const FAN_RECORD_JSON: &str = r#"{
    "name": "CPU",
    "fan": "hwmon0/fan1_input",
    "temp": "hwmon0/temp1_input",
    "mintemp": 45,
    "maxtemp": 60,
    "minstart": 150,
    "minstop": 100
}"#;

/// `gen`
pub const GEN_JSON: &str = r#"{"logger": "hwmon0/pwm2", "loggerinterval": 60, "farenheit": false, "interval": 10}"#;

pub const LIVE_JSON: &str =
    r#"{"ctrl": "hwmon0/pwm2", "farenheit": false, "temp": 45.5, "rpm": 1200, "pwm": 128, "alarm": "Ok"}"#;

pub const LIVE_PATCH_JSON: &str =
    r#"{"ctrl": "hwmon0/pwm2", "farenheit": false, "temp": 47.5, "rpm": 1350, "pwm": 140, "alarm": "Warning"}"#;

/// Logger dump with samples at 100, 130 and 220 seconds.
pub const LOGGER_DUMP_JSON: &str = r#"{
    "settings": {"fancontrol": "Case", "farenheit": false, "interval": 60},
    "data": [
        {"time": "100", "temp": "40.0", "rpm": "900", "pwm": "100", "alarm": "Ok"},
        {"time": "130", "temp": "41.5", "rpm": "950", "pwm": "110", "alarm": "Ok"},
        {"time": "220", "temp": "43.0", "rpm": "1000", "pwm": "120", "alarm": "Ok"}
    ]
}"#;

pub const JOURNAL_JSON: &str = r#"[
    {"date": "Jan 01 10:02:00", "app": "fancontrol", "log": "fan speed changed"},
    {"date": "Jan 01 10:01:00", "app": "fancontrol", "log": "service restarted"},
    {"date": "Jan 01 10:00:00", "app": "systemd", "log": "Started fancontrol"}
]"#;

pub fn test_paths() -> ToolPaths {
    ToolPaths {
        config_cli: "/opt/fancontrol/fancontrol-cli.py".to_string(),
        logger_cli: "/opt/fancontrol/fancontrol-logger.py".to_string(),
    }
}

/// A mock runner answering every call with `status` and `text`.
pub fn fixed_runner(status: i32, text: &'static str) -> MockCommandRunner {
    let mut mock = MockCommandRunner::new();
    mock.expect_run()
        .returning(move |_| Ok(RawOutput { status, text: text.to_string() }));
    mock
}

/// App wired to a mock runner, plus the completion receiver it owns.
pub fn create_test_app(mock: MockCommandRunner) -> App {
    let (tx, rx) = mpsc::channel::<Completion<Reply>>();
    let bridge = Bridge::new(Arc::new(mock), test_paths(), tx);
    App::new(bridge, rx, PanelOptions::default())
}
