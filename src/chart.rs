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

//! Log graph dataset.
//!
//! Turns the logger dump into a two-series line chart: temperature on the
//! left axis, fan speed on the right, both against minutes since the first
//! sample.

use crate::model::LoggerDump;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScale {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl TimeScale {
    /// Tick step is 1 for spans up to ten minutes, else a tenth of the span.
    pub fn new(min: i64, max: i64) -> Self {
        let span = max.saturating_sub(min);
        let step = if span > 10 {
            ((span as f64) / 10.0).round() as i64
        } else {
            1
        };
        Self { min, max, step }
    }

    pub fn ticks(&self) -> Vec<i64> {
        let step = self.step.max(1);
        let mut out = Vec::new();
        let mut t = self.min;
        while t <= self.max {
            out.push(t);
            match t.checked_add(step) {
                Some(next) => t = next,
                None => break,
            }
        }
        out
    }
}

/// Raw series pulled out of the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSeries {
    pub time: Vec<i64>,
    pub temp: Vec<f64>,
    pub ctrl: Vec<f64>,
    pub scale: TimeScale,
}

/// Relative minutes per sample, in arrival order.
///
/// The first timestamp is time zero; later samples map to
/// `trunc((t - t0) / 60)`. Samples without a timestamp add nothing to the
/// time axis but still contribute their temperature and speed.
pub fn process_data(dump: &LoggerDump) -> LogSeries {
    let mut start: Option<i64> = None;
    let mut max = 0;
    let mut time = Vec::new();
    let mut temp = Vec::new();
    let mut ctrl = Vec::new();

    for sample in &dump.data {
        if let Some(t) = sample.time {
            match start {
                None => {
                    start = Some(t);
                    time.push(0);
                }
                Some(t0) => {
                    let minutes = t.saturating_sub(t0) / 60;
                    if minutes > max {
                        max = minutes;
                    }
                    time.push(minutes);
                }
            }
        }
        if let Some(v) = sample.temp {
            temp.push(v);
        }
        if let Some(v) = sample.rpm {
            ctrl.push(v);
        }
    }

    LogSeries { time, temp, ctrl, scale: TimeScale::new(0, max) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub axis: AxisSide,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    /// Value bounds padded so a flat line does not sit on the frame.
    pub fn bounds(&self) -> [f64; 2] {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &(_, y) in &self.points {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return [0.0, 1.0];
        }
        if (hi - lo).abs() < f64::EPSILON {
            return [lo - 1.0, hi + 1.0];
        }
        let pad = (hi - lo) * 0.05;
        [lo - pad, hi + pad]
    }
}

/// Everything the renderer needs to draw the log graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: &'static str,
    pub scale: TimeScale,
    pub temp: Series,
    pub ctrl: Series,
}

pub fn build_chart(dump: &LoggerDump) -> ChartSpec {
    let series = process_data(dump);

    let temp_label = match dump.settings.farenheit {
        Some(true) => "Temperature [°F]",
        Some(false) => "Temperature [°C]",
        None => "Temperature []",
    };
    let title = match dump.settings.fancontrol.as_deref() {
        Some(name) if !name.is_empty() => format!("Monitor - Graph ({})", name),
        _ => "Monitor - Graph".to_string(),
    };

    let zip = |values: &[f64]| -> Vec<(f64, f64)> {
        series
            .time
            .iter()
            .zip(values)
            .map(|(&t, &v)| (t as f64, v))
            .collect()
    };

    ChartSpec {
        title,
        x_title: "time [min]",
        scale: series.scale,
        temp: Series {
            label: temp_label.to_string(),
            axis: AxisSide::Left,
            points: zip(&series.temp),
        },
        ctrl: Series {
            label: "Fan speed [RPM]".to_string(),
            axis: AxisSide::Right,
            points: zip(&series.ctrl),
        },
    }
}
