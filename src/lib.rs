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

//! Fanpanel - terminal control panel for the fancontrol CLI tools
//!
//! This library provides the command bridge to the fancontrol configuration
//! and logger executables, the form and diff model behind the edit screens,
//! and the monitor, fans, settings and log panels drawn by the TUI.

pub mod bridge;
pub mod diff;
pub mod form;
pub mod model;
pub mod sensors;
pub mod chart;
pub mod panels;
pub mod app;
pub mod config;
pub mod handlers;
pub mod events;
pub mod ui;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
