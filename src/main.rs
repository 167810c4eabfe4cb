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

use std::io::stdout;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;

use fanpanel::app::App;
use fanpanel::bridge::{Bridge, SystemRunner};
use fanpanel::config::{config_path, load_config, PanelConfig};
use fanpanel::events::handle_key_event;
use fanpanel::handlers;
use fanpanel::logger;
use fanpanel::ui::ui;

const USAGE: &str = "\
Usage: fanpanel [OPTIONS]

Terminal control panel for the fancontrol tools.

Options:
  --config <PATH>   Use this configuration file
  --logging         Write events to /var/log/fanpanel/events.json
  --print-config    Print the effective configuration and exit
  -h, --help        Show this help and exit";

/// UI loop wake-up, so completions and timers are serviced without input.
const FRAME: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Cli {
    config: Option<PathBuf>,
    logging: bool,
    print_config: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Cli> {
    let mut cli = Cli::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                cli.config = Some(PathBuf::from(path));
            }
            "--logging" => cli.logging = true,
            "--print-config" => cli.print_config = true,
            "-h" | "--help" => cli.help = true,
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(cli)
}

fn main() -> anyhow::Result<()> {
    // Gather args once
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let path = config_path(cli.config.as_deref());
    let cfg = load_config(&path).with_context(|| format!("loading {}", path.display()))?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    let logging_enabled = cli.logging || cfg.logging;
    if logging_enabled {
        logger::init_logging();
        logger::log_event("startup", serde_json::json!({
            "args": args,
            "config": path.display().to_string(),
        }));
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    logger::log_event("tui_start", serde_json::json!({}));
    let res = run_app(&mut terminal, &cfg);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
        logger::log_event("fatal_error", serde_json::json!({ "error": err.to_string() }));
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    cfg: &PanelConfig,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel();
    let bridge = Bridge::new(Arc::new(SystemRunner::new(cfg.elevate)), cfg.tool_paths(), tx);
    let mut app = App::new(bridge, rx, cfg.panel_options());
    app.start();

    loop {
        handlers::drain_completions(&mut app);
        handlers::tick(&mut app, Instant::now());

        // draw
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key_event) = event::read()? {
                if handle_key_event(&mut app, key_event)? {
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("fanpanel").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = parse_args(&args(&["--config", "/tmp/c.json", "--logging"])).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(cli.logging);
        assert!(!cli.print_config);
        assert!(parse_args(&args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_parse_args_rejects_unknown_and_missing_values() {
        assert!(parse_args(&args(&["--service"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
    }
}
