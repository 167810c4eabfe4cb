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

//! Log tab: the fancontrol service journal.

use crate::bridge::Request;
use crate::model::{parse_journal, JournalLine};

use super::{Outbox, Reply, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalReply {
    Lines,
}

#[derive(Default)]
pub struct JournalPanel {
    lines: Vec<JournalLine>,
    offset: usize,
    loading: bool,
}

impl JournalPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self, out: &mut Outbox) {
        self.refresh(out);
    }

    pub fn refresh(&mut self, out: &mut Outbox) {
        self.loading = true;
        out.request(Request::config(Reply::Journal(JournalReply::Lines), &["log"]));
    }

    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn scroll(&mut self, delta: i32) {
        let last = self.lines.len().saturating_sub(1) as i64;
        self.offset = (self.offset as i64 + delta as i64).clamp(0, last) as usize;
    }

    pub fn on_reply(&mut self, reply: JournalReply, response: Response) {
        match reply {
            JournalReply::Lines => {
                self.loading = false;
                self.lines = parse_journal(&response.output);
                self.offset = 0;
            }
        }
    }
}
