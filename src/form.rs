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

//! Declarative form model shared by the monitor, settings and fan screens.
//!
//! A form is an ordered list of field descriptors. The renderer draws it, the
//! key handler edits it, and the owning panel reads the values back and
//! reacts to change notifications.

use serde_json::{Map, Value};

use crate::diff::normalize;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Value stored in the form (a sensor or control key).
    pub value: String,
    /// Text shown to the user.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number { min: Option<f64>, max: Option<f64>, step: f64 },
    Boolean,
    Select { options: Vec<SelectOption> },
}

impl FieldKind {
    pub fn bounded(min: f64, max: f64) -> Self {
        FieldKind::Number { min: Some(min), max: Some(max), step: 1.0 }
    }

    pub fn unbounded() -> Self {
        FieldKind::Number { min: None, max: None, step: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub param: String,
    pub label: String,
    pub value: Value,
    pub kind: FieldKind,
    pub readonly: bool,
    pub disabled: bool,
    pub comment: String,
    /// Report edits of this field back to the owning panel.
    pub notify: bool,
}

impl Field {
    pub fn new(param: &str, label: impl Into<String>, value: Value, kind: FieldKind) -> Self {
        Self {
            param: param.to_string(),
            label: label.into(),
            value,
            kind,
            readonly: false,
            disabled: false,
            comment: String::new(),
            notify: false,
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn notify(mut self) -> Self {
        self.notify = true;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn editable(&self) -> bool {
        !self.readonly && !self.disabled
    }

    /// Text shown for the current value (the option label for selects).
    pub fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Boolean => {
                if truthy(&self.value) { "[x]".into() } else { "[ ]".into() }
            }
            FieldKind::Select { options } => {
                let current = normalize(&self.value);
                options
                    .iter()
                    .find(|o| o.value == current)
                    .map(|o| o.label.clone())
                    .unwrap_or(current)
            }
            _ => normalize(&self.value),
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// A notified field edit.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub param: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub selected: usize,
    /// In-progress text for the selected text/number field.
    pub edit_buffer: Option<String>,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        let mut form = Self { fields, selected: 0, edit_buffer: None };
        form.selected = form.first_editable().unwrap_or(0);
        form
    }

    fn first_editable(&self) -> Option<usize> {
        self.fields.iter().position(Field::editable)
    }

    pub fn field(&self, param: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.param == param)
    }

    pub fn value(&self, param: &str) -> Option<&Value> {
        self.field(param).map(|f| &f.value)
    }

    /// Current values of every field that is not read-only.
    pub fn values(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|f| !f.readonly)
            .map(|f| (f.param.clone(), f.value.clone()))
            .collect()
    }

    /// Replaces field values in place. Unknown params are ignored and the
    /// field layout is untouched.
    pub fn update_data<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        for (param, value) in updates {
            if let Some(field) = self.fields.iter_mut().find(|f| f.param == param) {
                field.value = value;
            }
        }
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.fields.get(self.selected)
    }

    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.fields.is_empty() || self.is_editing() {
            return;
        }
        let len = self.fields.len() as i32;
        let mut idx = self.selected as i32;
        for _ in 0..len {
            idx += delta;
            if idx < 0 || idx >= len {
                return;
            }
            if self.fields[idx as usize].editable() {
                self.selected = idx as usize;
                return;
            }
        }
    }

    /// `Enter`: starts editing a text/number field, or commits the edit.
    pub fn activate(&mut self) -> Option<FieldChange> {
        let field = self.fields.get(self.selected)?;
        if !field.editable() {
            return None;
        }
        let textual = matches!(field.kind, FieldKind::Text | FieldKind::Number { .. });
        let boolean = field.kind == FieldKind::Boolean;
        let current = normalize(&field.value);
        if textual {
            if self.edit_buffer.is_some() {
                self.commit_edit()
            } else {
                self.edit_buffer = Some(current);
                None
            }
        } else if boolean {
            self.toggle()
        } else {
            self.cycle(1)
        }
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.edit_buffer.take().is_some()
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(buf) = self.edit_buffer.as_mut() {
            if buf.len() < 128 && !c.is_control() {
                buf.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.edit_buffer.as_mut() {
            buf.pop();
        }
    }

    fn commit_edit(&mut self) -> Option<FieldChange> {
        let buffer = self.edit_buffer.take()?;
        let field = self.fields.get(self.selected)?;
        let value = match &field.kind {
            FieldKind::Number { min, max, .. } => {
                let parsed: f64 = buffer.trim().parse().ok()?;
                let mut v = parsed;
                if let Some(lo) = min {
                    v = v.max(*lo);
                }
                if let Some(hi) = max {
                    v = v.min(*hi);
                }
                number_value(v)
            }
            _ => Value::String(buffer),
        };
        self.set_selected(value)
    }

    /// `Space` or arrows on a boolean field.
    pub fn toggle(&mut self) -> Option<FieldChange> {
        let field = self.fields.get(self.selected)?;
        if !field.editable() || field.kind != FieldKind::Boolean {
            return None;
        }
        let next = Value::Bool(!truthy(&field.value));
        self.set_selected(next)
    }

    /// Left/right on a select field.
    pub fn cycle(&mut self, delta: i32) -> Option<FieldChange> {
        let field = self.fields.get(self.selected)?;
        if !field.editable() {
            return None;
        }
        if field.kind == FieldKind::Boolean {
            return self.toggle();
        }
        let FieldKind::Select { options } = &field.kind else {
            return None;
        };
        if options.is_empty() {
            return None;
        }
        let current = normalize(&field.value);
        let len = options.len() as i32;
        let next = match options.iter().position(|o| o.value == current) {
            Some(i) => (i as i32 + delta).rem_euclid(len),
            None => 0,
        };
        let value = Value::String(options[next as usize].value.clone());
        self.set_selected(value)
    }

    fn set_selected(&mut self, value: Value) -> Option<FieldChange> {
        let field = self.fields.get_mut(self.selected)?;
        if field.value == value {
            return None;
        }
        field.value = value.clone();
        field
            .notify
            .then(|| FieldChange { param: field.param.clone(), value })
    }
}

/// Integral floats become JSON integers so the CLI receives `60`, not `60.0`.
fn number_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}
