// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// One practitioner record as the backend serves it. Every durable field
/// lives server-side; this snapshot is read-only until the next wholesale
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub did_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filetitle: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note1: String,
    #[serde(default)]
    pub note2: String,
    #[serde(default)]
    pub note3: String,
    #[serde(default)]
    pub sheet_url: String,
    #[serde(default)]
    pub demand_titles: Vec<DemandTitle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandTitle {
    pub title: String,
    #[serde(default)]
    pub demands: Vec<Demand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    pub name: String,
    #[serde(default)]
    pub patient_types: Vec<PatientType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientType {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dire_text: String,
}

impl Customer {
    /// Picker label: file title wins, then `name (did)`, then the bare did.
    pub fn display_label(&self) -> String {
        let filetitle = self.filetitle.trim();
        if !filetitle.is_empty() {
            return filetitle.to_owned();
        }
        let name = self.name.trim();
        if !name.is_empty() {
            return format!("{} ({})", name, self.did_number);
        }
        format!("Customer ({})", self.did_number)
    }

    /// Numeric prefix of the file title before the first `-`. Pickers sort
    /// by this rank; records without a prefix sort last.
    pub fn filetitle_rank(&self) -> u64 {
        let prefix = self.filetitle.trim().split('-').next().unwrap_or("");
        if prefix.is_empty() || !prefix.chars().all(|ch| ch.is_ascii_digit()) {
            return u64::MAX;
        }
        prefix.parse().unwrap_or(u64::MAX)
    }
}

impl Action {
    pub fn has_dire_text(&self) -> bool {
        !self.dire_text.trim().is_empty()
    }
}

/// Splits display text on `<br>`-style tags and newlines. Sheet imports
/// embed both separators in descriptions and dire texts.
pub fn split_text_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('\n') {
            lines.push(std::mem::take(&mut current));
            rest = after;
            continue;
        }
        if let Some(after) = strip_br_tag(rest) {
            lines.push(std::mem::take(&mut current));
            rest = after;
            continue;
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            current.push(ch);
        }
        rest = chars.as_str();
    }

    lines.push(current);
    lines
}

fn strip_br_tag(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("<br")?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    rest.strip_prefix('>')
}
