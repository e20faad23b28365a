// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use url::Url;

/// Input for the add-customer flow; the backend imports the sheet and owns
/// the resulting record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerFormInput {
    pub name: String,
    pub did_number: String,
    pub sheet_url: String,
}

impl CustomerFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("customer name is required -- enter a name and retry");
        }
        if self.did_number.trim().is_empty() {
            bail!("DID number is required -- enter the unique DID and retry");
        }
        let sheet_url = self.sheet_url.trim();
        if sheet_url.is_empty() {
            bail!("sheet URL is required -- paste the shared sheet link and retry");
        }
        let parsed = match Url::parse(sheet_url) {
            Ok(parsed) => parsed,
            Err(_) => bail!("sheet URL {sheet_url:?} is not a valid URL"),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("sheet URL must use http or https, got {:?}", parsed.scheme());
        }
        Ok(())
    }

    /// Trimmed copy ready for the import endpoint.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            did_number: self.did_number.trim().to_owned(),
            sheet_url: self.sheet_url.trim().to_owned(),
        }
    }
}
