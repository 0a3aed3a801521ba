// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Generation settings, loadable from a TOML file.
//!
//! Every field is optional: anything left unset is resolved to the
//! documented random default when the build starts, so a settings file
//! only needs to mention what it wants to pin down.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::pitch::Pitch;
use crate::music::scale::Mode;
use crate::search::builder::BuilderOptions;

/// File-level generation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Starting pitch in scientific notation, e.g. "D4".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tonic: Option<String>,
    /// Mode name: "major", "minor", or "dorian".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Total note count to aim for (8-16 when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Climax pitch in scientific notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climax: Option<String>,
    /// Zero-based index the climax should land on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climax_position: Option<usize>,
    /// Widest allowed generic size below the climax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_range: Option<u32>,
    /// Phase A success quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<usize>,
    /// RNG seed for reproducible runs; entropy-seeded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml: &str) -> Result<Self> {
        toml::from_str(toml).context("Failed to parse TOML settings")
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize settings to TOML")
    }

    /// Save settings to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml = self.to_toml()?;
        fs::write(path.as_ref(), toml)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }

    /// Convert the string-typed fields into engine options.
    pub fn builder_options(&self) -> Result<BuilderOptions> {
        let tonic = match &self.tonic {
            Some(spelling) => Some(
                spelling
                    .parse::<Pitch>()
                    .with_context(|| format!("Invalid tonic: {:?}", spelling))?,
            ),
            None => None,
        };
        let mode = match &self.mode {
            Some(name) => {
                Some(Mode::from_str(name).ok_or_else(|| anyhow!("Unknown mode: {:?}", name))?)
            }
            None => None,
        };
        let climax = match &self.climax {
            Some(spelling) => Some(
                spelling
                    .parse::<Pitch>()
                    .with_context(|| format!("Invalid climax: {:?}", spelling))?,
            ),
            None => None,
        };
        Ok(BuilderOptions {
            start: None,
            tonic,
            mode,
            goal_length: self.length,
            climax,
            climax_position: self.climax_position,
            max_range: self.max_range,
        })
    }
}
