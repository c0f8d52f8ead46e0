//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! YANG features and if-feature references.

use log::Level;

use crate::error::{Error, ErrorCode, Result};
use crate::logging;
use crate::types::{AppInfo, ModuleId, SourceLocation, Status};

/// One YANG `feature` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub name: String,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub status: Status,
    pub iffeatures: Vec<IfFeature>,
    pub appinfo: Vec<AppInfo>,
    pub enabled: bool,
    pub tkerr: SourceLocation,
}

/// Location of a feature definition inside the module registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct FeatureRef {
    pub module: ModuleId,
    pub index: usize,
}

/// One `if-feature` reference.
#[derive(Clone, Debug, PartialEq)]
pub struct IfFeature {
    pub prefix: Option<String>,
    pub name: String,
    pub feature: Option<FeatureRef>,
    pub tkerr: SourceLocation,
}

/// One feature enable setting, keyed by `module:feature` or `feature`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeatureEntry {
    pub module: Option<String>,
    pub feature: String,
    pub enabled: bool,
}

/// Feature enable configuration owned by a context.
///
/// Entries are applied to each feature when it is added to a module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeatureConfig {
    enable_default: bool,
    entries: Vec<FeatureEntry>,
}

// ===== impl Feature =====

impl Feature {
    pub fn new(name: &str) -> Feature {
        Feature {
            name: name.to_owned(),
            description: None,
            reference: None,
            status: Status::Current,
            iffeatures: Vec::new(),
            appinfo: Vec::new(),
            enabled: true,
            tkerr: SourceLocation::default(),
        }
    }
}

// ===== impl IfFeature =====

impl IfFeature {
    /// Create an unresolved reference from a `prefix:name` or `name` string.
    pub fn new(qname: &str) -> IfFeature {
        let (prefix, name) = crate::utils::split_qname(qname);
        IfFeature {
            prefix: prefix.map(str::to_owned),
            name: name.to_owned(),
            feature: None,
            tkerr: SourceLocation::default(),
        }
    }
}

// ===== impl FeatureEntry =====

impl FeatureEntry {
    fn parse(featstr: &str) -> Result<FeatureEntry> {
        let (module, feature) = split_feature_string(featstr)?;
        Ok(FeatureEntry {
            module: module.map(str::to_owned),
            feature: feature.to_owned(),
            enabled: true,
        })
    }

    fn matches(&self, module: Option<&str>, feature: &str) -> bool {
        if let (Some(own), Some(module)) = (self.module.as_deref(), module) {
            if own != module {
                return false;
            }
        }
        self.feature == feature
    }
}

fn split_feature_string(featstr: &str) -> Result<(Option<&str>, &str)> {
    let mut parts = featstr.split(':');
    let first = parts.next().unwrap_or_default();
    match (parts.next(), parts.next()) {
        (None, _) if !first.is_empty() => Ok((None, first)),
        (Some(feature), None) if !first.is_empty() && !feature.is_empty() => {
            Ok((Some(first), feature))
        }
        _ => Err(Error::with_msg(
            ErrorCode::InvalidValue,
            format!("invalid feature string '{}'", featstr),
        )),
    }
}

// ===== impl FeatureConfig =====

impl FeatureConfig {
    pub fn new(enable_default: bool) -> FeatureConfig {
        FeatureConfig {
            enable_default,
            entries: Vec::new(),
        }
    }

    /// Enable state given to features without a matching entry.
    pub fn enable_default(&self) -> bool {
        self.enable_default
    }

    pub fn set_enable_default(&mut self, flag: bool) {
        self.enable_default = flag;
    }

    /// Record an enable setting from a `module:feature` or `feature` string.
    ///
    /// Setting the same feature again with the opposite value is rejected
    /// and the first value is kept.
    pub fn set_enable_entry(
        &mut self,
        featstr: &str,
        flag: bool,
    ) -> Result<()> {
        let parsed = FeatureEntry::parse(featstr)?;
        if let Some(entry) = self.find_entry_mut(
            parsed.module.as_deref(),
            &parsed.feature,
        ) {
            if entry.enabled != flag {
                logging::emit(
                    Level::Info,
                    None,
                    &format!(
                        "feature '{}' already {} so ignoring new value",
                        featstr,
                        if entry.enabled { "enabled" } else { "disabled" }
                    ),
                );
                return Err(Error::with_msg(
                    ErrorCode::InvalidValue,
                    format!("feature '{}' already set", featstr),
                ));
            }
            return Ok(());
        }

        self.entries.push(FeatureEntry {
            enabled: flag,
            ..parsed
        });
        Ok(())
    }

    /// Record an enable setting for a feature of a known module.
    ///
    /// A disable always overrides an earlier enable; an enable never
    /// overrides an earlier disable.
    pub fn set_enable(&mut self, module: &str, feature: &str, flag: bool) {
        match self.find_entry_mut(Some(module), feature) {
            Some(entry) if entry.enabled != flag => {
                if flag {
                    logging::emit(
                        Level::Debug,
                        None,
                        &format!(
                            "feature '{}' already disabled, ignoring enable",
                            feature
                        ),
                    );
                } else {
                    logging::emit(
                        Level::Info,
                        None,
                        &format!(
                            "feature '{}' disabled, overriding earlier enable",
                            feature
                        ),
                    );
                    entry.enabled = false;
                }
            }
            Some(_) => (),
            None => self.entries.push(FeatureEntry {
                module: Some(module.to_owned()),
                feature: feature.to_owned(),
                enabled: flag,
            }),
        }
    }

    /// Enable state for a feature defined in `module`.
    pub fn enabled_for(&self, module: &str, feature: &str) -> bool {
        self.find_entry(Some(module), feature)
            .map(|entry| entry.enabled)
            .unwrap_or(self.enable_default)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter()
    }

    fn find_entry(
        &self,
        module: Option<&str>,
        feature: &str,
    ) -> Option<&FeatureEntry> {
        self.entries.iter().find(|e| e.matches(module, feature))
    }

    fn find_entry_mut(
        &mut self,
        module: Option<&str>,
        feature: &str,
    ) -> Option<&mut FeatureEntry> {
        self.entries.iter_mut().find(|e| e.matches(module, feature))
    }
}

impl Default for FeatureConfig {
    fn default() -> FeatureConfig {
        FeatureConfig::new(true)
    }
}
