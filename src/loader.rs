//! Line-oriented dial plan files.
//!
//! Used by the command line tool to get patterns into a trie; library
//! callers usually construct [`Pattern`]s themselves.
//!
//! ```text
//! # calling search spaces: name and partitions
//! css  phones     DN:SJC:PSTN
//! dn   \+14085551001   DN
//! rp   9.!             PSTN
//! tp   10XX            SJC   mask=+14085551XXX originator
//! tp   9.1[2-9]XX      PSTN  discard=predot prefix=+1 css=phones block
//! ```
//!
//! `#` starts a comment when it opens a line or follows whitespace, so it
//! can still be used as a separator inside patterns. The partition column is
//! optional; `NONE` or a missing column selects the empty partition.
//! Translation rule options are `key=value` pairs (`css`,
//! `mask`, `prefix`, `discard=predot`) or flags (`block`, `urgent`,
//! `nonurgent`, `originator`, `calling-route`). A `css=` reference must name
//! a search space declared on an earlier line.

use crate::pattern::{Pattern, TranslationRule};
use crate::visibility::{NONE_PARTITION, Visibility};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: unknown calling search space '{name}'")]
    UnknownSearchSpace { line: usize, name: String },

    #[error(transparent)]
    DialPlan(#[from] crate::error::DialPlanError),
}

/// Patterns and named search spaces read from a dial plan file.
#[derive(Debug, Clone, Default)]
pub struct DialPlan {
    pub patterns: Vec<Pattern>,
    /// Named visibilities, partitions in declaration order.
    pub search_spaces: BTreeMap<String, Vec<String>>,
}

impl DialPlan {
    /// Visibility of the named search space.
    pub fn search_space(&self, name: &str) -> Option<Visibility> {
        self.search_spaces.get(name).map(|partitions| Visibility::from_partitions(partitions.iter().cloned()))
    }
}

/// Read and parse a dial plan file.
pub fn load(path: &Path) -> Result<DialPlan, LoadError> {
    let text =
        std::fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let plan = parse(&text)?;
    log::debug!(
        target: "dialwise::build",
        "loaded {} patterns and {} search spaces from {}",
        plan.patterns.len(),
        plan.search_spaces.len(),
        path.display()
    );
    Ok(plan)
}

/// Parse dial plan text.
pub fn parse(text: &str) -> Result<DialPlan, LoadError> {
    let mut plan = DialPlan::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = regex!(r"(?:^|\s)#.*$").replace(raw, "");
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        let malformed = |reason: &str| LoadError::Malformed { line, reason: reason.to_string() };
        let Some(caps) = regex!(r"^(css|dn|rp|tp)\s+(\S+)(?:\s+(.*))?$").captures(content) else {
            return Err(malformed("expected 'css', 'dn', 'rp' or 'tp' followed by a value"));
        };
        let value = caps[2].to_string();
        let mut rest = caps.get(3).map_or("", |m| m.as_str()).split_whitespace();

        match &caps[1] {
            "css" => {
                let partitions = rest.next().ok_or_else(|| malformed("css needs a partition list"))?;
                if rest.next().is_some() {
                    return Err(malformed("trailing input after css partition list"));
                }
                let partitions = partitions.split(':').map(partition_name).collect();
                plan.search_spaces.insert(value, partitions);
            }
            kind @ ("dn" | "rp") => {
                let partition = rest.next().map(partition_name).unwrap_or_default();
                if rest.next().is_some() {
                    return Err(malformed("trailing input after partition"));
                }
                let pattern = if kind == "dn" {
                    Pattern::directory_number(value, partition)
                } else {
                    Pattern::route_pattern(value, partition)
                };
                plan.patterns.push(pattern);
            }
            _ => {
                let mut options: Vec<&str> = rest.collect();
                let has_partition = options.first().is_some_and(|first| !first.contains('=') && !is_flag(first));
                let partition = if has_partition { partition_name(options.remove(0)) } else { String::new() };
                let rule = translation_rule(line, &options, &plan)?;
                plan.patterns.push(Pattern::translation(value, partition, rule));
            }
        }
    }
    Ok(plan)
}

fn partition_name(token: &str) -> String {
    if token == NONE_PARTITION { String::new() } else { token.to_string() }
}

fn is_flag(token: &str) -> bool {
    matches!(token, "block" | "urgent" | "nonurgent" | "originator" | "calling-route")
}

fn translation_rule(line: usize, options: &[&str], plan: &DialPlan) -> Result<TranslationRule, LoadError> {
    let mut rule = TranslationRule::default();
    for option in options {
        if let Some(caps) = regex!(r"^([a-z]+)=(\S*)$").captures(option) {
            let value = &caps[2];
            match &caps[1] {
                "css" => {
                    rule.target_partitions = plan
                        .search_spaces
                        .get(value)
                        .cloned()
                        .ok_or_else(|| LoadError::UnknownSearchSpace { line, name: value.to_string() })?;
                }
                "mask" => rule.mask = value.to_string(),
                "prefix" => rule.prefix_digits = value.to_string(),
                "discard" if value == "predot" => rule.discard_pre_dot = true,
                key => {
                    return Err(LoadError::Malformed { line, reason: format!("unknown translation option '{key}={value}'") });
                }
            }
            continue;
        }
        match *option {
            "block" => rule.blocking = true,
            "urgent" => rule.urgent = true,
            "nonurgent" => rule.urgent = false,
            "originator" => rule.use_originator_visibility = true,
            "calling-route" => rule.route_by_calling_number = true,
            other => {
                return Err(LoadError::Malformed { line, reason: format!("unknown translation flag '{other}'") });
            }
        }
    }
    Ok(rule)
}
