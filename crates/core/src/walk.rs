//! Path resolution across zones.
//!
//! A path such as `:free.alice` is read left to right starting at the root
//! entry. Each step names a key in the zone that the previous entry's `data`
//! points at. `:` steps must land on locked entries and may only follow other
//! `:` steps; `.` steps accept anything.

use crate::dmap::Dmap;
use crate::errors::DmapError;
use dmap_storage::Storage;
use dmap_types::{Entry, Word, Zone, MAX_LABEL_BYTES};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Zero register before step {name:?}")]
    ZeroRegister { name: String },

    #[error("Encountered ':' in unlocked subpath at {name:?}")]
    UnlockedSubpath { name: String },

    #[error("Entry {name:?} is not locked")]
    NotLocked { name: String },

    #[error(transparent)]
    Dmap(#[from] DmapError),
}

/// Separator in front of each path step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rune {
    /// `:`, the step must resolve to a locked entry.
    Locked,
    /// `.`, the step may resolve to a mutable entry.
    Unlocked,
}

impl Rune {
    fn from_char(c: char) -> Option<Self> {
        match c {
            ':' => Some(Rune::Locked),
            '.' => Some(Rune::Unlocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub rune: Rune,
    pub name: String,
}

impl Step {
    /// Key this step looks up.
    pub fn key(&self) -> Word {
        // parse_path only yields 1..=31 byte ASCII names
        Word::from_label(&self.name).unwrap_or(Word::ZERO)
    }
}

/// Split a path into steps. A path that does not begin with a rune is read
/// as if it began with `:`.
pub fn parse_path(path: &str) -> Result<Vec<Step>, WalkError> {
    let invalid = |reason: &str| WalkError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut steps: Vec<Step> = Vec::new();
    let mut current: Option<Step> = None;
    for c in path.chars() {
        if let Some(rune) = Rune::from_char(c) {
            if let Some(step) = current.take() {
                if step.name.is_empty() {
                    return Err(invalid("empty name"));
                }
                steps.push(step);
            }
            current = Some(Step {
                rune,
                name: String::new(),
            });
            continue;
        }
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            return Err(invalid(&format!("unexpected character {c:?}")));
        }
        let step = current.get_or_insert_with(|| Step {
            rune: Rune::Locked,
            name: String::new(),
        });
        step.name.push(c);
        if step.name.len() > MAX_LABEL_BYTES {
            return Err(invalid("name too long"));
        }
    }
    if let Some(step) = current {
        if step.name.is_empty() {
            return Err(invalid("empty name"));
        }
        steps.push(step);
    }
    Ok(steps)
}

/// Resolve `path` and return the trace: the root entry followed by one entry
/// per step.
pub fn walk<S: Storage>(dmap: &Dmap<S>, path: &str) -> Result<Vec<Entry>, WalkError> {
    let steps = parse_path(path)?;
    let mut entry = dmap.root()?;
    let mut trace = vec![entry];
    let mut locked = steps.first().map_or(true, |s| s.rune == Rune::Locked);

    for step in &steps {
        let zone = Zone::from_pointer(&entry.data);
        if zone.is_zero() {
            return Err(WalkError::ZeroRegister {
                name: step.name.clone(),
            });
        }
        entry = dmap.get(&zone, &step.key())?;
        if step.rune == Rune::Locked {
            if !locked {
                return Err(WalkError::UnlockedSubpath {
                    name: step.name.clone(),
                });
            }
            if !entry.is_locked() {
                return Err(WalkError::NotLocked {
                    name: step.name.clone(),
                });
            }
        }
        locked = step.rune == Rune::Locked;
        trace.push(entry);
    }
    Ok(trace)
}
