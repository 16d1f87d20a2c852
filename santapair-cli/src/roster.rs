/// The roster file: groups, members, and their stored assignments.
///
/// This is the storage collaborator of the pairing engine. The engine only
/// ever sees `Participant` lists; everything about groups, wishlists, and
/// the `recipient` field written back after a run lives here.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use santapair_core::{PairingRun, Participant, ParticipantId};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse roster {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate member id {id} in roster")]
    DuplicateMemberId { id: ParticipantId },

    #[error("duplicate group code \"{code}\" in roster")]
    DuplicateGroupCode { code: String },

    #[error("member \"{member}\" has invalid group code \"{code}\"")]
    InvalidGroupCode { member: String, code: String },

    #[error("no group with code \"{code}\"")]
    NoSuchGroup { code: String },

    #[error(
        "scope \"{scope}\" already has stored assignments; use `santapair regenerate` to redraw"
    )]
    AlreadyAssigned { scope: String },

    #[error("failed to write roster {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A gift-exchange group. Members join by `code`, which is unique in the
/// roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub code: String,
}

/// One person in the roster.
///
/// `recipient` is the stored outcome of a pairing run: who this member gives
/// to, or `None` before any run (or after `regenerate` clears it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wishlist: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Group code, or `None` for the ungrouped pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ParticipantId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// Which part of the roster a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSelection {
    /// Every group independently, plus the ungrouped pool. Empty scopes are
    /// skipped (nothing was asked of them).
    EveryScope,
    /// One group, by join code. Unknown codes are an error.
    Group(String),
    /// Only members that belong to no group.
    Ungrouped,
    /// The whole roster as one scope, ignoring group boundaries.
    Everyone,
}

/// One pairing scope: a label for messages plus the member IDs the engine
/// will be handed. Pairing never crosses a scope boundary because each scope
/// becomes its own engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub label: String,
    pub member_ids: Vec<ParticipantId>,
}

/// A defect found in stored assignments by `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityProblem {
    NotAssigned { member: String, scope: String },
    SelfAssignment { member: String },
    OutsideScope {
        giver: String,
        recipient: String,
        scope: String,
    },
    UnknownRecipient {
        giver: String,
        id: ParticipantId,
    },
    DuplicateRecipient {
        member: String,
        givers: usize,
        scope: String,
    },
}

impl fmt::Display for IntegrityProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityProblem::NotAssigned { member, scope } => {
                write!(f, "{member} in scope \"{scope}\" has no recipient")
            }
            IntegrityProblem::SelfAssignment { member } => {
                write!(f, "{member} is assigned to themselves")
            }
            IntegrityProblem::OutsideScope {
                giver,
                recipient,
                scope,
            } => write!(
                f,
                "{giver} is assigned to {recipient}, outside scope \"{scope}\""
            ),
            IntegrityProblem::UnknownRecipient { giver, id } => {
                write!(f, "{giver} is assigned to unknown member id {id}")
            }
            IntegrityProblem::DuplicateRecipient {
                member,
                givers,
                scope,
            } => write!(
                f,
                "{member} in scope \"{scope}\" is the recipient of {givers} givers"
            ),
        }
    }
}

impl Roster {
    /// Read and validate a roster file.
    pub fn load(path: &Path) -> Result<Roster, RosterError> {
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let roster: Roster =
            serde_json::from_str(&content).map_err(|source| RosterError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        roster.validate()?;
        debug!(
            members = roster.members.len(),
            groups = roster.groups.len(),
            "roster loaded"
        );
        Ok(roster)
    }

    /// Write the roster back as one atomic batch: serialize everything,
    /// write to a temp file next to the target, then rename over it. A
    /// reader never observes a half-updated pairing, and a failure before
    /// the rename leaves the old file untouched.
    pub fn save(&self, path: &Path) -> Result<(), RosterError> {
        let write_err = |source: std::io::Error| RosterError::Write {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::other(e)))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), "roster saved");
        Ok(())
    }

    fn validate(&self) -> Result<(), RosterError> {
        let mut codes = HashSet::new();
        for g in &self.groups {
            if !codes.insert(g.code.as_str()) {
                return Err(RosterError::DuplicateGroupCode {
                    code: g.code.clone(),
                });
            }
        }

        let mut ids = HashSet::new();
        for m in &self.members {
            if !ids.insert(m.id) {
                return Err(RosterError::DuplicateMemberId { id: m.id });
            }
            if let Some(code) = &m.group {
                if !codes.contains(code.as_str()) {
                    return Err(RosterError::InvalidGroupCode {
                        member: m.name.clone(),
                        code: code.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn member(&self, id: ParticipantId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    fn member_mut(&mut self, id: ParticipantId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Display name for tables and problem reports.
    pub fn member_label(&self, id: ParticipantId) -> String {
        match self.member(id) {
            Some(m) => m.name.clone(),
            None => format!("#{id}"),
        }
    }

    /// Partition the roster into pairing scopes for a selection.
    pub fn scopes(&self, selection: &ScopeSelection) -> Result<Vec<Scope>, RosterError> {
        match selection {
            ScopeSelection::EveryScope => {
                let mut scopes = Vec::new();
                for g in &self.groups {
                    let scope = self.group_scope(g);
                    if scope.member_ids.is_empty() {
                        debug!(group = %g.code, "skipping empty group");
                        continue;
                    }
                    scopes.push(scope);
                }
                let ungrouped = self.ungrouped_scope();
                if !ungrouped.member_ids.is_empty() {
                    scopes.push(ungrouped);
                }
                Ok(scopes)
            }
            ScopeSelection::Group(code) => {
                let g = self
                    .groups
                    .iter()
                    .find(|g| g.code == *code)
                    .ok_or_else(|| RosterError::NoSuchGroup { code: code.clone() })?;
                Ok(vec![self.group_scope(g)])
            }
            ScopeSelection::Ungrouped => Ok(vec![self.ungrouped_scope()]),
            ScopeSelection::Everyone => Ok(vec![Scope {
                label: "everyone".to_string(),
                member_ids: self.members.iter().map(|m| m.id).collect(),
            }]),
        }
    }

    fn group_scope(&self, group: &Group) -> Scope {
        Scope {
            label: format!("{} ({})", group.name, group.code),
            member_ids: self
                .members
                .iter()
                .filter(|m| m.group.as_deref() == Some(group.code.as_str()))
                .map(|m| m.id)
                .collect(),
        }
    }

    fn ungrouped_scope(&self) -> Scope {
        Scope {
            label: "ungrouped".to_string(),
            member_ids: self
                .members
                .iter()
                .filter(|m| m.group.is_none())
                .map(|m| m.id)
                .collect(),
        }
    }

    /// Build the engine's input for a scope. Display name and hint ride
    /// along so callers holding only the run can still label people.
    pub fn participants(&self, ids: &[ParticipantId]) -> Vec<Participant> {
        ids.iter()
            .filter_map(|&id| self.member(id))
            .map(|m| Participant {
                id: m.id,
                display_name: Some(m.name.clone()),
                hint: m.hint.clone(),
            })
            .collect()
    }

    /// Whether any member of `ids` already has a stored assignment.
    pub fn any_assigned(&self, ids: &[ParticipantId]) -> bool {
        ids.iter()
            .any(|&id| self.member(id).is_some_and(|m| m.recipient.is_some()))
    }

    /// Refuse a fresh pairing over scopes that already hold assignments.
    /// Redrawing a live exchange is `regenerate`'s job; it clears first.
    pub fn ensure_unassigned(&self, scopes: &[Scope]) -> Result<(), RosterError> {
        for scope in scopes {
            if self.any_assigned(&scope.member_ids) {
                return Err(RosterError::AlreadyAssigned {
                    scope: scope.label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Store a run's assignments onto the member records (in memory; `save`
    /// makes it durable).
    pub fn apply_run(&mut self, run: &PairingRun) {
        for a in run {
            if let Some(m) = self.member_mut(a.giver) {
                m.recipient = Some(a.recipient);
            }
        }
    }

    /// Drop stored assignments for `ids`, returning the cleared
    /// `(giver, recipient)` edges so `regenerate --exclude-previous` can
    /// forbid them in the fresh draw.
    pub fn clear_assignments(
        &mut self,
        ids: &[ParticipantId],
    ) -> Vec<(ParticipantId, ParticipantId)> {
        let ids: HashSet<ParticipantId> = ids.iter().copied().collect();
        let mut cleared = Vec::new();
        for m in &mut self.members {
            if ids.contains(&m.id) {
                if let Some(r) = m.recipient.take() {
                    cleared.push((m.id, r));
                }
            }
        }
        cleared
    }

    /// Verify stored assignments scope by scope.
    ///
    /// A scope with no assignments at all is fine (not paired yet). A scope
    /// with any assignment must be a complete derangement over its members:
    /// everyone assigned, nobody to themselves, nobody outside the scope,
    /// every member a recipient exactly once.
    pub fn check_integrity(&self, scopes: &[Scope]) -> Vec<IntegrityProblem> {
        let mut problems = Vec::new();

        for scope in scopes {
            let ids: HashSet<ParticipantId> = scope.member_ids.iter().copied().collect();
            let members: Vec<&Member> = scope
                .member_ids
                .iter()
                .filter_map(|&id| self.member(id))
                .collect();

            if members.iter().all(|m| m.recipient.is_none()) {
                continue;
            }

            let mut received: HashMap<ParticipantId, usize> = HashMap::new();
            for m in &members {
                match m.recipient {
                    None => problems.push(IntegrityProblem::NotAssigned {
                        member: m.name.clone(),
                        scope: scope.label.clone(),
                    }),
                    Some(r) if r == m.id => problems.push(IntegrityProblem::SelfAssignment {
                        member: m.name.clone(),
                    }),
                    Some(r) if !ids.contains(&r) => {
                        if self.member(r).is_some() {
                            problems.push(IntegrityProblem::OutsideScope {
                                giver: m.name.clone(),
                                recipient: self.member_label(r),
                                scope: scope.label.clone(),
                            });
                        } else {
                            problems.push(IntegrityProblem::UnknownRecipient {
                                giver: m.name.clone(),
                                id: r,
                            });
                        }
                    }
                    Some(r) => {
                        *received.entry(r).or_insert(0) += 1;
                    }
                }
            }

            let mut duplicated: Vec<(ParticipantId, usize)> = received
                .into_iter()
                .filter(|&(_, count)| count > 1)
                .collect();
            duplicated.sort_unstable();
            for (id, givers) in duplicated {
                problems.push(IntegrityProblem::DuplicateRecipient {
                    member: self.member_label(id),
                    givers,
                    scope: scope.label.clone(),
                });
            }
        }

        problems
    }
}
