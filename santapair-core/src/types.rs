use std::collections::HashSet;

/// Identifier for a participant, provided by the caller.
///
/// The engine treats IDs as opaque: it never derives meaning from the value,
/// only requires uniqueness within one pairing call.
pub type ParticipantId = i64;

/// One member of a pairing scope.
///
/// Identity is by `id` alone. `display_name` and `hint` are carried for the
/// caller's benefit (message rendering, tables) and never inspected here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    /// Caller-provided ID, unique within the pairing scope.
    pub id: ParticipantId,
    /// Optional human-readable name.
    pub display_name: Option<String>,
    /// Optional gift hint, passed through to whoever notifies the giver.
    pub hint: Option<String>,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Participant {
            id,
            display_name: None,
            hint: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// A single giver → recipient edge. Always `giver != recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub giver: ParticipantId,
    pub recipient: ParticipantId,
}

/// The complete result of one pairing call: a derangement over the input set.
///
/// Every input participant appears exactly once as giver and exactly once as
/// recipient. The run is ephemeral — the engine keeps no record of it, and
/// persisting or discarding it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairingRun {
    assignments: Vec<Assignment>,
}

impl PairingRun {
    pub(crate) fn new(assignments: Vec<Assignment>) -> Self {
        PairingRun { assignments }
    }

    /// Assignments in cycle order: each giver is followed by the entry whose
    /// giver is their recipient.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Who `giver` gives to, or `None` if `giver` was not in the input set.
    pub fn recipient_of(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.assignments
            .iter()
            .find(|a| a.giver == giver)
            .map(|a| a.recipient)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }
}

impl<'a> IntoIterator for &'a PairingRun {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}

/// Forbidden `(giver, recipient)` edges for the exclusion-aware operations.
///
/// Directional: forbidding `(a, b)` still allows `b → a`. Pairs naming IDs
/// outside the participant set are allowed and simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExclusionSet {
    forbidden: HashSet<(ParticipantId, ParticipantId)>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid `giver → recipient` in future runs.
    pub fn forbid(&mut self, giver: ParticipantId, recipient: ParticipantId) {
        self.forbidden.insert((giver, recipient));
    }

    pub fn is_forbidden(&self, giver: ParticipantId, recipient: ParticipantId) -> bool {
        self.forbidden.contains(&(giver, recipient))
    }

    pub fn len(&self) -> usize {
        self.forbidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }
}

impl FromIterator<(ParticipantId, ParticipantId)> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, ParticipantId)>>(iter: I) -> Self {
        ExclusionSet {
            forbidden: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ParticipantId, ParticipantId)> for ExclusionSet {
    fn extend<I: IntoIterator<Item = (ParticipantId, ParticipantId)>>(&mut self, iter: I) {
        self.forbidden.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builders() {
        let p = Participant::new(7)
            .with_display_name("Alice")
            .with_hint("loves tea");
        assert_eq!(p.id, 7);
        assert_eq!(p.display_name.as_deref(), Some("Alice"));
        assert_eq!(p.hint.as_deref(), Some("loves tea"));

        let bare = Participant::new(8);
        assert!(bare.display_name.is_none());
        assert!(bare.hint.is_none());
    }

    #[test]
    fn test_recipient_lookup() {
        let run = PairingRun::new(vec![
            Assignment { giver: 1, recipient: 2 },
            Assignment { giver: 2, recipient: 3 },
            Assignment { giver: 3, recipient: 1 },
        ]);
        assert_eq!(run.recipient_of(1), Some(2));
        assert_eq!(run.recipient_of(3), Some(1));
        assert_eq!(run.recipient_of(99), None);
        assert_eq!(run.len(), 3);
        assert!(!run.is_empty());
    }

    #[test]
    fn test_exclusions_are_directional() {
        let mut ex = ExclusionSet::new();
        ex.forbid(1, 2);
        assert!(ex.is_forbidden(1, 2));
        assert!(!ex.is_forbidden(2, 1));
        assert_eq!(ex.len(), 1);
    }

    #[test]
    fn test_exclusions_from_iterator() {
        let ex: ExclusionSet = vec![(1, 2), (2, 3), (1, 2)].into_iter().collect();
        assert_eq!(ex.len(), 2); // duplicate collapses
        assert!(ex.is_forbidden(2, 3));
    }
}
