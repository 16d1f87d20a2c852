/// Derangement generation for Secret Santa exchanges.
///
/// Public functions accept `&[Participant]` and return a `PairingRun` of
/// `(giver, recipient)` ID assignments. Internals work on plain ID buffers.
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::constants::{EXCLUSION_SAMPLE_ATTEMPTS, MIN_PARTICIPANTS};
use crate::error::PairingError;
use crate::types::{Assignment, ExclusionSet, PairingRun, Participant, ParticipantId};

/// Generate a pairing: every participant gives to exactly one other
/// participant and receives from exactly one other, never themselves.
///
/// The construction is a uniform Fisher–Yates shuffle of the IDs followed by
/// rotate-by-one adjacency (position `i` gives to position `(i + 1) % n`).
/// A rotation by a nonzero offset over two or more elements has no fixed
/// points, so the result is a derangement by construction rather than by
/// re-checking a shuffle that might have left someone in place. One
/// consequence callers can rely on: every run is a single gift cycle,
/// sampled uniformly over all `(n-1)!` of them.
///
/// Draws from the thread RNG; use [`generate_pairing_with_rng`] to supply a
/// seeded source.
pub fn generate_pairing(participants: &[Participant]) -> Result<PairingRun, PairingError> {
    let mut rng = rand::rng();
    generate_pairing_with_rng(participants, &mut rng)
}

/// [`generate_pairing`] with an injectable randomness source, so callers and
/// tests can reproduce a run from a seed.
pub fn generate_pairing_with_rng(
    participants: &[Participant],
    rng: &mut impl Rng,
) -> Result<PairingRun, PairingError> {
    let mut ids = validated_ids(participants)?;
    Ok(derange(&mut ids, rng))
}

/// Re-run the pairing for a participant set.
///
/// Identical contract to [`generate_pairing`]: the engine holds no memory of
/// earlier runs, so every call is an independent random trial. Anything that
/// should happen to previously stored assignments (clearing them, feeding
/// them into an [`ExclusionSet`]) is the caller's job.
pub fn regenerate_pairing(participants: &[Participant]) -> Result<PairingRun, PairingError> {
    generate_pairing(participants)
}

/// Generate a pairing in which no assignment matches a forbidden
/// `(giver, recipient)` edge.
///
/// Resamples the same shuffle-and-rotate construction until a draw avoids
/// every exclusion, up to [`EXCLUSION_SAMPLE_ATTEMPTS`] tries. Candidates are
/// always single gift cycles, so an exclusion set only satisfiable by a
/// multi-cycle derangement is reported as
/// [`PairingError::ExclusionsUnsatisfiable`].
pub fn generate_pairing_with_exclusions(
    participants: &[Participant],
    exclusions: &ExclusionSet,
) -> Result<PairingRun, PairingError> {
    let mut rng = rand::rng();
    generate_pairing_with_exclusions_rng(participants, exclusions, &mut rng)
}

/// [`generate_pairing_with_exclusions`] with an injectable randomness source.
pub fn generate_pairing_with_exclusions_rng(
    participants: &[Participant],
    exclusions: &ExclusionSet,
    rng: &mut impl Rng,
) -> Result<PairingRun, PairingError> {
    let mut ids = validated_ids(participants)?;

    if exclusions.is_empty() {
        return Ok(derange(&mut ids, rng));
    }

    for _ in 0..EXCLUSION_SAMPLE_ATTEMPTS {
        let run = derange(&mut ids, rng);
        let clean = run
            .assignments()
            .iter()
            .all(|a| !exclusions.is_forbidden(a.giver, a.recipient));
        if clean {
            return Ok(run);
        }
    }

    Err(PairingError::ExclusionsUnsatisfiable {
        attempts: EXCLUSION_SAMPLE_ATTEMPTS,
    })
}

/// Check the input contract and extract the ID buffer the shuffle works on.
///
/// Count is checked before duplicates, so an empty or one-element input
/// always reports `InsufficientParticipants`.
fn validated_ids(participants: &[Participant]) -> Result<Vec<ParticipantId>, PairingError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(PairingError::InsufficientParticipants {
            count: participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.id) {
            return Err(PairingError::DuplicateParticipant { id: p.id });
        }
    }

    Ok(participants.iter().map(|p| p.id).collect())
}

/// Shuffle `ids` uniformly, then pair each position with its right neighbor,
/// wrapping the last around to the first.
///
/// Caller guarantees `ids.len() >= 2` and distinct entries.
fn derange(ids: &mut [ParticipantId], rng: &mut impl Rng) -> PairingRun {
    ids.shuffle(rng);

    let n = ids.len();
    let assignments: Vec<Assignment> = (0..n)
        .map(|i| Assignment {
            giver: ids[i],
            recipient: ids[(i + 1) % n],
        })
        .collect();

    debug_assert!(assignments.iter().all(|a| a.giver != a.recipient));

    PairingRun::new(assignments)
}
