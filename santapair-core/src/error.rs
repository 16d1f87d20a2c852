use thiserror::Error;

use crate::types::ParticipantId;

/// Validation and generation failures of the pairing engine.
///
/// The engine never retries these itself: the same input would fail the same
/// way, so they go straight back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    /// A derangement needs at least two participants.
    #[error("at least 2 participants are required for a pairing, got {count}")]
    InsufficientParticipants { count: usize },

    /// The input contained the same participant ID more than once. Pairing
    /// over duplicates would silently break the one-giver/one-recipient
    /// guarantee, so this is rejected instead.
    #[error("invalid input: duplicate participant id {id}")]
    DuplicateParticipant { id: ParticipantId },

    /// No run satisfying the exclusion set was found within the sampling
    /// budget. Only produced by the exclusion-aware operations.
    #[error("no pairing satisfies the exclusion set (gave up after {attempts} attempts)")]
    ExclusionsUnsatisfiable { attempts: usize },
}
