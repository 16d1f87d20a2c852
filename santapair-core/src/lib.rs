/// santapair-core: Pure-computation Secret Santa pairing engine.
///
/// Participants in → uniform derangement out. Everyone gives to exactly one
/// other participant, receives from exactly one, and never draws themselves.
/// No IO, no persistence — just the draw. Bring your own roster.
///
/// Participants are identified by caller-provided `i64` IDs. Display names
/// and gift hints ride along untouched — the engine only reads IDs.
///
/// # Quick start
///
/// ```rust
/// use santapair_core::{generate_pairing, Participant};
///
/// let participants = vec![
///     Participant::new(100).with_display_name("Avery"),
///     Participant::new(200).with_display_name("Blake"),
///     Participant::new(300).with_display_name("Casey"),
/// ];
///
/// let run = generate_pairing(&participants).unwrap();
///
/// for a in &run {
///     println!("{} gives to {}", a.giver, a.recipient);
/// }
/// ```

pub mod constants;
pub mod error;
pub mod pairing;
pub mod types;

// Re-export primary public API at crate root.
pub use error::PairingError;
pub use pairing::{
    generate_pairing, generate_pairing_with_exclusions, generate_pairing_with_exclusions_rng,
    generate_pairing_with_rng, regenerate_pairing,
};
pub use types::{Assignment, ExclusionSet, PairingRun, Participant, ParticipantId};
