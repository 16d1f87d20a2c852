use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use santapair_core::{
    generate_pairing, generate_pairing_with_exclusions_rng, generate_pairing_with_rng,
    ExclusionSet, PairingError, PairingRun, Participant, ParticipantId,
};
use std::collections::{BTreeSet, HashSet};

fn participants(ids: &[ParticipantId]) -> Vec<Participant> {
    ids.iter().map(|&id| Participant::new(id)).collect()
}

/// The three laws every run must satisfy: one assignment per participant,
/// givers and recipients each cover the input exactly, nobody draws
/// themselves.
fn check_derangement(run: &PairingRun, ids: &[ParticipantId]) -> Result<(), TestCaseError> {
    prop_assert_eq!(run.len(), ids.len());

    let expected: HashSet<ParticipantId> = ids.iter().copied().collect();
    let givers: HashSet<ParticipantId> = run.assignments().iter().map(|a| a.giver).collect();
    let recipients: HashSet<ParticipantId> =
        run.assignments().iter().map(|a| a.recipient).collect();

    prop_assert_eq!(&givers, &expected);
    prop_assert_eq!(&recipients, &expected);

    for a in run {
        prop_assert_ne!(a.giver, a.recipient);
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_every_run_is_a_derangement(
        ids in prop::collection::btree_set(any::<i64>(), 2..40),
        seed in any::<u64>(),
    ) {
        let ids: Vec<ParticipantId> = ids.into_iter().collect();
        let input = participants(&ids);

        let mut rng = SmallRng::seed_from_u64(seed);
        let run = generate_pairing_with_rng(&input, &mut rng).unwrap();

        check_derangement(&run, &ids)?;
    }

    #[test]
    fn test_same_seed_reproduces_the_run(
        ids in prop::collection::btree_set(any::<i64>(), 2..20),
        seed in any::<u64>(),
    ) {
        let input = participants(&ids.into_iter().collect::<Vec<_>>());

        let mut rng_a = SmallRng::seed_from_u64(seed);
        let mut rng_b = SmallRng::seed_from_u64(seed);

        let run_a = generate_pairing_with_rng(&input, &mut rng_a).unwrap();
        let run_b = generate_pairing_with_rng(&input, &mut rng_b).unwrap();

        prop_assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_every_run_closes_into_one_cycle(
        ids in prop::collection::btree_set(any::<i64>(), 2..30),
        seed in any::<u64>(),
    ) {
        let ids: Vec<ParticipantId> = ids.into_iter().collect();
        let input = participants(&ids);

        let mut rng = SmallRng::seed_from_u64(seed);
        let run = generate_pairing_with_rng(&input, &mut rng).unwrap();

        // Follow the chain of gifts from any starting point; it must visit
        // everybody once and land back at the start.
        let mut current = ids[0];
        let mut visited = BTreeSet::new();
        for _ in 0..ids.len() {
            prop_assert!(visited.insert(current), "revisited {} early", current);
            current = run.recipient_of(current).unwrap();
        }
        prop_assert_eq!(current, ids[0]);
        prop_assert_eq!(visited.len(), ids.len());
    }

    #[test]
    fn test_a_single_forbidden_edge_is_avoided(
        ids in prop::collection::btree_set(any::<i64>(), 3..12),
        seed in any::<u64>(),
        giver_pick in any::<prop::sample::Index>(),
        recipient_pick in any::<prop::sample::Index>(),
    ) {
        let ids: Vec<ParticipantId> = ids.into_iter().collect();
        let giver = ids[giver_pick.index(ids.len())];
        let recipient = ids[recipient_pick.index(ids.len())];
        prop_assume!(giver != recipient);

        let input = participants(&ids);
        let mut exclusions = ExclusionSet::new();
        exclusions.forbid(giver, recipient);

        // With n >= 3 a single forbidden edge rules out a 1/(n-1) fraction of
        // gift cycles, so 256 resamples all colliding with it is not a real
        // outcome.
        let mut rng = SmallRng::seed_from_u64(seed);
        let run = generate_pairing_with_exclusions_rng(&input, &exclusions, &mut rng).unwrap();

        prop_assert_ne!(run.recipient_of(giver), Some(recipient));
        check_derangement(&run, &ids)?;
    }

    #[test]
    fn test_too_few_participants_always_rejected(
        id in any::<i64>(),
    ) {
        prop_assert_eq!(
            generate_pairing(&[]),
            Err(PairingError::InsufficientParticipants { count: 0 })
        );
        prop_assert_eq!(
            generate_pairing(&participants(&[id])),
            Err(PairingError::InsufficientParticipants { count: 1 })
        );
    }
}

#[test]
fn test_two_participants_must_swap_so_forbidding_the_swap_fails() {
    let input = participants(&[1, 2]);
    let mut exclusions = ExclusionSet::new();
    exclusions.forbid(1, 2);

    let mut rng = SmallRng::seed_from_u64(0);
    let result = generate_pairing_with_exclusions_rng(&input, &exclusions, &mut rng);
    assert!(matches!(
        result,
        Err(PairingError::ExclusionsUnsatisfiable { .. })
    ));
}

#[test]
fn test_duplicate_ids_rejected_through_the_public_api() {
    let input = vec![
        Participant::new(7).with_display_name("Sam"),
        Participant::new(7).with_display_name("Riley"),
    ];
    assert_eq!(
        generate_pairing(&input),
        Err(PairingError::DuplicateParticipant { id: 7 })
    );
}
