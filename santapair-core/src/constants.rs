/// Smallest participant set that admits a derangement.
///
/// With one participant the only permutation is the identity, which a
/// derangement forbids. Two participants have exactly one derangement
/// (the mutual swap), so 2 is the hard floor for every operation.
pub const MIN_PARTICIPANTS: usize = 2;

/// Sampling budget for the exclusion-aware operations.
///
/// Exclusion handling resamples the shuffle-and-rotate construction until a
/// draw avoids every forbidden edge. A random gift cycle over n participants
/// passes through any one forbidden edge with probability 1/(n-1), so for
/// realistic exclusion sets (a previous year's run, a handful of couples)
/// the expected number of draws is small — single digits even when every
/// participant carries one exclusion.
///
/// The cap exists for exclusion sets that no gift cycle can satisfy, where
/// the loop would otherwise never finish. Each attempt is O(n), so 256 keeps
/// the worst case cheap while making a false "unsatisfiable" verdict on a
/// feasible set vanishingly unlikely.
pub const EXCLUSION_SAMPLE_ATTEMPTS: usize = 256;
