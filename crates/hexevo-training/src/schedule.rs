/// Opponents of one individual within a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    /// Opponent of the first round.
    pub second: usize,
    /// Opponent of the second round.
    pub third: usize,
}

/// Fixed pairing of a population of `λ` individuals for two tournament rounds.
///
/// For individual `i`:
///
/// ```text
/// second(i) = (i + λ/2) mod λ              mirrored to λ/2 - 1 - second if second < λ/2
/// third(i)  = (i + λ/2 + λ/4) mod λ        mirrored the same way
/// ```
///
/// Both rounds are permutations of the population, so every individual is
/// the second argument of exactly one match per round. For some `λ` the
/// second round pairs an individual with itself; such a match compares two
/// identical search points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSchedule {
    pairings: Vec<Pairing>,
}

impl TournamentSchedule {
    /// # Panics
    ///
    /// Panics if `population_size` is zero.
    #[must_use]
    pub fn new(population_size: usize) -> Self {
        assert!(population_size > 0, "population must not be empty");
        let lambda = population_size;
        let half = lambda / 2;
        let mirror = |partner: usize| {
            if partner < half {
                half - 1 - partner
            } else {
                partner
            }
        };
        let pairings = (0..lambda)
            .map(|i| Pairing {
                second: mirror((i + half) % lambda),
                third: mirror((i + half + lambda / 4) % lambda),
            })
            .collect();
        Self { pairings }
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.pairings.len()
    }

    #[must_use]
    pub fn pairing(&self, individual: usize) -> Pairing {
        self.pairings[individual]
    }

    #[must_use]
    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    /// All matches of a generation as `(first, second)` pairs.
    ///
    /// Match `2i` is individual `i`'s first round and match `2i + 1` its
    /// second round.
    pub fn matches(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairings
            .iter()
            .enumerate()
            .flat_map(|(i, p)| [(i, p.second), (i, p.third)])
    }
}
