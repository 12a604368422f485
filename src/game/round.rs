//! Round generation: one target plus distractors in random order.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::game::country::{Country, CountryCatalog};
use crate::game::rules::OPTION_COUNT;

/// Identity of a presented round.
///
/// Ids increase monotonically for the lifetime of a session object, across
/// restarts, so late fetch results can be matched to the round they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("#{}", _0)]
pub struct RoundId(pub u64);

impl RoundId {
    /// Returns the id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// One question: a target country and the options shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    id: RoundId,
    target: Country,
    options: Vec<Country>,
}

impl Round {
    /// Round identity.
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// The country the player must identify.
    pub fn target(&self) -> &Country {
        &self.target
    }

    /// The options, in presentation order.
    pub fn options(&self) -> &[Country] {
        &self.options
    }

    /// Returns true if `guess` is the target.
    pub fn is_correct(&self, guess: &Country) -> bool {
        self.target.same_as(guess)
    }
}

/// Generates a round from the catalog.
///
/// The target is drawn uniformly from the whole catalog; the distractors
/// are drawn uniformly without replacement from the rest, and the
/// combined options are shuffled.
#[instrument(skip(catalog, rng), fields(catalog_size = catalog.len()))]
pub fn generate_round<R: Rng>(catalog: &CountryCatalog, id: RoundId, rng: &mut R) -> Round {
    let countries = catalog.countries();
    let target_index = rng.gen_range(0..countries.len());
    let target = countries[target_index].clone();

    let others: Vec<&Country> = countries
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_index)
        .map(|(_, c)| c)
        .collect();

    let mut options: Vec<Country> = Vec::with_capacity(OPTION_COUNT);
    options.push(target.clone());
    options.extend(
        others
            .choose_multiple(rng, OPTION_COUNT - 1)
            .map(|c| (*c).clone()),
    );
    options.shuffle(rng);

    debug!(round = %id, target = %target, "Generated round");
    Round { id, target, options }
}
