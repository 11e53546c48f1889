use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha20Rng;

use crate::calendar::TemporalSampler;
use crate::columns;
use crate::config::GeneratorConfig;
use crate::defects::{self, Defect};
use crate::error::GeneratorError;
use crate::events;
use crate::financials::Financials;
use crate::record::{self, ClaimDraft, ClaimRecord};
use crate::types::RecordId;

/// One record straight out of the pipeline, with the defect it received.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClaim {
    pub record: ClaimRecord,
    pub defect: Option<Defect>,
}

/// Drives the per-record pipeline: timeline → seasonal event → financials →
/// assembly → defect injection.
///
/// Holds the only mutable state of a run (the RNG and the next row index);
/// the configuration and its reference tables are borrowed read-only, so one
/// config can back several generators at once.
pub struct ClaimsGenerator<'c> {
    config: &'c GeneratorConfig,
    sampler: TemporalSampler,
    rng: ChaCha20Rng,
    next_index: usize,
}

impl<'c> ClaimsGenerator<'c> {
    /// Validate `config` and seed the RNG from `config.seed`.
    pub fn new(config: &'c GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(ClaimsGenerator {
            config,
            sampler: TemporalSampler::new(config.epoch, config.today)?,
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            next_index: 0,
        })
    }

    pub fn sampler(&self) -> &TemporalSampler {
        &self.sampler
    }

    /// Generate the next claim. Ids increase by one per call, starting at 1.
    pub fn next_claim(&mut self) -> GeneratedClaim {
        let config = self.config;
        let rng = &mut self.rng;
        let id = RecordId::from_index(self.next_index);
        self.next_index += 1;

        let state = config
            .reference
            .states
            .choose(rng)
            .map_or("", String::as_str);
        let timeline = self.sampler.sample(rng);
        let event = events::correlate(&config.events, state, timeline.loss_date, rng);
        let financials = Financials::sample(events::claim_multiplier(event), rng);

        let draft = ClaimDraft {
            id,
            state,
            timeline,
            event,
            financials,
            today: config.today,
        };
        let mut record = record::assemble(&draft, &config.reference, rng);
        let defect = defects::maybe_inject(&mut record, config.defect_probability, &self.sampler, rng);
        if let Some(d) = defect {
            tracing::debug!(id = %id, defect = %d, "injected defect");
        }

        GeneratedClaim { record, defect }
    }

    /// Generate `n` claims with their defect tags.
    pub fn generate_tagged(&mut self, n: usize) -> Vec<GeneratedClaim> {
        (0..n).map(|_| self.next_claim()).collect()
    }

    /// Generate `config.rows` records with their original (human-readable)
    /// labels.
    pub fn generate(&mut self) -> Vec<ClaimRecord> {
        let rows = self.config.rows;
        let claims = self.generate_tagged(rows);
        let defective = claims.iter().filter(|c| c.defect.is_some()).count();
        tracing::info!(
            rows,
            defective,
            seed = self.config.seed,
            "generated claims"
        );
        claims.into_iter().map(|c| c.record).collect()
    }
}

/// Full run: generate `config.rows` records and normalize their labels, ready
/// to be written out.
pub fn generate_dataset(config: &GeneratorConfig) -> Result<Vec<ClaimRecord>, GeneratorError> {
    let mut generator = ClaimsGenerator::new(config)?;
    let records = generator.generate();
    Ok(columns::normalize_records(&records))
}
