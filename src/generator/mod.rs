//! Synthetic vote traffic against a running vote-submission endpoint.
//!
//! Each city with a `cityId` receives `votes_per_city` submissions whose type
//! is drawn from the configured weights. Failed submissions are counted and
//! logged, they never stop the run.

mod client;

pub use client::{HttpVoteSubmitter, SubmissionOutcome, VoteSubmission, VoteSubmitter};

use crate::city_ids::CityRef;
use crate::config::GeneratorSettings;
use crate::votes::VoteType;
use anyhow::{Context, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub cities_processed: usize,
    pub cities_skipped: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl GenerationReport {
    pub fn submitted(&self) -> usize {
        self.accepted + self.rejected + self.failed
    }

    fn record(&mut self, outcome: &SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Accepted => self.accepted += 1,
            SubmissionOutcome::Rejected { .. } => self.rejected += 1,
            SubmissionOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

pub struct VoteGenerator<S: VoteSubmitter, R: Rng> {
    submitter: S,
    rng: R,
    settings: GeneratorSettings,
    distribution: WeightedIndex<f64>,
}

impl<S: VoteSubmitter, R: Rng> VoteGenerator<S, R> {
    pub fn new(submitter: S, rng: R, settings: GeneratorSettings) -> Result<Self> {
        let distribution = WeightedIndex::new(settings.weights.as_array())
            .context("Invalid vote weights")?;
        Ok(Self {
            submitter,
            rng,
            settings,
            distribution,
        })
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn draw_vote_type(&mut self) -> VoteType {
        VoteType::ALL[self.distribution.sample(&mut self.rng)]
    }

    pub fn run(&mut self, cities: &[CityRef]) -> GenerationReport {
        let mut report = GenerationReport::default();
        let delay = self.settings.delay();

        for city in cities {
            let Some(city_id) = city.city_id.as_deref() else {
                report.cities_skipped += 1;
                continue;
            };

            for _ in 0..self.settings.votes_per_city {
                let submission = VoteSubmission {
                    city_id: city_id.to_string(),
                    vote_type: self.draw_vote_type(),
                    user_id: self
                        .settings
                        .attach_user_id
                        .then(|| format!("synthetic-{}", uuid::Uuid::new_v4())),
                };
                let outcome = self.submitter.submit(&submission);
                match &outcome {
                    SubmissionOutcome::Accepted => {}
                    SubmissionOutcome::Rejected { status, body } => warn!(
                        "Vote for {} rejected with status {}: {}",
                        city.display_name(),
                        status,
                        body
                    ),
                    SubmissionOutcome::Failed { reason } => {
                        warn!("Vote for {} failed: {}", city.display_name(), reason)
                    }
                }
                report.record(&outcome);

                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }

            report.cities_processed += 1;
            info!(
                "City {}: {} votes sent",
                city.display_name(),
                self.settings.votes_per_city
            );
        }

        report
    }
}
