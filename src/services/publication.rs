//! Publication gate
//!
//! Guests only see flight options while the configuration is published.
//! Each attempt re-evaluates live state; a blocked attempt withdraws an
//! earlier publication.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Configuration, PublishOutcome};
use crate::services::configuration::ConfigurationService;
use crate::utils::errors::Result;
use crate::utils::logging::log_publish_attempt;

/// What a publish attempt would report for this document right now
pub fn evaluate(configuration: &Configuration) -> PublishOutcome {
    let blockers = configuration.blockers();
    PublishOutcome {
        ok: blockers.is_empty(),
        missing_group_names: configuration.unconfigured_group_names(),
        blockers,
        published_at: None,
    }
}

pub struct PublicationGate {
    configurations: ConfigurationService,
}

impl PublicationGate {
    pub fn new(configurations: ConfigurationService) -> Self {
        Self { configurations }
    }

    /// Publish if every location group is configured, otherwise report what is missing
    pub async fn publish(&self, event_id: Uuid) -> Result<PublishOutcome> {
        let (_, outcome) = self
            .configurations
            .mutate(event_id, |configuration| {
                let mut outcome = evaluate(configuration);
                if outcome.ok {
                    let now = Utc::now();
                    configuration.mark_published(now);
                    outcome.published_at = Some(now);
                } else {
                    configuration.withdraw_publication();
                }
                Ok(outcome)
            })
            .await?;

        log_publish_attempt(event_id, outcome.ok, &outcome.missing_group_names);
        Ok(outcome)
    }

    /// Same evaluation as `publish` without changing anything
    pub async fn preview(&self, event_id: Uuid) -> Result<PublishOutcome> {
        let configuration = self.configurations.get(event_id).await?;
        let mut outcome = evaluate(&configuration);
        if outcome.ok && configuration.published {
            outcome.published_at = configuration.published_at;
        }
        Ok(outcome)
    }
}
