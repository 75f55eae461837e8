//! Blocking HTTP client for the vote-submission endpoint.

use crate::votes::VoteType;
use anyhow::Result;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

/// Request body of `POST /api/vote`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSubmission {
    pub city_id: String,
    pub vote_type: VoteType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted,
    /// The endpoint answered with a non-success status.
    Rejected { status: u16, body: String },
    /// No response at all (connection refused, timeout, ...).
    Failed { reason: String },
}

pub trait VoteSubmitter {
    fn submit(&self, submission: &VoteSubmission) -> SubmissionOutcome;
}

pub struct HttpVoteSubmitter {
    client: Client,
    endpoint: String,
}

impl HttpVoteSubmitter {
    pub fn new(endpoint: impl Into<String>, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VoteSubmitter for HttpVoteSubmitter {
    fn submit(&self, submission: &VoteSubmission) -> SubmissionOutcome {
        let response = match self.client.post(&self.endpoint).json(submission).send() {
            Ok(response) => response,
            Err(e) => {
                return SubmissionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            SubmissionOutcome::Accepted
        } else {
            SubmissionOutcome::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            }
        }
    }
}
