//! Proposals for new delivery hubs.
//!
//! Anyone may propose a hub; a proposal stays pending until an external
//! [`Moderator`] approves or rejects it. Decisions are final.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Error from the request queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A moderator's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// A proposed hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Decides on pending requests.
///
/// `None` means "not yet"; the request stays pending.
pub trait Moderator {
    fn review(&self, request: &LocationRequest) -> Option<Decision>;
}

impl<F> Moderator for F
where
    F: Fn(&LocationRequest) -> Option<Decision>,
{
    fn review(&self, request: &LocationRequest) -> Option<Decision> {
        self(request)
    }
}

/// Counts of what one moderation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerationSummary {
    pub approved: usize,
    pub rejected: usize,
    pub still_pending: usize,
}

/// Submitted hub proposals, in submission order.
#[derive(Debug, Clone, Default)]
pub struct LocationRequestQueue {
    requests: Vec<LocationRequest>,
    next_id: u64,
}

impl LocationRequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a proposal, stamped with the current time.
    pub fn submit(
        &mut self,
        name: impl AsRef<str>,
        address: impl AsRef<str>,
    ) -> Result<&LocationRequest, RequestError> {
        self.submit_at(name, address, Utc::now())
    }

    pub fn submit_at(
        &mut self,
        name: impl AsRef<str>,
        address: impl AsRef<str>,
        submitted_at: DateTime<Utc>,
    ) -> Result<&LocationRequest, RequestError> {
        let name = name.as_ref().trim();
        let address = address.as_ref().trim();
        if name.is_empty() {
            return Err(RequestError::EmptyField("name"));
        }
        if address.is_empty() {
            return Err(RequestError::EmptyField("address"));
        }

        self.next_id += 1;
        let index = self.requests.len();
        self.requests.push(LocationRequest {
            id: self.next_id,
            name: name.to_string(),
            address: address.to_string(),
            status: RequestStatus::Pending,
            submitted_at,
        });
        info!(id = self.next_id, name, "hub proposal submitted");
        Ok(&self.requests[index])
    }

    pub fn all(&self) -> &[LocationRequest] {
        &self.requests
    }

    pub fn pending(&self) -> impl Iterator<Item = &LocationRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
    }

    pub fn get(&self, id: u64) -> Option<&LocationRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Ask `moderator` about every pending request and apply its decisions.
    pub fn moderate(&mut self, moderator: &impl Moderator) -> ModerationSummary {
        let mut summary = ModerationSummary::default();
        for request in self
            .requests
            .iter_mut()
            .filter(|r| r.status == RequestStatus::Pending)
        {
            match moderator.review(request) {
                Some(Decision::Approve) => {
                    request.status = RequestStatus::Approved;
                    summary.approved += 1;
                }
                Some(Decision::Reject) => {
                    request.status = RequestStatus::Rejected;
                    summary.rejected += 1;
                }
                None => summary.still_pending += 1,
            }
        }
        if summary.approved + summary.rejected > 0 {
            info!(
                approved = summary.approved,
                rejected = summary.rejected,
                "hub proposals moderated"
            );
        }
        summary
    }
}
