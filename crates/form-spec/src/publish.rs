use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::spec::form::{FormRecord, FormStyle, PublishState, PublishStatus};
use crate::spec::question::Question;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("a publish is already in progress")]
    AlreadyPublishing,
    #[error("publish failed: {source}")]
    PublishFailed {
        #[source]
        source: StoreError,
    },
    #[error("publish ticket {0} does not match the publish in progress")]
    StaleTicket(u64),
}

/// Observable publish phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishPhase {
    Draft,
    Publishing,
    Published,
}

/// What the public link serves until the next publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PublishedSnapshot {
    pub form_id: String,
    pub title: String,
    pub share_url: String,
    pub questions: Vec<Question>,
    pub style: FormStyle,
    pub published_at: DateTime<Utc>,
}

impl PublishedSnapshot {
    /// Compact CBOR encoding for caches in front of the public link.
    pub fn to_cbor(&self) -> Result<Vec<u8>, StoreError> {
        serde_cbor::to_vec(self).map_err(StoreError::Cbor)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_cbor::from_slice(bytes).map_err(StoreError::Cbor)
    }
}

/// Handle for one in-flight publish. Carries the record to persist.
#[derive(Debug, Clone)]
pub struct PublishTicket {
    id: u64,
    record: FormRecord,
    snapshot: PublishedSnapshot,
}

impl PublishTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Record as it will look once published; this is what gets saved.
    pub fn record(&self) -> &FormRecord {
        &self.record
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: u64,
    revision: u64,
}

/// Draft → Publishing → Published state machine for one form.
///
/// Edits made while published set `draft_exists` but keep the form
/// published; the public link serves the last snapshot until the next
/// publish completes.
#[derive(Debug, Clone)]
pub struct PublishManager {
    status: PublishStatus,
    draft_exists: bool,
    published_at: Option<DateTime<Utc>>,
    snapshot: Option<PublishedSnapshot>,
    in_flight: Option<InFlight>,
    revision: u64,
    next_ticket: u64,
}

impl Default for PublishManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PublishManager {
    pub fn new() -> Self {
        Self::restore(&PublishState::default(), None)
    }

    /// Restores the manager from persisted state.
    pub fn restore(state: &PublishState, snapshot: Option<PublishedSnapshot>) -> Self {
        Self {
            status: state.status,
            draft_exists: state.draft_exists || state.status == PublishStatus::Draft,
            published_at: state.published_at,
            snapshot,
            in_flight: None,
            revision: 0,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> PublishPhase {
        match (self.in_flight, self.status) {
            (Some(_), _) => PublishPhase::Publishing,
            (None, PublishStatus::Draft) => PublishPhase::Draft,
            (None, PublishStatus::Published) => PublishPhase::Published,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == PublishStatus::Published
    }

    pub fn draft_exists(&self) -> bool {
        self.draft_exists
    }

    /// Whether the share surface warns about an unpublished draft.
    pub fn shows_draft_notice(&self) -> bool {
        !self.is_published() || self.draft_exists
    }

    pub fn snapshot(&self) -> Option<&PublishedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn state(&self) -> PublishState {
        PublishState {
            status: self.status,
            draft_exists: self.draft_exists,
            published_at: self.published_at,
        }
    }

    /// Records that the question list or form settings changed.
    pub fn note_edit(&mut self) {
        self.revision += 1;
        self.draft_exists = true;
    }

    /// Enters the publishing phase. `record` is the current form; the ticket
    /// carries a copy stamped as published.
    pub fn begin(&mut self, record: FormRecord) -> Result<PublishTicket, PublishError> {
        if self.in_flight.is_some() {
            warn!(form_id = %record.id, "publish rejected, another is in flight");
            return Err(PublishError::AlreadyPublishing);
        }
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(InFlight {
            ticket,
            revision: self.revision,
        });

        let published_at = Utc::now();
        let mut record = record;
        record.publish_state = PublishState {
            status: PublishStatus::Published,
            draft_exists: false,
            published_at: Some(published_at),
        };
        let snapshot = PublishedSnapshot {
            form_id: record.id.clone(),
            title: record.title.clone(),
            share_url: record
                .share
                .as_ref()
                .map(|share| share.url.clone())
                .unwrap_or_default(),
            questions: record.questions.clone(),
            style: record.style.clone(),
            published_at,
        };
        record.published = Some(snapshot.clone());
        info!(form_id = %record.id, ticket, "publishing");
        Ok(PublishTicket {
            id: ticket,
            record,
            snapshot,
        })
    }

    /// Leaves the publishing phase with the outcome of the persistence call.
    /// On failure the prior state is kept untouched.
    pub fn finish(
        &mut self,
        ticket: PublishTicket,
        outcome: Result<(), StoreError>,
    ) -> Result<&PublishedSnapshot, PublishError> {
        let flight = match self.in_flight {
            Some(flight) if flight.ticket == ticket.id => flight,
            _ => return Err(PublishError::StaleTicket(ticket.id)),
        };
        self.in_flight = None;

        if let Err(source) = outcome {
            warn!(form_id = %ticket.record.id, error = %source, "publish failed");
            return Err(PublishError::PublishFailed { source });
        }

        let PublishTicket { snapshot, .. } = ticket;
        self.status = PublishStatus::Published;
        self.published_at = Some(snapshot.published_at);
        // Edits made while the save was in flight are not in the snapshot.
        self.draft_exists = self.revision != flight.revision;
        info!(form_id = %snapshot.form_id, draft_exists = self.draft_exists, "published");
        Ok(self.snapshot.insert(snapshot))
    }
}
