//! Consultation entity - a customer's request for legal help and its
//! assignment / chat lifecycle.
//!
//! `status` and `chat_status` only ever change through the transition
//! methods on [`Consultation`]. The stored fields are readable through
//! `Deref<Target = ConsultationRecord>` but there is no mutable access.

use chrono::{DateTime, Utc};
use std::ops::Deref;

use crate::error::DomainError;
use crate::value_objects::{ChatStatus, ConsultationStatus, Priority, SenderRole, Snowflake};

pub const MAX_SUBJECT_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_RESPONSE_CHARS: usize = 5000;
pub const MAX_REQUEST_ATTACHMENTS: usize = 10;

/// Persisted shape of a consultation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationRecord {
    pub id: Snowflake,
    pub customer_id: Snowflake,
    pub lawyer_id: Option<Snowflake>,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: ConsultationStatus,
    pub chat_status: ChatStatus,
    /// Lawyer was named by the customer at request time
    pub preferred_lawyer: bool,
    pub attachments: Vec<String>,
    pub response: Option<String>,
    pub notes: Option<String>,
    pub decline_reason: Option<String>,
    pub customer_unread_count: i32,
    pub lawyer_unread_count: i32,
    pub requested_at: DateTime<Utc>,
    pub chat_started_at: Option<DateTime<Utc>>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub answered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

/// Input of [`Consultation::request`]
#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub customer_id: Snowflake,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub preferred_lawyer_id: Option<Snowflake>,
    pub attachments: Vec<String>,
}

/// Result of [`Consultation::cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Was already cancelled; nothing changed
    AlreadyCancelled,
    Cancelled { chat_was_active: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    record: ConsultationRecord,
    loaded_version: i64,
}

impl Deref for Consultation {
    type Target = ConsultationRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl Consultation {
    /// Open a new consultation in `pending / waiting_acceptance`.
    ///
    /// A preferred lawyer is bound immediately, which takes the request off
    /// the claimable pool while leaving it pending until that lawyer accepts.
    pub fn request(
        id: Snowflake,
        input: NewConsultation,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let subject = input.subject.trim().to_string();
        let description = input.description.trim().to_string();

        if subject.is_empty() {
            return Err(DomainError::ValidationError("subject is required".into()));
        }
        if subject.chars().count() > MAX_SUBJECT_CHARS {
            return Err(DomainError::ValidationError(format!(
                "subject must be at most {MAX_SUBJECT_CHARS} characters"
            )));
        }
        if description.is_empty() {
            return Err(DomainError::ValidationError("description is required".into()));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(DomainError::ValidationError(format!(
                "description must be at most {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        if input.attachments.len() > MAX_REQUEST_ATTACHMENTS {
            return Err(DomainError::TooManyAttachments {
                max: MAX_REQUEST_ATTACHMENTS,
            });
        }
        if input.attachments.iter().any(|a| a.trim().is_empty()) {
            return Err(DomainError::ValidationError(
                "attachment reference must not be blank".into(),
            ));
        }

        Ok(Self {
            record: ConsultationRecord {
                id,
                customer_id: input.customer_id,
                lawyer_id: input.preferred_lawyer_id,
                subject,
                description,
                priority: input.priority,
                status: ConsultationStatus::Pending,
                chat_status: ChatStatus::WaitingAcceptance,
                preferred_lawyer: input.preferred_lawyer_id.is_some(),
                attachments: input.attachments,
                response: None,
                notes: None,
                decline_reason: None,
                customer_unread_count: 0,
                lawyer_unread_count: 0,
                requested_at: now,
                chat_started_at: None,
                last_message_at: None,
                answered_at: None,
                completed_at: None,
                updated_at: now,
                version: 0,
            },
            loaded_version: 0,
        })
    }

    /// Rebuild from storage
    pub fn restore(record: ConsultationRecord) -> Self {
        Self {
            loaded_version: record.version,
            record,
        }
    }

    pub fn into_record(self) -> ConsultationRecord {
        self.record
    }

    /// Version the stored row must still carry for a commit to apply
    #[inline]
    pub fn expected_version(&self) -> i64 {
        self.loaded_version
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.record.version != self.loaded_version
    }

    /// Pending with no lawyer bound, preferred or otherwise
    #[inline]
    pub fn is_open_for_claim(&self) -> bool {
        self.record.status == ConsultationStatus::Pending && self.record.lawyer_id.is_none()
    }

    #[inline]
    pub fn is_bound_to(&self, lawyer_id: Snowflake) -> bool {
        self.record.lawyer_id == Some(lawyer_id)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.record.status.is_terminal()
    }

    /// Unread counter of the given side of the thread
    pub fn unread_for(&self, reader: SenderRole) -> i32 {
        match reader {
            SenderRole::Customer => self.record.customer_unread_count,
            SenderRole::Lawyer => self.record.lawyer_unread_count,
            SenderRole::System => 0,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Bind a volunteering lawyer to an unbound pending request
    pub fn claim(&mut self, lawyer_id: Snowflake, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.bind_unbound("claim", lawyer_id)?;
        self.touch(now);
        Ok(())
    }

    /// Admin binding of a lawyer to an unbound pending request
    pub fn assign(&mut self, lawyer_id: Snowflake, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.bind_unbound("assign", lawyer_id)?;
        self.touch(now);
        Ok(())
    }

    /// Open the chat. Binds the lawyer when nobody is bound yet.
    pub fn accept(&mut self, lawyer_id: Snowflake, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_awaiting_acceptance("accept")?;
        self.ensure_bound_or_unbound(lawyer_id)?;

        let r = &mut self.record;
        r.lawyer_id = Some(lawyer_id);
        r.status = ConsultationStatus::Assigned;
        r.chat_status = ChatStatus::Active;
        r.chat_started_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Turn the request down. Only the lawyer it is bound to may decline;
    /// an open request is simply left unclaimed.
    pub fn decline(
        &mut self,
        lawyer_id: Snowflake,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_awaiting_acceptance("decline")?;
        if !self.is_bound_to(lawyer_id) {
            return Err(DomainError::NotBoundLawyer);
        }

        let r = &mut self.record;
        r.status = ConsultationStatus::Cancelled;
        r.chat_status = ChatStatus::Closed;
        r.decline_reason = reason
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        r.completed_at = Some(now);
        self.touch(now);
        Ok(())
    }

    pub fn complete(&mut self, lawyer_id: Snowflake, now: DateTime<Utc>) -> Result<(), DomainError> {
        let r = &self.record;
        let in_chat = matches!(
            r.status,
            ConsultationStatus::Assigned | ConsultationStatus::InProgress
        ) && r.chat_status == ChatStatus::Active;
        if !in_chat {
            return Err(self.invalid("complete"));
        }
        if !self.is_bound_to(lawyer_id) {
            return Err(DomainError::NotBoundLawyer);
        }

        let r = &mut self.record;
        r.status = ConsultationStatus::Completed;
        r.chat_status = ChatStatus::Closed;
        r.completed_at = Some(now);
        r.answered_at.get_or_insert(now);
        self.touch(now);
        Ok(())
    }

    /// Withdraw the consultation. Repeating a cancel changes nothing.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<CancelOutcome, DomainError> {
        match self.record.status {
            ConsultationStatus::Cancelled => return Ok(CancelOutcome::AlreadyCancelled),
            ConsultationStatus::Completed => return Err(self.invalid("cancel")),
            _ => {}
        }

        let chat_was_active = self.record.chat_status == ChatStatus::Active;
        let r = &mut self.record;
        r.status = ConsultationStatus::Cancelled;
        r.chat_status = ChatStatus::Closed;
        r.completed_at = Some(now);
        self.touch(now);
        Ok(CancelOutcome::Cancelled { chat_was_active })
    }

    /// Record the bound lawyer's written answer and/or internal notes
    pub fn respond(
        &mut self,
        lawyer_id: Snowflake,
        response: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(self.invalid("respond to"));
        }
        if !self.is_bound_to(lawyer_id) {
            return Err(DomainError::NotBoundLawyer);
        }
        if response.is_none() && notes.is_none() {
            return Err(DomainError::ValidationError(
                "response or notes is required".into(),
            ));
        }
        for text in response.iter().chain(notes.iter()) {
            if text.chars().count() > MAX_RESPONSE_CHARS {
                return Err(DomainError::ContentTooLong {
                    max: MAX_RESPONSE_CHARS,
                });
            }
        }

        let r = &mut self.record;
        if let Some(response) = response {
            r.response = Some(response);
            r.answered_at.get_or_insert(now);
        }
        if let Some(notes) = notes {
            r.notes = Some(notes);
        }
        self.touch(now);
        Ok(())
    }

    /// Account for a new human message in the thread.
    ///
    /// The other side's unread counter goes up by one. The first lawyer
    /// message moves an `assigned` consultation to `in_progress`.
    pub fn record_message(
        &mut self,
        sender: SenderRole,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.record.chat_status != ChatStatus::Active {
            return Err(DomainError::ChatNotActive);
        }

        let r = &mut self.record;
        match sender {
            SenderRole::Customer => r.lawyer_unread_count += 1,
            SenderRole::Lawyer => {
                r.customer_unread_count += 1;
                if r.status == ConsultationStatus::Assigned {
                    r.status = ConsultationStatus::InProgress;
                }
            }
            SenderRole::System => {}
        }
        r.last_message_at = Some(now);
        self.touch(now);
        Ok(())
    }

    /// Reset the reader's unread counter. Returns `false` when it was already 0.
    pub fn mark_read_by(&mut self, reader: SenderRole, now: DateTime<Utc>) -> bool {
        let counter = match reader {
            SenderRole::Customer => &mut self.record.customer_unread_count,
            SenderRole::Lawyer => &mut self.record.lawyer_unread_count,
            SenderRole::System => return false,
        };
        if *counter == 0 {
            return false;
        }
        *counter = 0;
        self.touch(now);
        true
    }

    /// True when the status / chat status / lawyer coupling is consistent
    pub fn invariants_hold(&self) -> bool {
        let r = &self.record;
        let terminal = r.status.is_terminal();

        let unbound_ok = r.lawyer_id.is_some()
            || terminal
            || (r.status == ConsultationStatus::Pending
                && r.chat_status == ChatStatus::WaitingAcceptance);
        let active_ok = r.chat_status != ChatStatus::Active
            || (r.lawyer_id.is_some()
                && matches!(
                    r.status,
                    ConsultationStatus::Assigned | ConsultationStatus::InProgress
                ));
        let closed_ok = terminal == (r.chat_status == ChatStatus::Closed);

        unbound_ok && active_ok && closed_ok && r.customer_unread_count >= 0
            && r.lawyer_unread_count >= 0
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn bind_unbound(&mut self, action: &'static str, lawyer_id: Snowflake) -> Result<(), DomainError> {
        if self.record.status.is_terminal() {
            return Err(self.invalid(action));
        }
        if self.record.lawyer_id.is_some() {
            return Err(DomainError::AlreadyClaimed);
        }
        if self.record.status != ConsultationStatus::Pending {
            return Err(self.invalid(action));
        }
        self.record.lawyer_id = Some(lawyer_id);
        self.record.status = ConsultationStatus::Assigned;
        Ok(())
    }

    fn ensure_awaiting_acceptance(&self, action: &'static str) -> Result<(), DomainError> {
        let r = &self.record;
        let ok = matches!(
            r.status,
            ConsultationStatus::Pending | ConsultationStatus::Assigned
        ) && r.chat_status == ChatStatus::WaitingAcceptance;
        if ok {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn ensure_bound_or_unbound(&self, lawyer_id: Snowflake) -> Result<(), DomainError> {
        match self.record.lawyer_id {
            Some(bound) if bound != lawyer_id => Err(DomainError::NotBoundLawyer),
            _ => Ok(()),
        }
    }

    fn invalid(&self, action: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            action,
            status: self.record.status,
            chat_status: self.record.chat_status,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.record.version = self.loaded_version + 1;
        self.record.updated_at = now;
    }
}
