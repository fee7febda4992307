//! Message service
//!
//! Posting into a consultation thread, reading it back page by page and
//! marking the other side's messages as read.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use counsel_core::entities::{Consultation, Message, NewMessage, ReplySnapshot};
use counsel_core::events::{MessageCreatedEvent, MessagesReadEvent};
use counsel_core::policy::{self, Capability};
use counsel_core::traits::{ConsultationChange, PageRequest, ReadReceipt};
use counsel_core::value_objects::{Actor, SenderRole, Snowflake};
use counsel_core::{DomainError, DomainEvent};

use crate::dto::{
    message_sender_ids, MarkReadResponse, MessageResponse, PaginatedResponse, Participants,
    SendMessageRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Attempts for operations that re-read and retry on a version conflict
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a participant message.
    ///
    /// A repeated idempotency key returns the message stored under it and
    /// changes nothing.
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn send(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let input = NewMessage::from(request);
        input.validate(self.ctx.message_limits())?;

        let mut attempt = 1;
        loop {
            let consultation = self.load(consultation_id).await?;
            policy::check(actor, Capability::SendMessage(&consultation))?;
            let role = sender_role(actor, &consultation)?;

            if let Some(existing) = self.find_by_key(&consultation, actor, &input).await? {
                debug!(message_id = %existing.id, "Idempotent replay");
                return self.to_response(existing).await;
            }

            match self.try_send(consultation, actor, role, input.clone()).await {
                Ok((consultation, message)) => {
                    info!(
                        consultation_id = %consultation_id,
                        message_id = %message.id,
                        sender_role = role.as_str(),
                        "Message sent"
                    );
                    self.ctx
                        .publish(DomainEvent::MessageCreated(MessageCreatedEvent::new(
                            &consultation,
                            &message,
                        )))
                        .await;
                    return self.to_response(message).await;
                }
                Err(DomainError::StaleConsultation(_)) if attempt < MAX_COMMIT_ATTEMPTS => {
                    debug!(attempt, "Consultation moved on, retrying send");
                    attempt += 1;
                }
                Err(DomainError::DuplicateIdempotencyKey) => {
                    // A concurrent send with the same key won
                    let consultation = self.load(consultation_id).await?;
                    if let Some(existing) = self.find_by_key(&consultation, actor, &input).await? {
                        return self.to_response(existing).await;
                    }
                    return Err(DomainError::DuplicateIdempotencyKey.into());
                }
                Err(e) => {
                    warn!(consultation_id = %consultation_id, error = %e, "Send rejected");
                    return Err(e.into());
                }
            }
        }
    }

    /// One page of the thread, oldest first
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn list_messages(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<MessageResponse>> {
        let consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::ReadThread(&consultation))?;

        let page = self
            .ctx
            .message_repo()
            .find_page(consultation_id, page)
            .await?;
        let ids = message_sender_ids(&page.items);
        let participants = Participants::new(self.ctx.participant_repo().find_many(&ids).await?);

        Ok(PaginatedResponse::from_page(page, |m| {
            MessageResponse::new(m, &participants)
        }))
    }

    /// Mark everything the other side sent as read and reset the caller's
    /// unread counter. Repeating it is harmless.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn mark_read(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<MarkReadResponse> {
        let mut attempt = 1;
        loop {
            let mut consultation = self.load(consultation_id).await?;
            policy::check(actor, Capability::MarkRead(&consultation))?;
            let reader = sender_role(actor, &consultation)?;

            let now = Utc::now();
            let had_unread = consultation.mark_read_by(reader, now);
            let change = ConsultationChange::new(consultation.clone())
                .with_read_receipt(ReadReceipt { reader, read_at: now });

            match self.ctx.consultation_repo().commit(&change).await {
                Ok(()) => {
                    if had_unread {
                        info!(consultation_id = %consultation_id, reader = reader.as_str(), "Messages marked read");
                        self.ctx
                            .publish(DomainEvent::MessagesRead(MessagesReadEvent::new(
                                &consultation,
                                reader,
                                now,
                            )))
                            .await;
                    }
                    return Ok(MarkReadResponse {
                        consultation_id,
                        reader_role: reader,
                        unread_count: consultation.unread_for(reader),
                        read_at: now,
                    });
                }
                Err(DomainError::StaleConsultation(_)) if attempt < MAX_COMMIT_ATTEMPTS => {
                    debug!(attempt, "Consultation moved on, retrying mark read");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    async fn try_send(
        &self,
        mut consultation: Consultation,
        actor: &Actor,
        role: SenderRole,
        input: NewMessage,
    ) -> Result<(Consultation, Message), DomainError> {
        let reply_to = match input.reply_to {
            Some(target) => Some(self.reply_snapshot(&consultation, target).await?),
            None => None,
        };

        let now = Utc::now();
        consultation.record_message(role, now)?;
        let message = Message::from_participant(
            self.ctx.generate_id(),
            consultation.id,
            actor.id,
            role,
            input,
            reply_to,
            now,
        );

        self.ctx
            .consultation_repo()
            .commit(&ConsultationChange::new(consultation.clone()).with_message(message.clone()))
            .await?;
        Ok((consultation, message))
    }

    async fn reply_snapshot(
        &self,
        consultation: &Consultation,
        target: Snowflake,
    ) -> Result<ReplySnapshot, DomainError> {
        match self.ctx.message_repo().find_by_id(target).await? {
            Some(m) if m.consultation_id == consultation.id => Ok(ReplySnapshot::of(&m)),
            _ => Err(DomainError::InvalidReplyTarget(target)),
        }
    }

    async fn find_by_key(
        &self,
        consultation: &Consultation,
        actor: &Actor,
        input: &NewMessage,
    ) -> ServiceResult<Option<Message>> {
        let Some(key) = input.idempotency_key.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .ctx
            .message_repo()
            .find_by_idempotency_key(consultation.id, actor.id, key)
            .await?)
    }

    async fn load(&self, consultation_id: Snowflake) -> ServiceResult<Consultation> {
        Ok(self
            .ctx
            .consultation_repo()
            .find_by_id(consultation_id)
            .await?
            .ok_or(DomainError::ConsultationNotFound(consultation_id))?)
    }

    async fn to_response(&self, message: Message) -> ServiceResult<MessageResponse> {
        let participants = match message.sender_id {
            Some(id) => Participants::new(self.ctx.participant_repo().find_by_id(id).await?),
            None => Participants::default(),
        };
        Ok(MessageResponse::new(message, &participants))
    }
}

fn sender_role(actor: &Actor, consultation: &Consultation) -> Result<SenderRole, DomainError> {
    policy::participant_role(actor, consultation).ok_or(DomainError::NotParticipant)
}
