//! Consultation service
//!
//! Drives the consultation lifecycle: request, claim/assign, accept or
//! decline, complete, cancel and the lawyer's written response. Every
//! mutation is one repository commit; events go out after it succeeds.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use counsel_core::entities::{CancelOutcome, Consultation, Message, NewConsultation};
use counsel_core::events::{ConsultationChangedEvent, MessageCreatedEvent};
use counsel_core::policy::{self, Capability};
use counsel_core::traits::{ConsultationChange, ConsultationQuery, PageRequest, Scope};
use counsel_core::value_objects::{Actor, Role, Snowflake};
use counsel_core::{DomainError, DomainEvent};

use crate::dto::{
    consultation_participant_ids, AssignLawyerRequest, ConsultationResponse,
    ConsultationStatsResponse, CreateConsultationRequest, DeclineConsultationRequest,
    ListConsultationsQuery, PaginatedResponse, Participants, RespondConsultationRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

const ACCEPTED_NOTICE: &str = "Consultation accepted. The chat is now open.";
const COMPLETED_NOTICE: &str = "Consultation completed. The chat is now closed.";
const CANCELLED_NOTICE: &str = "Consultation cancelled. The chat is now closed.";

fn declined_notice(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("Consultation declined: {reason}"),
        None => "Consultation declined.".to_string(),
    }
}

/// Listing and stats scope of an actor
pub(crate) fn scope_of(actor: &Actor) -> Scope {
    match actor.role {
        Role::Customer => Scope::Customer(actor.id),
        Role::Lawyer => Scope::Lawyer(actor.id),
        Role::Admin => Scope::All,
    }
}

/// Consultation service
pub struct ConsultationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConsultationService<'a> {
    /// Create a new ConsultationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open a new consultation for the calling customer
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn request(
        &self,
        actor: &Actor,
        request: CreateConsultationRequest,
    ) -> ServiceResult<ConsultationResponse> {
        policy::check(actor, Capability::Request)?;

        if let Some(lawyer_id) = request.preferred_lawyer_id {
            self.require_lawyer(lawyer_id).await?;
        }

        let consultation = Consultation::request(
            self.ctx.generate_id(),
            NewConsultation {
                customer_id: actor.id,
                subject: request.subject,
                description: request.description,
                priority: request.priority,
                preferred_lawyer_id: request.preferred_lawyer_id,
                attachments: request.attachments,
            },
            Utc::now(),
        )?;

        self.ctx.consultation_repo().create(&consultation).await?;

        info!(
            consultation_id = %consultation.id,
            preferred_lawyer = consultation.preferred_lawyer,
            "Consultation requested"
        );

        self.publish_change(DomainEvent::ConsultationRequested, &consultation)
            .await;
        self.to_response(&consultation).await
    }

    /// Volunteer for an unbound pending consultation. Exactly one of several
    /// concurrent claims wins; the others get `AlreadyClaimed`.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn claim(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Claim(&consultation))?;

        consultation
            .claim(actor.id, Utc::now())
            .inspect_err(|e| warn!(consultation_id = %consultation_id, error = %e, "Claim rejected"))?;

        let consultation = self.bind(consultation, "claim").await?;
        info!(consultation_id = %consultation_id, lawyer_id = %actor.id, "Consultation claimed");

        self.publish_change(DomainEvent::ConsultationClaimed, &consultation)
            .await;
        self.to_response(&consultation).await
    }

    /// Admin binding of a lawyer to an unbound pending consultation
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn assign(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
        request: AssignLawyerRequest,
    ) -> ServiceResult<ConsultationResponse> {
        policy::check(actor, Capability::Assign)?;
        let mut consultation = self.load(consultation_id).await?;
        self.require_lawyer(request.lawyer_id).await?;

        consultation.assign(request.lawyer_id, Utc::now())?;

        let consultation = self.bind(consultation, "assign").await?;
        info!(
            consultation_id = %consultation_id,
            lawyer_id = %request.lawyer_id,
            "Lawyer assigned"
        );

        self.publish_change(DomainEvent::ConsultationAssigned, &consultation)
            .await;
        self.to_response(&consultation).await
    }

    /// Open the chat
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn accept(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Accept(&consultation))?;

        let now = Utc::now();
        consultation
            .accept(actor.id, now)
            .inspect_err(|e| warn!(consultation_id = %consultation_id, error = %e, "Accept rejected"))?;

        let notice = self.system_message(&consultation, ACCEPTED_NOTICE, now);
        self.commit_with_notice(&consultation, notice.clone()).await?;
        info!(consultation_id = %consultation_id, lawyer_id = %actor.id, "Consultation accepted");

        self.publish_change(DomainEvent::ConsultationAccepted, &consultation)
            .await;
        self.publish_notice(&consultation, &notice).await;
        self.to_response(&consultation).await
    }

    /// Turn the request down, optionally with a reason shown in the thread
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn decline(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
        request: DeclineConsultationRequest,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Decline(&consultation))?;

        let now = Utc::now();
        consultation
            .decline(actor.id, request.reason, now)
            .inspect_err(|e| warn!(consultation_id = %consultation_id, error = %e, "Decline rejected"))?;

        let content = declined_notice(consultation.decline_reason.as_deref());
        let notice = self.system_message(&consultation, content, now);
        self.commit_with_notice(&consultation, notice.clone()).await?;
        info!(consultation_id = %consultation_id, lawyer_id = %actor.id, "Consultation declined");

        self.publish_change(DomainEvent::ConsultationDeclined, &consultation)
            .await;
        self.publish_notice(&consultation, &notice).await;
        self.to_response(&consultation).await
    }

    /// Close the chat as done
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn complete(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Complete(&consultation))?;

        let now = Utc::now();
        consultation
            .complete(actor.id, now)
            .inspect_err(|e| warn!(consultation_id = %consultation_id, error = %e, "Complete rejected"))?;

        let notice = self.system_message(&consultation, COMPLETED_NOTICE, now);
        self.commit_with_notice(&consultation, notice.clone()).await?;
        info!(consultation_id = %consultation_id, "Consultation completed");

        self.publish_change(DomainEvent::ConsultationCompleted, &consultation)
            .await;
        self.publish_notice(&consultation, &notice).await;
        self.to_response(&consultation).await
    }

    /// Withdraw a consultation. Cancelling twice returns the current state.
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn cancel(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Cancel(&consultation))?;

        let now = Utc::now();
        let outcome = consultation
            .cancel(now)
            .inspect_err(|e| warn!(consultation_id = %consultation_id, error = %e, "Cancel rejected"))?;

        match outcome {
            CancelOutcome::AlreadyCancelled => {
                info!(consultation_id = %consultation_id, "Consultation already cancelled");
            }
            CancelOutcome::Cancelled { chat_was_active } => {
                let notice = chat_was_active
                    .then(|| self.system_message(&consultation, CANCELLED_NOTICE, now));
                let mut change = ConsultationChange::new(consultation.clone());
                if let Some(notice) = &notice {
                    change = change.with_message(notice.clone());
                }
                self.ctx.consultation_repo().commit(&change).await?;
                info!(consultation_id = %consultation_id, by = %actor.role, "Consultation cancelled");

                self.publish_change(DomainEvent::ConsultationCancelled, &consultation)
                    .await;
                if let Some(notice) = &notice {
                    self.publish_notice(&consultation, notice).await;
                }
            }
        }

        self.to_response(&consultation).await
    }

    /// Record the bound lawyer's written answer and/or internal notes
    #[instrument(skip(self, request), fields(actor_id = %actor.id))]
    pub async fn respond(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
        request: RespondConsultationRequest,
    ) -> ServiceResult<ConsultationResponse> {
        let mut consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::Respond(&consultation))?;

        consultation.respond(actor.id, request.response, request.notes, Utc::now())?;
        self.ctx
            .consultation_repo()
            .commit(&ConsultationChange::new(consultation.clone()))
            .await?;
        info!(consultation_id = %consultation_id, "Consultation response recorded");

        self.to_response(&consultation).await
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a consultation the actor can see
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn get(
        &self,
        actor: &Actor,
        consultation_id: Snowflake,
    ) -> ServiceResult<ConsultationResponse> {
        let consultation = self.load(consultation_id).await?;
        policy::check(actor, Capability::View(&consultation))?;
        self.to_response(&consultation).await
    }

    /// List the actor's consultations, newest request first
    #[instrument(skip(self, query), fields(actor_id = %actor.id))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: ListConsultationsQuery,
    ) -> ServiceResult<PaginatedResponse<ConsultationResponse>> {
        let query = ConsultationQuery::scoped(scope_of(actor), query.status, query.page_request());
        self.page(query).await
    }

    /// Pending consultations nobody is bound to
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn list_available(
        &self,
        actor: &Actor,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ConsultationResponse>> {
        policy::check(actor, Capability::ListAvailable)?;
        self.page(ConsultationQuery::available(page)).await
    }

    /// Per-status counts and unread total for the actor's scope
    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn stats(&self, actor: &Actor) -> ServiceResult<ConsultationStatsResponse> {
        let stats = self.ctx.consultation_repo().stats(scope_of(actor)).await?;
        Ok(stats.into())
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    async fn load(&self, consultation_id: Snowflake) -> ServiceResult<Consultation> {
        Ok(self
            .ctx
            .consultation_repo()
            .find_by_id(consultation_id)
            .await?
            .ok_or(DomainError::ConsultationNotFound(consultation_id))?)
    }

    async fn require_lawyer(&self, lawyer_id: Snowflake) -> ServiceResult<()> {
        let lawyer = self
            .ctx
            .participant_repo()
            .find_by_id(lawyer_id)
            .await?
            .ok_or(DomainError::UserNotFound(lawyer_id))?;
        if !lawyer.is_lawyer() {
            return Err(DomainError::ValidationError(format!("user {lawyer_id} is not a lawyer")).into());
        }
        Ok(())
    }

    /// Store a claim/assign binding. When the conditional update loses, the
    /// stored state explains why.
    async fn bind(&self, consultation: Consultation, action: &'static str) -> ServiceResult<Consultation> {
        let id = consultation.id;
        if self
            .ctx
            .consultation_repo()
            .bind_lawyer_if_unbound(&consultation)
            .await?
        {
            return Ok(consultation);
        }

        let current = self.load(id).await?;
        warn!(consultation_id = %id, action, "Lost the race to bind a lawyer");
        if current.is_open_for_claim() {
            // Only reachable if the row changed back in between
            return Err(DomainError::StaleConsultation(id).into());
        }
        match current.lawyer_id {
            Some(_) if !current.is_terminal() => Err(DomainError::AlreadyClaimed.into()),
            _ => Err(DomainError::InvalidTransition {
                action,
                status: current.status,
                chat_status: current.chat_status,
            }
            .into()),
        }
    }

    fn system_message(
        &self,
        consultation: &Consultation,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Message {
        Message::system(self.ctx.generate_id(), consultation.id, content, now)
    }

    async fn commit_with_notice(&self, consultation: &Consultation, notice: Message) -> ServiceResult<()> {
        self.ctx
            .consultation_repo()
            .commit(&ConsultationChange::new(consultation.clone()).with_message(notice))
            .await
            .inspect_err(|e| warn!(consultation_id = %consultation.id, error = %e, "Commit rejected"))?;
        Ok(())
    }

    async fn publish_change(
        &self,
        variant: fn(ConsultationChangedEvent) -> DomainEvent,
        consultation: &Consultation,
    ) {
        self.ctx
            .publish(variant(ConsultationChangedEvent::from_consultation(consultation)))
            .await;
    }

    async fn publish_notice(&self, consultation: &Consultation, notice: &Message) {
        self.ctx
            .publish(DomainEvent::MessageCreated(MessageCreatedEvent::new(
                consultation,
                notice,
            )))
            .await;
    }

    async fn participants_for<'c>(
        &self,
        consultations: impl IntoIterator<Item = &'c Consultation>,
    ) -> ServiceResult<Participants> {
        let ids = consultation_participant_ids(consultations);
        let found = self.ctx.participant_repo().find_many(&ids).await?;
        Ok(Participants::new(found))
    }

    async fn to_response(&self, consultation: &Consultation) -> ServiceResult<ConsultationResponse> {
        let participants = self.participants_for([consultation]).await?;
        Ok(ConsultationResponse::new(consultation, &participants))
    }

    async fn page(
        &self,
        query: ConsultationQuery,
    ) -> ServiceResult<PaginatedResponse<ConsultationResponse>> {
        let page = self.ctx.consultation_repo().find_page(&query).await?;
        let participants = self.participants_for(&page.items).await?;
        Ok(PaginatedResponse::from_page(page, |c| {
            ConsultationResponse::new(&c, &participants)
        }))
    }
}
