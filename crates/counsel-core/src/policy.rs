//! Capability checks.
//!
//! Every consultation and message operation asks [`check`] whether the actor
//! may perform it before any state is touched. State preconditions (is the
//! chat active, is it still pending) stay on the entity; this module only
//! answers "who".

use crate::entities::Consultation;
use crate::error::DomainError;
use crate::value_objects::{Actor, Role, SenderRole};

/// An operation, together with the consultation it targets where relevant
#[derive(Debug, Clone, Copy)]
pub enum Capability<'a> {
    Request,
    ListAvailable,
    Assign,
    Claim(&'a Consultation),
    Accept(&'a Consultation),
    Decline(&'a Consultation),
    Complete(&'a Consultation),
    Respond(&'a Consultation),
    Cancel(&'a Consultation),
    View(&'a Consultation),
    ReadThread(&'a Consultation),
    SendMessage(&'a Consultation),
    MarkRead(&'a Consultation),
}

impl Capability<'_> {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Request => "request a consultation",
            Self::ListAvailable => "list available consultations",
            Self::Assign => "assign a lawyer",
            Self::Claim(_) => "claim",
            Self::Accept(_) => "accept",
            Self::Decline(_) => "decline",
            Self::Complete(_) => "complete",
            Self::Respond(_) => "respond",
            Self::Cancel(_) => "cancel",
            Self::View(_) | Self::ReadThread(_) => "view",
            Self::SendMessage(_) => "send messages",
            Self::MarkRead(_) => "mark messages read",
        }
    }
}

pub fn check(actor: &Actor, capability: Capability<'_>) -> Result<(), DomainError> {
    let deny_role = || DomainError::RoleNotAllowed {
        role: actor.role,
        action: capability.action(),
    };

    match capability {
        Capability::Request => require_role(actor, Role::Customer).ok_or_else(deny_role),
        Capability::ListAvailable => match actor.role {
            Role::Lawyer | Role::Admin => Ok(()),
            Role::Customer => Err(deny_role()),
        },
        Capability::Assign => require_role(actor, Role::Admin).ok_or_else(deny_role),
        Capability::Claim(_) => require_role(actor, Role::Lawyer).ok_or_else(deny_role),
        // Unbound requests may be accepted by any lawyer
        Capability::Accept(c) => {
            require_role(actor, Role::Lawyer).ok_or_else(deny_role)?;
            match c.lawyer_id {
                Some(bound) if bound != actor.id => Err(DomainError::NotBoundLawyer),
                _ => Ok(()),
            }
        }
        Capability::Decline(c) | Capability::Complete(c) | Capability::Respond(c) => {
            require_role(actor, Role::Lawyer).ok_or_else(deny_role)?;
            if c.is_bound_to(actor.id) {
                Ok(())
            } else {
                Err(DomainError::NotBoundLawyer)
            }
        }
        Capability::Cancel(c) => match actor.role {
            Role::Admin => Ok(()),
            Role::Customer if c.customer_id == actor.id => Ok(()),
            Role::Customer => Err(DomainError::ConsultationNotFound(c.id)),
            Role::Lawyer => Err(deny_role()),
        },
        Capability::View(c) | Capability::ReadThread(c) => {
            if can_view(actor, c) {
                Ok(())
            } else {
                Err(DomainError::ConsultationNotFound(c.id))
            }
        }
        Capability::SendMessage(c) | Capability::MarkRead(c) => {
            if !can_view(actor, c) {
                return Err(DomainError::ConsultationNotFound(c.id));
            }
            participant_role(actor, c)
                .map(|_| ())
                .ok_or(DomainError::NotParticipant)
        }
    }
}

/// Side of the thread the actor speaks for, if they are a participant
pub fn participant_role(actor: &Actor, consultation: &Consultation) -> Option<SenderRole> {
    match actor.role {
        Role::Customer if consultation.customer_id == actor.id => Some(SenderRole::Customer),
        Role::Lawyer if consultation.is_bound_to(actor.id) => Some(SenderRole::Lawyer),
        _ => None,
    }
}

fn can_view(actor: &Actor, c: &Consultation) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Customer => c.customer_id == actor.id,
        Role::Lawyer => c.is_bound_to(actor.id) || c.is_open_for_claim(),
    }
}

#[inline]
fn require_role(actor: &Actor, role: Role) -> Option<()> {
    actor.is(role).then_some(())
}
