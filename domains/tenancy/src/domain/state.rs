//! Invitation lifecycle state machine
//!
//! States are derived from timestamps rather than stored, so the machine
//! validates transitions before the repository writes the timestamps that
//! realize them. Resend is the only self-transition: it keeps the invitation
//! pending and extends its expiry.

use habitek_common::StateError;
use serde::{Deserialize, Serialize};

/// Derived invitation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl InvitationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Expired | Self::Cancelled)
    }

    pub fn valid_transitions(&self) -> &'static [InvitationState] {
        match self {
            Self::Pending => &[Self::Pending, Self::Accepted, Self::Expired, Self::Cancelled],
            Self::Accepted => &[],
            Self::Expired => &[],
            Self::Cancelled => &[],
        }
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Expired => write!(f, "expired"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Events that drive invitation transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvitationEvent {
    /// Recipient completes registration through the token link
    Accept,
    /// The expiry timestamp passes
    Expire,
    /// Inviter or admin withdraws the invitation
    Cancel,
    /// Inviter re-sends the email; extends expiry, token unchanged
    Resend,
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Expire => write!(f, "expire"),
            Self::Cancel => write!(f, "cancel"),
            Self::Resend => write!(f, "resend"),
        }
    }
}

/// Guard context for invitation transitions.
#[derive(Debug, Clone)]
pub struct InvitationGuardContext {
    pub is_expired: bool,
}

pub struct InvitationStateMachine;

impl InvitationStateMachine {
    pub fn transition(
        current: InvitationState,
        event: InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> Result<InvitationState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            (InvitationState::Pending, InvitationEvent::Accept) => {
                if let Some(ctx) = context {
                    if ctx.is_expired {
                        return Err(StateError::GuardFailed(
                            "Cannot accept expired invitation".to_string(),
                        ));
                    }
                }
                InvitationState::Accepted
            }
            (InvitationState::Pending, InvitationEvent::Expire) => InvitationState::Expired,
            (InvitationState::Pending, InvitationEvent::Cancel) => InvitationState::Cancelled,
            (InvitationState::Pending, InvitationEvent::Resend) => {
                if let Some(ctx) = context {
                    if ctx.is_expired {
                        return Err(StateError::GuardFailed(
                            "Cannot resend expired invitation".to_string(),
                        ));
                    }
                }
                InvitationState::Pending
            }

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    pub fn can_transition(
        current: InvitationState,
        event: &InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> bool {
        Self::transition(current, *event, context).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_accept_succeeds_when_not_expired() {
        let ctx = InvitationGuardContext { is_expired: false };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Accept,
            Some(&ctx),
        );
        assert_eq!(result, Ok(InvitationState::Accepted));
    }

    #[test]
    fn pending_accept_guard_blocks_expired() {
        let ctx = InvitationGuardContext { is_expired: true };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Accept,
            Some(&ctx),
        );
        assert!(matches!(result, Err(StateError::GuardFailed(_))));
    }

    #[test]
    fn pending_expire_and_cancel() {
        assert_eq!(
            InvitationStateMachine::transition(
                InvitationState::Pending,
                InvitationEvent::Expire,
                None
            ),
            Ok(InvitationState::Expired)
        );
        assert_eq!(
            InvitationStateMachine::transition(
                InvitationState::Pending,
                InvitationEvent::Cancel,
                None
            ),
            Ok(InvitationState::Cancelled)
        );
    }

    #[test]
    fn resend_keeps_invitation_pending() {
        let ctx = InvitationGuardContext { is_expired: false };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Resend,
            Some(&ctx),
        );
        assert_eq!(result, Ok(InvitationState::Pending));
    }

    #[test]
    fn resend_guard_blocks_expired() {
        let ctx = InvitationGuardContext { is_expired: true };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Resend,
            Some(&ctx),
        );
        assert!(matches!(result, Err(StateError::GuardFailed(_))));
    }

    #[test]
    fn terminal_states_cannot_transition() {
        for state in [
            InvitationState::Accepted,
            InvitationState::Expired,
            InvitationState::Cancelled,
        ] {
            for event in [
                InvitationEvent::Accept,
                InvitationEvent::Expire,
                InvitationEvent::Cancel,
                InvitationEvent::Resend,
            ] {
                let result = InvitationStateMachine::transition(state, event, None);
                assert!(
                    matches!(result, Err(StateError::TerminalState(_))),
                    "{state} + {event}"
                );
            }
        }
    }

    #[test]
    fn is_terminal_partition() {
        assert!(!InvitationState::Pending.is_terminal());
        assert!(InvitationState::Accepted.is_terminal());
        assert!(InvitationState::Expired.is_terminal());
        assert!(InvitationState::Cancelled.is_terminal());
    }

    #[test]
    fn valid_transitions_table() {
        let pending = InvitationState::Pending.valid_transitions();
        assert_eq!(pending.len(), 4);
        assert!(pending.contains(&InvitationState::Pending));
        assert!(pending.contains(&InvitationState::Accepted));
        assert!(pending.contains(&InvitationState::Expired));
        assert!(pending.contains(&InvitationState::Cancelled));

        assert!(InvitationState::Accepted.valid_transitions().is_empty());
        assert!(InvitationState::Expired.valid_transitions().is_empty());
        assert!(InvitationState::Cancelled.valid_transitions().is_empty());
    }

    #[test]
    fn can_transition_mirrors_transition() {
        let ctx = InvitationGuardContext { is_expired: false };
        assert!(InvitationStateMachine::can_transition(
            InvitationState::Pending,
            &InvitationEvent::Accept,
            Some(&ctx)
        ));
        assert!(!InvitationStateMachine::can_transition(
            InvitationState::Accepted,
            &InvitationEvent::Cancel,
            None
        ));
    }
}
