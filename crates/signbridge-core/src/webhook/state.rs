//! Agreement state machine.
//!
//! `Pending -> Closed` is the only transition. It is requested here and
//! committed by the processor once the workflow call succeeds.

use signbridge_types::agreement::{AgreementState, Disposition};
use signbridge_types::event::EventKind;

/// What a qualifying event asks the processor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Re-fetch and republish the signed document.
    pub refetch: bool,
    /// Disposition to record; closes the agreement on success.
    pub disposition: Option<Disposition>,
}

impl Transition {
    pub const NONE: Transition = Transition {
        refetch: false,
        disposition: None,
    };
}

pub fn transition(state: AgreementState, kind: &EventKind) -> Transition {
    if !kind.affects_document() {
        return Transition::NONE;
    }

    let disposition = match state {
        AgreementState::Closed => None,
        AgreementState::Pending if *kind == EventKind::AgreementRejected => {
            Some(Disposition::Rejected)
        }
        AgreementState::Pending if kind.is_fully_completed() => Some(Disposition::Signed),
        AgreementState::Pending => None,
    };

    Transition {
        refetch: true,
        disposition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_event_does_nothing() {
        let kind = EventKind::parse("AGREEMENT_EMAIL_VIEWED");
        assert_eq!(transition(AgreementState::Pending, &kind), Transition::NONE);
        assert_eq!(transition(AgreementState::Closed, &kind), Transition::NONE);
    }

    #[test]
    fn test_rejection_while_pending() {
        let t = transition(AgreementState::Pending, &EventKind::AgreementRejected);
        assert!(t.refetch);
        assert_eq!(t.disposition, Some(Disposition::Rejected));
    }

    #[test]
    fn test_completion_kinds_sign() {
        for kind in [
            EventKind::AgreementCompleted,
            EventKind::AgreementSigned,
            EventKind::AgreementWorkflowCompleted,
        ] {
            assert_eq!(
                transition(AgreementState::Pending, &kind).disposition,
                Some(Disposition::Signed)
            );
        }
    }

    #[test]
    fn test_participant_events_only_refetch() {
        for kind in [
            EventKind::DocumentSigned,
            EventKind::ParticipantSigned,
            EventKind::ParticipantCompleted,
            EventKind::AgreementActionCompleted,
        ] {
            let t = transition(AgreementState::Pending, &kind);
            assert!(t.refetch);
            assert!(t.disposition.is_none());
        }
    }

    #[test]
    fn test_closed_agreement_still_refetches() {
        let t = transition(AgreementState::Closed, &EventKind::AgreementRejected);
        assert!(t.refetch);
        assert!(t.disposition.is_none());
    }
}
