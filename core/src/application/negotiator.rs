//! Graceful shutdown negotiation.
//!
//! Two protocols are combined, because some children honor only one:
//! 1. A console control event delivered to the root's process group
//! 2. For `Interrupt` requests, a bounded request to the child's cooperative
//!    shutdown endpoint
//!
//! The negotiator never kills anything. A failed negotiation is reported to
//! the caller, who decides whether to kill the tree.

use tracing::{debug, warn};

use crate::domain::{ConsoleEvent, NegotiationState, RootProcess, ShutdownRequest, SignalKind};
use crate::error::NegotiationFailure;
use crate::ports::{ConsoleSignaler, ShutdownNotifier};

/// Drives one [`NegotiationState`] machine per shutdown request.
pub struct ShutdownNegotiator<C, N> {
    console: C,
    notifier: N,
    event: ConsoleEvent,
}

impl<C, N> ShutdownNegotiator<C, N>
where
    C: ConsoleSignaler,
    N: ShutdownNotifier,
{
    pub fn new(console: C, notifier: N, event: ConsoleEvent) -> Self {
        Self {
            console,
            notifier,
            event,
        }
    }

    /// Run the state machine to a terminal state.
    pub async fn run(&self, root: RootProcess, request: &ShutdownRequest) -> NegotiationState {
        let mut state = NegotiationState::Start;

        while !state.is_terminal() {
            state = match state {
                NegotiationState::Start => self.signal_group(root, request.signal),
                NegotiationState::AwaitingCooperativeShutdown => {
                    match self.notifier.notify().await {
                        Ok(()) => NegotiationState::Completed,
                        Err(failure) => {
                            warn!(
                                pid = root.pid(),
                                error = %failure,
                                "Cooperative shutdown failed"
                            );
                            NegotiationState::Failed(failure)
                        }
                    }
                }
                terminal => terminal,
            };
            debug!(pid = root.pid(), state = ?state, "Shutdown negotiation advanced");
        }
        state
    }

    /// Negotiate and collapse the terminal state into a `Result`.
    pub async fn negotiate(
        &self,
        root: RootProcess,
        request: &ShutdownRequest,
    ) -> Result<(), NegotiationFailure> {
        match self.run(root, request).await {
            NegotiationState::Failed(failure) => Err(failure),
            _ => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn console(&self) -> &C {
        &self.console
    }

    fn signal_group(&self, root: RootProcess, signal: SignalKind) -> NegotiationState {
        let process_group = root.process_group();

        if let Err(source) = self.console.send_event(self.event, process_group) {
            warn!(
                process_group = process_group,
                event = %self.event,
                error = %source,
                "Error sending console control event"
            );
            return NegotiationState::Failed(NegotiationFailure::ConsoleEvent {
                process_group,
                source,
            });
        }

        match signal {
            SignalKind::Interrupt => NegotiationState::AwaitingCooperativeShutdown,
            // Only gives the child a head start on its cleanup; the caller kills next
            SignalKind::Terminate => NegotiationState::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{FakeConsole, FakeNotifier};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_interrupt_completes_on_200() {
        let negotiator = ShutdownNegotiator::new(
            FakeConsole::default(),
            FakeNotifier::responding(200),
            ConsoleEvent::CtrlBreak,
        );

        let state = negotiator
            .run(RootProcess::new(100), &ShutdownRequest::interrupt(TIMEOUT))
            .await;

        assert!(matches!(state, NegotiationState::Completed));
        assert_eq!(negotiator.console.sent(), vec![(ConsoleEvent::CtrlBreak, 100)]);
        assert_eq!(negotiator.notifier.calls(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_fails_on_non_200() {
        let negotiator = ShutdownNegotiator::new(
            FakeConsole::default(),
            FakeNotifier::responding(500),
            ConsoleEvent::CtrlBreak,
        );

        let result = negotiator
            .negotiate(RootProcess::new(100), &ShutdownRequest::interrupt(TIMEOUT))
            .await;

        assert!(matches!(
            result,
            Err(NegotiationFailure::Endpoint { status: 500 })
        ));
    }

    #[tokio::test]
    async fn test_console_failure_skips_endpoint() {
        let negotiator = ShutdownNegotiator::new(
            FakeConsole::failing(),
            FakeNotifier::responding(200),
            ConsoleEvent::CtrlBreak,
        );

        let result = negotiator
            .negotiate(RootProcess::new(100), &ShutdownRequest::interrupt(TIMEOUT))
            .await;

        assert!(matches!(
            result,
            Err(NegotiationFailure::ConsoleEvent {
                process_group: 100,
                ..
            })
        ));
        assert_eq!(negotiator.notifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_terminate_sends_event_without_waiting() {
        // The endpoint would fail, but a terminate request never asks it
        let negotiator = ShutdownNegotiator::new(
            FakeConsole::default(),
            FakeNotifier::responding(500),
            ConsoleEvent::CtrlBreak,
        );

        let state = negotiator
            .run(RootProcess::new(42), &ShutdownRequest::terminate(TIMEOUT))
            .await;

        assert!(matches!(state, NegotiationState::Completed));
        assert_eq!(negotiator.console.sent(), vec![(ConsoleEvent::CtrlBreak, 42)]);
        assert_eq!(negotiator.notifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_terminate_fails_when_event_cannot_be_sent() {
        let negotiator = ShutdownNegotiator::new(
            FakeConsole::failing(),
            FakeNotifier::responding(200),
            ConsoleEvent::CtrlC,
        );

        let state = negotiator
            .run(RootProcess::new(42), &ShutdownRequest::terminate(TIMEOUT))
            .await;

        assert!(matches!(state, NegotiationState::Failed(_)));
    }
}
