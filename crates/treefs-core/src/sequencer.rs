//! Sequential, cancellable execution of asynchronous traversal steps.
//!
//! Every asynchronous operation in the crate (listing, walking, finding,
//! deleting) is a chain of "run one filesystem step, then continue". A
//! [`Sequencer`] runs those steps strictly one at a time and races each one
//! against an explicit [`CancellationToken`]. When cancellation wins, the step's
//! future is dropped before it can deliver a result, so nothing is emitted
//! after cancellation.
//!
//! A sequencer belongs to exactly one traversal. Its token is a child of the
//! caller's cancellation context: cancelling the caller's token stops every
//! traversal started from it, while [`Sequencer::cancel`] stops only this one.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};

/// Lifecycle of a sequenced traversal.
///
/// `Cancelled`, `Completed` and `Failed` are terminal and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Running,
    Cancelled,
    Completed,
    Failed,
}

impl SequenceState {
    pub fn is_terminal(self) -> bool {
        self != SequenceState::Running
    }
}

/// Runs asynchronous steps one at a time under a cancellation scope.
#[derive(Debug)]
pub struct Sequencer {
    scope: CancellationToken,
    in_flight: Option<CancellationToken>,
    state: SequenceState,
}

impl Sequencer {
    /// Creates a sequencer scoped under `parent`.
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            scope: parent.child_token(),
            in_flight: None,
            state: SequenceState::Running,
        }
    }

    /// Creates a sequencer with its own root scope.
    pub fn detached() -> Self {
        Self::new(&CancellationToken::new())
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Returns `true` while a step is being awaited.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Runs one step.
    ///
    /// The step replaces any previously tracked in-flight handle. If the
    /// sequencer's scope is cancelled before or while the step runs, the step
    /// is dropped unfinished and [`CoreError::Cancelled`] is returned. A step
    /// error fails the whole sequence via [`Sequencer::fail`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::Cancelled`] if the sequence is no longer running or was
    ///   cancelled during the step.
    /// - Whatever error the step itself produced.
    pub async fn run_next<T, F>(&mut self, step: F) -> CoreResult<T>
    where
        F: Future<Output = CoreResult<T>>,
    {
        self.observe_scope();
        if self.state != SequenceState::Running {
            return Err(CoreError::Cancelled);
        }

        let handle = self.scope.child_token();
        self.in_flight = Some(handle.clone());

        let outcome = tokio::select! {
            biased;
            _ = handle.cancelled() => None,
            result = step => Some(result),
        };
        self.in_flight = None;

        match outcome {
            None => {
                self.mark_cancelled();
                Err(CoreError::Cancelled)
            }
            Some(Ok(value)) => Ok(value),
            Some(Err(error)) => Err(self.fail(error)),
        }
    }

    /// Cancels the in-flight step, if any, and stops the sequence.
    ///
    /// Idempotent. Has no effect once the sequence reached a terminal state.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_cancelled() {
                handle.cancel();
            }
        }
        if self.state == SequenceState::Running {
            self.scope.cancel();
            self.mark_cancelled();
        }
    }

    /// Cancels whatever is in flight, marks the sequence failed and hands the
    /// error back for propagation to the owning consumer.
    ///
    /// A sequence that was already cancelled stays cancelled; the error is
    /// still returned so the caller never loses it.
    pub fn fail(&mut self, error: CoreError) -> CoreError {
        if let Some(handle) = self.in_flight.take() {
            handle.cancel();
        }
        if self.state == SequenceState::Running {
            tracing::debug!(%error, "traversal failed");
            self.state = SequenceState::Failed;
            self.scope.cancel();
        }
        error
    }

    /// Marks a running sequence as completed. Returns `false` if the sequence
    /// had already been cancelled or failed, in which case nothing changes.
    pub fn complete(&mut self) -> bool {
        self.observe_scope();
        if self.state != SequenceState::Running {
            return false;
        }
        self.state = SequenceState::Completed;
        true
    }

    fn observe_scope(&mut self) {
        if self.state == SequenceState::Running && self.scope.is_cancelled() {
            self.mark_cancelled();
        }
    }

    fn mark_cancelled(&mut self) {
        if self.state == SequenceState::Running {
            tracing::debug!("traversal cancelled");
            self.state = SequenceState::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn runs_steps_in_order() {
        let mut seq = Sequencer::detached();
        let a = seq.run_next(async { Ok(1) }).await.unwrap();
        let b = seq.run_next(async { Ok(a + 1) }).await.unwrap();
        assert_eq!(b, 2);
        assert_eq!(seq.state(), SequenceState::Running);
        assert!(!seq.has_in_flight());
    }

    #[tokio::test]
    async fn complete_only_from_running() {
        let mut seq = Sequencer::detached();
        assert!(seq.complete());
        assert_eq!(seq.state(), SequenceState::Completed);
        assert!(!seq.complete());

        seq.cancel();
        assert_eq!(seq.state(), SequenceState::Completed);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_blocks_completion() {
        let mut seq = Sequencer::detached();
        seq.cancel();
        seq.cancel();
        assert_eq!(seq.state(), SequenceState::Cancelled);
        assert!(!seq.complete());
        assert_eq!(seq.state(), SequenceState::Cancelled);
    }

    #[tokio::test]
    async fn steps_after_cancel_do_not_run() {
        let mut seq = Sequencer::detached();
        seq.cancel();

        let ran = Cell::new(false);
        let result = seq
            .run_next(async {
                ran.set(true);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert!(!ran.get());
    }

    #[tokio::test]
    async fn parent_cancellation_disarms_in_flight_step() {
        let parent = CancellationToken::new();
        let mut seq = Sequencer::new(&parent);
        let finished = Cell::new(false);

        let trigger = parent.clone();
        let result = seq
            .run_next(async {
                trigger.cancel();
                tokio::task::yield_now().await;
                finished.set(true);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert!(!finished.get());
        assert_eq!(seq.state(), SequenceState::Cancelled);
        assert!(!seq.has_in_flight());
    }

    #[tokio::test]
    async fn parent_cancelled_between_steps_is_observed() {
        let parent = CancellationToken::new();
        let mut seq = Sequencer::new(&parent);
        seq.run_next(async { Ok(()) }).await.unwrap();

        parent.cancel();

        assert!(!seq.complete());
        assert_eq!(seq.state(), SequenceState::Cancelled);
    }

    #[tokio::test]
    async fn step_error_fails_the_sequence() {
        let mut seq = Sequencer::detached();
        let result: CoreResult<()> = seq
            .run_next(async { Err(CoreError::NotFound("/x".into())) })
            .await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(seq.state(), SequenceState::Failed);

        let next = seq.run_next(async { Ok(()) }).await;
        assert!(matches!(next, Err(CoreError::Cancelled)));
    }

    #[tokio::test]
    async fn fail_returns_error_even_after_cancel() {
        let mut seq = Sequencer::detached();
        seq.cancel();
        let err = seq.fail(CoreError::MalformedTree("late".into()));
        assert!(matches!(err, CoreError::MalformedTree(_)));
        assert_eq!(seq.state(), SequenceState::Cancelled);
    }

    #[test]
    fn sibling_sequencers_are_independent() {
        let parent = CancellationToken::new();
        let mut first = Sequencer::new(&parent);
        let second = Sequencer::new(&parent);

        first.cancel();

        assert_eq!(first.state(), SequenceState::Cancelled);
        assert_eq!(second.state(), SequenceState::Running);
        assert!(!parent.is_cancelled());
    }
}
