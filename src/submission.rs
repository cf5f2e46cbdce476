use crate::normalize::ErrorModel;

/// Identifies one dispatch. Completions carrying an older ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState<T> {
    Idle,
    Submitting(Ticket),
    Succeeded(T),
    Failed(ErrorModel),
}

impl<T> SubmissionState<T> {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting(_) => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// The state machine proper, independent of any form.
#[derive(Debug, Clone)]
pub struct Submission<T> {
    state: SubmissionState<T>,
    next_ticket: u64,
}

impl<T> Default for Submission<T> {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            next_ticket: 0,
        }
    }
}

impl<T> Submission<T> {
    pub fn state(&self) -> &SubmissionState<T> {
        &self.state
    }

    /// Drops any previous outcome. Returns false while a request is in flight.
    pub fn reset(&mut self) -> bool {
        if self.state.is_submitting() {
            return false;
        }
        self.state = SubmissionState::Idle;
        true
    }

    /// Idle -> Submitting. `None` unless currently idle.
    pub fn start(&mut self) -> Option<Ticket> {
        if !matches!(self.state, SubmissionState::Idle) {
            return None;
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.state = SubmissionState::Submitting(ticket);
        Some(ticket)
    }

    /// Submitting -> Succeeded/Failed, only for the in-flight ticket.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<T, ErrorModel>) -> bool {
        if !matches!(self.state, SubmissionState::Submitting(current) if current == ticket) {
            return false;
        }
        self.state = match outcome {
            Ok(result) => SubmissionState::Succeeded(result),
            Err(error) => SubmissionState::Failed(error),
        };
        true
    }
}
