/// Tuning parameters for the convergence policy.
///
/// The underlying page offers no end-of-list marker, so the only available
/// termination signal is the absence of growth over consecutive rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergencePolicy {
    /// Consecutive no-growth rounds after which the harvest is complete.
    pub stall_threshold: u32,
    /// Optional hard cap on the number of harvested identities.
    pub max_items: Option<usize>,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self {
            stall_threshold: 5,
            max_items: None,
        }
    }
}

/// Where a harvest session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Growing, or not yet observed.
    Running,
    /// At least one consecutive round without growth; growth may resume.
    Stalled,
    /// Terminated normally (converged or cap reached).
    Done,
    /// Terminated because the render surface was lost.
    Aborted,
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No growth for `stall_threshold` consecutive rounds.
    Converged,
    /// The configured `max_items` cap was reached or exceeded.
    CapReached,
    /// The render surface could not be re-acquired after going stale.
    RenderTargetLost,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::Converged => "converged",
            StopReason::CapReached => "cap_reached",
            StopReason::RenderTargetLost => "render_target_lost",
        }
    }
}

/// What the driver should do after a round's merge has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDecision {
    /// Reveal more content and run another round.
    Continue,
    /// Stop harvesting for the given reason.
    Stop(StopReason),
}

/// Transient state of one harvesting run.
///
/// Created at harvest start, fed the post-merge result size once per round,
/// and discarded once a [`crate::HarvestResult`] has been produced.
#[derive(Debug, Clone)]
pub struct HarvestSession {
    policy: ConvergencePolicy,
    rounds_without_growth: u32,
    last_size: usize,
    round: u64,
    state: SessionState,
}

impl HarvestSession {
    pub fn new(policy: ConvergencePolicy) -> Self {
        Self {
            policy,
            rounds_without_growth: 0,
            last_size: 0,
            round: 0,
            state: SessionState::Running,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of rounds observed so far.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn rounds_without_growth(&self) -> u32 {
        self.rounds_without_growth
    }

    /// Applies one round's post-merge observation and decides whether to
    /// continue.
    ///
    /// The cap is checked before stall accounting, so a round that both
    /// grows past the cap and would otherwise stall reports `CapReached`.
    /// A session that never merges anything still terminates after
    /// `stall_threshold` rounds; the first round gets no special treatment.
    pub fn observe_round(&mut self, result_size: usize) -> RoundDecision {
        debug_assert!(result_size >= self.last_size, "result set must not shrink");
        self.round += 1;

        if let Some(cap) = self.policy.max_items {
            if result_size >= cap {
                self.state = SessionState::Done;
                return RoundDecision::Stop(StopReason::CapReached);
            }
        }

        if result_size == self.last_size {
            self.rounds_without_growth += 1;
            if self.rounds_without_growth >= self.policy.stall_threshold {
                self.state = SessionState::Done;
                return RoundDecision::Stop(StopReason::Converged);
            }
            self.state = SessionState::Stalled;
        } else {
            self.rounds_without_growth = 0;
            self.last_size = result_size;
            self.state = SessionState::Running;
        }

        RoundDecision::Continue
    }

    /// Records that the render surface could not be re-acquired.
    /// This is the one fatal, unretried transition.
    pub fn target_lost(&mut self) -> StopReason {
        self.state = SessionState::Aborted;
        StopReason::RenderTargetLost
    }
}
