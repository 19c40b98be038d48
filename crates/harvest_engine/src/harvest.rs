use engine_logging::{engine_debug, engine_info, engine_warn};
use harvest_core::{ConvergencePolicy, HarvestSession, ResultSet, RoundDecision, StopReason};

use crate::{Extractor, RenderError, Renderer};

/// Consecutive re-acquisition attempts allowed after a stale target before
/// the session aborts.
const REACQUIRE_ATTEMPTS: u32 = 2;

/// Drives the incremental harvesting loop until the convergence policy says
/// to stop.
///
/// Each round takes a content snapshot, extracts candidates, merges them
/// into the result set, and asks the session what to do next. Transient
/// render failures merge nothing and fall through the normal stall
/// accounting, so even a permanently failing renderer terminates within the
/// stall threshold. Whatever has been accumulated when a session aborts is
/// still returned.
pub async fn run_harvest<R, E>(
    renderer: &mut R,
    extractor: &E,
    policy: ConvergencePolicy,
) -> (ResultSet<E::Item>, StopReason)
where
    R: Renderer + ?Sized,
    E: Extractor,
{
    let mut results = ResultSet::new();
    let mut session = HarvestSession::new(policy);

    loop {
        let round = session.round() + 1;
        engine_logging::set_harvest_round(round);

        let snapshot = match renderer.current_content().await {
            Err(RenderError::StaleTarget) => {
                if !recover_target(renderer).await {
                    return (results, session.target_lost());
                }
                // One retry against the re-acquired surface.
                renderer.current_content().await
            }
            other => other,
        };

        match snapshot {
            Ok(html) => {
                let added = results.merge(extractor.extract(&html));
                engine_debug!(
                    "round {}: {} new identities, {} total",
                    round,
                    added,
                    results.len()
                );
            }
            Err(err) => {
                engine_warn!("round {}: snapshot failed ({}), retrying next round", round, err);
            }
        }

        match session.observe_round(results.len()) {
            RoundDecision::Stop(reason) => {
                engine_info!(
                    "harvest stopped after {} rounds: {} ({} items)",
                    session.round(),
                    reason.as_str(),
                    results.len()
                );
                return (results, reason);
            }
            RoundDecision::Continue => {}
        }

        match renderer.reveal_more().await {
            Ok(()) => {}
            Err(RenderError::StaleTarget) => {
                if !recover_target(renderer).await {
                    return (results, session.target_lost());
                }
            }
            Err(err) => {
                engine_warn!("round {}: reveal failed ({}), retrying next round", round, err);
            }
        }
    }
}

/// Re-acquisition protocol: a stale target gets `REACQUIRE_ATTEMPTS`
/// chances to come back before the session gives up on it.
async fn recover_target<R: Renderer + ?Sized>(renderer: &mut R) -> bool {
    for attempt in 1..=REACQUIRE_ATTEMPTS {
        match renderer.reacquire().await {
            Ok(()) => {
                engine_info!("render target re-acquired on attempt {}", attempt);
                return true;
            }
            Err(err) => {
                engine_warn!("re-acquisition attempt {} failed: {}", attempt, err);
            }
        }
    }
    false
}
