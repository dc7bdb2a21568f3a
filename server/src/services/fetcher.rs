//! Fetches the two responses shown on the comparison screen.
//!
//! Each side runs as its own task and reports straight into the run
//! registry, so one slow or failing call never holds up the other. Nothing
//! is retried or cached, and tasks are never cancelled: a result that lands
//! after the judge has moved on is dropped by the registry.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::models::generation::{Side, SideState};
use crate::services::llm::{GenerationError, GenerationRequest, TextGenerator};
use crate::services::runs::{PendingComparison, RunRegistry};

#[derive(Clone)]
pub struct ResponseFetcher {
    generator: Arc<dyn TextGenerator>,
    temperature: Option<f32>,
}

impl ResponseFetcher {
    pub fn new(generator: Arc<dyn TextGenerator>, temperature: Option<f32>) -> Self {
        Self { generator, temperature }
    }

    /// One call: `system` is the candidate prompt, `question` the user turn.
    pub async fn generate(
        &self,
        system: &str,
        question: &str,
        temperature: Option<f32>,
    ) -> Result<String, GenerationError> {
        let request = GenerationRequest {
            system: system.to_string(),
            user: question.to_string(),
            temperature: temperature.or(self.temperature),
        };
        self.generator.generate(&request).await.map_err(|e| {
            warn!(error = %e, "text generation failed");
            e
        })
    }

    pub async fn side_state(&self, system: &str, question: &str) -> SideState {
        match self.generate(system, question, None).await {
            Ok(response) => SideState::Ready { response },
            Err(e) => SideState::Failed { error: e.to_string() },
        }
    }

    /// Starts both calls. Handlers drop the handles; tests await them.
    pub fn dispatch(&self, runs: Arc<RunRegistry>, pending: PendingComparison) -> [JoinHandle<()>; 2] {
        let spawn_side = |side: Side, system: String| {
            let fetcher = self.clone();
            let runs = runs.clone();
            let run_id = pending.run_id.clone();
            let question = pending.question.clone();
            let ticket = pending.ticket;
            tokio::spawn(async move {
                let state = fetcher.side_state(&system, &question).await;
                runs.settle(&run_id, ticket, side, state);
            })
        };

        [
            spawn_side(Side::Left, pending.left.content.clone()),
            spawn_side(Side::Right, pending.right.content.clone()),
        ]
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CannedGenerator;
    use super::*;
    use crate::models::tournament::CandidatePatch;
    use crate::services::controller;
    use std::time::Duration;

    fn started(registry: &RunRegistry) -> String {
        let id = registry.create().id;
        for (cid, content) in [("1", "alpha"), ("2", "beta")] {
            registry
                .apply(&id, |run| {
                    controller::update_candidate(
                        run,
                        cid,
                        CandidatePatch {
                            name: None,
                            content: Some(content.into()),
                        },
                    )
                })
                .unwrap();
        }
        registry.apply(&id, |run| controller::set_question(run, "Q")).unwrap();
        registry.apply(&id, controller::start).unwrap();
        id
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_the_other_side() {
        let generator = Arc::new(CannedGenerator::failing("beta", "rate limited"));
        let fetcher = ResponseFetcher::new(generator.clone(), Some(0.7));
        let registry = Arc::new(RunRegistry::new());
        let id = started(&registry);

        let (_, pending) = registry.open_match(&id, "match-1-0").unwrap();
        for handle in fetcher.dispatch(registry.clone(), pending) {
            handle.await.unwrap();
        }

        let view = registry.snapshot(&id).unwrap().comparison.unwrap();
        assert_eq!(view.left, SideState::Ready { response: "[alpha] Q".into() });
        assert_eq!(
            view.right,
            SideState::Failed {
                error: "Request failed: rate limited".into()
            }
        );
        assert!(view.selection_enabled);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|r| r.user == "Q" && r.temperature == Some(0.7)));
    }

    #[tokio::test]
    async fn sides_settle_independently() {
        let mut generator = CannedGenerator::default();
        generator.delays.insert("beta".into(), Duration::from_millis(200));
        let fetcher = ResponseFetcher::new(Arc::new(generator), None);
        let registry = Arc::new(RunRegistry::new());
        let id = started(&registry);

        let (_, pending) = registry.open_match(&id, "match-1-0").unwrap();
        let [left, right] = fetcher.dispatch(registry.clone(), pending);
        left.await.unwrap();

        let view = registry.snapshot(&id).unwrap().comparison.unwrap();
        assert!(view.left.is_settled());
        assert_eq!(view.right, SideState::Loading);
        assert!(!view.selection_enabled);

        right.await.unwrap();
        assert!(registry.snapshot(&id).unwrap().comparison.unwrap().selection_enabled);
    }

    #[tokio::test]
    async fn late_results_after_back_are_discarded() {
        let mut generator = CannedGenerator::default();
        generator.delays.insert("alpha".into(), Duration::from_millis(50));
        generator.delays.insert("beta".into(), Duration::from_millis(50));
        let fetcher = ResponseFetcher::new(Arc::new(generator), None);
        let registry = Arc::new(RunRegistry::new());
        let id = started(&registry);

        let (_, pending) = registry.open_match(&id, "match-1-0").unwrap();
        let handles = fetcher.dispatch(registry.clone(), pending);
        registry.apply(&id, controller::back).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = registry.snapshot(&id).unwrap();
        assert!(snapshot.comparison.is_none());
        let (reopened, _) = registry.open_match(&id, "match-1-0").unwrap();
        let view = reopened.comparison.unwrap();
        assert_eq!(view.left, SideState::Loading);
        assert_eq!(view.right, SideState::Loading);
    }
}
