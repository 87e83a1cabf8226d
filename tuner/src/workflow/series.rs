//! Serial step runner
//!
//! Runs a list of steps one after another. Step *i+1* is never invoked before
//! step *i* has completed successfully, and nothing after a failing step is
//! ever invoked. The runner iterates over a work queue, so arbitrarily long
//! plans never grow the stack.

use super::Step;
use crate::error::TunerError;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, warn};

/// First failure of a series, tagged with where it happened
#[derive(Debug)]
pub struct SeriesFailure {
    /// 0-based index of the failing step in its plan
    pub index: usize,
    /// Label of the failing step
    pub label: String,
    /// Error returned by the failing step
    pub error: TunerError,
}

impl SeriesFailure {
    /// Index path of the failing leaf step, outermost first
    ///
    /// A failure inside a composed step yields e.g. `[3, 2]`: fourth step of
    /// the outer plan, third step of the inner plan.
    pub fn location(&self) -> Vec<usize> {
        let mut location = vec![self.index];
        let mut error = &self.error;
        while let TunerError::StepFailed(inner) = error {
            location.push(inner.index);
            error = &inner.error;
        }
        location
    }

    /// Labels along the failure path, outermost first
    pub fn labels(&self) -> Vec<String> {
        let mut labels = vec![self.label.clone()];
        let mut error = &self.error;
        while let TunerError::StepFailed(inner) = error {
            labels.push(inner.label.clone());
            error = &inner.error;
        }
        labels
    }

    /// The leaf error, looking through nested step failures
    pub fn root_cause(&self) -> &TunerError {
        self.error.root_cause()
    }
}

impl fmt::Display for SeriesFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} ({}) failed: {}",
            self.index, self.label, self.error
        )
    }
}

impl std::error::Error for SeriesFailure {}

/// Run steps strictly in order, stopping at the first failure
///
/// Returns every step's result in order on success. An empty list succeeds
/// immediately with an empty result.
pub async fn run_series<T>(steps: impl Into<VecDeque<Step<T>>>) -> Result<Vec<T>, SeriesFailure>
where
    T: Send + 'static,
{
    let mut queue: VecDeque<Step<T>> = steps.into();
    let mut results = Vec::with_capacity(queue.len());
    let mut index = 0;

    while let Some(step) = queue.pop_front() {
        let label = step.label().to_string();
        debug!(index, step = %label, "Running step");

        match step.invoke().await {
            Ok(value) => results.push(value),
            Err(error) => {
                warn!(index, step = %label, %error, skipped = queue.len(), "Step failed");
                return Err(SeriesFailure {
                    index,
                    label,
                    error,
                });
            }
        }
        index += 1;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowPlan;

    #[tokio::test]
    async fn test_results_in_order() {
        let steps: Vec<Step<usize>> = (0..5)
            .map(|i| Step::new(format!("s{}", i), move || async move { Ok(i * 10) }))
            .collect();

        assert_eq!(run_series(steps).await.unwrap(), vec![0, 10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_long_series_does_not_recurse() {
        let steps: Vec<Step<()>> = (0..20_000)
            .map(|i| Step::new(format!("s{}", i), || async { Ok(()) }))
            .collect();

        assert_eq!(run_series(steps).await.unwrap().len(), 20_000);
    }

    #[tokio::test]
    async fn test_nested_failure_location_and_labels() {
        let mut inner: WorkflowPlan<()> = WorkflowPlan::new();
        inner.push(Step::new("announce", || async { Ok(()) }));
        inner.push(Step::new("transcode", || async {
            Err(TunerError::Timeout {
                tool: "xld".to_string(),
                seconds: 5,
            })
        }));

        let mut outer: WorkflowPlan<()> = WorkflowPlan::new();
        outer.push(Step::new("artwork", || async { Ok(()) }));
        outer.push(Step::compose("track 1", inner, |_| Ok(())));

        let failure = outer.run().await.unwrap_err();
        assert_eq!(failure.location(), vec![1, 1]);
        assert_eq!(failure.labels(), vec!["track 1", "transcode"]);
        assert!(matches!(failure.root_cause(), TunerError::Timeout { .. }));
    }
}
