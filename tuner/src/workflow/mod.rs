//! Step sequencing
//!
//! A [`Step`] is one unit of asynchronous work that eventually yields a value
//! or a [`TunerError`]. A [`WorkflowPlan`] is an ordered list of steps run by
//! [`run_series`]: strictly one at a time, in insertion order, stopping at the
//! first failure.
//!
//! Steps compose. [`Step::compose`] turns a whole nested plan into a single
//! step, which is how a track's announce/transcode/embed sub-sequence becomes
//! one atomic unit of the directory plan.
//!
//! # Example
//! ```rust,ignore
//! let mut plan = WorkflowPlan::new();
//! plan.push(Step::new("first", || async { Ok(1) }));
//! plan.push(Step::new("second", || async { Ok(2) }));
//! assert_eq!(plan.run().await?, vec![1, 2]);
//! ```

pub mod series;
pub mod track_pipeline;

pub use series::{run_series, SeriesFailure};
pub use track_pipeline::{build_track_step, TrackContext};

use crate::error::TunerError;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::path::PathBuf;
use tuner_common::FileDescriptor;

/// Future returned by a step
pub type StepFuture<T> = BoxFuture<'static, Result<T, TunerError>>;

type StepTask<T> = Box<dyn FnOnce() -> StepFuture<T> + Send>;

/// One unit of work in a plan
///
/// A step owns everything it needs; nothing runs until the runner invokes it,
/// and it can be invoked at most once.
pub struct Step<T> {
    label: String,
    task: StepTask<T>,
}

impl<T: Send + 'static> Step<T> {
    /// Create a step from a closure producing its future
    pub fn new<F, Fut>(label: impl Into<String>, task: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TunerError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            task: Box::new(move || task().boxed()),
        }
    }

    /// Run a nested plan as a single step
    ///
    /// If any inner step fails the composed step fails with
    /// [`TunerError::StepFailed`] carrying the inner index, so the outer runner
    /// reports a nested location. On success `finish` maps the inner results.
    pub fn compose<U, F>(label: impl Into<String>, plan: WorkflowPlan<U>, finish: F) -> Self
    where
        U: Send + 'static,
        F: FnOnce(Vec<U>) -> Result<T, TunerError> + Send + 'static,
    {
        Step::new(label, move || async move {
            let results = plan
                .run()
                .await
                .map_err(|failure| TunerError::StepFailed(Box::new(failure)))?;
            finish(results)
        })
    }

    /// Run `prelude` right before this step's own work
    pub fn with_prelude<P>(self, prelude: P) -> Self
    where
        P: FnOnce() + Send + 'static,
    {
        let Step { label, task } = self;
        Self {
            label,
            task: Box::new(move || {
                prelude();
                task()
            }),
        }
    }

    /// Step label, used in failure reports
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn invoke(self) -> StepFuture<T> {
        (self.task)()
    }
}

impl<T> std::fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("label", &self.label).finish()
    }
}

/// Ordered steps for one directory pass
///
/// Insertion order is execution order; the plan offers no way to reorder.
#[derive(Debug)]
pub struct WorkflowPlan<T> {
    steps: Vec<Step<T>>,
}

impl<T: Send + 'static> WorkflowPlan<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step to the end of the plan
    pub fn push(&mut self, step: Step<T>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Labels in execution order
    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(Step::label).collect()
    }

    /// Run every step in order, stopping at the first failure
    pub async fn run(self) -> Result<Vec<T>, SeriesFailure> {
        run_series(self.steps).await
    }
}

impl<T: Send + 'static> Default for WorkflowPlan<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Extend<Step<T>> for WorkflowPlan<T> {
    fn extend<I: IntoIterator<Item = Step<T>>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

/// Value produced by the steps of the tuner's plans
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutput {
    /// Shared thumbnail prepared (path of the thumbnail)
    Thumbnail(PathBuf),
    /// Track announced to listeners
    Announced,
    /// Track transcoded (path of the transcoded file)
    Transcoded(PathBuf),
    /// Artwork embedded (path of the track)
    Embedded(PathBuf),
    /// Whole track sub-pipeline finished
    Track(FileDescriptor),
    /// Completion marker written
    Marker(PathBuf),
    /// Generated thumbnail discarded
    ThumbnailRemoved(PathBuf),
    /// File removed by clean
    Removed(FileDescriptor),
    /// File handed to the music library
    Added(FileDescriptor),
}
