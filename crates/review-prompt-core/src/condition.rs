//! Review conditions.
//!
//! A condition is a named predicate over the tracked settings and the
//! current time. Synchronous and asynchronous predicates share one type so
//! a policy can mix them freely.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, EvaluationError};

/// Boxed, sendable future returned by async predicates and collaborators.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type SyncPredicate<S> = Arc<dyn Fn(&S, DateTime<Utc>) -> Result<bool, BoxError> + Send + Sync>;

type AsyncPredicate<S> = Arc<
    dyn Fn(CancellationToken, S, DateTime<Utc>) -> BoxFuture<'static, Result<bool, BoxError>>
        + Send
        + Sync,
>;

/// How a condition produces its outcome.
pub enum ConditionKind<S> {
    /// Pure function of the settings and the current time.
    Synchronous(SyncPredicate<S>),
    /// Suspendable function that also receives the cancellation token.
    Asynchronous(AsyncPredicate<S>),
}

impl<S> Clone for ConditionKind<S> {
    fn clone(&self) -> Self {
        match self {
            ConditionKind::Synchronous(f) => ConditionKind::Synchronous(Arc::clone(f)),
            ConditionKind::Asynchronous(f) => ConditionKind::Asynchronous(Arc::clone(f)),
        }
    }
}

/// A single named criterion a review request must satisfy.
pub struct ReviewCondition<S> {
    name: String,
    kind: ConditionKind<S>,
}

impl<S> Clone for ReviewCondition<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<S> fmt::Debug for ReviewCondition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConditionKind::Synchronous(_) => "synchronous",
            ConditionKind::Asynchronous(_) => "asynchronous",
        };
        f.debug_struct("ReviewCondition")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

impl<S> ReviewCondition<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Wrap an infallible synchronous predicate.
    pub fn synchronous<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S, DateTime<Utc>) -> bool + Send + Sync + 'static,
    {
        Self::try_synchronous(name, move |settings, now| Ok(predicate(settings, now)))
    }

    /// Wrap a synchronous predicate that may fail.
    pub fn try_synchronous<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&S, DateTime<Utc>) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind: ConditionKind::Synchronous(Arc::new(predicate)),
        }
    }

    /// Wrap an asynchronous predicate.
    ///
    /// The predicate receives a clone of the cancellation token and an
    /// owned copy of the settings snapshot.
    pub fn asynchronous<F, Fut>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(CancellationToken, S, DateTime<Utc>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        let predicate: AsyncPredicate<S> =
            Arc::new(move |ct, settings, now| Box::pin(predicate(ct, settings, now)));
        Self {
            name: name.into(),
            kind: ConditionKind::Asynchronous(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ConditionKind<S> {
        &self.kind
    }

    pub fn is_asynchronous(&self) -> bool {
        matches!(self.kind, ConditionKind::Asynchronous(_))
    }

    /// Evaluate this condition against `settings` at `now`.
    ///
    /// `Ok(false)` means the condition does not hold. An error means no
    /// outcome could be produced: the predicate failed or `ct` was
    /// cancelled before it finished.
    pub async fn validate(
        &self,
        ct: &CancellationToken,
        settings: &S,
        now: DateTime<Utc>,
    ) -> Result<bool, EvaluationError> {
        if ct.is_cancelled() {
            return Err(EvaluationError::Cancelled);
        }

        let outcome = match &self.kind {
            ConditionKind::Synchronous(predicate) => predicate(settings, now),
            ConditionKind::Asynchronous(predicate) => {
                let pending = predicate(ct.clone(), settings.clone(), now);
                tokio::select! {
                    biased;
                    _ = ct.cancelled() => return Err(EvaluationError::Cancelled),
                    outcome = pending => outcome,
                }
            }
        };

        outcome.map_err(|source| EvaluationError::Condition {
            name: self.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReviewSettings;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn test_synchronous_condition_reads_settings() {
        let condition = ReviewCondition::<ReviewSettings>::synchronous("launched", |s, _| {
            s.application_launch_count > 0
        });
        let ct = CancellationToken::new();

        let settings = ReviewSettings::default();
        assert!(!condition.validate(&ct, &settings, Utc::now()).await.unwrap());

        let settings = settings.with_application_launch(Utc::now());
        assert!(condition.validate(&ct, &settings, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_asynchronous_condition_receives_now() {
        let now = Utc::now();
        let condition =
            ReviewCondition::<ReviewSettings>::asynchronous("same-now", move |_, _, at| async move {
                Ok::<_, BoxError>(at == now)
            });

        let ct = CancellationToken::new();
        assert!(condition.is_asynchronous());
        assert!(condition
            .validate(&ct, &ReviewSettings::default(), now)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_failing_predicate_is_an_error_not_false() {
        let condition = ReviewCondition::<ReviewSettings>::try_synchronous("broken", |_, _| {
            Err("predicate exploded".into())
        });
        let ct = CancellationToken::new();

        let err = condition
            .validate(&ct, &ReviewSettings::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Condition { ref name, .. } if name == "broken"));
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let condition = ReviewCondition::<ReviewSettings>::synchronous("always", |_, _| true);
        let ct = CancellationToken::new();
        ct.cancel();

        let err = condition
            .validate(&ct, &ReviewSettings::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_pending_async_condition() {
        let condition =
            ReviewCondition::<ReviewSettings>::asynchronous("slow", |_, _, _| async {
                tokio::time::sleep(StdDuration::from_secs(3600)).await;
                Ok::<_, BoxError>(true)
            });
        let ct = CancellationToken::new();
        let canceller = ct.clone();
        tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            canceller.cancel();
        });

        let err = condition
            .validate(&ct, &ReviewSettings::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Cancelled));
    }

    #[test]
    fn test_debug_shows_name_and_kind() {
        let condition = ReviewCondition::<ReviewSettings>::synchronous("launched", |_, _| true);
        let debug = format!("{:?}", condition);
        assert!(debug.contains("launched"));
        assert!(debug.contains("synchronous"));
    }
}
