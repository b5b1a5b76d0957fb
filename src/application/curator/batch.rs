//! Batch plans: the async half of a curator dispatch.
//!
//! A [`BatchPlan`] owns everything it needs to run, so executing it never
//! touches curator state. The curator builds plans in `begin_batch` and folds
//! the resulting [`BatchReport`] back in with `settle`.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use futures::{
    StreamExt,
    future::{AbortHandle, AbortRegistration, Abortable},
    stream,
};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::toasts::ToastKind,
    domain::types::{EntityId, MutationAction, Resource},
    infra::{
        http::AdminGateway,
        telemetry::{
            METRIC_BATCH_MS, METRIC_BATCH_TOTAL, METRIC_MUTATION_RETRY_TOTAL,
            METRIC_MUTATION_TOTAL,
        },
    },
};

use super::DispatchPolicy;

pub type PlanId = u64;

pub(super) const CANCELLED_REASON: &str = "cancelled";

/// Identifies a plan's in-flight reservation inside its curator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTicket {
    pub(super) plan: PlanId,
}

/// Settlement of one requested id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ItemOutcome::Succeeded => None,
            ItemOutcome::Failed { reason } => Some(reason.as_str()),
        }
    }
}

pub struct BatchPlan {
    pub(super) id: PlanId,
    pub(super) resource: Resource,
    pub(super) action: MutationAction,
    pub(super) ids: Vec<EntityId>,
    pub(super) labels: BTreeMap<EntityId, String>,
    pub(super) skipped: Vec<EntityId>,
    pub(super) policy: DispatchPolicy,
    pub(super) abort: AbortHandle,
    pub(super) registration: AbortRegistration,
}

impl std::fmt::Debug for BatchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPlan")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("action", &self.action)
            .field("ids", &self.ids)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl BatchPlan {
    pub fn ticket(&self) -> PlanTicket {
        PlanTicket { plan: self.id }
    }

    /// Handle that stops the plan; ids not yet settled report as cancelled.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Ids left out because another plan already had them in flight.
    pub fn skipped(&self) -> &[EntityId] {
        &self.skipped
    }

    /// Issue one request per id, at most `policy.concurrency` at a time, and
    /// wait for every request to settle or for the plan to be aborted.
    pub async fn execute<G>(self, gateway: &G) -> BatchReport
    where
        G: AdminGateway + ?Sized,
    {
        let BatchPlan {
            id: plan,
            resource,
            action,
            ids,
            labels,
            skipped,
            policy,
            registration,
            ..
        } = self;

        let started_at = Instant::now();
        let mut outcomes = BTreeMap::new();

        let run = async {
            let policy = &policy;
            let mut settled = stream::iter(ids.iter().copied())
                .map(|id| async move { (id, run_one(gateway, resource, action, id, policy).await) })
                .buffer_unordered(policy.concurrency.max(1));

            while let Some((id, outcome)) = settled.next().await {
                outcomes.insert(id, outcome);
            }
        };
        let cancelled = Abortable::new(run, registration).await.is_err();

        if cancelled {
            for id in &ids {
                outcomes.entry(*id).or_insert_with(|| ItemOutcome::Failed {
                    reason: CANCELLED_REASON.to_string(),
                });
            }
        }

        let elapsed = started_at.elapsed();
        let report = BatchReport {
            plan,
            resource,
            action,
            outcomes,
            labels,
            skipped,
            cancelled,
            elapsed,
        };

        counter!(
            METRIC_BATCH_TOTAL,
            "resource" => resource.as_str(),
            "action" => action.as_str(),
            "outcome" => report.outcome_label()
        )
        .increment(1);
        histogram!(METRIC_BATCH_MS, "resource" => resource.as_str())
            .record(elapsed.as_secs_f64() * 1000.0);

        info!(
            plan,
            resource = resource.as_str(),
            action = %action,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            skipped = report.skipped.len(),
            cancelled,
            elapsed_ms = elapsed.as_millis() as u64,
            "Batch settled"
        );

        report
    }
}

/// Per-id settlement of one executed plan.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub plan: PlanId,
    #[serde(serialize_with = "serialize_resource")]
    pub resource: Resource,
    #[serde(serialize_with = "serialize_action")]
    pub action: MutationAction,
    pub outcomes: BTreeMap<EntityId, ItemOutcome>,
    #[serde(skip)]
    pub labels: BTreeMap<EntityId, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<EntityId>,
    pub cancelled: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded_ids(&self) -> Vec<EntityId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_success())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Failed ids with their reasons, in id order.
    pub fn failed(&self) -> Vec<(EntityId, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.reason().map(|reason| (*id, reason)))
            .collect()
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    pub fn is_complete_success(&self) -> bool {
        !self.outcomes.is_empty() && self.failed_count() == 0
    }

    pub fn outcome(&self, id: EntityId) -> Option<&ItemOutcome> {
        self.outcomes.get(&id)
    }

    /// Display name of `id`, falling back to the resource and raw id.
    pub fn label_of(&self, id: EntityId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("{} `{id}`", self.resource.singular()))
    }

    /// The single toast summarising this batch.
    pub fn summary_toast(&self) -> (ToastKind, String) {
        let succeeded = self.succeeded_count();

        if self.is_complete_success() {
            return (
                ToastKind::Success,
                format!(
                    "{} applied to {}",
                    self.action.label(),
                    self.resource.count_label(succeeded)
                ),
            );
        }

        let sample = self
            .failed()
            .first()
            .map(|(id, reason)| format!("{} ({reason})", self.label_of(*id)))
            .unwrap_or_else(|| "unknown error".to_string());

        (
            ToastKind::Error,
            format!(
                "{} succeeded, {} failed (e.g. {})",
                succeeded,
                self.failed_count(),
                sample
            ),
        )
    }

    fn outcome_label(&self) -> &'static str {
        if self.cancelled {
            "cancelled"
        } else if self.is_complete_success() {
            "complete"
        } else {
            "partial"
        }
    }
}

fn serialize_resource<S: serde::Serializer>(
    resource: &Resource,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(resource.as_str())
}

fn serialize_action<S: serde::Serializer>(
    action: &MutationAction,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(action)
}

/// One id, retried while the failure is transient and attempts remain.
#[instrument(
    skip_all,
    fields(resource = resource.as_str(), action = %action, id = id)
)]
async fn run_one<G>(
    gateway: &G,
    resource: Resource,
    action: MutationAction,
    id: EntityId,
    policy: &DispatchPolicy,
) -> ItemOutcome
where
    G: AdminGateway + ?Sized,
{
    let mut attempt: u32 = 1;

    loop {
        match gateway.mutate(resource, id, action).await {
            Ok(()) => {
                debug!(attempt, outcome = "succeeded", "Mutation settled");
                record_mutation(resource, action, "succeeded");
                return ItemOutcome::Succeeded;
            }
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(attempt, error = %err, "Mutation failed transiently; retrying");
                counter!(
                    METRIC_MUTATION_RETRY_TOTAL,
                    "resource" => resource.as_str(),
                    "action" => action.as_str()
                )
                .increment(1);
                tokio::time::sleep(policy.retry_backoff * attempt).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(attempt, outcome = "failed", error = %err, "Mutation settled");
                record_mutation(resource, action, "failed");
                return ItemOutcome::Failed {
                    reason: err.reason(),
                };
            }
        }
    }
}

fn record_mutation(resource: Resource, action: MutationAction, outcome: &'static str) {
    counter!(
        METRIC_MUTATION_TOTAL,
        "resource" => resource.as_str(),
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
