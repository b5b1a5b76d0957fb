//! Client-side curation of one admin collection page.
//!
//! A [`CollectionCurator`] holds the server snapshot, the ephemeral filter
//! criteria, the derived visible rows and the selection. State transitions are
//! synchronous; only loading and dispatching touch the network.

mod batch;
mod view;

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use futures::future::AbortHandle;
use tracing::{debug, info};

pub use batch::{BatchPlan, BatchReport, ItemOutcome, PlanId, PlanTicket};
pub use view::{Criteria, SortDirection, SortField, SortOrder, visible_indices};

use quire_api_types::PagePayload;

use crate::{
    config::DispatchSettings,
    domain::{
        entities::Curatable,
        types::{EntityId, MutationAction, Resource},
    },
    infra::http::AdminGateway,
};

use super::{
    error::CuratorError,
    pagination::CollectionPage,
    toasts::{Toast, ToastQueue},
};

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// How batch plans issue their requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub concurrency: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl From<&DispatchSettings> for DispatchPolicy {
    fn from(settings: &DispatchSettings) -> Self {
        Self {
            concurrency: usize::try_from(settings.concurrency.get()).unwrap_or(usize::MAX),
            max_attempts: settings.max_attempts.get(),
            retry_backoff: settings.retry_backoff,
        }
    }
}

#[derive(Debug)]
pub struct CollectionCurator<E: Curatable> {
    page: CollectionPage<E>,
    criteria: Criteria<E::Category>,
    visible: Vec<usize>,
    selection: BTreeSet<EntityId>,
    in_flight: BTreeMap<EntityId, PlanId>,
    toasts: ToastQueue,
    policy: DispatchPolicy,
    next_plan: PlanId,
}

impl<E: Curatable> CollectionCurator<E> {
    pub fn new(page: CollectionPage<E>, policy: DispatchPolicy, toasts: ToastQueue) -> Self {
        let criteria = Criteria::default();
        let visible = visible_indices(page.items(), &criteria);
        Self {
            page,
            criteria,
            visible,
            selection: BTreeSet::new(),
            in_flight: BTreeMap::new(),
            toasts,
            policy,
            next_plan: 1,
        }
    }

    /// Fetch page `page_no` of `E`'s collection and build a curator over it.
    pub async fn load<G>(
        gateway: &G,
        page_no: u32,
        policy: DispatchPolicy,
        toasts: ToastQueue,
    ) -> Result<Self, CuratorError>
    where
        G: AdminGateway + ?Sized,
    {
        let page = fetch_page::<E, G>(gateway, page_no).await?;
        Ok(Self::new(page, policy, toasts))
    }

    pub fn resource(&self) -> Resource {
        E::RESOURCE
    }

    pub fn page(&self) -> &CollectionPage<E> {
        &self.page
    }

    pub fn criteria(&self) -> &Criteria<E::Category> {
        &self.criteria
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Rows of the current page admitted by the criteria, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &E> + '_ {
        let items = self.page.items();
        self.visible.iter().map(move |index| &items[*index])
    }

    pub fn visible_ids(&self) -> Vec<EntityId> {
        self.visible().map(Curatable::id).collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.page.items().iter().find(|entity| entity.id() == id)
    }

    pub fn set_search_term(&mut self, text: &str) {
        self.criteria.set_search(text);
        self.recompute();
    }

    pub fn set_category_filter(&mut self, category: Option<E::Category>) {
        self.criteria.set_category(category);
        self.recompute();
    }

    /// Parse a wire value (`"pending"`, `"A"`) and apply it; blank clears.
    pub fn apply_category_filter(&mut self, raw: Option<&str>) -> Result<(), CuratorError> {
        let category = match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Some(E::parse_category(value)?),
            None => None,
        };
        self.set_category_filter(category);
        Ok(())
    }

    pub fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.criteria.set_sort(sort);
        self.recompute();
    }

    pub fn reset_criteria(&mut self) {
        self.criteria = Criteria::default();
        self.recompute();
    }

    /// Flip `id` in the selection; returns whether it is now selected.
    pub fn toggle_select(&mut self, id: EntityId) -> Result<bool, CuratorError> {
        if self.get(id).is_none() {
            return Err(CuratorError::UnknownEntity {
                resource: E::RESOURCE,
                id,
            });
        }

        if self.selection.remove(&id) {
            Ok(false)
        } else {
            self.selection.insert(id);
            Ok(true)
        }
    }

    /// Select exactly the visible rows, or clear the selection when they are
    /// all selected already.
    pub fn toggle_select_all(&mut self) {
        if self.is_all_selected() {
            self.selection.clear();
        } else {
            self.selection = self.visible_ids().into_iter().collect();
        }
    }

    pub fn is_all_selected(&self) -> bool {
        !self.visible.is_empty() && self.visible().all(|entity| self.selection.contains(&entity.id()))
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.selection.iter().copied().collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_in_flight(&self, id: EntityId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn in_flight_ids(&self) -> Vec<EntityId> {
        self.in_flight.keys().copied().collect()
    }

    /// Install a fresh server snapshot. The selection is cleared; criteria
    /// survive a reload of the same page and reset on navigation.
    pub fn replace_page(&mut self, page: CollectionPage<E>) {
        if page.meta().current_page != self.page.meta().current_page {
            self.criteria = Criteria::default();
        }
        self.page = page;
        self.selection.clear();
        self.recompute();
    }

    /// Fetch the current page again and install it.
    pub async fn refresh<G>(&mut self, gateway: &G) -> Result<(), CuratorError>
    where
        G: AdminGateway + ?Sized,
    {
        let page = fetch_page::<E, G>(gateway, self.page.meta().current_page.max(1)).await?;
        self.replace_page(page);
        Ok(())
    }

    /// Move to page `page_no`; criteria reset when the page number changes.
    pub async fn goto_page<G>(&mut self, gateway: &G, page_no: u32) -> Result<(), CuratorError>
    where
        G: AdminGateway + ?Sized,
    {
        let page = fetch_page::<E, G>(gateway, page_no.max(1)).await?;
        self.replace_page(page);
        Ok(())
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain_all()
    }

    /// Validate `ids`, reserve them, and return a plan ready to execute.
    ///
    /// Duplicates collapse; ids already reserved by another plan are left out
    /// and listed as skipped.
    pub fn begin_batch<I>(&mut self, action: MutationAction, ids: I) -> Result<BatchPlan, CuratorError>
    where
        I: IntoIterator<Item = EntityId>,
    {
        let resource = E::RESOURCE;

        if !E::supports(action) {
            let err = CuratorError::UnsupportedAction { resource, action };
            self.toasts.error(capitalize(&err.to_string()));
            return Err(err);
        }

        let requested: BTreeSet<EntityId> = ids.into_iter().collect();
        if requested.is_empty() {
            let err = CuratorError::EmptySelection { resource };
            self.toasts.error(capitalize(&err.to_string()));
            return Err(err);
        }

        let (skipped, ids): (Vec<EntityId>, Vec<EntityId>) = requested
            .into_iter()
            .partition(|id| self.in_flight.contains_key(id));

        if ids.is_empty() {
            return Err(CuratorError::AlreadyInFlight {
                resource,
                ids: skipped,
            });
        }

        let id = self.next_plan;
        self.next_plan += 1;
        for entity_id in &ids {
            self.in_flight.insert(*entity_id, id);
        }

        let labels = ids
            .iter()
            .filter_map(|entity_id| self.get(*entity_id).map(|e| (*entity_id, e.label())))
            .collect();

        let (abort, registration) = AbortHandle::new_pair();

        debug!(
            plan = id,
            resource = resource.as_str(),
            action = %action,
            requested = ids.len(),
            skipped = skipped.len(),
            "Batch planned"
        );

        Ok(BatchPlan {
            id,
            resource,
            action,
            ids,
            labels,
            skipped,
            policy: self.policy,
            abort,
            registration,
        })
    }

    /// Fold an executed plan back in: release its reservations, drop
    /// succeeded ids from the selection and publish one summary toast.
    pub fn settle(&mut self, report: &BatchReport) {
        self.release(report);
        let (kind, text) = report.summary_toast();
        self.toasts.publish(kind, text);
    }

    /// Release the reservations of a plan that will never be settled.
    pub fn abandon(&mut self, ticket: PlanTicket) {
        self.in_flight.retain(|_, plan| *plan != ticket.plan);
    }

    /// Run `action` over `ids` and settle the result.
    pub async fn dispatch_batch<G, I>(
        &mut self,
        gateway: &G,
        action: MutationAction,
        ids: I,
    ) -> Result<BatchReport, CuratorError>
    where
        G: AdminGateway + ?Sized,
        I: IntoIterator<Item = EntityId>,
    {
        let plan = self.begin_batch(action, ids)?;
        let mut guard = PlanGuard {
            ticket: Some(plan.ticket()),
            curator: self,
        };

        let report = plan.execute(gateway).await;

        guard.ticket = None;
        guard.curator.settle(&report);
        Ok(report)
    }

    pub async fn dispatch_selected<G>(
        &mut self,
        gateway: &G,
        action: MutationAction,
    ) -> Result<BatchReport, CuratorError>
    where
        G: AdminGateway + ?Sized,
    {
        let ids = self.selected_ids();
        self.dispatch_batch(gateway, action, ids).await
    }

    /// One mutation on one row with its own toast. The snapshot is left as
    /// is; call [`refresh`](Self::refresh) to observe the server's state.
    pub async fn single_action<G>(
        &mut self,
        gateway: &G,
        id: EntityId,
        action: MutationAction,
    ) -> Result<ItemOutcome, CuratorError>
    where
        G: AdminGateway + ?Sized,
    {
        let plan = self.begin_batch(action, [id])?;
        let mut guard = PlanGuard {
            ticket: Some(plan.ticket()),
            curator: self,
        };

        let report = plan.execute(gateway).await;

        guard.ticket = None;
        let curator = &mut *guard.curator;
        curator.release(&report);

        let resource = E::RESOURCE;
        let outcome = report
            .outcome(id)
            .cloned()
            .unwrap_or_else(|| ItemOutcome::Failed {
                reason: batch::CANCELLED_REASON.to_string(),
            });

        match &outcome {
            ItemOutcome::Succeeded => {
                info!(resource = resource.as_str(), id, action = %action, "Row action applied");
                curator.toasts.success(format!(
                    "{} {}",
                    capitalize(resource.singular()),
                    action.past_tense()
                ));
            }
            ItemOutcome::Failed { reason } => {
                curator.toasts.error(format!(
                    "Failed to {} {}: {reason}",
                    action.verb(),
                    resource.singular()
                ));
            }
        }

        Ok(outcome)
    }

    fn release(&mut self, report: &BatchReport) {
        self.in_flight.retain(|_, plan| *plan != report.plan);
        for id in report.succeeded_ids() {
            self.selection.remove(&id);
        }
    }

    fn recompute(&mut self) {
        self.visible = visible_indices(self.page.items(), &self.criteria);
    }
}

/// Releases a plan's reservations if its dispatch future is dropped early.
struct PlanGuard<'a, E: Curatable> {
    ticket: Option<PlanTicket>,
    curator: &'a mut CollectionCurator<E>,
}

impl<E: Curatable> Drop for PlanGuard<'_, E> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            debug!(plan = ticket.plan, "Batch dropped before settling");
            self.curator.abandon(ticket);
        }
    }
}

async fn fetch_page<E, G>(gateway: &G, page_no: u32) -> Result<CollectionPage<E>, CuratorError>
where
    E: Curatable,
    G: AdminGateway + ?Sized,
{
    let document = gateway.fetch_page(E::RESOURCE, page_no).await?;
    let payload: PagePayload<E> = serde_json::from_value(document)
        .map_err(|err| CuratorError::payload(E::RESOURCE, err.to_string()))?;
    Ok(CollectionPage::from(payload))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
