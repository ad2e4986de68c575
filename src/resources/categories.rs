//! Category handle: cached lists, reconciling mutations, bulk reorder.

use reqwest::Method;
use time::OffsetDateTime;
use tracing::{info, warn};

use bantin_api_types::{Category, CategoryCreateRequest, ListQuery, ListResponse, OrderUpdate};

use crate::cache::{CachedList, EntityKey, ResourceKind};
use crate::domain::diff::{ChangeSet, merge_changes};
use crate::domain::ordering::plan_reorder;
use crate::domain::ownership::Editable;

use super::{ListPage, SyncContext, SyncError, UpdateOutcome, entity_from_mutation};

/// Reorder submission result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Fewer than two items; no request was issued.
    Skipped,
    /// The submitted `{id, order}` payload, dense and 1-based.
    Submitted(Vec<OrderUpdate>),
}

pub struct Categories<'a> {
    cx: &'a SyncContext,
}

impl<'a> Categories<'a> {
    pub(super) fn new(cx: &'a SyncContext) -> Self {
        Self { cx }
    }

    /// Paginated, keyword-filtered read. A fresh cached slot is served
    /// without a request; a stale slot or a miss refetches and overwrites.
    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<Category>, SyncError> {
        if let Some(cached) = self.cx.store.get_categories(query) {
            if !cached.stale {
                return Ok(ListPage {
                    items: cached.items,
                    total: cached.total,
                });
            }
        }

        let res: ListResponse<Category> = self
            .cx
            .api
            .request(
                Method::GET,
                "categories",
                Some(&query.query_pairs()),
                None,
                self.cx.bearer().as_deref(),
            )
            .await?;
        let total = res.total();
        self.cx
            .store
            .set_categories(query, CachedList::fresh(res.data.clone(), total));
        Ok(ListPage {
            items: res.data,
            total,
        })
    }

    /// The screen-facing read: failures log and render as an empty page.
    pub async fn list_or_empty(&self, query: &ListQuery) -> ListPage<Category> {
        match self.list(query).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "Category list failed, serving empty page");
                ListPage::empty()
            }
        }
    }

    /// Create a category and flag every cached list for refetch. No
    /// optimistic insert; placement depends on server-side ordering.
    pub async fn create(
        &self,
        request: CategoryCreateRequest,
    ) -> Result<Option<Category>, SyncError> {
        let body = serde_json::to_value(&request)?;
        let value: serde_json::Value = self
            .cx
            .api
            .request(
                Method::POST,
                "categories",
                None,
                Some(&body),
                self.cx.bearer().as_deref(),
            )
            .await?;
        self.cx.store.mark_stale(ResourceKind::Categories);
        Ok(entity_from_mutation(&value))
    }

    /// Send the changed fields, then reconcile the result into every cached
    /// page. An empty change set short-circuits without a request.
    pub async fn update(
        &self,
        current: &Category,
        changes: ChangeSet,
    ) -> Result<UpdateOutcome<Category>, SyncError> {
        let actor = self.cx.session.current_user().ok_or(SyncError::NotSignedIn)?;
        if !current.may_edit(&actor) {
            return Err(SyncError::NotOwner);
        }
        if changes.is_empty() {
            info!(id = current.id, "No fields changed, skipping update request");
            return Ok(UpdateOutcome::Unchanged);
        }

        let key = EntityKey::Category(current.id);
        let epoch = self.cx.ledger.begin(key);
        let path = format!("categories/{}", current.id);
        let value: serde_json::Value = match self
            .cx
            .api
            .request(
                Method::PATCH,
                &path,
                None,
                Some(&changes.to_value()),
                self.cx.bearer().as_deref(),
            )
            .await
        {
            Ok(value) => value,
            Err(err) => {
                self.cx.ledger.abort(&key, epoch);
                return Err(err.into());
            }
        };

        let updated = match entity_from_mutation::<Category>(&value) {
            Some(updated) => updated,
            None => {
                // Response carried no usable entity: rebuild from the best
                // locally-known copy and the submitted fields.
                let base = self
                    .cx
                    .store
                    .find_category(current.id)
                    .unwrap_or_else(|| current.clone());
                merge_changes(&base, &changes, OffsetDateTime::now_utc())?
            }
        };

        if self.cx.ledger.settle(key, epoch) {
            self.cx.store.apply_category_update(&updated);
        } else {
            self.cx.store.mark_stale(ResourceKind::Categories);
        }
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Delete and drop the category from every cached page.
    pub async fn delete(&self, current: &Category) -> Result<(), SyncError> {
        let actor = self.cx.session.current_user().ok_or(SyncError::NotSignedIn)?;
        if !current.may_edit(&actor) {
            return Err(SyncError::NotOwner);
        }

        let key = EntityKey::Category(current.id);
        let epoch = self.cx.ledger.begin(key);
        let path = format!("categories/{}", current.id);
        if let Err(err) = self
            .cx
            .api
            .request_unit(
                Method::DELETE,
                &path,
                None,
                None,
                self.cx.bearer().as_deref(),
            )
            .await
        {
            self.cx.ledger.abort(&key, epoch);
            return Err(err.into());
        }

        self.cx.ledger.settle(key, epoch);
        self.cx.store.apply_category_delete(current.id);
        Ok(())
    }

    /// Submit the full visible sequence as one bulk order mutation.
    ///
    /// All-or-nothing from the caller's perspective: on failure the local
    /// arrangement stays as dragged, but every slot is flagged stale, so the
    /// authoritative order returns within one refetch cycle.
    pub async fn reorder(&self, ordered: &[Category]) -> Result<ReorderOutcome, SyncError> {
        let Some(plan) = plan_reorder(ordered) else {
            info!("Reorder skipped, fewer than two items");
            return Ok(ReorderOutcome::Skipped);
        };

        let body = serde_json::to_value(&plan)?;
        let result = self
            .cx
            .api
            .request_unit(
                Method::PATCH,
                "categories/order",
                None,
                Some(&body),
                self.cx.bearer().as_deref(),
            )
            .await;
        self.cx.store.mark_stale(ResourceKind::Categories);
        result?;

        info!(items = plan.len(), "Category order submitted");
        Ok(ReorderOutcome::Submitted(plan))
    }
}
