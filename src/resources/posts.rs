//! Post handle: cached lists, single-post reads, reconciling mutations.

use reqwest::Method;
use time::OffsetDateTime;
use tracing::{info, warn};

use bantin_api_types::{ListQuery, ListResponse, Post, PostCreateRequest};

use crate::api::ApiError;
use crate::cache::{CachedList, EntityKey, ResourceKind};
use crate::domain::diff::{ChangeSet, merge_changes};
use crate::domain::ownership::Editable;

use super::{ListPage, SyncContext, SyncError, UpdateOutcome, entity_from_mutation};

pub struct Posts<'a> {
    cx: &'a SyncContext,
}

impl<'a> Posts<'a> {
    pub(super) fn new(cx: &'a SyncContext) -> Self {
        Self { cx }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<Post>, SyncError> {
        if let Some(cached) = self.cx.store.get_posts(query) {
            if !cached.stale {
                return Ok(ListPage {
                    items: cached.items,
                    total: cached.total,
                });
            }
        }

        let res: ListResponse<Post> = self
            .cx
            .api
            .request(
                Method::GET,
                "posts",
                Some(&query.query_pairs()),
                None,
                self.cx.bearer().as_deref(),
            )
            .await?;
        let total = res.total();
        self.cx
            .store
            .set_posts(query, CachedList::fresh(res.data.clone(), total));
        Ok(ListPage {
            items: res.data,
            total,
        })
    }

    pub async fn list_or_empty(&self, query: &ListQuery) -> ListPage<Post> {
        match self.list(query).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "Post list failed, serving empty page");
                ListPage::empty()
            }
        }
    }

    /// Single-post read through the by-id cache; the detail screen's path.
    pub async fn get(&self, id: i64) -> Result<Post, SyncError> {
        if let Some(post) = self.cx.store.get_post_by_id(id) {
            return Ok(post);
        }

        let path = format!("posts/{id}");
        let value: serde_json::Value = self
            .cx
            .api
            .request(Method::GET, &path, None, None, self.cx.bearer().as_deref())
            .await?;
        let post = entity_from_mutation::<Post>(&value).ok_or_else(|| {
            ApiError::Decode(format!("post {id} response carried no entity"))
        })?;
        self.cx.store.set_post(post.clone());
        Ok(post)
    }

    pub async fn create(&self, request: PostCreateRequest) -> Result<Option<Post>, SyncError> {
        let body = serde_json::to_value(&request)?;
        let value: serde_json::Value = self
            .cx
            .api
            .request(
                Method::POST,
                "posts",
                None,
                Some(&body),
                self.cx.bearer().as_deref(),
            )
            .await?;
        self.cx.store.mark_stale(ResourceKind::Posts);
        Ok(entity_from_mutation(&value))
    }

    pub async fn update(
        &self,
        current: &Post,
        changes: ChangeSet,
    ) -> Result<UpdateOutcome<Post>, SyncError> {
        let actor = self.cx.session.current_user().ok_or(SyncError::NotSignedIn)?;
        if !current.may_edit(&actor) {
            return Err(SyncError::NotOwner);
        }
        if changes.is_empty() {
            info!(id = current.id, "No fields changed, skipping update request");
            return Ok(UpdateOutcome::Unchanged);
        }

        let key = EntityKey::Post(current.id);
        let epoch = self.cx.ledger.begin(key);
        let path = format!("posts/{}", current.id);
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

        let updated = match entity_from_mutation::<Post>(&value) {
            Some(updated) => updated,
            None => {
                let base = self
                    .cx
                    .store
                    .find_post(current.id)
                    .unwrap_or_else(|| current.clone());
                merge_changes(&base, &changes, OffsetDateTime::now_utc())?
            }
        };

        if self.cx.ledger.settle(key, epoch) {
            self.cx.store.apply_post_update(&updated);
        } else {
            self.cx.store.mark_stale(ResourceKind::Posts);
        }
        Ok(UpdateOutcome::Updated(updated))
    }

    pub async fn delete(&self, current: &Post) -> Result<(), SyncError> {
        let actor = self.cx.session.current_user().ok_or(SyncError::NotSignedIn)?;
        if !current.may_edit(&actor) {
            return Err(SyncError::NotOwner);
        }

        let key = EntityKey::Post(current.id);
        let epoch = self.cx.ledger.begin(key);
        let path = format!("posts/{}", current.id);
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
        self.cx.store.apply_post_delete(current.id);
        Ok(())
    }
}
