//! User handle: cached lists, self-edit, and the login round-trip.

use reqwest::Method;
use time::OffsetDateTime;
use tracing::{info, warn};

use bantin_api_types::{ListQuery, ListResponse, LoginRequest, User, UserCreateRequest};

use crate::cache::{CachedList, EntityKey, ResourceKind};
use crate::domain::diff::{ChangeSet, merge_changes};
use crate::domain::ownership::Editable;

use super::{ListPage, SyncContext, SyncError, UpdateOutcome, entity_from_mutation};

pub struct Users<'a> {
    cx: &'a SyncContext,
}

impl<'a> Users<'a> {
    pub(super) fn new(cx: &'a SyncContext) -> Self {
        Self { cx }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<User>, SyncError> {
        if let Some(cached) = self.cx.store.get_users(query) {
            if !cached.stale {
                return Ok(ListPage {
                    items: cached.items,
                    total: cached.total,
                });
            }
        }

        let res: ListResponse<User> = self
            .cx
            .api
            .request(
                Method::GET,
                "users",
                Some(&query.query_pairs()),
                None,
                self.cx.bearer().as_deref(),
            )
            .await?;
        let total = res.total();
        self.cx
            .store
            .set_users(query, CachedList::fresh(res.data.clone(), total));
        Ok(ListPage {
            items: res.data,
            total,
        })
    }

    pub async fn list_or_empty(&self, query: &ListQuery) -> ListPage<User> {
        match self.list(query).await {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "User list failed, serving empty page");
                ListPage::empty()
            }
        }
    }

    /// Admin-create an account. New accounts default to active.
    pub async fn create(&self, request: UserCreateRequest) -> Result<Option<User>, SyncError> {
        let body = serde_json::to_value(&request)?;
        let value: serde_json::Value = self
            .cx
            .api
            .request(
                Method::POST,
                "users",
                None,
                Some(&body),
                self.cx.bearer().as_deref(),
            )
            .await?;
        self.cx.store.mark_stale(ResourceKind::Users);
        Ok(entity_from_mutation(&value))
    }

    /// Self-edit: send the changed fields, reconcile every cached page, and
    /// refresh the stored session user. Password handling is the caller's
    /// job; a blank password never belongs in the change set.
    pub async fn update(
        &self,
        current: &User,
        changes: ChangeSet,
    ) -> Result<UpdateOutcome<User>, SyncError> {
        let actor = self.cx.session.current_user().ok_or(SyncError::NotSignedIn)?;
        if !current.may_edit(&actor) {
            return Err(SyncError::SelfEditOnly);
        }
        if changes.is_empty() {
            info!(id = %current.id, "No fields changed, skipping update request");
            return Ok(UpdateOutcome::Unchanged);
        }

        let key = EntityKey::User(current.id);
        let epoch = self.cx.ledger.begin(key);
        let path = format!("users/{}", current.id);
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

        let updated = match entity_from_mutation::<User>(&value) {
            Some(updated) => updated,
            None => {
                // Cached pages first, then the session copy when it is us.
                let base = self
                    .cx
                    .store
                    .find_user(current.id)
                    .or_else(|| {
                        self.cx
                            .session
                            .current_user()
                            .filter(|user| user.id == current.id)
                    })
                    .unwrap_or_else(|| current.clone());
                merge_changes(&base, &changes, OffsetDateTime::now_utc())?
            }
        };

        if self.cx.ledger.settle(key, epoch) {
            self.cx.store.apply_user_update(&updated);
            if updated.id == actor.id {
                self.cx.session.set_current_user(Some(updated.clone()))?;
            }
        } else {
            self.cx.store.mark_stale(ResourceKind::Users);
        }
        Ok(UpdateOutcome::Updated(updated))
    }

    /// `POST /users/login`. Success stores both tokens and the session user
    /// durably; rejection stores nothing.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SyncError> {
        let body = serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let res: bantin_api_types::LoginResponse = self
            .cx
            .api
            .request(Method::POST, "users/login", None, Some(&body), None)
            .await?;

        match (res.access_token, res.data) {
            (Some(token), Some(user)) if !token.is_empty() => {
                self.cx
                    .session
                    .store_login(token, res.refresh_token, user.clone())?;
                info!(user_id = %user.id, "Login succeeded");
                Ok(user)
            }
            _ => Err(SyncError::LoginRejected {
                message: res
                    .message
                    .unwrap_or_else(|| "invalid credentials".to_string()),
            }),
        }
    }

    /// Clear the stored session user and tokens.
    pub fn logout(&self) -> Result<(), SyncError> {
        self.cx.session.logout()?;
        Ok(())
    }
}
