//! List cache storage and reconciliation walks.
//!
//! One LRU of list slots per resource, keyed by the query-parameter hash,
//! plus a by-id KV cache for single-post reads. Mutations never touch slots
//! directly; they go through the `apply_*` / `mark_*` walks below, which
//! keep every loaded page coherent and flag it for an eventual refetch.

use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use bantin_api_types::{Category, ListQuery, Post, User};

use super::config::CacheConfig;
use super::keys::{ResourceKind, hash_value};
use super::lock;

/// One cached list page plus the bookkeeping reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedList<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// Stale slots are served only as placeholders; the next read refetches.
    pub stale: bool,
}

impl<T> CachedList<T> {
    pub fn fresh(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            total,
            stale: false,
        }
    }
}

type Slots<T> = RwLock<LruCache<u64, CachedList<T>>>;

/// Process-wide list cache, owned by the `SyncContext` that created it.
pub struct ListStore {
    users: Slots<User>,
    categories: Slots<Category>,
    posts: Slots<Post>,
    posts_by_id: RwLock<LruCache<i64, Post>>,
}

impl ListStore {
    /// Create a store with the given slot limits.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            users: RwLock::new(LruCache::new(config.user_list_limit_non_zero())),
            categories: RwLock::new(LruCache::new(config.category_list_limit_non_zero())),
            posts: RwLock::new(LruCache::new(config.post_list_limit_non_zero())),
            posts_by_id: RwLock::new(LruCache::new(config.post_limit_non_zero())),
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn get_users(&self, query: &ListQuery) -> Option<CachedList<User>> {
        get_slot(&self.users, ResourceKind::Users, query)
    }

    pub fn set_users(&self, query: &ListQuery, list: CachedList<User>) {
        lock::write(&self.users, "set_users").put(hash_value(query), list);
    }

    pub fn mark_users_stale(&self) {
        mark_stale(&self.users, ResourceKind::Users);
    }

    /// Replace the user by id in every cached page; flags touched slots stale.
    pub fn apply_user_update(&self, user: &User) -> usize {
        apply_update(&self.users, "apply_user_update", user, |u| u.id == user.id)
    }

    /// Drop the user from every cached page, shrinking each affected total.
    pub fn apply_user_delete(&self, id: Uuid) -> usize {
        apply_delete(&self.users, "apply_user_delete", |u| u.id == id)
    }

    /// Best locally-known copy, searched across all cached pages.
    pub fn find_user(&self, id: Uuid) -> Option<User> {
        find(&self.users, "find_user", |u| u.id == id)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub fn get_categories(&self, query: &ListQuery) -> Option<CachedList<Category>> {
        get_slot(&self.categories, ResourceKind::Categories, query)
    }

    pub fn set_categories(&self, query: &ListQuery, list: CachedList<Category>) {
        lock::write(&self.categories, "set_categories").put(hash_value(query), list);
    }

    pub fn mark_categories_stale(&self) {
        mark_stale(&self.categories, ResourceKind::Categories);
    }

    pub fn apply_category_update(&self, category: &Category) -> usize {
        apply_update(&self.categories, "apply_category_update", category, |c| {
            c.id == category.id
        })
    }

    pub fn apply_category_delete(&self, id: i64) -> usize {
        apply_delete(&self.categories, "apply_category_delete", |c| c.id == id)
    }

    pub fn find_category(&self, id: i64) -> Option<Category> {
        find(&self.categories, "find_category", |c| c.id == id)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub fn get_posts(&self, query: &ListQuery) -> Option<CachedList<Post>> {
        get_slot(&self.posts, ResourceKind::Posts, query)
    }

    pub fn set_posts(&self, query: &ListQuery, list: CachedList<Post>) {
        lock::write(&self.posts, "set_posts").put(hash_value(query), list);
    }

    pub fn mark_posts_stale(&self) {
        mark_stale(&self.posts, ResourceKind::Posts);
    }

    pub fn apply_post_update(&self, post: &Post) -> usize {
        let touched = apply_update(&self.posts, "apply_post_update", post, |p| p.id == post.id);
        lock::write(&self.posts_by_id, "apply_post_update.by_id").put(post.id, post.clone());
        touched
    }

    pub fn apply_post_delete(&self, id: i64) -> usize {
        lock::write(&self.posts_by_id, "apply_post_delete.by_id").pop(&id);
        apply_delete(&self.posts, "apply_post_delete", |p| p.id == id)
    }

    pub fn find_post(&self, id: i64) -> Option<Post> {
        if let Some(post) = lock::write(&self.posts_by_id, "find_post.by_id")
            .get(&id)
            .cloned()
        {
            return Some(post);
        }
        find(&self.posts, "find_post", |p| p.id == id)
    }

    /// Single-post KV read, used by the detail screen.
    pub fn get_post_by_id(&self, id: i64) -> Option<Post> {
        let hit = lock::write(&self.posts_by_id, "get_post_by_id")
            .get(&id)
            .cloned();
        record_lookup(ResourceKind::Posts, hit.is_some());
        hit
    }

    pub fn set_post(&self, post: Post) {
        lock::write(&self.posts_by_id, "set_post").put(post.id, post);
    }

    // ========================================================================
    // Cross-resource
    // ========================================================================

    /// Flag every slot of one resource stale.
    pub fn mark_stale(&self, resource: ResourceKind) {
        match resource {
            ResourceKind::Users => self.mark_users_stale(),
            ResourceKind::Categories => self.mark_categories_stale(),
            ResourceKind::Posts => self.mark_posts_stale(),
        }
    }

    /// Clear all cached data.
    pub fn clear(&self) {
        lock::write(&self.users, "clear.users").clear();
        lock::write(&self.categories, "clear.categories").clear();
        lock::write(&self.posts, "clear.posts").clear();
        lock::write(&self.posts_by_id, "clear.posts_by_id").clear();
    }
}

// ============================================================================
// Shared walks
// ============================================================================

fn get_slot<T: Clone>(
    slots: &Slots<T>,
    resource: ResourceKind,
    query: &ListQuery,
) -> Option<CachedList<T>> {
    let hit = lock::write(slots, "get_slot")
        .get(&hash_value(query))
        .cloned();
    record_lookup(resource, hit.as_ref().is_some_and(|list| !list.stale));
    hit
}

fn mark_stale<T>(slots: &Slots<T>, resource: ResourceKind) {
    let mut guard = lock::write(slots, "mark_stale");
    for (_, list) in guard.iter_mut() {
        list.stale = true;
    }
    debug!(resource = resource.as_str(), "Marked list slots stale");
}

fn apply_update<T, F>(slots: &Slots<T>, op: &'static str, replacement: &T, matches: F) -> usize
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let mut touched = 0;
    let mut guard = lock::write(slots, op);
    for (_, list) in guard.iter_mut() {
        for item in &mut list.items {
            if matches(item) {
                *item = replacement.clone();
                touched += 1;
            }
        }
        list.stale = true;
    }
    debug!(op, touched, "Reconciled update into cached pages");
    touched
}

fn apply_delete<T, F>(slots: &Slots<T>, op: &'static str, matches: F) -> usize
where
    F: Fn(&T) -> bool,
{
    let mut touched = 0;
    let mut guard = lock::write(slots, op);
    for (_, list) in guard.iter_mut() {
        let before = list.items.len();
        list.items.retain(|item| !matches(item));
        let removed = before - list.items.len();
        if removed > 0 {
            list.total = list.total.saturating_sub(removed as u64);
            touched += removed;
        }
        list.stale = true;
    }
    debug!(op, touched, "Reconciled delete into cached pages");
    touched
}

fn find<T, F>(slots: &Slots<T>, op: &'static str, matches: F) -> Option<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let guard = lock::read(slots, op);
    for (_, list) in guard.iter() {
        if let Some(item) = list.items.iter().find(|item| matches(item)) {
            return Some(item.clone());
        }
    }
    None
}

fn record_lookup(resource: ResourceKind, fresh_hit: bool) {
    if fresh_hit {
        counter!("bantin_cache_hit_total", "resource" => resource.as_str()).increment(1);
    } else {
        counter!("bantin_cache_miss_total", "resource" => resource.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use crate::domain::entities::fixtures::{actor_id, sample_category, sample_post};

    use super::*;

    fn query(page: u32) -> ListQuery {
        ListQuery {
            page,
            ..ListQuery::default()
        }
    }

    #[test]
    fn list_slot_roundtrip() {
        let store = ListStore::new(&CacheConfig::default());
        let q = query(1);

        assert!(store.get_categories(&q).is_none());

        let list = CachedList::fresh(vec![sample_category(1, 1, actor_id())], 1);
        store.set_categories(&q, list.clone());

        let cached = store.get_categories(&q).expect("cached slot");
        assert_eq!(cached, list);

        // A different page occupies a different slot.
        assert!(store.get_categories(&query(2)).is_none());
    }

    #[test]
    fn update_reconciles_every_cached_page() {
        let store = ListStore::new(&CacheConfig::default());
        let shared = sample_category(7, 1, actor_id());

        store.set_categories(
            &query(1),
            CachedList::fresh(vec![shared.clone(), sample_category(8, 2, actor_id())], 4),
        );
        store.set_categories(&query(2), CachedList::fresh(vec![shared.clone()], 4));

        let mut renamed = shared.clone();
        renamed.name_vi = "Thời sự".into();
        assert_eq!(store.apply_category_update(&renamed), 2);

        for page in [1, 2] {
            let slot = store.get_categories(&query(page)).expect("slot");
            let item = slot.items.iter().find(|c| c.id == 7).expect("entity");
            assert_eq!(item.name_vi, "Thời sự");
            assert!(slot.stale);
        }
    }

    #[test]
    fn delete_drops_the_entity_and_shrinks_totals() {
        let store = ListStore::new(&CacheConfig::default());
        let doomed = sample_category(7, 1, actor_id());

        store.set_categories(
            &query(1),
            CachedList::fresh(vec![doomed.clone(), sample_category(8, 2, actor_id())], 5),
        );
        store.set_categories(
            &query(2),
            CachedList::fresh(vec![sample_category(9, 3, actor_id())], 5),
        );

        assert_eq!(store.apply_category_delete(7), 1);

        let first = store.get_categories(&query(1)).expect("slot");
        assert!(first.items.iter().all(|c| c.id != 7));
        assert_eq!(first.total, 4);

        // Pages without the entity keep their total but go stale.
        let second = store.get_categories(&query(2)).expect("slot");
        assert_eq!(second.total, 5);
        assert!(second.stale);
    }

    #[test]
    fn mark_stale_leaves_data_in_place() {
        let store = ListStore::new(&CacheConfig::default());
        store.set_categories(
            &query(1),
            CachedList::fresh(vec![sample_category(1, 1, actor_id())], 1),
        );

        store.mark_stale(ResourceKind::Categories);

        let slot = store.get_categories(&query(1)).expect("slot");
        assert!(slot.stale);
        assert_eq!(slot.items.len(), 1);
    }

    #[test]
    fn find_searches_all_cached_pages() {
        let store = ListStore::new(&CacheConfig::default());
        store.set_categories(
            &query(3),
            CachedList::fresh(vec![sample_category(11, 1, actor_id())], 1),
        );

        assert_eq!(store.find_category(11).expect("found").id, 11);
        assert!(store.find_category(12).is_none());
    }

    #[test]
    fn post_kv_follows_list_reconciliation() {
        let store = ListStore::new(&CacheConfig::default());
        let post = sample_post(3, actor_id());
        store.set_post(post.clone());
        assert!(store.get_post_by_id(3).is_some());

        let mut updated = post.clone();
        updated.title_vi = "Tiêu đề mới".into();
        store.apply_post_update(&updated);
        assert_eq!(store.get_post_by_id(3).expect("kv").title_vi, "Tiêu đề mới");

        store.apply_post_delete(3);
        assert!(store.get_post_by_id(3).is_none());
    }

    #[test]
    fn list_slots_evict_least_recently_used() {
        let config = CacheConfig {
            category_list_limit: 2,
            ..Default::default()
        };
        let store = ListStore::new(&config);

        for page in 1..=3 {
            store.set_categories(
                &query(page),
                CachedList::fresh(vec![sample_category(i64::from(page), 1, actor_id())], 1),
            );
        }

        assert!(store.get_categories(&query(1)).is_none()); // Evicted
        assert!(store.get_categories(&query(2)).is_some());
        assert!(store.get_categories(&query(3)).is_some());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = ListStore::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .categories
                .write()
                .expect("categories lock should be acquired");
            panic!("poison categories lock");
        }));

        store.set_categories(
            &query(1),
            CachedList::fresh(vec![sample_category(1, 1, actor_id())], 1),
        );
        assert!(store.get_categories(&query(1)).is_some());
    }
}
