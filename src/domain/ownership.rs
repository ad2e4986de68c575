//! Client-side ownership gate.
//!
//! Categories and posts may only be mutated by their creator; users may only
//! edit themselves. This is a UX affordance mirrored from the admin screens,
//! not a security boundary; the server performs its own authorization.

use bantin_api_types::{Category, Post, User};

/// Records whose mutation actions are gated on the acting session user.
pub trait Editable {
    /// Whether `actor` may edit or delete this record.
    fn may_edit(&self, actor: &User) -> bool;
}

impl Editable for Category {
    fn may_edit(&self, actor: &User) -> bool {
        self.creator_id == actor.id
    }
}

impl Editable for Post {
    fn may_edit(&self, actor: &User) -> bool {
        self.creator_id == actor.id
    }
}

impl Editable for User {
    // Self-edit only; there is no admin override.
    fn may_edit(&self, actor: &User) -> bool {
        self.id == actor.id
    }
}

/// Gate helper for UI layers holding an optional session: no session, no edit.
pub fn may_edit<T: Editable>(record: &T, actor: Option<&User>) -> bool {
    actor.is_some_and(|actor| record.may_edit(actor))
}

#[cfg(test)]
mod tests {
    use crate::domain::entities::fixtures::{actor_id, other_id, sample_category, sample_user};

    use super::*;

    #[test]
    fn creator_may_edit_category() {
        let actor = sample_user(actor_id());
        let own = sample_category(1, 1, actor.id);
        let foreign = sample_category(2, 2, other_id());

        assert!(own.may_edit(&actor));
        assert!(!foreign.may_edit(&actor));
    }

    #[test]
    fn users_are_self_edit_only() {
        let actor = sample_user(actor_id());
        let other = sample_user(other_id());

        assert!(actor.may_edit(&actor));
        assert!(!other.may_edit(&actor));
    }

    #[test]
    fn no_session_means_no_edit() {
        let record = sample_category(1, 1, actor_id());
        assert!(!may_edit(&record, None));
        assert!(may_edit(&record, Some(&sample_user(actor_id()))));
    }
}
