#![deny(clippy::all, clippy::pedantic)]

pub mod categories;
pub mod posts;
pub mod session;
pub mod users;

use bantin::domain::types::Locale;
use bantin::i18n::Notice;
use bantin::resources::SyncError;

use crate::context::Ctx;

/// Localized notice line on stderr; stdout stays JSON-only.
pub fn notice(ctx: &Ctx, notice: Notice) {
    eprintln!("{}", notice.text(ctx.locale));
}

/// Render a mutation failure: the gate notices get their own localized
/// strings, transport failures carry the server's message when one exists.
pub fn failure_line(err: &SyncError, fallback: Notice, locale: Locale) -> String {
    match err {
        SyncError::NotOwner => Notice::NotOwner.text(locale).to_string(),
        SyncError::SelfEditOnly => Notice::SelfEditOnly.text(locale).to_string(),
        SyncError::NotSignedIn => Notice::NotSignedIn.text(locale).to_string(),
        SyncError::LoginRejected { message } => {
            format!("{}: {message}", Notice::LoginFailed.text(locale))
        }
        SyncError::Api(api) => format!("{}: {}", fallback.text(locale), api.notice_message()),
        other => format!("{}: {other}", fallback.text(locale)),
    }
}
