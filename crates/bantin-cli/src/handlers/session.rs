#![deny(clippy::all, clippy::pedantic)]

use bantin::domain::types::Locale;
use bantin::i18n::Notice;

use crate::args::SessionCmd;
use crate::context::{CliError, Ctx};
use crate::handlers::notice;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: SessionCmd) -> Result<(), CliError> {
    match cmd {
        SessionCmd::Show => show(ctx),
        SessionCmd::Logout => logout(ctx),
        SessionCmd::Locale { locale } => set_locale(ctx, locale.into()),
    }
}

fn show(ctx: &Ctx) -> Result<(), CliError> {
    let snapshot = ctx.sync.session().snapshot();
    let mut value = serde_json::to_value(&snapshot)
        .map_err(|e| CliError::InvalidInput(format!("failed to render session: {e}")))?;
    // The stored hash is opaque and never displayed.
    if let Some(user) = value
        .get_mut("current_user")
        .and_then(serde_json::Value::as_object_mut)
    {
        user.remove("password");
    }
    print_json(&value)
}

fn logout(ctx: &Ctx) -> Result<(), CliError> {
    ctx.sync.users().logout()?;
    notice(ctx, Notice::UpdateSuccess);
    Ok(())
}

fn set_locale(ctx: &Ctx, locale: Locale) -> Result<(), CliError> {
    ctx.sync.session().set_locale(locale)?;
    notice(ctx, Notice::UpdateSuccess);
    Ok(())
}
