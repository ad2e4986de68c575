#![deny(clippy::all, clippy::pedantic)]

use uuid::Uuid;

use bantin::domain::diff::diff_records;
use bantin::i18n::Notice;
use bantin::resources::UpdateOutcome;
use bantin_api_types::{ListQuery, User, UserCreateRequest};

use crate::args::{PageArgs, UsersCmd};
use crate::context::{CliError, Ctx};
use crate::handlers::{failure_line, notice};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: UsersCmd) -> Result<(), CliError> {
    match cmd {
        UsersCmd::List { page } => list(ctx, &page.query()).await,
        UsersCmd::Create {
            email,
            password,
            status,
        } => create(ctx, email, password, status).await,
        UsersCmd::Update {
            id,
            email,
            password,
            status,
            page,
        } => update(ctx, id, email, password, status, &page).await,
        UsersCmd::Login { email, password } => login(ctx, &email, &password).await,
    }
}

async fn list(ctx: &Ctx, query: &ListQuery) -> Result<(), CliError> {
    let page = ctx.sync.users().list(query).await?;
    // Password hashes never reach the terminal.
    let redacted: Vec<serde_json::Value> = page.items.iter().map(redact_password).collect();
    print_json(&serde_json::json!({
        "data": redacted,
        "total": page.total,
    }))
}

async fn create(ctx: &Ctx, email: String, password: String, status: bool) -> Result<(), CliError> {
    let result = ctx
        .sync
        .users()
        .create(UserCreateRequest {
            email,
            password,
            status,
        })
        .await;

    match result {
        Ok(created) => {
            notice(ctx, Notice::CreateSuccess);
            if let Some(user) = created {
                print_json(&redact_password(&user))?;
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::CreateFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn update(
    ctx: &Ctx,
    id: Option<Uuid>,
    email: Option<String>,
    password: Option<String>,
    status: Option<bool>,
    page: &PageArgs,
) -> Result<(), CliError> {
    let current = locate(ctx, id, page).await?;

    let mut submitted = current.clone();
    if let Some(value) = email {
        submitted.email = value;
    }
    if let Some(value) = status {
        submitted.status = value;
    }

    let mut changes =
        diff_records(&current, &submitted).map_err(bantin::resources::SyncError::from)?;
    // The stored hash never equals a submitted password; include it only
    // when one was actually typed.
    if let Some(password) = password {
        let trimmed = password.trim();
        if !trimmed.is_empty() {
            changes.pin("password", trimmed);
        }
    }

    match ctx.sync.users().update(&current, changes).await {
        Ok(UpdateOutcome::Unchanged) => {
            notice(ctx, Notice::NoChanges);
            Ok(())
        }
        Ok(UpdateOutcome::Updated(user)) => {
            notice(ctx, Notice::UpdateSuccess);
            print_json(&redact_password(&user))
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::UpdateFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn login(ctx: &Ctx, email: &str, password: &str) -> Result<(), CliError> {
    match ctx.sync.users().login(email, password).await {
        Ok(user) => {
            notice(ctx, Notice::LoginSuccess);
            print_json(&redact_password(&user))
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::LoginFailed, ctx.locale));
            Err(err.into())
        }
    }
}

/// The update target: an explicit id is searched on the selected page,
/// otherwise the signed-in account is edited.
async fn locate(ctx: &Ctx, id: Option<Uuid>, page: &PageArgs) -> Result<User, CliError> {
    match id {
        None => ctx
            .sync
            .session()
            .current_user()
            .ok_or_else(|| CliError::InvalidInput("not signed in; run `users login` first".into())),
        Some(id) => {
            if let Some(me) = ctx.sync.session().current_user() {
                if me.id == id {
                    return Ok(me);
                }
            }
            let loaded = ctx.sync.users().list(&page.query()).await?;
            loaded.items.into_iter().find(|u| u.id == id).ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "user {id} is not on the selected page; adjust --page/--keyword"
                ))
            })
        }
    }
}

fn redact_password(user: &User) -> serde_json::Value {
    let mut value = serde_json::to_value(user).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.remove("password");
    }
    value
}
