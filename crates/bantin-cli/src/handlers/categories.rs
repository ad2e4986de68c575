#![deny(clippy::all, clippy::pedantic)]

use bantin::domain::diff::diff_records;
use bantin::domain::ordering::reposition;
use bantin::domain::slug::generate_unique_slug;
use bantin::i18n::Notice;
use bantin::resources::{ReorderOutcome, UpdateOutcome};
use bantin_api_types::{Category, CategoryCreateRequest, ListQuery};

use crate::args::{CategoriesCmd, PageArgs};
use crate::context::{CliError, Ctx};
use crate::handlers::{failure_line, notice};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: CategoriesCmd) -> Result<(), CliError> {
    match cmd {
        CategoriesCmd::List { page } => list(ctx, &page.query()).await,
        CategoriesCmd::Create {
            name_vi,
            name_en,
            slug,
            order,
        } => create(ctx, name_vi, name_en, slug, order).await,
        CategoriesCmd::Update {
            id,
            name_vi,
            name_en,
            slug,
            page,
        } => update(ctx, id, name_vi, name_en, slug, &page).await,
        CategoriesCmd::Delete { id, page } => delete(ctx, id, &page).await,
        CategoriesCmd::Reorder { ids, page } => reorder(ctx, &ids, &page).await,
        CategoriesCmd::Move { id, to, page } => move_item(ctx, id, to, &page).await,
    }
}

async fn list(ctx: &Ctx, query: &ListQuery) -> Result<(), CliError> {
    let page = ctx.sync.categories().list(query).await?;
    print_json(&serde_json::json!({
        "data": page.items,
        "total": page.total,
    }))
}

async fn create(
    ctx: &Ctx,
    name_vi: String,
    name_en: Option<String>,
    slug: Option<String>,
    order: Option<i32>,
) -> Result<(), CliError> {
    let slug = match slug {
        Some(slug) => slug,
        None => derive_slug_against_page(ctx, &name_vi).await?,
    };

    let result = ctx
        .sync
        .categories()
        .create(CategoryCreateRequest {
            slug: Some(slug),
            name_vi,
            name_en,
            order,
        })
        .await;

    match result {
        Ok(created) => {
            notice(ctx, Notice::CreateSuccess);
            if let Some(category) = created {
                print_json(&category)?;
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
    id: i64,
    name_vi: Option<String>,
    name_en: Option<String>,
    slug: Option<String>,
    page: &PageArgs,
) -> Result<(), CliError> {
    let current = locate(ctx, id, page).await?;

    let mut submitted = current.clone();
    if let Some(value) = name_vi {
        submitted.name_vi = value;
    }
    if let Some(value) = name_en {
        submitted.name_en = Some(value);
    }
    if let Some(value) = slug {
        submitted.slug = value;
    }

    let changes = diff_records(&current, &submitted).map_err(bantin::resources::SyncError::from)?;
    match ctx.sync.categories().update(&current, changes).await {
        Ok(UpdateOutcome::Unchanged) => {
            notice(ctx, Notice::NoChanges);
            Ok(())
        }
        Ok(UpdateOutcome::Updated(category)) => {
            notice(ctx, Notice::UpdateSuccess);
            print_json(&category)
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::UpdateFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn delete(ctx: &Ctx, id: i64, page: &PageArgs) -> Result<(), CliError> {
    let current = locate(ctx, id, page).await?;
    match ctx.sync.categories().delete(&current).await {
        Ok(()) => {
            notice(ctx, Notice::DeleteSuccess);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::DeleteFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn reorder(ctx: &Ctx, ids: &[i64], page: &PageArgs) -> Result<(), CliError> {
    let loaded = ctx.sync.categories().list(&page.query()).await?;
    let ordered = sequence_from_ids(loaded.items, ids)?;
    submit_order(ctx, &ordered).await
}

async fn move_item(ctx: &Ctx, id: i64, to: usize, page: &PageArgs) -> Result<(), CliError> {
    let loaded = ctx.sync.categories().list(&page.query()).await?;
    let mut ordered = loaded.items;
    if !reposition(&mut ordered, id, to) {
        return Err(CliError::InvalidInput(format!(
            "category {id} is not on the selected page; adjust --page/--keyword"
        )));
    }
    submit_order(ctx, &ordered).await
}

async fn submit_order(ctx: &Ctx, ordered: &[Category]) -> Result<(), CliError> {
    match ctx.sync.categories().reorder(ordered).await {
        Ok(ReorderOutcome::Skipped) => {
            notice(ctx, Notice::NoChanges);
            Ok(())
        }
        Ok(ReorderOutcome::Submitted(plan)) => {
            notice(ctx, Notice::UpdateSuccess);
            print_json(&plan)
        }
        Err(err) => {
            eprintln!(
                "{}",
                failure_line(&err, Notice::OrderUpdateFailed, ctx.locale)
            );
            Err(err.into())
        }
    }
}

/// Rebuild the dragged sequence from an explicit id order. The ids must be
/// exactly the visible page's ids, each exactly once.
fn sequence_from_ids(items: Vec<Category>, ids: &[i64]) -> Result<Vec<Category>, CliError> {
    if ids.len() != items.len() {
        return Err(CliError::InvalidInput(format!(
            "--ids must cover the whole visible page ({} items, got {})",
            items.len(),
            ids.len()
        )));
    }

    let mut remaining = items;
    let mut ordered = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(position) = remaining.iter().position(|c| c.id == id) else {
            return Err(CliError::InvalidInput(format!(
                "category {id} is not on the selected page (or listed twice)"
            )));
        };
        ordered.push(remaining.swap_remove(position));
    }
    Ok(ordered)
}

async fn locate(ctx: &Ctx, id: i64, page: &PageArgs) -> Result<Category, CliError> {
    let loaded = ctx.sync.categories().list(&page.query()).await?;
    loaded
        .items
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "category {id} is not on the selected page; adjust --page/--keyword"
            ))
        })
}

/// Derive a slug from the Vietnamese name, dodging collisions with the
/// currently visible page the way the admin form does.
async fn derive_slug_against_page(ctx: &Ctx, name_vi: &str) -> Result<String, CliError> {
    let loaded = ctx
        .sync
        .categories()
        .list_or_empty(&ListQuery::default())
        .await;
    generate_unique_slug(name_vi, |candidate| {
        !loaded.items.iter().any(|c| c.slug == candidate)
    })
    .map_err(|err| CliError::InvalidInput(err.to_string()))
}
