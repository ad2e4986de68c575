#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use bantin::domain::content::render_html;
use bantin::domain::diff::diff_records;
use bantin::domain::entities::post_content;
use bantin::domain::slug::generate_unique_slug;
use bantin::domain::types::Locale;
use bantin::i18n::Notice;
use bantin::resources::UpdateOutcome;
use bantin_api_types::{ListQuery, Post, PostCreateRequest};

use crate::args::{PageArgs, PostsCmd};
use crate::context::{CliError, Ctx};
use crate::handlers::{failure_line, notice};
use crate::io::{read_opt_value, read_value};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List { page } => list(ctx, &page.query()).await,
        PostsCmd::Get { id } => get(ctx, id).await,
        PostsCmd::Show { id, lang } => show(ctx, id, lang.map(Locale::from)).await,
        PostsCmd::Create {
            title_vi,
            title_en,
            description_vi,
            description_en,
            content,
            content_file,
            content_en,
            content_en_file,
            thumbnail,
            category_id,
            slug,
        } => {
            let input = CreateInput {
                title_vi,
                title_en,
                description_vi,
                description_en,
                content,
                content_file,
                content_en,
                content_en_file,
                thumbnail,
                category_id,
                slug,
            };
            create(ctx, input).await
        }
        PostsCmd::Update {
            id,
            title_vi,
            title_en,
            description_vi,
            description_en,
            content,
            content_file,
            thumbnail,
            category_id,
            page,
        } => {
            let input = UpdateInput {
                id,
                title_vi,
                title_en,
                description_vi,
                description_en,
                content,
                content_file,
                thumbnail,
                category_id,
            };
            update(ctx, input, &page).await
        }
        PostsCmd::Delete { id, page } => delete(ctx, id, &page).await,
    }
}

struct CreateInput {
    title_vi: String,
    title_en: Option<String>,
    description_vi: Option<String>,
    description_en: Option<String>,
    content: Option<String>,
    content_file: Option<PathBuf>,
    content_en: Option<String>,
    content_en_file: Option<PathBuf>,
    thumbnail: Option<String>,
    category_id: i64,
    slug: Option<String>,
}

struct UpdateInput {
    id: i64,
    title_vi: Option<String>,
    title_en: Option<String>,
    description_vi: Option<String>,
    description_en: Option<String>,
    content: Option<String>,
    content_file: Option<PathBuf>,
    thumbnail: Option<String>,
    category_id: Option<i64>,
}

async fn list(ctx: &Ctx, query: &ListQuery) -> Result<(), CliError> {
    let page = ctx.sync.posts().list(query).await?;
    print_json(&serde_json::json!({
        "data": page.items,
        "total": page.total,
    }))
}

async fn get(ctx: &Ctx, id: i64) -> Result<(), CliError> {
    let post = ctx.sync.posts().get(id).await?;
    print_json(&post)
}

async fn show(ctx: &Ctx, id: i64, lang: Option<Locale>) -> Result<(), CliError> {
    let post = ctx.sync.posts().get(id).await?;
    let locale = lang.unwrap_or(ctx.locale);
    println!("{}", render_html(post_content(&post, locale)));
    Ok(())
}

async fn create(ctx: &Ctx, input: CreateInput) -> Result<(), CliError> {
    let content_vi = read_value(input.content, input.content_file)?;
    let content_en = read_opt_value(input.content_en, input.content_en_file)?;
    let slug = match input.slug {
        Some(slug) => slug,
        None => derive_slug_against_page(ctx, &input.title_vi).await?,
    };

    let result = ctx
        .sync
        .posts()
        .create(PostCreateRequest {
            slug: Some(slug),
            title_vi: input.title_vi,
            title_en: input.title_en,
            description_vi: input.description_vi,
            description_en: input.description_en,
            content_vi,
            content_en,
            thumbnail: input.thumbnail,
            category_id: input.category_id,
        })
        .await;

    match result {
        Ok(created) => {
            notice(ctx, Notice::CreateSuccess);
            if let Some(post) = created {
                print_json(&post)?;
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::CreateFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn update(ctx: &Ctx, input: UpdateInput, page: &PageArgs) -> Result<(), CliError> {
    let current = locate(ctx, input.id, page).await?;

    let mut submitted = current.clone();
    if let Some(value) = input.title_vi {
        submitted.title_vi = value;
    }
    if let Some(value) = input.title_en {
        submitted.title_en = Some(value);
    }
    if let Some(value) = input.description_vi {
        submitted.description_vi = Some(value);
    }
    if let Some(value) = input.description_en {
        submitted.description_en = Some(value);
    }
    if input.content.is_some() || input.content_file.is_some() {
        submitted.content_vi = read_value(input.content, input.content_file)?;
    }
    if let Some(value) = input.thumbnail {
        submitted.thumbnail = Some(value);
    }
    if let Some(value) = input.category_id {
        submitted.category_id = value;
    }

    let changes = diff_records(&current, &submitted).map_err(bantin::resources::SyncError::from)?;
    match ctx.sync.posts().update(&current, changes).await {
        Ok(UpdateOutcome::Unchanged) => {
            notice(ctx, Notice::NoChanges);
            Ok(())
        }
        Ok(UpdateOutcome::Updated(post)) => {
            notice(ctx, Notice::UpdateSuccess);
            print_json(&post)
        }
        Err(err) => {
            eprintln!("{}", failure_line(&err, Notice::UpdateFailed, ctx.locale));
            Err(err.into())
        }
    }
}

async fn delete(ctx: &Ctx, id: i64, page: &PageArgs) -> Result<(), CliError> {
    let current = locate(ctx, id, page).await?;
    match ctx.sync.posts().delete(&current).await {
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

async fn locate(ctx: &Ctx, id: i64, page: &PageArgs) -> Result<Post, CliError> {
    let loaded = ctx.sync.posts().list(&page.query()).await?;
    loaded
        .items
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "post {id} is not on the selected page; adjust --page/--keyword"
            ))
        })
}

async fn derive_slug_against_page(ctx: &Ctx, title_vi: &str) -> Result<String, CliError> {
    let loaded = ctx.sync.posts().list_or_empty(&ListQuery::default()).await;
    generate_unique_slug(title_vi, |candidate| {
        !loaded.items.iter().any(|p| p.slug == candidate)
    })
    .map_err(|err| CliError::InvalidInput(err.to_string()))
}
