//! Command-line surface for `bantin-cli`.
//! Kept in a shared file so tests can reuse the same definitions as the
//! binary itself.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use bantin::domain::types::Locale;
use bantin_api_types::ListQuery;
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "bantin-cli", version, about = "bantin content administration CLI", long_about = None)]
pub struct Cli {
    /// API base URL, e.g. <https://panel.example.com/api>
    #[arg(long, env = "BANTIN_SITE_URL")]
    pub site: Option<String>,

    /// Directory holding durable client state (session, locale preference)
    #[arg(long, env = "BANTIN_STATE_DIR", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Optional path to a configuration file
    #[arg(long = "config-file", env = "BANTIN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Override the stored locale for this invocation
    #[arg(long, value_enum)]
    pub locale: Option<LocaleArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account management and sign-in
    Users(UsersArgs),
    /// Category management (list/create/update/delete/reorder)
    Categories(CategoriesArgs),
    /// Post management (list/read/write)
    Posts(PostsArgs),
    /// Stored session inspection
    Session(SessionArgs),
}

/// Pagination and keyword filter shared by list-shaped commands.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long = "page-size", default_value_t = 10)]
    pub page_size: u32,
    #[arg(long)]
    pub keyword: Option<String>,
}

impl PageArgs {
    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            page_size: self.page_size,
            keyword: self.keyword.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocaleArg {
    Vi,
    En,
}

impl From<LocaleArg> for Locale {
    fn from(value: LocaleArg) -> Self {
        match value {
            LocaleArg::Vi => Locale::Vi,
            LocaleArg::En => Locale::En,
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersCmd,
}

#[derive(Subcommand, Debug)]
pub enum UsersCmd {
    /// List accounts
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Create an account (active by default)
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        status: bool,
    },
    /// Self-edit the signed-in account; a blank password means unchanged
    Update {
        /// Defaults to the signed-in account
        #[arg(long)]
        id: Option<Uuid>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, action = clap::ArgAction::Set)]
        status: Option<bool>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Parser, Debug)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub action: CategoriesCmd,
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCmd {
    /// List categories
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Create a category; the slug is derived from --name-vi when omitted
    Create {
        #[arg(long)]
        name_vi: String,
        #[arg(long)]
        name_en: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        order: Option<i32>,
    },
    /// Update a category loaded from the selected page
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name_vi: Option<String>,
        #[arg(long)]
        name_en: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Delete a category loaded from the selected page
    Delete {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Submit a new order for the whole visible page, e.g. --ids 3,1,2
    Reorder {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Move one category to a new position (0-based) within the visible page
    Move {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        to: usize,
        #[command(flatten)]
        page: PageArgs,
    },
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Parser, Debug)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Subcommand, Debug)]
pub enum PostsCmd {
    /// List posts
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Fetch a post by id
    Get { id: i64 },
    /// Render a post body as HTML using the inline line convention
    Show {
        id: i64,
        /// Content language; falls back to Vietnamese when missing
        #[arg(long, value_enum)]
        lang: Option<LocaleArg>,
    },
    /// Create a post; the slug is derived from --title-vi when omitted
    Create {
        #[arg(long)]
        title_vi: String,
        #[arg(long)]
        title_en: Option<String>,
        #[arg(long)]
        description_vi: Option<String>,
        #[arg(long)]
        description_en: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        #[arg(long)]
        content_en: Option<String>,
        #[arg(long)]
        content_en_file: Option<PathBuf>,
        #[arg(long)]
        thumbnail: Option<String>,
        #[arg(long)]
        category_id: i64,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Update a post loaded from the selected page
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title_vi: Option<String>,
        #[arg(long)]
        title_en: Option<String>,
        #[arg(long)]
        description_vi: Option<String>,
        #[arg(long)]
        description_en: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        content_file: Option<PathBuf>,
        #[arg(long)]
        thumbnail: Option<String>,
        #[arg(long)]
        category_id: Option<i64>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Delete a post loaded from the selected page
    Delete {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
}

// ============================================================================
// Session
// ============================================================================

#[derive(Parser, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionCmd,
}

#[derive(Subcommand, Debug)]
pub enum SessionCmd {
    /// Print the stored session (password redacted)
    Show,
    /// Clear the stored user and tokens
    Logout,
    /// Store the locale preference
    Locale {
        #[arg(value_enum)]
        locale: LocaleArg,
    },
}
