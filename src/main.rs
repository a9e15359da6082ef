//! datasheets CLI - Inspect and edit Google Sheets workbooks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use datasheets::config::{CREDENTIALS_PATH_ENV, SERVICE_PATH_ENV};
use datasheets::convenience::{create_tab_in_existing_workbook, create_tab_in_new_workbook};
use datasheets::{
    extract_id, index_to_label, label_to_index, AuthMode, CellValue, Client, Config, IndexBase,
    Role, WorkbookRef,
};

/// CLI tool for working with Google Sheets workbooks.
#[derive(Parser)]
#[command(name = "datasheets")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Identity to authenticate as.
    #[arg(long, value_enum, default_value_t = Mode::Service)]
    mode: Mode,

    /// Service account JSON key file.
    #[arg(long, env = SERVICE_PATH_ENV)]
    service_key: Option<PathBuf>,

    /// Stored user credentials JSON file.
    #[arg(long, env = CREDENTIALS_PATH_ENV)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Service,
    User,
}

#[derive(Subcommand)]
enum Commands {
    /// List workbooks, optionally only those in a folder.
    Workbooks {
        /// Folder name.
        #[arg(long)]
        folder: Option<String>,
    },

    /// List folders.
    Folders {
        /// Only folders owned by this account.
        #[arg(long)]
        mine: bool,
    },

    /// List the tabs of a workbook.
    Tabs {
        /// Workbook name, URL or ID.
        workbook: String,

        /// Treat WORKBOOK as a file ID rather than a name.
        #[arg(long)]
        id: bool,
    },

    /// Print the contents of a tab as tab-separated values.
    Read {
        /// Workbook name, URL or ID.
        workbook: String,

        /// Tab name.
        tab: String,

        /// Treat WORKBOOK as a file ID rather than a name.
        #[arg(long)]
        id: bool,

        /// The first row is data, not column names.
        #[arg(long)]
        no_headers: bool,
    },

    /// Create a tab in an existing or new workbook.
    CreateTab {
        /// Workbook name, URL or ID.
        workbook: String,

        /// Tab name.
        tab: String,

        /// Treat WORKBOOK as a file ID rather than a name.
        #[arg(long, conflicts_with = "new")]
        id: bool,

        /// Create WORKBOOK as a new workbook.
        #[arg(long)]
        new: bool,

        /// Share the new workbook, as EMAIL:ROLE (role is owner, writer or
        /// reader).
        #[arg(long = "share", requires = "new", value_parser = parse_share)]
        shares: Vec<(String, Role)>,

        /// Send notification emails to shared users.
        #[arg(long)]
        notify: bool,

        /// Message included in notification emails.
        #[arg(long)]
        message: Option<String>,
    },

    /// Delete a tab from a workbook.
    DeleteTab {
        /// Workbook name, URL or ID.
        workbook: String,

        /// Tab name.
        tab: String,

        /// Treat WORKBOOK as a file ID rather than a name.
        #[arg(long)]
        id: bool,
    },

    /// List who a workbook is shared with.
    Permissions {
        /// Workbook name, URL or ID.
        workbook: String,

        /// Treat WORKBOOK as a file ID rather than a name.
        #[arg(long)]
        id: bool,
    },

    /// Convert a cell label such as B7 to row and column indexes.
    Index {
        label: String,

        /// Print spreadsheet-style (1-based) indexes.
        #[arg(long)]
        one_based: bool,
    },

    /// Convert row and column indexes to a cell label.
    Label {
        row: i64,
        column: i64,

        /// Indexes are spreadsheet-style (1-based).
        #[arg(long)]
        one_based: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        mode,
        service_key,
        credentials,
        command,
    } = Cli::parse();
    let client = || connect(mode, service_key, credentials);

    match command {
        Commands::Index { label, one_based } => {
            let (row, column) = label_to_index(&label, index_base(one_based))
                .with_context(|| format!("Invalid cell label: {}", label))?;
            println!("{}\t{}", row, column);
        }

        Commands::Label {
            row,
            column,
            one_based,
        } => {
            let label = index_to_label(row, column, index_base(one_based))
                .with_context(|| format!("Invalid cell index: ({}, {})", row, column))?;
            println!("{}", label);
        }

        Commands::Workbooks { folder } => {
            let workbooks = client()?
                .fetch_workbooks_info(folder.as_deref())
                .await
                .context("Failed to list workbooks")?;
            print_items(&workbooks);
        }

        Commands::Folders { mine } => {
            let folders = client()?
                .fetch_folders(mine)
                .await
                .context("Failed to list folders")?;
            print_items(&folders);
        }

        Commands::Tabs { workbook, id } => {
            let workbook = client()?.fetch_workbook(&workbook_ref(&workbook, id)?).await?;
            for name in workbook.fetch_tab_names().await? {
                println!("{}", name);
            }
        }

        Commands::Read {
            workbook,
            tab,
            id,
            no_headers,
        } => {
            let workbook = client()?.fetch_workbook(&workbook_ref(&workbook, id)?).await?;
            let tab = workbook.fetch_tab(&tab).await?;
            let data = tab
                .fetch_data(!no_headers)
                .await
                .with_context(|| format!("Failed to read tab: {}", tab.tabname()))?;

            if !no_headers {
                println!("{}", data.headers.join("\t"));
            }
            for row in &data.rows {
                let cells: Vec<String> = row.iter().map(CellValue::to_label).collect();
                println!("{}", cells.join("\t"));
            }
        }

        Commands::CreateTab {
            workbook,
            tab,
            id,
            new,
            shares,
            notify,
            message,
        } => {
            let client = client()?;
            let tab = if new {
                let shares: Vec<(&str, Role)> =
                    shares.iter().map(|(e, r)| (e.as_str(), *r)).collect();
                create_tab_in_new_workbook(
                    &client,
                    &workbook,
                    &tab,
                    &shares,
                    notify,
                    message.as_deref(),
                )
                .await?
            } else {
                create_tab_in_existing_workbook(&client, &workbook_ref(&workbook, id)?, &tab)
                    .await?
            };
            println!("Created {}", tab);
            println!("{}", tab.url());
        }

        Commands::DeleteTab { workbook, tab, id } => {
            let workbook = client()?.fetch_workbook(&workbook_ref(&workbook, id)?).await?;
            workbook.delete_tab(&tab).await?;
            println!("Deleted tab {} from {}", tab, workbook.filename());
        }

        Commands::Permissions { workbook, id } => {
            let workbook = client()?.fetch_workbook(&workbook_ref(&workbook, id)?).await?;
            for permission in workbook.fetch_permissions().await? {
                println!("{}", permission);
            }
        }
    }

    Ok(())
}

/// Load credentials for the chosen identity. Flags override the environment.
fn connect(
    mode: Mode,
    service_key: Option<PathBuf>,
    credentials: Option<PathBuf>,
) -> Result<Client> {
    let mut config = Config::from_env(match mode {
        Mode::Service => AuthMode::Service,
        Mode::User => AuthMode::User,
    });
    if let Some(path) = service_key {
        config.service_key_path = path;
    }
    if let Some(path) = credentials {
        config.credentials_path = path;
    }

    Client::from_config(&config).with_context(|| {
        format!(
            "Failed to load credentials from {:?}",
            config.credentials_file()
        )
    })
}

fn index_base(one_based: bool) -> IndexBase {
    if one_based {
        IndexBase::One
    } else {
        IndexBase::Zero
    }
}

/// URLs always identify a workbook by ID; anything else is a name unless
/// `by_id` is set.
fn workbook_ref(workbook: &str, by_id: bool) -> Result<WorkbookRef> {
    if workbook.starts_with("http://") || workbook.starts_with("https://") || by_id {
        let file_id = extract_id(workbook)
            .with_context(|| format!("Invalid workbook URL or ID: {}", workbook))?;
        Ok(WorkbookRef::Id(file_id))
    } else {
        Ok(WorkbookRef::Name(workbook.to_string()))
    }
}

fn parse_share(value: &str) -> std::result::Result<(String, Role), String> {
    let (email, role) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected EMAIL:ROLE, got '{}'", value))?;
    Ok((email.to_string(), role.parse()?))
}

fn print_items(items: &[datasheets::FileMetadata]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    println!("{:<44} {:<23} {}", "ID", "MODIFIED", "NAME");
    println!("{}", "-".repeat(100));
    for item in items {
        println!("{}", item);
    }
}
