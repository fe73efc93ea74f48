//! Subcommand implementations.

use std::cell::RefCell;
use std::time::Duration;

use dashboard_lib::pagination::total_pages;
use dashboard_lib::pagination::Paginator;
use dashboard_lib::request::RequestOptions;
use dashboard_lib::session::ChannelNavigator;
use dashboard_lib::session::FileStore;
use dashboard_lib::session::SessionRecord;
use dashboard_lib::session::LOGIN_ROUTE;
use dashboard_lib::table::render_text;
use dashboard_lib::table::rows_from_payload;
use dashboard_lib::table::total_from_payload;
use dashboard_lib::table::RenderContext;
use dashboard_lib::table::TableView;
use dashboard_lib::DashboardClient;
use dashboard_lib::Session;

use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::ListArgs;
use crate::cli::LoginArgs;
use crate::config::Config;
use crate::error::CliError;
use crate::error::Result;
use crate::paths;

pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    let session = open_session().await?;

    match cli.command.unwrap_or_else(|| Command::List(ListArgs::default())) {
        Command::List(args) => list(&config, args, session).await,
        Command::Login(args) => login(args, &session).await,
        Command::Logout => logout(&session).await,
    }
}

async fn open_session() -> Result<Session> {
    let path = paths::session_file().ok_or(CliError::NoDataDir)?;
    log::debug!("Session file: {}", path.display());
    Ok(Session::load(FileStore::new(path)).await?)
}

async fn list(config: &Config, args: ListArgs, session: Session) -> Result<()> {
    let endpoint = args.endpoint.unwrap_or_else(|| config.endpoint.clone());
    let page = args.page.unwrap_or(1);
    let page_size = args.page_size.unwrap_or(config.page_size).max(1);

    let mut options = RequestOptions::new()
        .query("page", page)
        .query("limit", page_size);
    if let Some(key) = args.sort.as_deref() {
        options = options.query("sort", sort_key(config, key)?);
    }

    let (navigator, mut routes) = ChannelNavigator::new();
    let mut builder = DashboardClient::builder()
        .base_url(config.api_url.clone())
        .session(session)
        .navigator(navigator);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build()?;

    let resource = client
        .resource(endpoint.clone())
        .options(options)
        .build();

    let payload = match resource.revalidate().await {
        Ok(payload) => payload,
        Err(e) => {
            if routes.try_recv().is_ok_and(|route| route == LOGIN_ROUTE) {
                log::warn!("{}", e);
                return Err(CliError::SessionExpired);
            }
            return Err(e.into());
        }
    };

    let rows = rows_from_payload(&payload, &config.items_key);
    let total = total_from_payload(&payload, &config.total_key, &config.items_key);
    let pages = total_pages(total, page_size);
    log::info!(
        "{}: {} rows on page {} of {} ({} total)",
        endpoint,
        rows.len(),
        page,
        pages,
        total
    );

    let columns = config.column_set(rows.first())?;
    let view = TableView::new(&columns)
        .context(RenderContext::new(page, page_size))
        .empty_message(format!("No records at {}", endpoint));
    println!("{}", render_text(&view.render(&rows)));
    println!();

    let mut next_page = None;
    {
        let mut paginator = Paginator::new(page, pages, |p| next_page = Some(p));
        println!(
            "{}  page {} of {} ({} records)",
            paginator.render_text(),
            page.min(pages),
            pages,
            total
        );
        paginator.next();
    }
    if let Some(next) = next_page {
        println!("Next: dashboard list --page {}", next);
    }

    Ok(())
}

/// Resolves `--sort` against the configured columns.
fn sort_key(config: &Config, key: &str) -> Result<String> {
    let columns = config.column_set(None)?;
    let chosen = RefCell::new(None);
    let accepted = TableView::new(&columns)
        .on_sort(|k| *chosen.borrow_mut() = Some(k.to_string()))
        .click_header(key);

    match (accepted, chosen.into_inner()) {
        (true, Some(key)) => Ok(key),
        _ => Err(CliError::NotSortable(key.to_string())),
    }
}

async fn login(args: LoginArgs, session: &Session) -> Result<()> {
    let record = SessionRecord {
        id: args.id,
        username: args.username,
        token: args.token,
        refresh: args.refresh,
    };
    session.set(record).await?;
    println!("Signed in.");
    Ok(())
}

async fn logout(session: &Session) -> Result<()> {
    if !session.is_authenticated().await {
        println!("Not signed in.");
        return Ok(());
    }
    session.clear().await?;
    println!("Signed out.");
    Ok(())
}
