use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hooklab_server::db::{
    repositories::{ContentRepository, UserRepository, VoteRepository},
    Database,
};
use hooklab_server::{import, metrics};
use hooklab_types::{voter_session, BulkImportResult, ContentType, VoteType};
use uuid::Uuid;

/// Hooklab administration utility
///
/// Works directly against the database file, so it can be used while the
/// server is stopped or to prepare a database before first start.
#[derive(Parser, Debug)]
#[command(name = "hooklab-admin")]
#[command(about = "Manage users and content in a Hooklab database", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "./hooklab.db")]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user or change their admin bit
    AddUser {
        email: String,
        #[arg(long)]
        admin: bool,
    },
    /// Bulk import snippets from a CSV file
    Import {
        file: String,
        /// hook, bridge or followup
        #[arg(short = 't', long = "type", default_value = "hook", value_parser = parse_content_type)]
        content_type: ContentType,
        /// Admin email recorded as the creator
        #[arg(long = "as")]
        as_email: Option<String>,
        /// Classify rows without inserting anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Print dashboard figures
    Stats {
        #[arg(short = 't', long = "type", value_parser = parse_content_type)]
        content_type: Option<ContentType>,
    },
    /// Rebuild vote counters from the event log (one item, or all of them)
    Recount {
        content_id: Option<Uuid>,
    },
    /// Cast a vote from this process's voter session
    Vote {
        content_id: Uuid,
        /// positive, negative or star (green/red also accepted)
        #[arg(value_parser = parse_vote_type)]
        vote_type: VoteType,
    },
}

fn parse_content_type(raw: &str) -> Result<ContentType, String> {
    ContentType::parse(raw).ok_or_else(|| format!("unknown content type '{}'", raw))
}

fn parse_vote_type(raw: &str) -> Result<VoteType, String> {
    VoteType::parse(raw).ok_or_else(|| format!("unknown vote type '{}'", raw))
}

/// Open the database, creating the schema if it is missing
fn connect_database(path: &str) -> Result<Database> {
    println!("Connecting to database: {}", path);
    let db = Database::new(path).context("Failed to open database connection")?;
    db.initialize().context("Failed to prepare database schema")?;
    Ok(db)
}

fn add_user(db: &Database, email: &str, admin: bool) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        anyhow::bail!("'{}' is not an email address", email);
    }
    let user = UserRepository::new(db.pool.clone()).upsert(email, admin)?;
    println!(
        "{} {} ({})",
        if user.is_admin { "Admin" } else { "User" },
        user.email,
        user.id
    );
    Ok(())
}

/// Classify (and unless `dry_run`, insert) the rows of a CSV document
fn import_csv(
    db: &Database,
    data: &str,
    content_type: ContentType,
    as_email: Option<&str>,
    dry_run: bool,
) -> Result<BulkImportResult> {
    let created_by = match as_email {
        Some(email) => {
            let user = UserRepository::new(db.pool.clone())
                .get_by_email(email)?
                .with_context(|| format!("No user with email {}", email))?;
            if !user.is_admin {
                anyhow::bail!("{} is not an admin", user.email);
            }
            Some(user.id)
        }
        None => None,
    };

    let rows = import::rows_from_csv(data)?;
    let repo = ContentRepository::new(db.pool.clone());

    if !dry_run {
        return import::run_import(&repo, content_type, &rows, created_by);
    }

    let existing = repo.texts_for_type(content_type)?;
    let (_, result) = import::summarize(import::classify_rows(&rows, &existing));
    Ok(result)
}

fn display_import(result: &BulkImportResult, content_type: ContentType, dry_run: bool) {
    println!();
    println!("Import Summary ({})", content_type.label());
    println!("==============");
    println!();
    if dry_run {
        println!("Would create: {}", result.created);
    } else {
        println!("Created: {}", result.created);
    }
    println!("Skipped duplicates: {}", result.skipped);

    if !result.errors.is_empty() {
        println!();
        println!("Invalid rows: {}", result.errors.len());
        for error in &result.errors {
            println!("  row {}: {}", error.row, error.reason);
        }
    }

    if dry_run {
        println!();
        println!("This was a dry run - no changes were made to the database.");
    }
}

fn display_stats(db: &Database, filter: Option<ContentType>) -> Result<()> {
    let items = ContentRepository::new(db.pool.clone()).list(filter)?;
    let summary = metrics::dashboard_metrics(&items, filter);

    println!();
    println!("Hooklab Stats ({})", summary.top_category);
    println!("=============");
    println!();
    println!("Items: {}", summary.total_items);
    println!("Votes: {}", summary.total_votes);
    println!("Winning: {}", summary.winning_percentage);
    println!("Average votes per item: {}", summary.avg_votes_per_item);

    let flagged = items.iter().filter(|item| item.is_flagged).count();
    println!("Flagged: {}", flagged);
    Ok(())
}

/// Recompute aggregates and the flag from stored vote events.
///
/// Returns the number of items recounted.
fn recount(db: &Database, content_id: Option<Uuid>) -> Result<usize> {
    let content_repo = ContentRepository::new(db.pool.clone());
    let ids = match content_id {
        Some(id) => {
            if content_repo.get_by_id(&id)?.is_none() {
                anyhow::bail!("Content item {} not found", id);
            }
            vec![id]
        }
        None => content_repo.list(None)?.into_iter().map(|item| item.id).collect(),
    };

    let vote_repo = VoteRepository::new(db.pool.clone());
    for id in &ids {
        let tally = vote_repo.recount(id)?;
        let events = vote_repo.count_for_item(id)?;
        println!(
            "{}: {} events, {} counted, {:.2}% positive{}",
            id,
            events,
            tally.total_votes,
            tally.positive_percentage,
            if tally.is_flagged { " (flagged)" } else { "" }
        );
    }
    Ok(ids.len())
}

fn cast_vote(db: &Database, content_id: &Uuid, vote_type: VoteType) -> Result<()> {
    let content_repo = ContentRepository::new(db.pool.clone());
    if content_repo.get_by_id(content_id)?.is_none() {
        anyhow::bail!("Content item {} not found", content_id);
    }

    let session_id = voter_session::current();
    VoteRepository::new(db.pool.clone()).record_vote(content_id, vote_type, &session_id)?;

    let item = content_repo
        .get_by_id(content_id)?
        .context("Vote recorded but failed to fetch updated stats")?;
    println!(
        "Recorded {} vote as {}: {} votes, {:.2}% positive{}",
        vote_type.as_str(),
        session_id,
        item.total_votes,
        item.positive_percentage,
        if item.is_flagged { " (flagged)" } else { "" }
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let db = connect_database(&args.database)?;

    match args.command {
        Command::AddUser { email, admin } => add_user(&db, &email, admin),
        Command::Import {
            file,
            content_type,
            as_email,
            dry_run,
        } => {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?;
            let result = import_csv(&db, &data, content_type, as_email.as_deref(), dry_run)?;
            display_import(&result, content_type, dry_run);
            Ok(())
        }
        Command::Stats { content_type } => display_stats(&db, content_type),
        Command::Recount { content_id } => {
            let count = recount(&db, content_id)?;
            println!("Recounted {} items", count);
            Ok(())
        }
        Command::Vote {
            content_id,
            vote_type,
        } => cast_vote(&db, &content_id, vote_type),
    }
}
