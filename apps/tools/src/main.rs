use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::BookClient;
use shared::{
    domain::{Book, BookId},
    protocol::{BookUpdate, NewBook},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Manage the books served at /books")]
struct Cli {
    #[arg(long, env = "BOOKSHELF_URL", default_value = "http://127.0.0.1:3000")]
    server_url: String,
    /// Print JSON instead of one line per book.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
        /// Id to store the book under; the server assigns one when omitted.
        #[arg(long)]
        id: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
    },
    Remove {
        id: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Show { .. } => "show",
            Command::Add { .. } => "add",
            Command::Update { .. } => "update",
            Command::Remove { .. } => "remove",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let client = BookClient::new(&cli.server_url)?;
    debug!(command = cli.command.name(), server = %client.base_url(), "running command");

    match cli.command {
        Command::List => {
            let books = client.list_books().await?;
            debug!(count = books.len(), "listed books");
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("no books");
            } else {
                for book in &books {
                    println!("{}", describe(book));
                }
            }
        }
        Command::Show { id } => {
            let book = client.get_book(&BookId(id)).await?;
            print_book(&book, cli.json)?;
        }
        Command::Add { title, author, id } => {
            let book = client
                .create_book(&NewBook {
                    id: id.map(BookId),
                    title,
                    author,
                })
                .await?;
            info!(id = %book.id, "book added");
            print_book(&book, cli.json)?;
        }
        Command::Update { id, title, author } => {
            let book = client
                .update_book(&BookId(id), &BookUpdate { title, author })
                .await?;
            info!(id = %book.id, "book updated");
            print_book(&book, cli.json)?;
        }
        Command::Remove { id } => {
            client.delete_book(&BookId(id.clone())).await?;
            info!(%id, "book removed");
            println!("removed {id}");
        }
    }

    Ok(())
}

fn describe(book: &Book) -> String {
    if book.author.is_empty() {
        format!("{}\t{}", book.id, book.title)
    } else {
        format!("{}\t{} ({})", book.id, book.title, book.author)
    }
}

fn print_book(book: &Book, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(book)?);
    } else {
        println!("{}", describe(book));
    }
    Ok(())
}
