use clap::{Parser, Subcommand};
use notekeeper_rest_api::client;
use notekeeper_rest_api::store::NoteStore;
use notekeeper_rest_api::tables::{
    CreateCommentRequest, CreateNoteRequest, CreateTagRequest, UpdateNoteRequest,
};
use notekeeper_rest_api::{api, BASE_URL};
use serde::Serialize;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// The address to bind to
        #[arg(short, long, env = "NOTEKEEPER_ADDR", default_value = "127.0.0.1:3333")]
        addr: SocketAddr,
        /// Start without the seeded tags and notes
        #[arg(long)]
        empty: bool,
    },
    /// Client commands
    Client {
        /// The base URL of the API
        #[arg(long, env = "NOTEKEEPER_URL", default_value = BASE_URL)]
        url: String,
        #[command(subcommand)]
        command: ClientCommands,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// Notes related commands
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Tag related commands
    Tags {
        #[command(subcommand)]
        command: TagsCommands,
    },
    /// Comment related commands
    Comments {
        /// The note the comments belong to
        #[arg(long)]
        note_id: i32,
        #[command(subcommand)]
        command: CommentsCommands,
    },
}

#[derive(Subcommand)]
enum NotesCommands {
    /// List all notes, or a single note with --id
    Get {
        #[arg(long)]
        id: Option<i32>,
    },
    /// Create a new note
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Comma separated tag ids
        #[arg(long, value_delimiter = ',')]
        tag_ids: Vec<i32>,
    },
    /// Update the supplied fields of a note
    Update {
        #[arg(long)]
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Comma separated tag ids, replaces all tags
        #[arg(long, value_delimiter = ',')]
        tag_ids: Option<Vec<i32>>,
    },
    /// Delete a note
    Delete {
        #[arg(long)]
        id: i32,
    },
    /// Case-insensitive search in titles and contents
    Search { keyword: String },
    /// Notes carrying all of the given tags
    Filter {
        #[arg(value_delimiter = ',', required = true)]
        tags: Vec<String>,
    },
    /// List notes sorted by title or createdAt
    Sort {
        #[arg(long, default_value = "title")]
        by: String,
        #[arg(long)]
        order: Option<String>,
    },
}

#[derive(Subcommand)]
enum TagsCommands {
    /// List all tags
    Get,
    /// Create a tag
    Create { name: String },
}

#[derive(Subcommand)]
enum CommentsCommands {
    /// List the comments of the note
    Get,
    /// Comment on the note
    Create {
        #[arg(long)]
        text: String,
        #[arg(long)]
        author: String,
    },
    /// Delete a comment
    Delete { comment_id: i32 },
    /// Like a comment
    Like { comment_id: i32 },
    /// Take back a like
    Unlike { comment_id: i32 },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_client(url: &str, command: ClientCommands) -> anyhow::Result<()> {
    match command {
        ClientCommands::Notes { command } => match command {
            NotesCommands::Get { id: Some(id) } => print_json(&client::fetch_note(url, id).await?),
            NotesCommands::Get { id: None } => print_json(&client::fetch_notes(url).await?),
            NotesCommands::Create {
                title,
                content,
                tag_ids,
            } => {
                let note = CreateNoteRequest {
                    title,
                    content,
                    tag_ids,
                };
                print_json(&client::create_note(url, &note).await?)
            }
            NotesCommands::Update {
                id,
                title,
                content,
                tag_ids,
            } => {
                let patch = UpdateNoteRequest {
                    title,
                    content,
                    tag_ids,
                };
                print_json(&client::update_note(url, id, &patch).await?)
            }
            NotesCommands::Delete { id } => print_json(&client::delete_note(url, id).await?),
            NotesCommands::Search { keyword } => {
                print_json(&client::search_notes(url, &keyword).await?)
            }
            NotesCommands::Filter { tags } => {
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                print_json(&client::filter_notes(url, &tags).await?)
            }
            NotesCommands::Sort { by, order } => {
                print_json(&client::sort_notes(url, &by, order.as_deref()).await?)
            }
        },
        ClientCommands::Tags { command } => match command {
            TagsCommands::Get => print_json(&client::fetch_tags(url).await?),
            TagsCommands::Create { name } => {
                print_json(&client::create_tag(url, &CreateTagRequest { name }).await?)
            }
        },
        ClientCommands::Comments { note_id, command } => match command {
            CommentsCommands::Get => print_json(&client::fetch_comments(url, note_id).await?),
            CommentsCommands::Create { text, author } => {
                let comment = CreateCommentRequest { text, author };
                print_json(&client::create_comment(url, note_id, &comment).await?)
            }
            CommentsCommands::Delete { comment_id } => {
                print_json(&client::delete_comment(url, note_id, comment_id).await?)
            }
            CommentsCommands::Like { comment_id } => {
                print_json(&client::like_comment(url, note_id, comment_id).await?)
            }
            CommentsCommands::Unlike { comment_id } => {
                print_json(&client::unlike_comment(url, note_id, comment_id).await?)
            }
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notekeeper_rest_api=info,cli=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, empty } => {
            let store = if empty {
                NoteStore::default()
            } else {
                NoteStore::seeded()
            };

            // Create router owning the store
            let app = api::create_router(store);

            // Start server
            info!("Starting server on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Client { url, command } => run_client(&url, command).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_print_json_reports_serialization_failure() {
        // JSON object keys must be strings.
        let unprintable: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);
        assert!(print_json(&unprintable).is_err());
        assert!(print_json(&vec![1, 2, 3]).is_ok());
    }

    #[tokio::test]
    async fn test_run_client_propagates_errors() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::create_router(NoteStore::seeded()))
                .await
                .unwrap();
        });
        let url = format!("http://{}", addr);

        let ok = run_client(
            &url,
            ClientCommands::Tags {
                command: TagsCommands::Get,
            },
        )
        .await;
        assert!(ok.is_ok());

        let missing = run_client(
            &url,
            ClientCommands::Notes {
                command: NotesCommands::Get { id: Some(99) },
            },
        )
        .await;
        let err = missing.unwrap_err();
        assert!(err.to_string().contains("Note not found"), "{err}");
    }
}
