use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::domain::{ChannelId, ChannelKind, GuildId};
use storage::{Category, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/navigator.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adds a category; `--order` is 1-based, omitted appends.
    CreateCategory {
        name: String,
        #[arg(long)]
        order: Option<usize>,
    },
    RemoveCategory {
        category: String,
    },
    /// Records a platform channel in the directory table.
    CreateChannel {
        channel_id: i64,
        guild_id: i64,
        name: String,
        #[arg(default_value = "text")]
        kind: String,
    },
    Register {
        channel_id: i64,
        category: String,
    },
    Unregister {
        channel_id: i64,
    },
    View,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateCategory { name, order } => {
            let (id, position) = storage
                .update_navigator(|doc| {
                    let id = doc.unique_category_id(&name);
                    let index = order
                        .map(|order| order.saturating_sub(1))
                        .unwrap_or(doc.categories.len());
                    doc.insert_category_at(Category::new(id.clone(), name.trim()), index);
                    let position = doc.category(&id).map(|c| c.order).unwrap_or_default();
                    (id, position)
                })
                .await?;
            println!("created category id={id} order={position}");
        }
        Command::RemoveCategory { category } => {
            let doc = storage.read_all().await?;
            let Some(found) = doc.find_category_by_input(&category) else {
                bail!("no category matches '{category}'");
            };
            storage.remove_category(&found.id).await?;
            println!("removed category id={}", found.id);
        }
        Command::CreateChannel {
            channel_id,
            guild_id,
            name,
            kind,
        } => {
            let kind = if kind.eq_ignore_ascii_case("voice") {
                ChannelKind::Voice
            } else {
                ChannelKind::Text
            };
            storage
                .upsert_channel(ChannelId(channel_id), GuildId(guild_id), &name, kind)
                .await?;
            println!("stored channel_id={channel_id}");
        }
        Command::Register {
            channel_id,
            category,
        } => {
            let registered = storage
                .update_navigator(|doc| {
                    let id = doc.find_category_by_input(&category)?.id.clone();
                    let moved = doc
                        .entry(ChannelId(channel_id))
                        .is_some_and(|entry| entry.category_id != id);
                    doc.register_channel(ChannelId(channel_id), &id);
                    if moved {
                        doc.remove_empty_categories();
                    }
                    doc.entry(ChannelId(channel_id))
                        .map(|entry| (id, entry.position))
                })
                .await?;
            let Some((id, position)) = registered else {
                bail!("no category matches '{category}'");
            };
            println!("registered channel_id={channel_id} category={id} position={position}");
        }
        Command::Unregister { channel_id } => {
            let removed = storage
                .update_navigator(|doc| {
                    let entry = doc.unregister_channel(ChannelId(channel_id))?;
                    Some((entry.category_id, doc.remove_empty_categories()))
                })
                .await?;
            match removed {
                Some((category, pruned)) => {
                    println!("unregistered channel_id={channel_id} from category={category}");
                    for id in pruned {
                        println!("removed empty category id={id}");
                    }
                }
                None => println!("channel_id={channel_id} was not registered"),
            }
        }
        Command::View => {
            let doc = storage.read_all().await?;
            println!("{}", wizard::commands::render_layout(&doc));
        }
    }

    Ok(())
}
