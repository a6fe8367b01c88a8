// AIDEV-NOTE: setmend CLI front-end
// Subcommand layout grounded on the clap-derive style in
// examples/Beinsezii-ompl and examples/eikochan117-hvtag. Config
// resolution order is CLI flags > setmend.toml > defaults, matching
// tunez-cli's precedence over tunez-core::Config.

use clap::{Parser, Subcommand};
use setmend::catalog::MediaCatalog;
use setmend::config::ResolverConfig;
use setmend::coordinator::{self, ResolverCoordinator, SearchOptions};
use setmend::matcher::MatchOptions;
use setmend::playlist::PlaylistStore;
use setmend::rewriter::{self, RewriteItem};
use setmend::{indexer, Result};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "setmend", about = "Repairs broken absolute-path song references in DJ playlist files")]
struct Cli {
  /// Path to setmend.toml. Defaults to ./setmend.toml if present.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Rebuild the media catalog from a library root.
  Index {
    library_root: PathBuf,
  },
  /// Print catalog status.
  Status,
  /// Resolve one or more query paths against the catalog.
  Search {
    paths: Vec<PathBuf>,
    #[arg(long)]
    no_fuzzy: bool,
  },
  /// List the playlist tree.
  Playlists,
  /// Read the songs referenced by a playlist.
  Read {
    playlist_path: PathBuf,
  },
  /// Rewrite every occurrence of old_path to new_path across all playlists.
  Rewrite {
    /// `old_path=new_path` pairs.
    pairs: Vec<String>,
  },
  /// List every dangling reference anywhere in the playlist tree, with the
  /// best candidate found for each.
  Missing,
}

#[tokio::main]
async fn main() {
  env_logger::init();
  let cli = Cli::parse();

  if let Err(e) = run(cli).await {
    eprintln!("error: {}", e);
    std::process::exit(1);
  }
}

async fn run(cli: Cli) -> Result<()> {
  let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("setmend.toml"));
  let config = ResolverConfig::load_or_default(&config_path).map_err(|e| {
    setmend::SetmendError::Custom(format!("failed to load config: {}", e))
  })?;

  let catalog = Arc::new(MediaCatalog::load(&config.catalog_path).await?);
  let store = PlaylistStore::new(
    config.playlists_folders_root.clone().unwrap_or_else(|| PathBuf::from("Folders")),
    config.playlists_my_lists_root.clone().unwrap_or_else(|| PathBuf::from("MyLists")),
  );

  match cli.command {
    Command::Index { library_root } => {
      let report = indexer::build(&catalog, &library_root).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Command::Status => {
      let stats = catalog.stats().await;
      let last_update = catalog.last_update().await;
      println!(
        "{}",
        serde_json::json!({ "totalFiles": stats.total_files, "lastUpdate": last_update, "status": "ok" })
      );
    }
    Command::Search { paths, no_fuzzy } => {
      let coordinator =
        ResolverCoordinator::new(Arc::clone(&catalog), &config.logs_dir, config.cache.clone());
      let search_options = SearchOptions { fuzzy_search: !no_fuzzy };
      let match_options = MatchOptions {
        fuzzy_search: !no_fuzzy,
        tau: config.matcher.tau,
        scorer: config.matcher.scorer(),
      };
      let result = coordinator.search_many(&paths, &search_options, &match_options).await?;
      println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Command::Playlists => {
      let tree = store.tree();
      println!("{}", describe_tree(&tree));
    }
    Command::Read { playlist_path } => {
      let songs = store.read(&playlist_path)?;
      println!("{}", serde_json::to_string_pretty(&songs)?);
    }
    Command::Rewrite { pairs } => {
      let items: Vec<RewriteItem> = pairs
        .iter()
        .filter_map(|pair| pair.split_once('='))
        .map(|(old, new)| RewriteItem { old_path: old.to_string(), new_path: new.to_string() })
        .collect();
      let report = rewriter::rewrite_all(&store, &items, &config.logs_dir)?;
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Command::Missing => {
      let entries = coordinator::list_missing_global(&catalog, &store).await?;
      println!("{}", serde_json::to_string_pretty(&entries)?);
    }
  }

  Ok(())
}

fn describe_tree(tree: &setmend::playlist::PlaylistTree) -> String {
  let mut lines = Vec::new();
  if let Some(folders) = &tree.folders {
    describe_node(folders, 0, &mut lines);
  }
  if let Some(my_lists) = &tree.my_lists {
    describe_node(my_lists, 0, &mut lines);
  }
  lines.join("\n")
}

fn describe_node(node: &setmend::playlist::PlaylistNode, depth: usize, lines: &mut Vec<String>) {
  lines.push(format!("{}{}", "  ".repeat(depth), node.name));
  for child in &node.children {
    describe_node(child, depth + 1, lines);
  }
}
