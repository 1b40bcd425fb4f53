//! camcache - a command-line camera list that works offline.
//!
//! Cameras are kept in a local JSON store and synchronized from a simulated
//! remote service, itself persisted next to the local store so every run
//! talks to the same remote. Every command goes through `CamerasRepository`.

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camcache_core::utils::{format_optional, truncate_string};
use camcache_core::{
    Camera, CamerasFilterType, CamerasRepository, Config, DataSourceError,
    LocalCamerasDataSource, RemoteCamerasDataSource,
};

// ============================================================================
// Constants
// ============================================================================

/// Width of the title column in `list` output
const TITLE_COLUMN_WIDTH: usize = 48;

const USAGE: &str = "\
Usage: camcache <command>

Commands:
  list [all|active|closed] [--refresh]   List cameras (--refresh reloads from remote)
  show <id>                              Show one camera
  add <title> [description]              Add a camera
  edit <id> <title> [description]        Replace a camera's title and description
  close <id>                             Mark a camera closed
  activate <id>                          Mark a camera active
  clear-closed                           Delete all closed cameras
  delete <id>                            Delete a camera
  delete-all                             Delete every camera
  status                                 Show store and cache status
  config                                 Show the config file, writing defaults if missing
  help                                   Show this message

Environment:
  CAMCACHE_DATA_DIR            Local store directory
  CAMCACHE_REMOTE_LATENCY_MS   Simulated remote latency (default 5000)
  RUST_LOG                     Log filter (e.g. RUST_LOG=debug)";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List {
        filter: CamerasFilterType,
        refresh: bool,
    },
    Show(String),
    Add {
        title: String,
        description: Option<String>,
    },
    Edit {
        id: String,
        title: String,
        description: Option<String>,
    },
    Close(String),
    Activate(String),
    ClearClosed,
    Delete(String),
    DeleteAll,
    Status,
    Config,
    Help,
}

impl Command {
    /// Parse the arguments following the program name.
    fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        let command = match name.as_str() {
            "list" | "ls" => {
                let mut filter = CamerasFilterType::All;
                let mut refresh = false;
                for arg in rest {
                    if arg == "--refresh" || arg == "-r" {
                        refresh = true;
                    } else if let Some(f) = CamerasFilterType::from_str(arg) {
                        filter = f;
                    } else {
                        bail!("Unknown list option: {}", arg);
                    }
                }
                Command::List { filter, refresh }
            }
            "show" => Command::Show(Self::single_id(name, rest)?),
            "add" => match rest {
                [title] => Command::Add {
                    title: title.clone(),
                    description: None,
                },
                [title, description] => Command::Add {
                    title: title.clone(),
                    description: Some(description.clone()),
                },
                _ => bail!("Usage: camcache add <title> [description]"),
            },
            "edit" => match rest {
                [id, title] => Command::Edit {
                    id: id.clone(),
                    title: title.clone(),
                    description: None,
                },
                [id, title, description] => Command::Edit {
                    id: id.clone(),
                    title: title.clone(),
                    description: Some(description.clone()),
                },
                _ => bail!("Usage: camcache edit <id> <title> [description]"),
            },
            "close" => Command::Close(Self::single_id(name, rest)?),
            "activate" => Command::Activate(Self::single_id(name, rest)?),
            "clear-closed" => Command::ClearClosed,
            "delete" | "rm" => Command::Delete(Self::single_id(name, rest)?),
            "delete-all" => Command::DeleteAll,
            "status" => Command::Status,
            "config" => Command::Config,
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("Unknown command: {}\n\n{}", other, USAGE),
        };
        Ok(command)
    }

    fn single_id(name: &str, rest: &[String]) -> Result<String> {
        match rest {
            [id] => Ok(id.clone()),
            _ => bail!("Usage: camcache {} <id>", name),
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Non-empty argument as `Some`, empty as `None`
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

struct CameraApp {
    config: Config,
    local: Arc<LocalCamerasDataSource>,
    repository: CamerasRepository,
}

impl CameraApp {
    fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let local = Arc::new(
            LocalCamerasDataSource::new(data_dir).context("Failed to open local camera store")?,
        );
        let remote = RemoteCamerasDataSource::open(
            config.remote_path()?,
            config.remote_latency(),
            config.seed_demo_data,
        )
        .context("Failed to open remote camera store")?;
        let repository = CamerasRepository::new(Arc::new(remote), local.clone());
        Ok(Self {
            config,
            local,
            repository,
        })
    }

    async fn run(&self, command: Command) -> Result<()> {
        debug!(?command, "Running command");
        match command {
            Command::List { filter, refresh } => self.list(filter, refresh).await,
            Command::Show(id) => {
                let camera = self.repository.get_camera(&id).await?;
                Self::print_detail(&camera);
                Ok(())
            }
            Command::Add { title, description } => {
                let camera = Camera::new(
                    non_empty(&title),
                    description.as_deref().and_then(non_empty),
                );
                if camera.is_empty() {
                    bail!("A camera needs a title or a description");
                }
                let id = camera.id.clone();
                self.repository.save_camera(camera).await?;
                println!("Added camera {}", id);
                Ok(())
            }
            Command::Edit {
                id,
                title,
                description,
            } => {
                // Ensure the camera exists before replacing it
                self.repository.get_camera(&id).await?;
                let camera = Camera::with_id(
                    id.clone(),
                    non_empty(&title),
                    description.as_deref().and_then(non_empty),
                );
                if camera.is_empty() {
                    bail!("A camera needs a title or a description");
                }
                self.repository.save_camera(camera).await?;
                println!("Updated camera {}", id);
                Ok(())
            }
            Command::Close(id) => {
                // Loading puts the camera in the cache the by-id calls resolve from
                self.repository.get_camera(&id).await?;
                self.repository.close_camera_by_id(&id).await?;
                println!("Closed camera {}", id);
                Ok(())
            }
            Command::Activate(id) => {
                self.repository.get_camera(&id).await?;
                self.repository.activate_camera_by_id(&id).await?;
                println!("Activated camera {}", id);
                Ok(())
            }
            Command::ClearClosed => {
                self.repository.clear_closed_cameras().await?;
                println!("Cleared closed cameras");
                Ok(())
            }
            Command::Delete(id) => {
                self.repository.delete_camera(&id).await?;
                println!("Deleted camera {}", id);
                Ok(())
            }
            Command::DeleteAll => {
                self.repository.delete_all_cameras().await?;
                println!("Deleted all cameras");
                Ok(())
            }
            Command::Status => self.status().await,
            Command::Config => Self::show_config(),
            Command::Help => {
                println!("{}", USAGE);
                Ok(())
            }
        }
    }

    async fn list(&self, filter: CamerasFilterType, refresh: bool) -> Result<()> {
        let cameras = match self.repository.get_filtered_cameras(filter, refresh).await {
            Ok(cameras) => cameras,
            Err(DataSourceError::DataNotAvailable) => {
                println!("No camera data available");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        println!("{} ({})", filter.label(), cameras.len());
        if cameras.is_empty() {
            println!("  (none)");
        }
        for camera in &cameras {
            let marker = if camera.is_closed() { "x" } else { " " };
            let title = format_optional(camera.title_for_list(), "(untitled)");
            println!(
                "  [{}] {}  {}",
                marker,
                camera.id,
                truncate_string(&title, TITLE_COLUMN_WIDTH)
            );
        }
        Ok(())
    }

    fn print_detail(camera: &Camera) {
        println!("Id:          {}", camera.id);
        println!("Title:       {}", format_optional(camera.title.as_deref(), "-"));
        println!(
            "Description: {}",
            format_optional(camera.description.as_deref(), "-")
        );
        println!(
            "Status:      {}",
            if camera.is_closed() { "closed" } else { "active" }
        );
    }

    fn show_config() -> Result<()> {
        let path = Config::config_path()?;
        if !path.exists() {
            Config::default().save()?;
            println!("Wrote default config");
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        println!("Config file: {}", path.display());
        println!("{}", contents);
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        let stored = self.local.load()?;
        let cache = self.repository.cache_status().await;

        println!("Data directory:  {}", self.local.data_dir().display());
        println!("Remote store:    {}", self.config.remote_path()?.display());
        println!("Remote latency:  {} ms", self.config.remote_latency().as_millis());
        match stored {
            Some(cached) => println!(
                "Local store:     {} cameras, saved {}",
                cached.data.len(),
                cached.age_display()
            ),
            None => println!("Local store:     never saved"),
        }
        println!(
            "Cache:           {} ({} cameras)",
            if cache.is_valid() {
                "valid"
            } else if cache.dirty {
                "dirty"
            } else {
                "not loaded"
            },
            cache.len
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = Config::load()?;
    info!(data_dir = ?config.data_dir, "camcache starting");

    let app = CameraApp::new(config)?;
    app.run(command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_empty_is_help() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_list_options() {
        assert_eq!(
            Command::parse(&args(&["list"])).unwrap(),
            Command::List {
                filter: CamerasFilterType::All,
                refresh: false
            }
        );
        assert_eq!(
            Command::parse(&args(&["list", "closed", "--refresh"])).unwrap(),
            Command::List {
                filter: CamerasFilterType::Closed,
                refresh: true
            }
        );
        assert!(Command::parse(&args(&["list", "--sideways"])).is_err());
    }

    #[test]
    fn test_parse_add_and_edit() {
        assert_eq!(
            Command::parse(&args(&["add", "Pisa"])).unwrap(),
            Command::Add {
                title: "Pisa".to_string(),
                description: None
            }
        );
        assert_eq!(
            Command::parse(&args(&["edit", "abc", "Pisa", "tower"])).unwrap(),
            Command::Edit {
                id: "abc".to_string(),
                title: "Pisa".to_string(),
                description: Some("tower".to_string())
            }
        );
        assert!(Command::parse(&args(&["add"])).is_err());
        assert!(Command::parse(&args(&["edit", "abc"])).is_err());
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(
            Command::parse(&args(&["close", "abc"])).unwrap(),
            Command::Close("abc".to_string())
        );
        assert_eq!(
            Command::parse(&args(&["rm", "abc"])).unwrap(),
            Command::Delete("abc".to_string())
        );
        assert!(Command::parse(&args(&["activate"])).is_err());
        assert!(Command::parse(&args(&["show", "a", "b"])).is_err());
    }

    #[test]
    fn test_parse_status_and_config() {
        assert_eq!(Command::parse(&args(&["status"])).unwrap(), Command::Status);
        assert_eq!(Command::parse(&args(&["config"])).unwrap(), Command::Config);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(Command::parse(&args(&["launch"])).is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("Pisa"), Some("Pisa".to_string()));
    }
}
