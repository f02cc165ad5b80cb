//! CLI utility for jump-link generation

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use navlink::{
    export_off_mesh_links, ActionConfig, BoxScene, JumpDownConfig, JumpDownSettings, JumpLink,
    JumpOverConfig, JumpOverSettings, LinkBuilderConfig, NavLinkBuilder, OffMeshLink,
};

/// A CLI utility that builds jump links between the platforms of a box scene
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build jump links for a scene
    Build {
        /// Scene file (JSON grid bounds and box platforms)
        #[clap(long, value_parser)]
        scene: PathBuf,

        /// Configuration file (JSON), defaults are used when omitted
        #[clap(long, value_parser)]
        config: Option<PathBuf>,

        /// Output links file (JSON)
        #[clap(long, value_parser)]
        output: PathBuf,

        /// Which jump actions to build
        #[clap(long, value_enum, default_value = "down")]
        action: ActionArg,

        /// Also export the jump-down links as off-mesh connections
        #[clap(long)]
        off_mesh: bool,
    },

    /// Print the default configuration
    Defaults {
        /// Write to a file instead of stdout
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ActionArg {
    Down,
    Over,
    Both,
}

/// Configuration file layout
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct Settings {
    agent: LinkBuilderConfig,
    jump_down: JumpDownSettings,
    jump_over: JumpOverSettings,
}

/// Output file layout
#[derive(Serialize, Debug)]
struct LinkReport<'a> {
    edges: usize,
    links: Vec<&'a JumpLink>,
    filtered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    off_mesh: Option<Vec<OffMeshLink>>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Build {
            scene,
            config,
            output,
            action,
            off_mesh,
        } => build_links(&scene, config.as_deref(), &output, action, off_mesh),
        Commands::Defaults { output } => print_defaults(output.as_deref()),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

/// Build jump links for a box scene
fn build_links(
    scene_path: &Path,
    config_path: Option<&Path>,
    output: &Path,
    action: ActionArg,
    off_mesh: bool,
) -> Result<()> {
    println!("Loading scene from {}...", scene_path.display());
    let scene: BoxScene = read_json(scene_path)?;

    let settings: Settings = match config_path {
        Some(path) => read_json(path)?,
        None => Settings::default(),
    };

    let jump_down = JumpDownConfig::new(settings.jump_down.clone())
        .map_err(|e| anyhow!("Invalid jump-down configuration: {}", e))?;
    let jump_over = JumpOverConfig::new(settings.jump_over.clone())
        .map_err(|e| anyhow!("Invalid jump-over configuration: {}", e))?;

    let data = scene
        .build(settings.agent.agent_height, settings.agent.agent_climb)
        .map_err(|e| anyhow!("Failed to voxelize scene: {}", e))?;
    let (width, height) = scene.grid_size();
    println!(
        "Scene voxelized: {}x{} cells, {} platforms",
        width,
        height,
        scene.platforms.len()
    );

    let config = LinkBuilderConfig::from_compact_heightfield(
        &data.chf,
        settings.agent.agent_radius,
        settings.agent.agent_height,
        settings.agent.agent_climb,
    );

    let mut builder = NavLinkBuilder::new(&data.solid, &data.chf, &data.cset, config)
        .map_err(|e| anyhow!("Invalid agent configuration: {}", e))?;

    let edges = builder
        .find_edges()
        .map_err(|e| anyhow!("Failed to find edges: {}", e))?;
    println!("Found {} boundary edges", edges);

    let mut actions: Vec<ActionConfig> = Vec::new();
    if matches!(action, ActionArg::Down | ActionArg::Both) {
        actions.push(jump_down.clone().into());
    }
    if matches!(action, ActionArg::Over | ActionArg::Both) {
        actions.push(jump_over.into());
    }

    for action_config in &actions {
        if !action_config.enabled() {
            println!("{:?} links are disabled in the configuration", action_config.action());
        }
        let added = builder
            .build_for_all_edges(action_config)
            .map_err(|e| anyhow!("Failed to build {:?} links: {}", action_config.action(), e))?;
        println!("Built {} {:?} links", added, action_config.action());
    }

    let links: Vec<&JumpLink> = builder.valid_links().collect();
    let filtered = builder.links().len() - links.len();
    println!(
        "{} valid links, {} filtered as overlapping",
        links.len(),
        filtered
    );

    let off_mesh = off_mesh.then(|| {
        export_off_mesh_links(builder.links(), &jump_down, builder.config().agent_radius)
    });
    if let Some(connections) = &off_mesh {
        println!("Exported {} off-mesh connections", connections.len());
    }

    log::debug!("Timers:\n{}", builder.context().timer_summary());

    println!("Saving links to {}...", output.display());
    write_json(
        &LinkReport {
            edges,
            links,
            filtered,
            off_mesh,
        },
        Some(output),
    )
}

/// Print the default configuration
fn print_defaults(output: Option<&Path>) -> Result<()> {
    write_json(&Settings::default(), output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let json = r#"{
            "agent": { "agent_radius": 20.0 },
            "jump_down": { "jump_length": 200.0 }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.agent.agent_radius, 20.0);
        assert_eq!(
            settings.agent.agent_height,
            LinkBuilderConfig::default().agent_height
        );
        assert_eq!(settings.jump_down.jump_length, 200.0);
        assert!(settings.jump_down.enabled);
        assert!(!settings.jump_over.enabled);
    }

    #[test]
    fn test_default_settings_round_trip() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        let settings: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings.jump_down, JumpDownSettings::default());
        assert_eq!(settings.jump_over, JumpOverSettings::default());
    }

    #[test]
    fn test_scene_file_layout() {
        let json = r#"{
            "bmin": [-50.0, -200.0, -50.0],
            "bmax": [350.0, 100.0, 450.0],
            "cell_size": 10.0,
            "cell_height": 5.0,
            "platforms": [
                { "min": [0.0, -100.0, 0.0], "max": [300.0, 0.0, 100.0] }
            ]
        }"#;
        let scene: BoxScene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.grid_size(), (40, 50));
        assert_eq!(scene.platforms.len(), 1);
    }
}
