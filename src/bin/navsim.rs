use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use sightline::config::{get_config_path, load_config, save_config};
use sightline::game_logic::debug::SearchDebugger;
use sightline::game_logic::errors::NavResult;
use sightline::map::WaypointLayout;
use sightline::resources::NavConfig;
use sightline::pathfinding::PathPlanner;
use std::path::PathBuf;

mod navsim {
    pub mod cli_utils;
    pub mod layout_generator;
    pub mod simulation;
}

use navsim::cli_utils::*;
use navsim::layout_generator::{LayoutGenerationConfig, LayoutGenerator};
use navsim::simulation::{TICK_SECONDS, run_simulation};

#[derive(Parser)]
#[command(name = "navsim")]
#[command(about = "Inspect and simulate sight-weighted waypoint layouts")]
struct Args {
    /// Log search internals (edge costs, plans)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cost map of every waypoint
    Edges {
        /// Layout file (.toml or .bin)
        #[arg(long)]
        layout: PathBuf,
    },
    /// Plan a single path between two named waypoints
    Plan {
        #[arg(long)]
        layout: PathBuf,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Chase scripted goal visits with a straight-line mover
    Simulate {
        #[arg(long)]
        layout: PathBuf,
        /// Goal visits as NAME@TICK, comma separated
        #[arg(long, default_value = "")]
        goals: String,
        #[arg(long, default_value = "300")]
        ticks: u32,
    },
    /// Write the effective settings to the user config file
    Config {
        /// Write the built-in defaults instead of the current settings
        #[arg(long)]
        reset: bool,
    },
    /// Write a random single-room layout
    Generate {
        /// Output file (.toml or .bin)
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value = "0")]
        seed: u64,
        #[arg(long, default_value = "12")]
        waypoints: usize,
        #[arg(long, default_value = "4")]
        obstacles: usize,
    },
}

fn main() -> NavResult<()> {
    let args = Args::parse();

    // Only the log subscriber is needed; nothing else runs in this app
    App::new().add_plugins(LogPlugin {
        level: if args.verbose { Level::DEBUG } else { Level::WARN },
        ..default()
    });

    match args.command {
        Command::Edges { layout } => print_edges(&WaypointLayout::load_from_file(layout)?),
        Command::Plan { layout, from, to } => {
            print_plan(&WaypointLayout::load_from_file(layout)?, &from, &to)
        }
        Command::Simulate {
            layout,
            goals,
            ticks,
        } => simulate(
            &WaypointLayout::load_from_file(layout)?,
            &parse_goal_schedule(&goals)?,
            validate_ticks(ticks),
        ),
        Command::Generate {
            output,
            seed,
            waypoints,
            obstacles,
        } => generate(output, seed, waypoints, obstacles),
        Command::Config { reset } => write_config(reset),
    }
}

fn print_edges(layout: &WaypointLayout) -> NavResult<()> {
    let (graph, _) = layout.build_scene()?;

    println!("Layout '{}': {} waypoints", layout.name, graph.len());
    for node in graph.nodes() {
        println!(
            "\n{} [{}] at ({:.2}, {:.2}, {:.2})",
            node.name,
            graph.group_name(node.group).unwrap_or("?"),
            node.position.x,
            node.position.y,
            node.position.z
        );
        if let Err(e) = graph.check_connected(node.id) {
            println!("  ({e})");
        }
        for (neighbor, cost) in node.edges() {
            println!(
                "  -> {:<16} g={:>6.2} h={} {}",
                graph.name(neighbor),
                cost.g,
                cost.h,
                if cost.direct { "direct" } else { "" }
            );
        }
    }

    let isolated = graph.isolated_nodes();
    if !isolated.is_empty() {
        println!("\n{} waypoints have no edges", isolated.len());
    }
    Ok(())
}

fn print_plan(layout: &WaypointLayout, from: &str, to: &str) -> NavResult<()> {
    let (graph, _) = layout.build_scene()?;
    let start = layout.resolve(&graph, from)?;
    let goal = layout.resolve(&graph, to)?;

    let settings = load_config().settings;
    let mut planner = PathPlanner::from_settings(&settings);
    match planner.plan(&graph, start, goal) {
        Ok(path) => {
            println!("{}", SearchDebugger::describe_path(&graph, &path));
            let mut obstructions = 0;
            let mut length = 0.0;
            for pair in path.waypoints().windows(2) {
                if let Some(cost) = graph.cost(pair[0], pair[1]) {
                    obstructions += cost.h;
                    length += cost.g;
                }
            }
            println!(
                "  {} waypoints, length {:.2}, {} obstructions crossed",
                path.len(),
                length,
                obstructions
            );
        }
        Err(e) => println!("No path: {e}"),
    }
    Ok(())
}

fn simulate(layout: &WaypointLayout, schedule: &[ScheduledGoal], ticks: u32) -> NavResult<()> {
    let (graph, _) = layout.build_scene()?;
    let settings = load_config().settings;
    let summary = run_simulation(layout, &graph, schedule, ticks, &settings)?;

    println!(
        "Simulated {} ticks ({:.1}s) on '{}'",
        ticks,
        ticks as f32 * TICK_SECONDS,
        layout.name
    );
    for (tick, waypoint) in &summary.dispatches {
        println!("  tick {tick:>5}: -> {}", graph.name(*waypoint));
    }
    println!("Replans: {}", summary.replans);
    if summary.hold_ticks > 0 {
        println!(
            "Held position for {} ticks (last reason: {})",
            summary.hold_ticks,
            summary
                .last_hold
                .map(|e| e.to_string())
                .unwrap_or_default()
        );
    }
    if let Some(reason) = summary.final_hold {
        println!("Still holding at the end: {reason}");
    }
    println!(
        "Final position: ({:.2}, {:.2}, {:.2})",
        summary.final_position.x, summary.final_position.y, summary.final_position.z
    );
    Ok(())
}

fn write_config(reset: bool) -> NavResult<()> {
    let config = if reset {
        NavConfig::default()
    } else {
        load_config()
    };
    save_config(&config)?;
    println!("Config written to: {}", get_config_path()?.display());
    Ok(())
}

fn generate(output: PathBuf, seed: u64, waypoints: usize, obstacles: usize) -> NavResult<()> {
    validate_output_path(&output)?;

    let config = LayoutGenerationConfig {
        name: output
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("generated_layout")
            .to_string(),
        seed,
        waypoints,
        obstacles,
        ..Default::default()
    };
    let layout = LayoutGenerator::generate(&config)?;
    layout.save_to_file(&output)?;

    println!("Layout saved successfully to: {}", output.display());
    println!("  Name: {}", layout.name);
    println!("  Waypoints: {}", layout.groups[0].waypoints.len());
    println!("  Obstacles: {}", layout.obstacles.len());
    println!("  Beacon route: {}", layout.beacon_route.join(" -> "));
    Ok(())
}
