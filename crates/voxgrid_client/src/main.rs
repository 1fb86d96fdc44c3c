use std::env;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use glam::IVec3;
use tracing::info;
use voxgrid_client::app::{App, WorldCommand};
use voxgrid_client::settings::{load_or_create_settings, SETTINGS_PATH};
use voxgrid_shared::coords::ChunkPos;
use voxgrid_shared::voxel::VoxelId;
use voxgrid_shared::worldgen::WorldGenerator;

const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut settings_path = PathBuf::from(SETTINGS_PATH);
    let mut frames: u64 = 120;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let Some(value) = args.next() else {
                    eprintln!("--settings expects a path argument");
                    std::process::exit(2);
                };
                settings_path = PathBuf::from(value);
            }
            "--frames" => {
                let Some(value) = args.next() else {
                    eprintln!("--frames expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => frames = parsed,
                    Err(err) => {
                        eprintln!("invalid frame count '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--help" | "-h" => {
                println!("Usage: voxgrid [--settings <path>] [--frames <n>]");
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let settings = load_or_create_settings(&settings_path);
    let seed = settings.world_seed;
    let mut app = match App::new(settings) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("voxgrid failed to start: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = app.load_world() {
        eprintln!("failed to load world: {err}");
        std::process::exit(1);
    }

    let script = edit_script(seed);
    let commands = app.commands();
    let mut totals = (0usize, 0usize, 0usize);

    for frame in 0..frames {
        if let Some(edits) = script.get(frame as usize) {
            for edit in edits {
                let _ = commands.send(*edit);
            }
        }

        let stats = app.frame();
        totals.0 += stats.submitted;
        totals.1 += stats.uploaded;
        totals.2 += stats.stale;
        thread::sleep(FRAME_TIME);
    }

    let rest = app.run_until_idle();
    info!(
        "Ran {} frames: {} meshes submitted, {} uploaded, {} stale, {} chunks holding {} quads",
        app.frame_index(),
        totals.0 + rest.submitted,
        totals.1 + rest.uploaded,
        totals.2 + rest.stale,
        app.store().len(),
        app.store().total_quads()
    );
}

/// Frame-indexed edits: dig a shaft at the origin, flood it, then cap it with sand.
fn edit_script(seed: u64) -> Vec<Vec<WorldCommand>> {
    let surface = WorldGenerator::new(seed).surface_height(0, 0);
    let bottom = (surface - 4).max(0);
    let shaft = |voxel: VoxelId| -> Vec<WorldCommand> {
        (bottom..=surface)
            .map(|y| WorldCommand::SetVoxel {
                world: IVec3::new(0, y, 0),
                voxel,
            })
            .collect()
    };

    let mut script = vec![Vec::new(); 40];
    script[10] = shaft(VoxelId::AIR);
    script[20] = shaft(VoxelId::WATER);
    script[30] = vec![WorldCommand::SetVoxel {
        world: IVec3::new(0, surface + 1, 0),
        voxel: VoxelId::SAND,
    }];
    script[35] = vec![WorldCommand::Remesh(ChunkPos::new(0, 0, 0))];
    script
}
