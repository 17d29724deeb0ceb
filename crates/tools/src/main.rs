use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use warren_core::minimap;
use warren_core::{Canvas, GenerateParameter, Generator};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the run; 0 picks one from the wall clock
    #[arg(short, long, default_value_t = 0)]
    seed: u32,
    /// Optional parameter JSON; defaults are used when omitted
    #[arg(short, long)]
    parameter: Option<PathBuf>,
    /// Directory to write the debug dumps into
    #[arg(short, long, default_value = "dungeon-out")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut parameter = match &args.parameter {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| "Failed to deserialize parameter JSON")?
        }
        None => GenerateParameter::default(),
    };
    if args.seed != 0 {
        parameter.random_seed = args.seed;
    }

    let mut generator = Generator::new();
    generator.generate(&parameter);
    if !generator.last_error().is_success() {
        bail!(
            "Generation failed: {:?} (seed {})",
            generator.last_error(),
            generator.effective_seed()
        );
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory: {}", args.out.display()))?;
    generator.dump_room_diagram(&args.out.join("dungeon_diagram.pu"))?;
    generator.dump_aisle(&args.out.join("dungeon_aisles.txt"))?;
    generator.dump_room_image(&args.out.join("dungeon_rooms.bmp"))?;
    generator.parameter().dump_to_json(&args.out.join("dungeon_parameter.json"))?;

    let voxel = generator.voxel();
    for (floor, &height) in generator.floor_heights().iter().enumerate() {
        let pixels = minimap::render_level(voxel, height);
        let mut canvas = Canvas::new(voxel.width(), voxel.depth());
        for y in 0..voxel.depth() as i32 {
            for x in 0..voxel.width() as i32 {
                canvas.put(x, y, pixels[(y * voxel.width() as i32 + x) as usize]);
            }
        }
        canvas.write(&args.out.join(format!("dungeon_minimap_{floor}.bmp")))?;
    }
    println!("Generation complete.");
    println!("Seed: {}", generator.effective_seed());
    println!("Rooms: {}", generator.room_count());
    println!("Aisles: {}", generator.aisles().len());
    println!("Floors: {:?}", generator.floor_heights());
    println!("Voxel: {}x{}x{}", voxel.width(), voxel.depth(), voxel.height());
    println!("Deepest depth from start: {}", generator.deepest_depth_from_start());
    println!("Start: {:?}", generator.start_point().point());
    println!("Goal: {:?}", generator.goal_point().point());

    Ok(())
}
