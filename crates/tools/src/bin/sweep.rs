use anyhow::Result;
use clap::Parser;
use warren_core::{GenerateParameter, Generator};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    first_seed: u32,
    #[arg(short, long, default_value_t = 100)]
    count: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Sweeping {} seeds starting at {}...", args.count, args.first_seed);
    let mut failures = 0u32;
    let mut generator = Generator::new();
    for seed in args.first_seed..args.first_seed.saturating_add(args.count) {
        let parameter = GenerateParameter { random_seed: seed, ..GenerateParameter::default() };
        generator.generate(&parameter);
        if !generator.last_error().is_success() {
            failures += 1;
            println!("seed {seed}: {:?}", generator.last_error());
        }
    }

    println!("Done: {} of {} seeds failed", failures, args.count);
    Ok(())
}
