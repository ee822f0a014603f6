//! Command-line driver: load an instance, run a fixed number of generations,
//! report and optionally save the best solution.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use mdvrp_ga::solution::ReferenceSolution;
use mdvrp_ga::utils::RunStatistics;
use mdvrp_ga::{Config, GeneticProgram};

#[derive(Debug, Parser)]
#[command(name = "mdvrp-ga", about = "Genetic algorithm for the multi-depot VRP")]
struct Args {
    /// Problem file (Cordeau MDVRP format, or .json)
    #[arg(env = "PROBLEM_PATH")]
    problem: PathBuf,

    /// Number of generations to simulate
    #[arg(short, long, env = "GENERATIONS", default_value_t = 1000)]
    generations: usize,

    /// JSON configuration file; individual flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, env = "POPULATION_SIZE")]
    population_size: Option<usize>,

    /// Single-swap mutation rate
    #[arg(short, long, env = "SINGLE_SWAP_MUT_RATE")]
    mutation_rate: Option<f64>,

    /// Route-removal mutation rate
    #[arg(long, env = "VEHICLE_REMOVE_MUT_RATE")]
    route_removal_rate: Option<f64>,

    #[arg(long, env = "CROSSOVER_RATE")]
    crossover_rate: Option<f64>,

    #[arg(short, long, env = "PARENT_SELECTION_K")]
    tournament_size: Option<usize>,

    /// Vehicle capacity applied to every depot
    #[arg(long)]
    capacity: Option<f64>,

    #[arg(long, env = "SEED")]
    seed: Option<u64>,

    /// Where to write the best solution
    #[arg(short, long, env = "SOLUTION_PATH")]
    output: Option<PathBuf>,

    /// Known solution to compare against
    #[arg(long, env = "OPTIMAL_SOLUTION_PATH")]
    reference: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn build_config(&self) -> mdvrp_ga::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::new(),
        };

        if let Some(size) = self.population_size {
            config = config.with_population_size(size);
        }
        if let Some(rate) = self.mutation_rate {
            config = config.with_mutation_rate(rate);
        }
        if let Some(rate) = self.route_removal_rate {
            config = config.with_route_removal_rate(rate);
        }
        if let Some(rate) = self.crossover_rate {
            config = config.with_crossover_rate(rate);
        }
        if let Some(k) = self.tournament_size {
            config = config.with_tournament_size(k);
        }
        if let Some(capacity) = self.capacity {
            config = config.with_capacity_override(capacity);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = args.build_config()?;

    info!("Loading problem from: {}", args.problem.display());
    let mut program = GeneticProgram::from_file(&args.problem)?;
    info!(
        "Loaded problem: {} with {} customers and {} depots",
        program.problem().name(),
        program.problem().customer_count(),
        program.problem().depot_count()
    );

    program.update_config(config)?;
    program.generate_population()?;

    let start_time = Instant::now();
    for _ in 0..args.generations {
        program.simulate()?;
    }
    let runtime = start_time.elapsed();

    let best = program.best_solution()?;

    let reference_distance = match &args.reference {
        Some(path) => {
            let reference = ReferenceSolution::from_file(path)?;
            Some(program.evaluate_reference(&reference)?.distance)
        }
        None => None,
    };

    println!(
        "{}",
        RunStatistics::new(program.generation(), runtime, &best, reference_distance).format()
    );
    println!("{:?}", best);

    if let Some(path) = &args.output {
        info!("Saving solution to: {}", path.display());
        best.write_to_file(program.problem(), path)?;
    }

    Ok(())
}
