//! Integration tests for the full genetic program.

use mdvrp_ga::distance::DistanceCache;
use mdvrp_ga::problem::{Node, ProblemInstance};
use mdvrp_ga::solution::ReferenceSolution;
use mdvrp_ga::{Config, Error, GeneticProgram, ProgramState};
use std::collections::HashSet;
use std::sync::Arc;

/// Creates a moderate size test problem with two depots and customers.
fn create_moderate_problem() -> ProblemInstance {
    let mut customers = Vec::new();

    // Create 20 customers in a grid pattern
    let mut id = 1;
    for i in 0..4 {
        for j in 0..5 {
            let x = i as f64 * 20.0 + 10.0;
            let y = j as f64 * 20.0 + 10.0;
            let demand = 1.0 + 0.1 * (id as f64 % 3.0);
            customers.push(Node::customer(id, x, y, demand));
            id += 1;
        }
    }

    ProblemInstance::new(
        "ModerateTestProblem".to_string(),
        customers,
        vec![
            Node::depot(21, 0.0, 0.0, 10.0),
            Node::depot(22, 80.0, 100.0, 10.0),
        ],
        None,
    )
    .unwrap()
}

fn small_config() -> Config {
    Config::new()
        .with_population_size(20)
        .with_mutation_rate(0.2)
        .with_seed(2024)
}

fn assert_valid_routes(problem: &ProblemInstance, routes: &[Vec<usize>]) {
    let depots: HashSet<usize> = problem.get_depots().iter().map(|d| d.id).collect();
    let mut visited = Vec::new();

    for route in routes {
        assert!(route.len() >= 3, "route without customers: {:?}", route);
        let first = route[0];
        let last = route[route.len() - 1];
        assert_eq!(first, last);
        assert!(depots.contains(&first));
        visited.extend_from_slice(&route[1..route.len() - 1]);
    }

    visited.sort_unstable();
    assert_eq!(visited, problem.customer_ids());
}

#[test]
fn test_operations_require_configuration_and_population() {
    let mut program = GeneticProgram::new(create_moderate_problem());
    assert_eq!(program.state(), ProgramState::Unconfigured);

    assert!(matches!(
        program.generate_population(),
        Err(Error::NotInitialized(_))
    ));
    assert!(matches!(program.simulate(), Err(Error::NotInitialized(_))));
    assert!(matches!(
        program.get_solution_fitness(),
        Err(Error::NotInitialized(_))
    ));

    program.update_config(small_config()).unwrap();
    assert_eq!(program.state(), ProgramState::Configured);
    assert!(matches!(program.simulate(), Err(Error::NotInitialized(_))));
    assert!(matches!(program.get_solution(), Err(Error::NotInitialized(_))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut program = GeneticProgram::new(create_moderate_problem());
    program.update_config(small_config()).unwrap();
    program.generate_population().unwrap();

    let result = program.update_config(Config::new().with_tournament_size(0));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    // The previous state is untouched
    assert_eq!(program.state(), ProgramState::Populated);
    assert_eq!(program.config().unwrap().population_size, 20);
    assert!(program.get_solution().is_ok());
}

#[test]
fn test_algorithm_short_run() {
    let problem = create_moderate_problem();
    let mut program = GeneticProgram::new(problem.clone());
    program.update_config(small_config()).unwrap();
    program.generate_population().unwrap();
    assert_eq!(program.state(), ProgramState::Populated);

    let mut previous = program.get_solution_fitness().unwrap();
    for _ in 0..50 {
        let routes = program.simulate().unwrap();
        assert_valid_routes(&problem, &routes);

        // The best-ever fitness never gets worse
        let fitness = program.get_solution_fitness().unwrap();
        assert!(fitness <= previous);
        previous = fitness;

        assert_eq!(routes, program.get_solution().unwrap());
    }

    assert_eq!(program.state(), ProgramState::Running);
    assert_eq!(program.generation(), 50);

    let solution = program.best_solution().unwrap();
    assert!(solution.distance > 0.0);
    assert!((solution.fitness - (solution.distance + 1000.0 * solution.excess_load)).abs() < 1e-6);
    assert_eq!(solution.is_feasible, solution.excess_load <= 1e-10);
    let load: f64 = solution.routes.iter().map(|r| r.load).sum();
    assert!((load - problem.total_demand()).abs() < 1e-9);
}

#[test]
fn test_same_seed_same_search() {
    let run = || {
        let mut program = GeneticProgram::new(create_moderate_problem());
        program.update_config(small_config()).unwrap();
        program.generate_population().unwrap();
        let mut fitness_history = vec![program.get_solution_fitness().unwrap()];
        for _ in 0..20 {
            program.simulate().unwrap();
            fitness_history.push(program.get_solution_fitness().unwrap());
        }
        (program.get_solution().unwrap(), fitness_history)
    };

    let (first_routes, first_history) = run();
    let (second_routes, second_history) = run();
    assert_eq!(first_history.len(), 21);
    assert_eq!(first_history, second_history);
    assert_eq!(first_routes, second_routes);
}

#[test]
fn test_generate_population_reseeds() {
    let mut program = GeneticProgram::new(create_moderate_problem());
    program.update_config(small_config()).unwrap();

    program.generate_population().unwrap();
    let first = program.get_solution().unwrap();
    for _ in 0..5 {
        program.simulate().unwrap();
    }

    program.generate_population().unwrap();
    assert_eq!(program.generation(), 0);
    assert_eq!(program.state(), ProgramState::Populated);
    assert_eq!(program.get_solution().unwrap(), first);
}

#[test]
fn test_update_config_discards_population() {
    let mut program = GeneticProgram::new(create_moderate_problem());
    program.update_config(small_config()).unwrap();
    program.generate_population().unwrap();
    program.simulate().unwrap();

    program
        .update_config(small_config().with_population_size(8))
        .unwrap();
    assert_eq!(program.state(), ProgramState::Configured);
    assert!(program.population().is_none());
    assert!(program.simulate().is_err());

    program.generate_population().unwrap();
    assert_eq!(program.population().unwrap().size(), 8);
}

#[test]
fn test_without_variation_only_initial_chromosomes_survive() {
    let config = Config::new()
        .with_population_size(12)
        .with_crossover_rate(0.0)
        .with_mutation_rate(0.0)
        .with_route_removal_rate(0.0)
        .with_seed(5);

    let mut program = GeneticProgram::new(create_moderate_problem());
    program.update_config(config).unwrap();
    program.generate_population().unwrap();

    let initial = program.population().unwrap().individuals.clone();
    for _ in 0..10 {
        program.simulate().unwrap();
        for individual in &program.population().unwrap().individuals {
            assert!(initial.iter().any(|i| i.is_clone_of(individual)));
        }
    }
}

#[test]
fn test_over_capacity_customer_is_served_with_penalty() {
    let problem = ProblemInstance::new(
        "Heavy".to_string(),
        vec![Node::customer(1, 0.0, 10.0, 150.0)],
        vec![Node::depot(0, 0.0, 0.0, 100.0)],
        None,
    )
    .unwrap();

    let mut program = GeneticProgram::new(problem);
    program
        .update_config(Config::new().with_population_size(4).with_seed(1))
        .unwrap();
    program.generate_population().unwrap();

    assert_eq!(program.simulate().unwrap(), vec![vec![0, 1, 0]]);
    assert_eq!(program.get_solution_fitness().unwrap(), 20.0 + 1000.0 * 50.0);
    assert!(!program.best_solution().unwrap().is_feasible);
}

#[test]
fn test_programs_share_instance_across_threads() {
    let problem = Arc::new(create_moderate_problem());
    let distances = Arc::new(DistanceCache::new(&problem));

    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..3)
            .map(|seed| {
                let problem = Arc::clone(&problem);
                let distances = Arc::clone(&distances);
                scope.spawn(move || {
                    let mut program = GeneticProgram::with_shared(problem, distances);
                    program.update_config(small_config().with_seed(seed)).unwrap();
                    program.generate_population().unwrap();
                    for _ in 0..10 {
                        program.simulate().unwrap();
                    }
                    program.get_solution_fitness().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|f| f.is_finite() && *f > 0.0));
}

#[test]
fn test_evaluate_reference() {
    let problem = ProblemInstance::new(
        "Square".to_string(),
        vec![
            Node::customer(1, 0.0, 10.0, 10.0),
            Node::customer(2, 10.0, 10.0, 10.0),
            Node::customer(3, 10.0, 0.0, 10.0),
        ],
        vec![Node::depot(4, 0.0, 0.0, 100.0)],
        None,
    )
    .unwrap();
    let program = GeneticProgram::new(problem);

    let reference = ReferenceSolution::parse("40.00\n1\t1\t40.00\t30\t0 1 2 3 0\n").unwrap();
    let evaluation = program.evaluate_reference(&reference).unwrap();

    assert!((evaluation.distance - reference.total_distance).abs() < 1e-9);
    assert!(evaluation.is_feasible());
}

#[test]
fn test_default_config_spreads_routes_over_depots() {
    let mut program = GeneticProgram::new(create_moderate_problem());
    program
        .update_config(Config::new().with_population_size(10).with_seed(3))
        .unwrap();
    program.generate_population().unwrap();

    let depots: HashSet<usize> = program
        .population()
        .unwrap()
        .individuals
        .iter()
        .flat_map(|i| i.chromosome.routes.iter().map(|r| r.depot))
        .collect();
    assert_eq!(depots, HashSet::from([21, 22]));
}

#[test]
fn test_accessors_expose_instance() {
    let program = GeneticProgram::new(create_moderate_problem());

    assert_eq!(program.get_customers().len(), 20);
    assert_eq!(program.get_depots().len(), 2);

    let bounds = program.get_boundaries();
    assert_eq!(bounds.min_x, 0.0);
    assert_eq!(bounds.min_y, 0.0);
    assert_eq!(bounds.max_x, 80.0);
    assert_eq!(bounds.max_y, 100.0);
    assert_eq!(program.distances().len(), 22);
}
