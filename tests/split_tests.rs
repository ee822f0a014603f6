//! Unit tests for splitting a customer permutation into routes.

use mdvrp_ga::distance::DistanceCache;
use mdvrp_ga::fitness::FitnessEvaluator;
use mdvrp_ga::problem::{Node, ProblemInstance};
use mdvrp_ga::split::Split;
use mdvrp_ga::DepotAssignment;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Creates a simple test problem with a depot and some customers.
fn create_test_problem() -> ProblemInstance {
    let customers = vec![
        // 6 customers in a line, with increasing demands
        Node::customer(1, 10.0, 0.0, 1.0),
        Node::customer(2, 20.0, 0.0, 1.0),
        Node::customer(3, 30.0, 0.0, 1.5),
        Node::customer(4, 40.0, 0.0, 1.5),
        Node::customer(5, 50.0, 0.0, 2.0),
        Node::customer(6, 60.0, 0.0, 2.0),
    ];

    ProblemInstance::new(
        "TestProblem".to_string(),
        customers,
        vec![Node::depot(0, 0.0, 0.0, 5.0)],
        None,
    )
    .unwrap()
}

/// Two depots far apart, every customer fills a vehicle on its own.
fn create_two_depot_problem(max_vehicles: Option<usize>) -> ProblemInstance {
    let customers = vec![
        Node::customer(1, 1.0, 0.0, 1.0),
        Node::customer(2, 99.0, 0.0, 1.0),
        Node::customer(3, 2.0, 0.0, 1.0),
        Node::customer(4, 98.0, 0.0, 1.0),
    ];

    ProblemInstance::new(
        "TwoDepots".to_string(),
        customers,
        vec![
            Node::depot(10, 0.0, 0.0, 1.0),
            Node::depot(11, 100.0, 0.0, 1.0),
        ],
        max_vehicles,
    )
    .unwrap()
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

#[test]
fn test_split_empty_tour() {
    let problem = create_test_problem();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome = Split::split(&[], &evaluator, DepotAssignment::Nearest, &mut rng()).unwrap();

    // Should produce 0 routes
    assert!(chromosome.routes.is_empty());
}

#[test]
fn test_split_single_customer() {
    let problem = create_test_problem();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome = Split::split(&[1], &evaluator, DepotAssignment::Nearest, &mut rng()).unwrap();

    assert_eq!(chromosome.routes.len(), 1);
    assert_eq!(chromosome.routes[0].customers, vec![1]);
    // Distance should be depot->1->depot = 10 + 10 = 20
    assert!((chromosome.routes[0].distance - 20.0).abs() < 1e-6);
    assert!(!chromosome.routes[0].modified);
}

#[test]
fn test_split_closes_route_at_capacity() {
    let problem = create_test_problem();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let permutation = [1, 2, 3, 4, 5, 6];
    let chromosome =
        Split::split(&permutation, &evaluator, DepotAssignment::Nearest, &mut rng()).unwrap();

    // 1 + 1 + 1.5 + 1.5 fills the vehicle exactly, 2 + 2 goes to a second one
    assert_eq!(chromosome.routes.len(), 2);
    assert_eq!(chromosome.routes[0].customers, vec![1, 2, 3, 4]);
    assert_eq!(chromosome.routes[1].customers, vec![5, 6]);
    assert_eq!(chromosome.routes[0].load, 5.0);
    assert_eq!(chromosome.routes[1].load, 4.0);
    assert!((chromosome.routes[0].distance - 80.0).abs() < 1e-6);
    assert!((chromosome.routes[1].distance - 120.0).abs() < 1e-6);

    // The permutation order is preserved across routes
    assert_eq!(chromosome.customer_sequence(), permutation.to_vec());
}

#[test]
fn test_split_respects_capacity() {
    let problem = create_test_problem();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let permutation = [6, 3, 1, 5, 2, 4];
    let chromosome =
        Split::split(&permutation, &evaluator, DepotAssignment::Nearest, &mut rng()).unwrap();

    for route in &chromosome.routes {
        assert!(route.load <= 5.0);
        assert!(!route.is_empty());
    }
    assert!(chromosome.is_permutation_of(&problem.customer_ids()));
}

#[test]
fn test_split_oversized_customer_gets_own_route() {
    let problem = ProblemInstance::new(
        "Oversized".to_string(),
        vec![
            Node::customer(1, 10.0, 0.0, 1.0),
            Node::customer(2, 20.0, 0.0, 7.0),
            Node::customer(3, 30.0, 0.0, 1.0),
        ],
        vec![Node::depot(0, 0.0, 0.0, 5.0)],
        None,
    )
    .unwrap();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome =
        Split::split(&[1, 2, 3], &evaluator, DepotAssignment::Nearest, &mut rng()).unwrap();

    assert_eq!(chromosome.routes.len(), 3);
    assert_eq!(chromosome.routes[1].customers, vec![2]);
    assert_eq!(chromosome.routes[1].load, 7.0);
    assert!(chromosome.is_permutation_of(&[1, 2, 3]));
}

#[test]
fn test_split_capacity_override() {
    let problem = create_test_problem();
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, Some(100.0), 1000.0);

    let chromosome = Split::split(
        &[1, 2, 3, 4, 5, 6],
        &evaluator,
        DepotAssignment::Nearest,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(chromosome.routes.len(), 1);
    assert_eq!(chromosome.routes[0].load, 9.0);
}

#[test]
fn test_split_nearest_depot() {
    let problem = create_two_depot_problem(None);
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome = Split::split(
        &[1, 2, 3, 4],
        &evaluator,
        DepotAssignment::Nearest,
        &mut rng(),
    )
    .unwrap();

    let depots: Vec<_> = chromosome.routes.iter().map(|r| r.depot).collect();
    assert_eq!(depots, vec![10, 11, 10, 11]);
}

#[test]
fn test_split_round_robin_depot() {
    let problem = create_two_depot_problem(None);
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome = Split::split(
        &[1, 3, 2, 4],
        &evaluator,
        DepotAssignment::RoundRobin,
        &mut rng(),
    )
    .unwrap();

    let depots: Vec<_> = chromosome.routes.iter().map(|r| r.depot).collect();
    assert_eq!(depots, vec![10, 11, 10, 11]);
}

#[test]
fn test_split_random_depot_is_valid() {
    let problem = create_two_depot_problem(None);
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    let chromosome = Split::split(
        &[4, 3, 2, 1],
        &evaluator,
        DepotAssignment::Random,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(chromosome.routes.len(), 4);
    for route in &chromosome.routes {
        assert!(route.depot == 10 || route.depot == 11);
    }
    assert!(chromosome.is_permutation_of(&[1, 2, 3, 4]));

    // Same seed, same depots
    let again = Split::split(
        &[4, 3, 2, 1],
        &evaluator,
        DepotAssignment::Random,
        &mut rng(),
    )
    .unwrap();
    assert_eq!(again, chromosome);
}

#[test]
fn test_split_vehicle_limit_moves_routes_to_other_depot() {
    let problem = create_two_depot_problem(Some(1));
    let distances = DistanceCache::new(&problem);
    let evaluator = FitnessEvaluator::with_parameters(&problem, &distances, None, 1000.0);

    // Customers 1 and 3 are both near depot 10, which has a single vehicle
    let chromosome = Split::split(
        &[1, 3, 2],
        &evaluator,
        DepotAssignment::Nearest,
        &mut rng(),
    )
    .unwrap();

    let depots: Vec<_> = chromosome.routes.iter().map(|r| r.depot).collect();
    // Third route: every depot is at its limit, so the nearest one is used again
    assert_eq!(depots, vec![10, 11, 11]);
}
