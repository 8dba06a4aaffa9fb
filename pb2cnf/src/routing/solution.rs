use std::collections::VecDeque;
use std::fmt::Display;
use std::fmt::Formatter;

use super::Point;
use super::RoutingError;
use super::RoutingInstance;
use crate::basic_types::Solution;

/// The path number of every cell of the grid, 0 for a free cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSolution {
    width: u32,
    height: u32,
    cells: Vec<usize>,
}

impl RoutingSolution {
    /// Reads off the paths from a solution over the variables of
    /// [`RoutingInstance::cell_literal`].
    pub fn from_solution(instance: &RoutingInstance, solution: &Solution) -> RoutingSolution {
        let mut routing_solution = RoutingSolution {
            width: instance.width(),
            height: instance.height(),
            cells: vec![0; instance.num_cells() as usize],
        };

        for cell in instance.cells() {
            if let Some(pair) = (0..instance.pairs().len())
                .find(|&pair| solution.get_literal_value(instance.cell_literal(cell, pair)))
            {
                routing_solution.set(cell, pair + 1);
            }
        }

        routing_solution
    }

    pub fn path_number(&self, cell: Point) -> usize {
        self.cells[self.index(cell)]
    }

    pub fn num_used_cells(&self) -> usize {
        self.cells.iter().filter(|&&path| path != 0).count()
    }

    /// Checks that the endpoints of every pair are on its path and connected through it.
    pub fn check(&self, instance: &RoutingInstance) -> Result<(), RoutingError> {
        for pair in 1..=instance.pairs().len() {
            let _ = self.trace_path(instance, pair)?;
        }
        Ok(())
    }

    /// Keeps only the cells on a shortest route between the endpoints of every pair, which drops
    /// cycles that a solution without optimisation may contain.
    pub fn trace_paths(&self, instance: &RoutingInstance) -> Result<RoutingSolution, RoutingError> {
        let mut traced = RoutingSolution {
            width: self.width,
            height: self.height,
            cells: vec![0; self.cells.len()],
        };

        for pair in 1..=instance.pairs().len() {
            for cell in self.trace_path(instance, pair)? {
                traced.set(cell, pair);
            }
        }

        Ok(traced)
    }

    /// A breadth-first search from the first endpoint over the cells of the path.
    fn trace_path(&self, instance: &RoutingInstance, pair: usize) -> Result<Vec<Point>, RoutingError> {
        let (source, target) = instance.pairs()[pair - 1];
        if self.path_number(source) != pair || self.path_number(target) != pair {
            return Err(RoutingError::MissingEndpoint { pair });
        }

        let mut predecessors: Vec<Option<Point>> = vec![None; self.cells.len()];
        let mut queue = VecDeque::from([source]);
        predecessors[self.index(source)] = Some(source);

        while let Some(cell) = queue.pop_front() {
            if cell == target {
                let mut path = vec![target];
                let mut current = target;
                while current != source {
                    let Some(previous) = predecessors[self.index(current)] else {
                        break;
                    };
                    path.push(previous);
                    current = previous;
                }
                return Ok(path);
            }

            for neighbour in instance.neighbours(cell) {
                let index = self.index(neighbour);
                if self.cells[index] == pair && predecessors[index].is_none() {
                    predecessors[index] = Some(cell);
                    queue.push_back(neighbour);
                }
            }
        }

        Err(RoutingError::DisconnectedPath { pair })
    }

    fn index(&self, cell: Point) -> usize {
        (cell.x + self.width * cell.y) as usize
    }

    fn set(&mut self, cell: Point, path: usize) {
        let index = self.index(cell);
        self.cells[index] = path;
    }
}

impl Display for RoutingSolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        super::write_grid(f, self.width, self.height, |cell| self.path_number(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause_databases::SatSolverClauseDatabase;
    use crate::encoders::Pb2Cnf;
    use crate::optimisation::LinearSearch;
    use crate::optimisation::OptimisationResult;
    use crate::optimisation::OptimisationSolver;
    use crate::routing::RoutingModel;
    use crate::termination::Indefinite;

    fn solve_optimally(instance: &RoutingInstance) -> Option<(RoutingSolution, i64)> {
        let model = RoutingModel::new(instance, None);
        let mut clause_database = SatSolverClauseDatabase::default();
        if model.encode(Pb2Cnf::default(), &mut clause_database).is_err() {
            return None;
        }

        let mut solver = OptimisationSolver::new(
            clause_database,
            model.objective().clone(),
            LinearSearch::new(Default::default()),
        );
        match solver.solve(&mut Indefinite, |_, _| {}) {
            OptimisationResult::Optimal {
                solution,
                objective_value,
            } => Some((
                RoutingSolution::from_solution(instance, &solution),
                objective_value,
            )),
            OptimisationResult::Infeasible => None,
            result => panic!("unexpected result {result:?}"),
        }
    }

    #[test]
    fn straight_paths_are_optimal() {
        let instance = RoutingInstance::parse("3 2\n2\n0 0 2 0\n0 1 2 1\n".as_bytes()).expect("valid");

        let (solution, objective_value) = solve_optimally(&instance).expect("routable");

        assert_eq!(6, objective_value);
        assert_eq!("1 1 1\n2 2 2\n", solution.to_string());
        assert!(solution.check(&instance).is_ok());
    }

    #[test]
    fn shortest_paths_meet_the_lower_bound_without_a_final_proof() {
        let instance = RoutingInstance::parse("3 2\n2\n0 0 2 0\n0 1 2 1\n".as_bytes()).expect("valid");
        let model = RoutingModel::new(&instance, None);
        let mut clause_database = SatSolverClauseDatabase::default();
        model
            .encode(Pb2Cnf::default(), &mut clause_database)
            .expect("routable");

        let mut solver = OptimisationSolver::new(
            clause_database,
            model.objective().clone(),
            LinearSearch::new(Default::default()),
        )
        .with_lower_bound(instance.min_num_cells() as i64);
        let mut num_improvements = 0;
        let result = solver.solve(&mut Indefinite, |_, _| num_improvements += 1);

        assert!(matches!(
            result,
            OptimisationResult::Optimal {
                objective_value: 6,
                ..
            }
        ));
        // one solve call per improving solution and none that ends unsatisfiable
        assert_eq!(
            num_improvements,
            solver.clause_database().solver().counters().num_solve_calls
        );
    }

    #[test]
    fn paths_go_around_each_other() {
        // pair 2 blocks the middle row, so pair 1 goes around it
        let instance =
            RoutingInstance::parse("3 3\n2\n0 1 2 1\n1 0 1 1\n".as_bytes()).expect("valid");

        let (solution, objective_value) = solve_optimally(&instance).expect("routable");

        assert_eq!(7, objective_value);
        assert!(solution.check(&instance).is_ok());
        assert_eq!(2, solution.path_number(Point::new(1, 0)));
        assert_eq!(1, solution.path_number(Point::new(1, 2)));
    }

    #[test]
    fn crossing_pairs_are_unroutable() {
        let instance =
            RoutingInstance::parse("3 3\n2\n0 1 2 1\n1 0 1 2\n".as_bytes()).expect("valid");

        assert_eq!(None, solve_optimally(&instance));
    }

    #[test]
    fn tracing_drops_detached_cycles() {
        let instance = RoutingInstance::new(4, 3, vec![(Point::new(0, 0), Point::new(1, 0))])
            .expect("valid");
        let used = [(0, 0), (1, 0), (2, 1), (3, 1), (2, 2), (3, 2)]
            .map(|(x, y)| instance.cell_literal(Point::new(x, y), 0));
        let solution = Solution::new(
            (0..=instance.num_variables())
                .map(|index| used.iter().any(|literal| literal.to_dimacs() as u32 == index))
                .collect(),
        );

        let routing_solution = RoutingSolution::from_solution(&instance, &solution);
        assert_eq!(6, routing_solution.num_used_cells());

        let traced = routing_solution.trace_paths(&instance).expect("connected");
        assert_eq!("1 1 0 0\n0 0 0 0\n0 0 0 0\n", traced.to_string());
    }

    #[test]
    fn broken_paths_are_reported() {
        let instance = RoutingInstance::new(3, 1, vec![(Point::new(0, 0), Point::new(2, 0))])
            .expect("valid");

        let disconnected = Solution::new(vec![false, true, false, true]);
        assert!(matches!(
            RoutingSolution::from_solution(&instance, &disconnected).check(&instance),
            Err(RoutingError::DisconnectedPath { pair: 1 })
        ));

        let missing_endpoint = Solution::new(vec![false, true, true, false]);
        assert!(matches!(
            RoutingSolution::from_solution(&instance, &missing_endpoint).check(&instance),
            Err(RoutingError::MissingEndpoint { pair: 1 })
        ));
    }
}
