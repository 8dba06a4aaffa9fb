#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::instance_path;
use helpers::objective_values;
use helpers::run_pb2cnf;
use helpers::status;

fn grid_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| !line.starts_with("c ") && !line.starts_with("o ") && !line.starts_with("s "))
        .collect()
}

#[test]
fn straight_paths_are_optimal() {
    let instance_path = instance_path("routing", "two_rows.txt");

    let files = run_pb2cnf(
        &instance_path,
        "optimise",
        ["route", instance_path.to_str().expect("utf-8 path")],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));
    assert_eq!(Some(&6), objective_values(&output).last());
    assert_eq!(vec!["1 1 1", "2 2 2"], grid_lines(&output));

    files.cleanup().unwrap();
}

#[test]
fn shortest_paths_stop_the_search_without_a_final_solve() {
    let instance_path = instance_path("routing", "two_rows.txt");

    let files = run_pb2cnf(
        &instance_path,
        "lower_bound",
        [
            "route",
            instance_path.to_str().expect("utf-8 path"),
            "--log-statistics",
        ],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));
    let num_solve_calls = output
        .lines()
        .find_map(|line| line.strip_prefix("c STAT number_of_solve_calls="))
        .and_then(|value| value.parse::<usize>().ok())
        .expect("solve calls are logged");
    assert_eq!(objective_values(&output).len(), num_solve_calls);

    files.cleanup().unwrap();
}

#[test]
fn detour_uses_the_minimum_number_of_cells() {
    let instance_path = instance_path("routing", "detour.txt");

    let files = run_pb2cnf(
        &instance_path,
        "optimise",
        [
            "route",
            instance_path.to_str().expect("utf-8 path"),
            "--encoding",
            "best",
        ],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));
    assert_eq!(Some(&10), objective_values(&output).last());

    let grid = grid_lines(&output);
    assert_eq!(4, grid.len());
    assert_eq!("1 1 1 1", grid[0]);
    let num_cells_of_second_path = grid
        .iter()
        .flat_map(|line| line.split(' '))
        .filter(|&cell| cell == "2")
        .count();
    assert_eq!(6, num_cells_of_second_path);

    files.cleanup().unwrap();
}

#[test]
fn crossing_pairs_cannot_be_routed() {
    let instance_path = instance_path("routing", "crossing.txt");

    let files = run_pb2cnf(
        &instance_path,
        "optimise",
        ["route", instance_path.to_str().expect("utf-8 path")],
    );
    let output = files.output();

    assert_eq!("UNSATISFIABLE", status(&output));
    assert!(grid_lines(&output).is_empty());

    files.cleanup().unwrap();
}

#[test]
fn satisfying_routing_connects_every_pair() {
    let instance_path = instance_path("routing", "detour.txt");

    let files = run_pb2cnf(
        &instance_path,
        "satisfy",
        ["route", instance_path.to_str().expect("utf-8 path"), "--satisfy"],
    );
    let output = files.output();

    assert_eq!("SATISFIABLE", status(&output));
    let grid = grid_lines(&output);
    assert_eq!(4, grid.len());
    for pair in ["1", "2"] {
        assert!(grid
            .iter()
            .flat_map(|line| line.split_whitespace())
            .any(|cell| cell == pair));
    }

    files.cleanup().unwrap();
}

#[test]
fn model_is_written_as_opb() {
    let instance_path = instance_path("routing", "two_rows.txt");
    let opb_path = instance_path.with_extension("model.opb");

    let files = run_pb2cnf(
        &instance_path,
        "opb-out",
        [
            "route",
            instance_path.to_str().expect("utf-8 path"),
            "--max-cells",
            "6",
            "--opb-out",
            opb_path.to_str().expect("utf-8 path"),
        ],
    );
    assert_eq!("OPTIMUM FOUND", status(&files.output()));
    files.cleanup().unwrap();

    let model = std::fs::read_to_string(&opb_path).unwrap();
    assert!(model.starts_with("* #variable= 12 #constraint= "));
    assert!(model.lines().any(|line| line.starts_with("min: ")));

    let files = run_pb2cnf(
        &opb_path,
        "solve",
        ["solve", opb_path.to_str().expect("utf-8 path"), "--verify"],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));
    assert_eq!(Some(&6), objective_values(&output).last());

    files.cleanup().unwrap();
    std::fs::remove_file(opb_path).unwrap();
}
