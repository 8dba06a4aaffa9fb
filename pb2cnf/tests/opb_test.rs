#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::instance_path;
use helpers::objective_values;
use helpers::run_pb2cnf;
use helpers::status;

macro_rules! opb_optimisation_test {
    ($name:ident, $instance:literal, $encoding:literal, $optimum:expr) => {
        #[test]
        fn $name() {
            run_opb_optimisation_test($instance, $encoding, $optimum);
        }
    };
}

opb_optimisation_test!(vertex_cover_gte, "vertex_cover", "gte", 3);
opb_optimisation_test!(vertex_cover_cne, "vertex_cover", "cne", 3);
opb_optimisation_test!(vertex_cover_best, "vertex_cover", "best", 3);
opb_optimisation_test!(weighted_cover_gte, "weighted_cover", "gte", 7);
opb_optimisation_test!(weighted_cover_best, "weighted_cover", "best", 7);
// maximisation objectives are reported negated
opb_optimisation_test!(knapsack_gte, "knapsack", "gte", -12);
opb_optimisation_test!(knapsack_best, "knapsack", "best", -12);

fn run_opb_optimisation_test(instance_name: &str, encoding: &str, optimum: i64) {
    let instance_path = instance_path("opb", &format!("{instance_name}.opb"));
    let path = instance_path.to_str().expect("utf-8 path");

    let files = run_pb2cnf(
        &instance_path,
        encoding,
        ["solve", path, "--verify", "--encoding", encoding],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));

    let objective_values = objective_values(&output);
    assert_eq!(Some(&optimum), objective_values.last());
    assert!(
        objective_values.windows(2).all(|pair| pair[0] > pair[1]),
        "objective values are not strictly improving: {objective_values:?}"
    );

    let solution_line = output
        .lines()
        .find(|line| line.starts_with("v "))
        .expect("a solution is printed");
    assert!(solution_line[2..]
        .split(' ')
        .all(|value| value.starts_with('x') || value.starts_with("-x")));

    files.cleanup().unwrap();
}

#[test]
fn infeasible_instance_is_unsatisfiable() {
    let instance_path = instance_path("opb", "infeasible.opb");

    let files = run_pb2cnf(
        &instance_path,
        "default",
        ["solve", instance_path.to_str().expect("utf-8 path")],
    );
    let output = files.output();

    assert_eq!("UNSATISFIABLE", status(&output));
    assert!(!output.lines().any(|line| line.starts_with("v ")));

    files.cleanup().unwrap();
}

#[test]
fn decision_instance_is_satisfied() {
    let instance_path = instance_path("opb", "decision.opb");

    let files = run_pb2cnf(
        &instance_path,
        "default",
        ["solve", instance_path.to_str().expect("utf-8 path"), "--verify"],
    );
    let output = files.output();

    assert_eq!("SATISFIABLE", status(&output));
    assert!(objective_values(&output).is_empty());
    let solution_line = output
        .lines()
        .find(|line| line.starts_with("v "))
        .expect("a solution is printed");
    assert_eq!(3, solution_line[2..].split(' ').count());

    files.cleanup().unwrap();
}
