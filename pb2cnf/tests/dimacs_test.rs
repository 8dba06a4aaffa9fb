#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::instance_path;
use helpers::objective_values;
use helpers::run_pb2cnf;
use helpers::status;

#[test]
fn satisfiable_cnf() {
    let instance_path = instance_path("cnf", "satisfiable.cnf");

    let files = run_pb2cnf(
        &instance_path,
        "default",
        ["solve", instance_path.to_str().expect("utf-8 path"), "--verify"],
    );
    let output = files.output();

    assert_eq!("SATISFIABLE", status(&output));
    let solution_line = output
        .lines()
        .find(|line| line.starts_with("v "))
        .expect("a solution is printed");
    assert!(solution_line.ends_with(" 0"));
    assert_eq!(5, solution_line[2..].split(' ').count());

    files.cleanup().unwrap();
}

#[test]
fn pigeonhole_cnf_is_unsatisfiable() {
    let instance_path = instance_path("cnf", "pigeonhole.cnf");

    let files = run_pb2cnf(
        &instance_path,
        "default",
        ["solve", instance_path.to_str().expect("utf-8 path")],
    );

    assert_eq!("UNSATISFIABLE", status(&files.output()));

    files.cleanup().unwrap();
}

#[test]
fn weighted_maxsat_optimum() {
    let instance_path = instance_path("wcnf", "exactly_one.wcnf");

    let files = run_pb2cnf(
        &instance_path,
        "default",
        ["solve", instance_path.to_str().expect("utf-8 path"), "--verify"],
    );
    let output = files.output();

    assert_eq!("OPTIMUM FOUND", status(&output));
    assert_eq!(Some(&2), objective_values(&output).last());

    files.cleanup().unwrap();
}
