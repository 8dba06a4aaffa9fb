#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::instance_path;
use helpers::objective_values;
use helpers::run_pb2cnf;
use helpers::status;
use regex::Regex;

#[test]
fn decision_instance_is_encoded_as_cnf() {
    let instance_path = instance_path("opb", "decision.opb");

    let files = run_pb2cnf(
        &instance_path,
        "encode",
        ["encode", instance_path.to_str().expect("utf-8 path")],
    );
    let output = files.output();

    let header = Regex::new(r"(?m)^p cnf (\d+) (\d+)$").unwrap();
    let captures = header.captures(&output).expect("a cnf header is written");
    let num_variables: u32 = captures[1].parse().unwrap();
    let num_clauses: usize = captures[2].parse().unwrap();

    assert!(num_variables >= 3);
    let clause = Regex::new(r"^(-?[1-9]\d* )*0$").unwrap();
    assert_eq!(
        num_clauses,
        output.lines().filter(|line| clause.is_match(line)).count()
    );

    files.cleanup().unwrap();
}

#[test]
fn objective_becomes_soft_clauses() {
    let instance_path = instance_path("opb", "knapsack.opb");

    let files = run_pb2cnf(
        &instance_path,
        "encode",
        ["encode", instance_path.to_str().expect("utf-8 path")],
    );
    let output = files.output();

    // max: 6 x1 + 5 x2 + 4 x3 + 3 x4 is minimised as -18 + 6 ~x1 + 5 ~x2 + 4 ~x3 + 3 ~x4
    assert!(Regex::new(r"(?m)^p wcnf \d+ \d+ 19$")
        .unwrap()
        .is_match(&output));
    assert!(output.lines().any(|line| line == "c objective offset -18"));
    for soft_clause in ["6 1 0", "5 2 0", "4 3 0", "3 4 0"] {
        assert!(
            output.lines().any(|line| line == soft_clause),
            "missing soft clause {soft_clause}"
        );
    }

    files.cleanup().unwrap();
}

#[test]
fn encoded_wcnf_has_the_same_optimum() {
    let instance_path = instance_path("opb", "knapsack.opb");
    let encoded_path = instance_path.with_extension("encoded.wcnf");

    let files = run_pb2cnf(
        &instance_path,
        "encode-to-file",
        [
            "encode",
            instance_path.to_str().expect("utf-8 path"),
            "--output",
            encoded_path.to_str().expect("utf-8 path"),
        ],
    );
    files.cleanup().unwrap();

    let files = run_pb2cnf(
        &encoded_path,
        "solve",
        ["solve", encoded_path.to_str().expect("utf-8 path"), "--verify"],
    );
    let output = files.output();

    // the offset of -18 is not part of the wcnf objective
    assert_eq!("OPTIMUM FOUND", status(&output));
    assert_eq!(Some(&6), objective_values(&output).last());

    files.cleanup().unwrap();
    std::fs::remove_file(encoded_path).unwrap();
}
