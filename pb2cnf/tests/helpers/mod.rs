//! Runs the `pb2cnf` binary on instances under `tests/`.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;

use wait_timeout::ChildExt;

#[derive(Debug)]
pub(crate) struct Files {
    pub(crate) log_file: PathBuf,
    pub(crate) err_file: PathBuf,
}

impl Files {
    pub(crate) fn output(&self) -> String {
        std::fs::read_to_string(&self.log_file).expect("Failed to read solver output")
    }

    pub(crate) fn cleanup(self) -> std::io::Result<()> {
        std::fs::remove_file(self.log_file)?;
        std::fs::remove_file(self.err_file)?;

        Ok(())
    }
}

pub(crate) fn instance_path(folder_name: &str, file_name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(folder_name)
        .join(file_name)
}

/// Runs `pb2cnf` with the given arguments. The output is written next to `instance_path`, with
/// `prefix` distinguishing runs on the same instance.
pub(crate) fn run_pb2cnf<'a>(
    instance_path: impl AsRef<Path>,
    prefix: &str,
    args: impl IntoIterator<Item = &'a str>,
) -> Files {
    const TEST_TIMEOUT: Duration = Duration::from_secs(60);

    let instance_path = instance_path.as_ref();
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_pb2cnf"));

    let log_file_path = instance_path.with_extension(format!("{prefix}.log"));
    let err_file_path = instance_path.with_extension(format!("{prefix}.err"));

    let mut command = Command::new(solver);
    for arg in args {
        let _ = command.arg(arg);
    }

    let mut child = command
        .stdout(File::create(&log_file_path).expect("Failed to create log file."))
        .stderr(File::create(&err_file_path).expect("Failed to create error file."))
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run pb2cnf.");

    match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => panic!("pb2cnf took more than {} seconds", TEST_TIMEOUT.as_secs()),
        Ok(Some(status)) if status.success() => {}
        Ok(Some(e)) => panic!("error running pb2cnf {e}"),
        Err(e) => panic!("error starting pb2cnf: {e}"),
    }

    Files {
        log_file: log_file_path,
        err_file: err_file_path,
    }
}

/// The status reported on the `s` line.
pub(crate) fn status(output: &str) -> &str {
    output
        .lines()
        .find_map(|line| line.strip_prefix("s "))
        .expect("no status line in the output")
}

/// The objective values reported on `o` lines, in order.
pub(crate) fn objective_values(output: &str) -> Vec<i64> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("o "))
        .map(|value| value.parse().expect("objective value is an integer"))
        .collect()
}
