//! shimsmith CLI entrypoint.
//!
//! This binary installs launchers for a package's entry points, installs
//! proxies for prebuilt Windows executables and repairs interpreter
//! directives after an install has moved.

use clap::Parser;
use shimsmith_installer::cli::Cli;
use shimsmith_installer::commands::run;
use shimsmith_installer::error::Result;
use shimsmith_installer::output::{init_logging, write_stderr_line};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.target().verbose);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli.command, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format_args!("error: {err}"));
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                write_stderr_line(stderr, format_args!("  caused by: {cause}"));
                source = std::error::Error::source(cause);
            }
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shimsmith_installer::error::InstallerError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(InstallerError::MissingStubs), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: Windows targets need stub executables"));
    }

    #[test]
    fn exit_code_for_run_result_prints_error_chain() {
        let err = InstallerError::ReadFailed {
            path: "/pkg/entry_points.toml".into(),
            source: std::io::Error::other("permission denied"),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("failed to read /pkg/entry_points.toml"));
        assert!(stderr_text.contains("caused by: permission denied"));
    }
}
