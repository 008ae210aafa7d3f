use colored::Colorize;
use std::process::{Command, ExitStatus, Stdio};

use crate::{project_root, DynError};

pub fn ci() -> Result<(), DynError> {
    let tasks = vec![
        ("cargo check", vec!["check", "--workspace"]),
        ("cargo check on examples", vec!["check", "--examples"]),
        (
            "cargo clippy",
            vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        ),
        ("cargo build", vec!["build", "--workspace"]),
        ("cargo build on examples", vec!["build", "--examples"]),
        ("cargo nextest", vec!["nextest", "run", "--workspace"]),
        ("cargo test on docs", vec!["test", "--doc"]),
        ("cargo audit", vec!["audit"]),
        ("cargo fmt", vec!["fmt", "--all", "--check"]),
    ];

    for (name, args) in tasks {
        println!("{}", format!("Running {}...", name).truecolor(255, 165, 0));
        let status = cargo_command(args).status()?;
        if !status.success() {
            print_error_with_status_code(name, status);
            return Err(format!("`{}` failed", name).into());
        }
    }

    println!("{}", "All checks passed".green());
    Ok(())
}

fn print_error_with_status_code(task: &str, status: ExitStatus) {
    let code = status
        .code()
        .map(|x| x.to_string())
        .unwrap_or_else(|| "<< no status code >>".to_string());
    println!(
        "{} `{}` finished with a non-zero status code: {}",
        "Error:".red(),
        task.blue(),
        code
    );
}

fn cargo_command(args: Vec<&str>) -> Command {
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut cmd = Command::new(cargo);
    cmd.current_dir(project_root())
        .args(args)
        .stdout(Stdio::inherit());
    cmd
}
