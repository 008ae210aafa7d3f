use std::{
    env, fs,
    process::{Command, Stdio},
};

use crate::{dist_dir, project_root, DynError};

const BINARY_NAME: &str = "cosmos-demo";
const EXAMPLE_CONFIG: &str = "configuration.example.toml";

pub fn dist() -> Result<(), DynError> {
    let _ = fs::remove_dir_all(dist_dir());
    fs::create_dir_all(dist_dir())?;

    dist_binary()?;
    dist_configuration()?;

    Ok(())
}

pub fn dist_binary() -> Result<(), DynError> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let status = Command::new(cargo)
        .current_dir(project_root())
        .args(["build", "--release", "--package", "cosmos_demo", "--bin", BINARY_NAME])
        .status()?;

    if !status.success() {
        return Err("cargo build failed".into());
    }

    #[allow(unused_mut)]
    let mut distributable = project_root().join("target/release").join(BINARY_NAME);

    #[allow(unused_mut)]
    let mut destination = dist_dir().join(BINARY_NAME);

    #[cfg(windows)]
    distributable.set_extension("exe");
    #[cfg(windows)]
    destination.set_extension("exe");

    fs::copy(&distributable, &destination)?;

    if Command::new("strip")
        .arg("--version")
        .stdout(Stdio::null())
        .status()
        .is_ok()
    {
        eprintln!("stripping the binary");
        let status = Command::new("strip").arg(&destination).status()?;
        if !status.success() {
            return Err("strip failed".into());
        }
    } else {
        eprintln!("No `strip` utility found");
    }

    Ok(())
}

/// Ships the example settings file next to the binary, never a real `configuration.toml`.
pub fn dist_configuration() -> Result<(), DynError> {
    let source = project_root().join(EXAMPLE_CONFIG);
    if !source.exists() {
        return Err(format!("`{}` is missing from the workspace root", EXAMPLE_CONFIG).into());
    }
    fs::copy(source, dist_dir().join(EXAMPLE_CONFIG))?;
    Ok(())
}
