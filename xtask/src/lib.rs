use std::path::{Path, PathBuf};

pub mod tasks;

pub type DynError = Box<dyn std::error::Error>;

pub const USAGE: &str = "
Usage: cargo xtask <task>

Tasks:
  ci              runs check, clippy, build, tests, audit and fmt over the workspace
  dist            builds the release cosmos-demo binary into target/dist
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Ci,
    Dist,
}

impl Task {
    /// `None` for anything that is not a known task name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ci" => Some(Task::Ci),
            "dist" => Some(Task::Dist),
            _ => None,
        }
    }

    pub fn run(self) -> Result<(), DynError> {
        match self {
            Task::Ci => tasks::ci::ci(),
            Task::Dist => tasks::distribute::dist(),
        }
    }
}

/// The workspace root, one level above this crate.
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

pub fn dist_dir() -> PathBuf {
    project_root().join("target/dist")
}

#[cfg(test)]
mod tests {
    use super::{project_root, Task};

    #[test]
    fn parse_knows_each_task() {
        assert_eq!(Task::parse("ci"), Some(Task::Ci));
        assert_eq!(Task::parse("dist"), Some(Task::Dist));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(Task::parse("build"), None);
        assert_eq!(Task::parse("CI"), None);
    }

    #[test]
    fn project_root_is_the_workspace() {
        assert!(project_root().join("cosmos_demo").join("Cargo.toml").exists());
        assert!(project_root().join("xtask").join("Cargo.toml").exists());
    }
}
