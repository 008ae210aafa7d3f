use std::env;

use xtask::{Task, USAGE};

fn main() {
    let task = env::args().nth(1);
    match task.as_deref().and_then(Task::parse) {
        Some(task) => {
            if let Err(e) = task.run() {
                eprintln!("{}", e);
                std::process::exit(-1);
            }
        }
        None => eprintln!("{}", USAGE),
    }
}
