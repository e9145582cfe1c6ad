#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};

mod config;
mod error;
mod model;
mod protocol;
mod services;

fn main() {
    let cfg = config::load();

    // Both tables must load before any query can run. A missing column or an
    // unreachable source halts here, per the startup error contract.
    let mut session = match protocol::Session::bootstrap(cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[core] startup failed: {e}");
            println!(
                "{}",
                serde_json::json!({
                    "status": "fatal",
                    "message": e.to_string()
                })
            );
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| session.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
