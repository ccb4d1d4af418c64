// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Standalone setup check for the Firebase configuration.
//!
//! Reads `.env` (via dotenvy) and the process environment, then reports
//! each required platform variable as set, missing, or still a template
//! placeholder. Exits non-zero when anything needs attention.

use landscape_pro::config::{is_placeholder, REQUIRED_FIREBASE_VARS};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("Checking Firebase configuration...\n");

    if dotenvy::dotenv().is_err() {
        println!("Note: no .env file found, checking process environment only.\n");
    }

    println!("Environment variables:");
    let mut all_good = true;

    for var in REQUIRED_FIREBASE_VARS {
        let value = std::env::var(var).ok();
        if is_placeholder(value.as_deref()) {
            println!("  [MISSING] {}: not set or using placeholder value", var);
            all_good = false;
        } else {
            println!("  [ok]      {}: set", var);
        }
    }

    println!();
    if all_good {
        println!("All environment variables are set correctly.");
        println!("Start the server with `cargo run` and check /health.");
        ExitCode::SUCCESS
    } else {
        println!("Next steps:");
        println!("  1. Copy .env.template to .env");
        println!("  2. Fill in your Firebase configuration values");
        println!("  3. Enable Storage in the Firebase console and deploy storage rules");
        ExitCode::FAILURE
    }
}
