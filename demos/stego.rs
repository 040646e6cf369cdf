// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Example: hide a text file in an image, or read it back.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_err| eprintln!("Unable to set global default subscriber"))
        .expect("Failed to set log subscriber");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: stego <cover.png> <message.txt> <output.png> <passphrase>");
        eprintln!("       stego --decode <stego.png> <passphrase>");
        std::process::exit(1);
    }

    if args[1] == "--decode" {
        match stegosaur_core::decode_file(&args[2], &args[3]) {
            Ok(text) => println!("Decoded message: {}", text),
            Err(e) => {
                eprintln!("Decode failed: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        if args.len() < 5 {
            eprintln!("Usage: stego <cover.png> <message.txt> <output.png> <passphrase>");
            std::process::exit(1);
        }
        match stegosaur_core::encode_file(&args[1], &args[2], &args[3], &args[4]) {
            Ok(report) if report.is_complete() => {
                println!("Embedded {} characters into {}", report.written, args[3]);
            }
            Ok(report) => {
                println!(
                    "Image full: embedded {} of {} characters into {}",
                    report.written, report.total, args[3]
                );
            }
            Err(e) => {
                eprintln!("Encode failed: {}", e);
                std::process::exit(2);
            }
        }
    }
}
