//! # Quire CLI
//!
//! Usage:
//!   quire input.xml -o output.pdf
//!   echo '<document>...</document>' | quire -o output.pdf
//!   quire input.xml --layout          # dump the laid-out tree as JSON

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    let args: Vec<String> = env::args().collect();

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let renderer = match quire::Renderer::from_xml(&input) {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    if args.iter().any(|a| a == "--layout") {
        match renderer.layout_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match renderer.write_pdf() {
        Ok(pdf_bytes) => {
            fs::write(&output_path, &pdf_bytes).expect("Failed to write PDF");
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}
