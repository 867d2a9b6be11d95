//! # pagetable CLI
//!
//! Usage:
//!   pagetable input.json -o output.pdf
//!   echo '{ ... }' | pagetable -o output.pdf
//!   pagetable --example > schedule.json
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    setup_logging();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_schedule_json());
        return;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => fail(&e),
    };

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    match pagetable::render_json(&input) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                fail(&format!("Failed to write {}: {}", output_path, e));
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}

fn example_schedule_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Horaires des messes",
    "author": "Secteur paroissial"
  },
  "page": {
    "size": "A4",
    "unit": "mm",
    "margin": { "top": 10, "right": 10, "bottom": 10, "left": 10 }
  },
  "tables": [
    {
      "heading": ["Date", "Heure", "Célébration", "Lieu"],
      "colWidths": [40, 30, 60, 60],
      "align": ["Left", "Center", "Left", "Left"],
      "font": { "family": "Helvetica", "size": 10 },
      "regroup": {
        "groups": ["Toussaint", "Toussaint", "Toussaint", "Défunts", "Défunts"],
        "underline": true
      },
      "rows": [
        ["Mardi 31 octobre", "18:30", "Messe anticipée", "Embrun, cathédrale"],
        ["Mercredi 1er novembre", "10:00", "Messe de la Toussaint", "Embrun, cathédrale"],
        ["Mercredi 1er novembre", "10:30", "Messe de la Toussaint suivie de la bénédiction des tombes", "Savines-le-Lac"],
        ["Jeudi 2 novembre", "18:00", "Messe pour les défunts", "Chorges"],
        [{ "text": "Pas de messe en semaine le 3 novembre", "colspan": 4 }]
      ],
      "spacing": 8
    },
    {
      "heading": ["Permanences", "Lieu"],
      "colWidths": [1, 2],
      "fillAlternate": false,
      "rows": [
        ["Lundi au vendredi, 9:00 - 11:00", "Maison paroissiale, Embrun"],
        ["Samedi, 10:00 - 12:00", "Presbytère de Chorges"]
      ]
    }
  ]
}
"##
}
