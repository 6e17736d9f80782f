// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the blocktrie command-line interface.
//!
//! Four subcommands: `build` to compile blocklist source files into a
//! `.btrie` blob, `inspect` to examine a blob's layout, `query` to run
//! lookups against one, and `stamp` to convert between tag names and
//! blockstamp wire strings.

pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blocktrie",
    about = "Succinct domain trie builder for multi-blocklist lookups",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a .btrie blob from a blocklist source file
    Build {
        /// Input file: one "domain tag1,tag2" entry per line ("-" for
        /// stdin). Lines starting with '#' are skipped; entries for the
        /// same domain are merged.
        #[arg(short, long)]
        input: String,

        /// Output path for the .btrie blob
        #[arg(short, long)]
        output: String,

        /// Tag table, comma-separated in bit-index order. Defaults to the
        /// tags seen in the input, sorted by name.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Write a JSON build report next to the blob
        #[arg(long)]
        report: Option<String>,
    },

    /// Inspect a .btrie blob's structure
    Inspect {
        /// Path to .btrie file
        file: String,
    },

    /// Look a domain up in a .btrie blob
    Query {
        /// Path to .btrie file
        file: String,

        /// Domain name to look up
        domain: String,

        /// Filter matches through a user blockstamp: only lists in the
        /// intersection are reported
        #[arg(long)]
        stamp: Option<String>,
    },

    /// Encode tag names into a blockstamp, or decode one
    Stamp {
        /// Path to .btrie file (supplies the tag table)
        file: String,

        /// Decode this stamp into tag names instead of encoding
        #[arg(long, conflicts_with = "tags")]
        decode: Option<String>,

        /// Tag names to encode, comma-separated
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Emit the case-insensitive base32 variant ("1-...")
        #[arg(long)]
        base32: bool,
    },
}
