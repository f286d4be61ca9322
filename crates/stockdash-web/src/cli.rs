//! Command-line flags of the dashboard host.
//!
//! Flags override the matching environment variables.
//!
//! | Option | Overrides |
//! |--------|-----------|
//! | `--bind` | `STOCKDASH_BIND` |
//! | `--catalog` | `STOCKDASH_CATALOG` |

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Stock dashboard JSON host.
#[derive(Debug, Parser)]
#[command(name = "stockdash", author, version, about = "Stock dashboard JSON host")]
pub struct Cli {
    /// Listen address, e.g. 0.0.0.0:8080.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Industry catalog TOML replacing the bundled table.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,
}
