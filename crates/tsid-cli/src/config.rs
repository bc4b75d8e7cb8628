use core::time::Duration;

use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tsid::{MAX_NODE_BITS, TSID_EPOCH, Tsid};

/// Generate, inspect and convert time-sorted unique identifiers.
///
/// Factory settings are read from CLI arguments, the environment, or a
/// `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "tsid", version, about)]
pub struct CliArgs {
    #[command(flatten)]
    pub factory: FactoryArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct FactoryArgs {
    /// Node id stamped on generated ids. Random when unset.
    ///
    /// Environment variable: `TSID_NODE`
    #[arg(long, global = true, env = "TSID_NODE")]
    pub node: Option<u32>,

    /// Width of the node field, 0 to 20 bits.
    ///
    /// Environment variable: `TSID_NODE_BITS`
    #[arg(long, global = true, env = "TSID_NODE_BITS", default_value_t = 10)]
    pub node_bits: u32,

    /// Custom epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `TSID_EPOCH_MS`
    #[arg(long, global = true, env = "TSID_EPOCH_MS", default_value_t = TSID_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// Clock used by the factories.
    ///
    /// Environment variable: `TSID_CLOCK`
    #[arg(long, global = true, env = "TSID_CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock; may move backwards.
    System,
    /// Ticker anchored at start-up; never moves backwards.
    Monotonic,
}

/// `<ID>` arguments take a 13-character canonical string or a decimal number.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print new ids, one per line.
    Generate {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Use the node-less process-wide counter.
        #[arg(long, conflicts_with = "atomic")]
        fast: bool,
        /// Use the lock-free factory.
        #[arg(long)]
        atomic: bool,
    },
    /// Print every representation and field of an id.
    Inspect {
        #[arg(value_parser = parse_id)]
        id: Tsid,
    },
    /// Print an id in another radix.
    Encode {
        #[arg(value_parser = parse_id)]
        id: Tsid,
        #[arg(short, long, default_value_t = 62)]
        base: u32,
    },
    /// Read an id written in another radix.
    Decode {
        value: String,
        #[arg(short, long, default_value_t = 62)]
        base: u32,
    },
    /// Render an id through a template such as `DOC-%X.PDF`.
    Format {
        #[arg(value_parser = parse_id)]
        id: Tsid,
        template: String,
    },
    /// Recover an id from templated text.
    Unformat { value: String, template: String },
}

/// Validated factory settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub node: Option<u32>,
    pub node_bits: u32,
    pub epoch: Duration,
    pub clock: ClockKind,
}

impl TryFrom<FactoryArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: FactoryArgs) -> Result<Self, Self::Error> {
        if args.node_bits > MAX_NODE_BITS {
            bail!(
                "TSID_NODE_BITS ({}) exceeds the maximum of {MAX_NODE_BITS}",
                args.node_bits
            );
        }

        if let Some(node) = args.node {
            let nodes = 1_u32 << args.node_bits;
            if node >= nodes {
                bail!(
                    "TSID_NODE ({node}) does not fit in {} node bits (max = {})",
                    args.node_bits,
                    nodes - 1
                );
            }
        }

        Ok(Self {
            node: args.node,
            node_bits: args.node_bits,
            epoch: Duration::from_millis(args.epoch_ms),
            clock: args.clock,
        })
    }
}

/// Digits only is a decimal number, anything else a canonical string. A
/// `tsid:` prefix forces the canonical reading for ids made only of digits.
pub fn parse_id(s: &str) -> anyhow::Result<Tsid> {
    if let Some(canonical) = s.strip_prefix("tsid:") {
        return Ok(canonical.parse()?);
    }
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return match s.parse::<u64>() {
            Ok(raw) => Ok(Tsid::from_raw(raw)),
            Err(_) => bail!("`{s}` does not fit in 64 bits"),
        };
    }
    if s.len() == tsid::TSID_CHARS {
        return Ok(s.parse()?);
    }
    bail!("`{s}` is neither a canonical TSID nor a decimal number")
}
