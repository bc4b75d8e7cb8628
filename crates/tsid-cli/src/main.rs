mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use config::{CliArgs, ClockKind, Command, Config};
use telemetry::init_telemetry;
use tsid::{
    MonotonicClock, SystemClock, ThreadRandom, TimeSource, Tsid, TsidFactoryBuilder, TsidGenerator,
};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args.factory)?;

    init_telemetry();
    tracing::debug!(?config, "starting");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.command {
        Command::Generate {
            count,
            fast,
            atomic,
        } => match (fast, config.clock) {
            (true, _) => {
                for _ in 0..count {
                    writeln!(out, "{}", Tsid::fast())?;
                }
            }
            (false, ClockKind::System) => generate(&mut out, &config, SystemClock, count, atomic)?,
            (false, ClockKind::Monotonic) => {
                generate(&mut out, &config, MonotonicClock::new(), count, atomic)?;
            }
        },
        Command::Inspect { id } => inspect(&mut out, &config, id)?,
        Command::Encode { id, base } => writeln!(out, "{}", id.encode(base)?)?,
        Command::Decode { value, base } => decode(&mut out, &value, base)?,
        Command::Format { id, template } => writeln!(out, "{}", id.format(&template)?)?,
        Command::Unformat { value, template } => {
            writeln!(out, "{}", Tsid::unformat(&value, &template)?)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn builder<T: TimeSource<u64>>(config: &Config, time: T) -> TsidFactoryBuilder<T, ThreadRandom> {
    let builder = TsidFactoryBuilder::new()
        .with_epoch(config.epoch)
        .with_node_bits(config.node_bits)
        .with_time_source(time);
    // without a node, the factory falls back to TSIDCREATOR_NODE, then random
    match config.node {
        Some(node) => builder.with_node(node),
        None => builder,
    }
}

fn generate<T, W>(out: &mut W, config: &Config, time: T, count: usize, atomic: bool) -> anyhow::Result<()>
where
    T: TimeSource<u64>,
    W: Write,
{
    let builder = builder(config, time);
    if atomic {
        let factory = builder.build_atomic()?;
        tracing::info!(node = factory.node(), node_bits = factory.node_bits(), "lock-free factory ready");
        write_ids(out, &factory, count)
    } else {
        let factory = builder.build()?;
        tracing::info!(node = factory.node(), node_bits = factory.node_bits(), "factory ready");
        write_ids(out, &factory, count)
    }
}

fn write_ids<G: TsidGenerator, W: Write>(out: &mut W, generator: &G, count: usize) -> anyhow::Result<()> {
    for _ in 0..count {
        writeln!(out, "{}", generator.create())?;
    }
    Ok(())
}

fn decode<W: Write>(out: &mut W, value: &str, base: u32) -> anyhow::Result<()> {
    writeln!(out, "{}", Tsid::decode(value, base)?)?;
    Ok(())
}

fn inspect<W: Write>(out: &mut W, config: &Config, id: Tsid) -> anyhow::Result<()> {
    let bytes: Vec<String> = id.to_bytes().iter().map(|b| format!("{b:02x}")).collect();
    writeln!(out, "number      : {}", id.to_raw())?;
    writeln!(out, "canonical   : {id}")?;
    writeln!(out, "lower       : {}", id.to_lower())?;
    writeln!(out, "hex         : {}", id.encode(16)?)?;
    writeln!(out, "base62      : {}", id.encode(62)?)?;
    writeln!(out, "bytes       : {}", bytes.join(" "))?;
    writeln!(out, "timestamp   : {}", id.timestamp())?;
    writeln!(out, "unix millis : {}", id.unix_millis_since(config.epoch))?;
    writeln!(out, "node        : {} ({} bits)", id.node(config.node_bits), config.node_bits)?;
    writeln!(out, "counter     : {}", id.counter(config.node_bits))?;
    writeln!(out, "{id:#?}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn config(node: Option<u32>) -> Config {
        Config {
            node,
            node_bits: 10,
            epoch: Duration::ZERO,
            clock: ClockKind::System,
        }
    }

    #[test]
    fn generate_writes_one_id_per_line() {
        for atomic in [false, true] {
            let mut out = Vec::new();
            generate(&mut out, &config(Some(5)), SystemClock, 3, atomic).unwrap();
            let text = String::from_utf8(out).unwrap();
            let ids: Vec<Tsid> = text.lines().map(|l| l.parse().unwrap()).collect();
            assert_eq!(ids.len(), 3);
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
            assert!(ids.iter().all(|id| id.node(10) == 5));
        }
    }

    #[test]
    fn inspect_reports_fields() {
        let id = Tsid::from_components(1_000, 7, 9, 10);
        let mut out = Vec::new();
        inspect(&mut out, &config(None), id).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("canonical   : {id}")));
        assert!(text.contains("unix millis : 1000"));
        assert!(text.contains("node        : 7 (10 bits)"));
        assert!(text.contains("counter     : 9"));
    }

    #[test]
    fn decode_prints_canonical() {
        let mut out = Vec::new();
        decode(&mut out, "05772439BB9F9074", 16).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0AXS476XSZ43M\n");

        let mut out = Vec::new();
        assert!(decode(&mut out, "zz", 10).is_err());
        assert!(decode(&mut out, "1", 63).is_err());
    }

    #[test]
    fn inspect_saturates_far_epochs() {
        let mut far = config(None);
        far.epoch = Duration::from_millis(u64::MAX);
        let mut out = Vec::new();
        inspect(&mut out, &far, Tsid::from_raw(u64::MAX)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("unix millis : {}", u64::MAX)));
    }

    #[test]
    fn random_node_fits() {
        let factory = builder(&config(None), SystemClock).build().unwrap();
        assert!(factory.node() < 1024);
    }
}
