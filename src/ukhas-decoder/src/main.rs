// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

mod config;
mod output;

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::{debug, info};

use ukhas_app::{init_logging, ConfigFile};
use ukhas_core::DynResult;
use ukhas_fsk::{SampleReader, UkhasDecoder};

use config::{DecoderConfig, OutputFormat};
use output::EventWriter;

const PKG_DESCRIPTION: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " - UKHASnet packet decoder for rtl_fm output"
);
const STDIN_PATH: &str = "-";

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
    after_help = "Expects rtl_fm output:\n  \
        rtl_fm -f 433961890 -s 64k -g 0 -p 162 | ukhas-decoder -v -s 64000\n  \
        rtl_fm -f 433961890 -s 64k -g 0 -p 162 -r 8000 | ukhas-decoder -v -s 8000",
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Sample rate in Hz (at least 4000 and a multiple of 2000)
    #[arg(short = 's', long = "sample-rate", value_name = "HZ")]
    sample_rate: Option<u32>,
    /// Print sync, length and checksum diagnostics
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// Read s16le samples from FILE instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: Option<String>,
    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<OutputFormat>,
    /// Print timestamps in UTC
    #[arg(long = "utc")]
    utc: bool,
}

/// CLI values take priority over the config file.
fn apply_cli_overrides(cli: &Cli, cfg: &mut DecoderConfig) {
    if let Some(rate) = cli.sample_rate {
        cfg.input.sample_rate = rate;
    }
    if let Some(ref input) = cli.input {
        cfg.input.path = input.clone();
    }
    if let Some(format) = cli.format {
        cfg.output.format = format;
    }
    if cli.verbose {
        cfg.general.verbose = true;
    }
    if cli.utc {
        cfg.output.utc = true;
    }
}

fn open_input(path: &str) -> DynResult<Box<dyn Read>> {
    if path == STDIN_PATH {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|e| format!("Failed to open input {}: {}", path, e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Pull samples until the input is exhausted, writing every event.
fn run<R: Read, W: Write>(
    input: R,
    decoder: &mut UkhasDecoder,
    writer: &mut EventWriter<W>,
) -> DynResult<()> {
    for sample in SampleReader::new(input) {
        if let Some(event) = decoder.process_sample(sample?) {
            debug!("{:?}", event);
            writer.write_event(&event)?;
        }
    }
    Ok(())
}

fn main() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", DecoderConfig::example_combined_toml());
        return Ok(());
    }

    let (mut cfg, config_path) = DecoderConfig::resolve(cli.config.as_deref())?;
    apply_cli_overrides(&cli, &mut cfg);
    cfg.validate()
        .map_err(|e| format!("Invalid decoder configuration: {}", e))?;

    init_logging(cfg.general.log_level.as_deref());

    if let Some(ref path) = config_path {
        info!("Loaded configuration from {}", path.display());
    }

    let mut decoder = UkhasDecoder::new(cfg.input.sample_rate)?;
    info!(
        "Starting ukhas-decoder (input: {}, sample rate: {} Hz, {} samples/bit)",
        cfg.input.path,
        cfg.input.sample_rate,
        decoder.slicer().ratio()
    );
    if cfg.general.verbose {
        info!("Verbose mode");
    }

    let input = open_input(&cfg.input.path)?;
    let stdout = io::stdout();
    let mut writer = EventWriter::new(stdout.lock(), &cfg.output, cfg.general.verbose);

    let started = Instant::now();
    run(input, &mut decoder, &mut writer)?;
    let elapsed = started.elapsed();

    let stats = decoder.stats();
    if cfg.output.summary {
        writer.write_summary(stats.samples, elapsed)?;
    }
    info!(
        "{} samples in {:.1} s: {} packets, {} syncs, {} CRC errors, {} oversize",
        stats.samples,
        elapsed.as_secs_f64(),
        stats.packets,
        stats.syncs,
        stats.crc_errors,
        stats.oversize
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use ukhas_fsk::frame::{bits_to_samples, frame_bits, samples_to_bytes};

    fn capture(payloads: &[&[u8]], sample_rate: u32) -> Vec<u8> {
        let ratio = ukhas_fsk::oversampling_ratio(sample_rate).unwrap();
        let mut bits = Vec::new();
        for payload in payloads {
            bits.extend(frame_bits(6, payload).unwrap());
        }
        samples_to_bytes(&bits_to_samples(&bits, ratio, 4_000))
    }

    fn text_writer(verbose: bool) -> EventWriter<Vec<u8>> {
        let cfg = OutputConfig {
            timestamp_format: "T".to_string(),
            ..OutputConfig::default()
        };
        EventWriter::new(Vec::new(), &cfg, verbose)
    }

    #[test]
    fn test_run_emits_one_line_per_packet() {
        let input = capture(&[b"ABC", b"0aT21.2[GW]"], 64_000);
        let mut decoder = UkhasDecoder::new(64_000).unwrap();
        let mut writer = text_writer(false);
        run(&input[..], &mut decoder, &mut writer).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "T PACKET ABC\nT PACKET 0aT21.2[GW]\n");
        assert_eq!(decoder.stats().samples, input.len() as u64 / 2);
    }

    #[test]
    fn test_run_verbose_reports_mismatch() {
        let mut input = capture(&[b"ABC"], 8_000);
        // Invert every sample of the first payload bit.
        let ratio = 4;
        let first_payload_bit = (6 + 2 + 1) * 8;
        let start = first_payload_bit * ratio * 2;
        for pair in input[start..start + ratio * 2].chunks_exact_mut(2) {
            let s = -i16::from_le_bytes([pair[0], pair[1]]);
            pair.copy_from_slice(&s.to_le_bytes());
        }

        let mut decoder = UkhasDecoder::new(8_000).unwrap();
        let mut writer = text_writer(true);
        run(&input[..], &mut decoder, &mut writer).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3, "got: {:?}", lines);
        assert_eq!(lines[0], "T Sync: 2DAA");
        assert_eq!(lines[1], "T Parsing 3 bytes");
        assert!(lines[2].starts_with("T CRC mismatch: read("));
        assert!(!out.contains("PACKET"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "ukhas-decoder",
            "-s",
            "8000",
            "-v",
            "-f",
            "json",
            "-i",
            "capture.s16",
            "--utc",
        ]);
        let mut cfg = DecoderConfig::default();
        apply_cli_overrides(&cli, &mut cfg);
        assert_eq!(cfg.input.sample_rate, 8_000);
        assert_eq!(cfg.input.path, "capture.s16");
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(cfg.general.verbose);
        assert!(cfg.output.utc);
    }

    #[test]
    fn test_cli_rejected_sample_rate_fails_validation() {
        let cli = Cli::parse_from(["ukhas-decoder", "-s", "3000"]);
        let mut cfg = DecoderConfig::default();
        apply_cli_overrides(&cli, &mut cfg);
        assert!(cfg.validate().is_err());
    }
}
