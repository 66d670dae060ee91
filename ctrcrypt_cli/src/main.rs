use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use indicatif::ParallelProgressIterator;
use path_clean::PathClean;
use rayon::prelude::*;

#[derive(Parser, Debug)]
struct ActionInfo {
    /// Input ncchinfo.bin path
    #[arg(index = 1)]
    input: String,
}

#[derive(Parser, Debug)]
struct ActionDecrypt {
    /// Input ncchinfo.bin path
    #[arg(index = 1)]
    input: String,

    /// Encrypted payload files, one per descriptor entry, in entry order
    #[arg(index = 2, num_args = 1.., required = true)]
    payloads: Vec<String>,

    /// Key file with slot0xNNKeyX/KeyY entries and the generator constant
    #[arg(short, long)]
    keys: String,

    /// Output directory. Defaults to next to the input descriptor
    #[arg(short, long)]
    output: Option<String>,

    /// Verbose
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct ActionPad {
    /// Input ncchinfo.bin path
    #[arg(index = 1)]
    input: String,

    /// Key file with slot0xNNKeyX/KeyY entries and the generator constant
    #[arg(short, long)]
    keys: String,

    /// Output directory. Defaults to next to the input descriptor
    #[arg(short, long)]
    output: Option<String>,

    /// Verbose
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Print ncchinfo.bin info
    Info(ActionInfo),
    /// List descriptor entries
    List(ActionInfo),
    /// Decrypt payload files against a descriptor
    Decrypt(ActionDecrypt),
    /// Generate the xorpad for every descriptor entry
    Pad(ActionPad),
}

#[derive(Parser, Debug)]
#[command(author, version)]
struct Args {
    #[command(subcommand)]
    action: Action,
}

fn main() -> Result<(), ctrcrypt::Error> {
    let args = Args::parse();

    match args.action {
        Action::Info(args) => info(args),
        Action::List(args) => list(args),
        Action::Decrypt(args) => decrypt(args),
        Action::Pad(args) => pad(args),
    }
}

fn load_descriptor(path: &str) -> Result<ctrcrypt::NcchInfo, ctrcrypt::Error> {
    ctrcrypt::NcchInfo::parse(&fs::read(path)?)
}

/// Load an aeskeydb-style text key file: `name = hex` lines, `;`/`#`
/// comments. Slot keys are named `slot0xNNKeyX` / `slot0xNNKeyY`; the
/// scrambler constant is named `generator`.
fn load_engine(path: &str) -> Result<ctrcrypt::Engine, ctrcrypt::Error> {
    let mut generator = None;
    let mut keys = Vec::new();
    for line in fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name == "generator" {
            generator = Some(ctrcrypt::parse_key(value)?);
        } else if let Some(slot_and_half) = name.strip_prefix("slot0x") {
            if slot_and_half.len() != 6 {
                return Err(ctrcrypt::Error::Other("key names look like slot0xNNKeyX"));
            }
            let (slot, half) = slot_and_half.split_at(2);
            let slot = u8::from_str_radix(slot, 16)
                .map_err(|_| ctrcrypt::Error::Other("key slot is not a hex byte"))?;
            keys.push((slot, half.to_string(), ctrcrypt::parse_key(value)?));
        }
    }

    let generator = generator.ok_or(ctrcrypt::Error::Other(
        "key file has no generator constant",
    ))?;
    let mut engine = ctrcrypt::Engine::new(generator);
    for (slot, half, key) in keys {
        match half.as_str() {
            "KeyX" => engine.write_key_x(slot, &key)?,
            "KeyY" => engine.write_key_y(slot, &key)?,
            _ => return Err(ctrcrypt::Error::Other("key names end in KeyX or KeyY")),
        }
    }
    Ok(engine)
}

fn resolve_jobs(
    engine: &mut ctrcrypt::Engine,
    info: &ctrcrypt::NcchInfo,
) -> Result<Vec<ctrcrypt::DecryptionJob>, ctrcrypt::Error> {
    info.entries.iter().map(|entry| engine.job(entry)).collect()
}

fn output_dir(output: Option<String>, input: &str) -> Result<PathBuf, ctrcrypt::Error> {
    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(input).with_extension(""));
    fs::create_dir_all(&output)?;
    Ok(output)
}

fn output_path(output: &Path, name: &str) -> Result<PathBuf, ctrcrypt::Error> {
    let path = output.join(name.trim_start_matches('/'));
    if !path.clean().starts_with(output) {
        return Err(ctrcrypt::Error::Other(
            "tried to write file outside of output directory",
        ));
    }
    Ok(path)
}

fn info(args: ActionInfo) -> Result<(), ctrcrypt::Error> {
    let info = load_descriptor(&args.input)?;
    println!("version: {}", info.version);
    println!("{} descriptor entries", info.entries.len());
    Ok(())
}

fn list(args: ActionInfo) -> Result<(), ctrcrypt::Error> {
    let info = load_descriptor(&args.input)?;
    for entry in &info.entries {
        println!(
            "{} slot 0x{:02X} {:>6} MB {}",
            hex::encode(entry.title_id),
            entry.key_slot(),
            entry.size_mb,
            entry.output_name
        );
    }
    Ok(())
}

fn decrypt(args: ActionDecrypt) -> Result<(), ctrcrypt::Error> {
    let info = load_descriptor(&args.input)?;
    let mut engine = load_engine(&args.keys)?;
    if args.payloads.len() != info.entries.len() {
        return Err(ctrcrypt::Error::Other(
            "payload count does not match descriptor entry count",
        ));
    }

    let output = output_dir(args.output, &args.input)?;
    let jobs = resolve_jobs(&mut engine, &info)?;
    let engine = &engine;
    jobs.par_iter()
        .zip(&args.payloads)
        .progress_count(jobs.len() as u64)
        .try_for_each(|(job, payload)| {
            if args.verbose {
                println!("decrypting {payload}");
            }
            let mut data = fs::read(payload)?;
            engine.decrypt(job, &mut data)?;
            fs::write(output_path(&output, &job.output_name)?, data)?;
            Ok(())
        })
}

fn pad(args: ActionPad) -> Result<(), ctrcrypt::Error> {
    let info = load_descriptor(&args.input)?;
    let mut engine = load_engine(&args.keys)?;

    let output = output_dir(args.output, &args.input)?;
    let jobs = resolve_jobs(&mut engine, &info)?;
    let engine = &engine;
    jobs.par_iter()
        .progress_count(jobs.len() as u64)
        .try_for_each(|job| {
            if args.verbose {
                println!("padding {}", job.output_name);
            }
            // the pad is the raw keystream: run the cipher over zeros
            let mut pad = vec![0u8; (job.size_mb as usize) << 20];
            engine.decrypt(job, &mut pad)?;
            fs::write(output_path(&output, &job.output_name)?, pad)?;
            Ok(())
        })
}
