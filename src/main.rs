mod core;
mod grab;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use crate::core::sampler::{Sampler, DEFAULT_INTERVAL, DEFAULT_PREFIX};
use crate::core::shutdown;
use crate::grab::flags;
use crate::grab::source::{FrameSource, TestPatternSource};

#[derive(Parser)]
#[command(version, about = "Periodically grab a frame and write it to disk as a PNG snapshot")]
struct Cli {
    /// Grab flags for the frame source, hex ("0x10000") or decimal
    #[arg(short, long)]
    flags: Option<String>,

    /// List the supported grab flags and exit
    #[arg(short, long)]
    list: bool,

    /// Print the flag list as JSON (only with --list)
    #[arg(long, requires = "list")]
    json: bool,

    /// Frame width in pixels
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap routes --help/--version through the error path with
            // exit 0; real usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    if cli.list {
        print_flag_list(cli.json);
        return ExitCode::SUCCESS;
    }

    let grab_flags = match cli.flags.as_deref() {
        Some(input) => match flags::parse_flags(input) {
            Ok(mask) => {
                println!("Resulting flags: {} (=0x{:08x})", mask, mask);
                mask
            }
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        },
        None => 0,
    };

    match run(grab_flags, cli.width, cli.height) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(grab_flags: u32, width: u32, height: u32) -> Result<()> {
    let running = shutdown::install()?;

    let mut source = TestPatternSource::new(width, height);
    source.set_flags(grab_flags);

    println!(
        "Sampling {}x{} frames every {:?} into {}<index>.png; press Ctrl-C to stop",
        width, height, DEFAULT_INTERVAL, DEFAULT_PREFIX
    );

    let mut sampler = Sampler::new(source, DEFAULT_PREFIX, DEFAULT_INTERVAL);
    sampler.run(&running)?;

    println!("Stopped after {} snapshot(s)", sampler.frame_index());
    Ok(())
}

fn print_flag_list(as_json: bool) {
    if as_json {
        let entries: Vec<_> = flags::FLAG_TABLE
            .iter()
            .map(|&(name, value)| {
                json!({
                    "name": name,
                    "value": value,
                    "hex": format!("0x{:08x}", value),
                })
            })
            .collect();
        println!("{}", json!({ "flags": entries }));
    } else {
        println!("Supported grab flags:");
        println!("{:<24}| Value", "Name");
        println!("{:-<24}|-----------", "");
        for (name, value) in flags::FLAG_TABLE.iter() {
            println!("{:<24}| 0x{:08x}", name, value);
        }
    }
}
