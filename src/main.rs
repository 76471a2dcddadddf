use std::env;
use std::process;

use nes_cpu_core::cartridge::Cartridge;
use nes_cpu_core::debug_flags;
use nes_cpu_core::save_state::SaveState;
use nes_cpu_core::{Emulator, RunOutcome};

// nestest writes its failure codes here
const RESULT_ADDR: u16 = 0x0002;

const EXIT_CPU_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_STARTUP: i32 = 3;

struct Options {
    rom: String,
    entry: Option<u16>,
    save: Option<String>,
    load: Option<String>,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--entry HEX] [--steps N] [--trace] [--save PATH] [--load PATH] <rom>",
        program
    );
    eprintln!("Accepts iNES images or raw PRG images of up to 32 KiB.");
}

fn value_of(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(v) => v.clone(),
        None => {
            eprintln!("{} requires a value", flag);
            process::exit(EXIT_USAGE);
        }
    }
}

fn parse_args(args: &[String]) -> Options {
    let program = args.first().map(String::as_str).unwrap_or("nes-cpu-core");
    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        usage(program);
        process::exit(if args.len() < 2 { EXIT_USAGE } else { 0 });
    }

    let mut rom = None;
    let mut entry = None;
    let mut save = None;
    let mut load = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--entry" => {
                let v = value_of(args, i, "--entry");
                let hex = v.trim_start_matches('$').trim_start_matches("0x");
                match u16::from_str_radix(hex, 16) {
                    Ok(addr) => entry = Some(addr),
                    Err(_) => {
                        eprintln!("--entry: invalid address '{}'", v);
                        process::exit(EXIT_USAGE);
                    }
                }
                i += 2;
            }
            "--steps" => {
                let v = value_of(args, i, "--steps");
                if v.parse::<u64>().is_err() {
                    eprintln!("--steps: invalid count '{}'", v);
                    process::exit(EXIT_USAGE);
                }
                env::set_var("STEP_LIMIT", &v);
                i += 2;
            }
            "--trace" => {
                env::set_var("TRACE_CPU", "1");
                i += 1;
            }
            "--save" => {
                save = Some(value_of(args, i, "--save"));
                i += 2;
            }
            "--load" => {
                load = Some(value_of(args, i, "--load"));
                i += 2;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                process::exit(EXIT_USAGE);
            }
            s => {
                if rom.is_some() {
                    eprintln!("Unexpected argument: {}", s);
                    process::exit(EXIT_USAGE);
                }
                rom = Some(s.to_string());
                i += 1;
            }
        }
    }

    let rom = match rom {
        Some(r) => r,
        None => {
            eprintln!("ROM argument missing");
            process::exit(EXIT_USAGE);
        }
    };
    Options {
        rom,
        entry,
        save,
        load,
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    // Flags are applied through the environment, so parse before anything
    // reads debug_flags.
    let options = parse_args(&args);

    let default_level = if debug_flags::trace_cpu() { "trace" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut emulator = match start(&options) {
        Ok(emulator) => emulator,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            process::exit(EXIT_STARTUP);
        }
    };

    let quiet = debug_flags::quiet();
    let limit = debug_flags::step_limit();
    if !quiet {
        println!(
            "Running from ${:04X} (step limit: {})",
            emulator.cpu().pc,
            if limit == 0 {
                "none".to_string()
            } else {
                limit.to_string()
            }
        );
    }

    let outcome = match emulator.run(limit) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("CPU halted: {}", e);
            emulator.debugger().dump_trace();
            process::exit(EXIT_CPU_ERROR);
        }
    };

    if !quiet {
        match outcome {
            RunOutcome::StepLimit => println!("Step limit reached"),
            RunOutcome::Breakpoint(pc) => println!("Breakpoint at ${:04X}", pc),
            RunOutcome::Trapped(pc) => println!("Trapped at ${:04X}", pc),
        }
        println!(
            "{} instructions, {}",
            emulator.debugger().instruction_count(),
            emulator.cpu().snapshot()
        );
        println!(
            "Result bytes ${:04X}: {:02X} {:02X}",
            RESULT_ADDR,
            emulator.bus().peek(RESULT_ADDR),
            emulator.bus().peek(RESULT_ADDR + 1)
        );
    }

    if let Some(path) = &options.save {
        if let Err(e) = emulator.save_state().save_to_file(path) {
            eprintln!("Failed to write save state: {}", e);
            process::exit(EXIT_STARTUP);
        }
    }
}

fn start(options: &Options) -> Result<Emulator, Box<dyn std::error::Error>> {
    let cartridge = Cartridge::load(&options.rom)?;
    if !debug_flags::quiet() {
        println!(
            "Loaded {} ({} bytes PRG, mapper {})",
            options.rom,
            cartridge.prg_rom().len(),
            cartridge.mapper()
        );
    }

    let mut emulator = Emulator::with_cartridge(&cartridge);
    if let Some(path) = &options.load {
        let state = SaveState::load_from_file(path)?;
        emulator.load_state(&state)?;
    } else if let Some(entry) = options.entry {
        emulator.reset_to(entry);
    } else {
        emulator.reset();
    }
    Ok(emulator)
}
