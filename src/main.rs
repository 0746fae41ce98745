//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run an `.ls8` or `.asm` file
//! - `ls8-emu debug <program>` - Interactive debugger
//! - `ls8-emu asm <source>` - Assemble to `.ls8`
//! - `ls8-emu disasm <program>` - Disassemble an `.ls8` file
//! - `ls8-emu test` - Built-in self-test

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator for the LS-8 8-bit register machine")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 or .asm file to execute
        program: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Print a trace line before every instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the final machine state as JSON
        #[arg(long)]
        dump_state: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the .ls8 or .asm file to debug
        program: String,
    },
    /// Assemble source to .ls8
    Asm {
        /// Path to the source file
        source: String,
        /// Output .ls8 file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble .ls8 to readable text
    Disasm {
        /// Path to the .ls8 file
        program: String,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, dump_state }) => {
            run_program(&program, max_cycles, trace, dump_state);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("LS-8 Emulator v0.1.0");
            println!("An 8-bit register machine emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialise logging: {}", e);
    }
}

/// Read a program, assembling `.asm` sources on the way.
fn read_program(path: &str) -> Vec<u8> {
    use ls8::{assemble, load_program};

    let program = if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(bytes) => {
                log::info!("assembled {} bytes from {}", bytes.len(), path);
                bytes
            }
            Err(e) => {
                eprintln!("Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match load_program(path) {
            Ok(bytes) => {
                log::info!("loaded {} bytes from {}", bytes.len(), path);
                bytes
            }
            Err(e) => {
                eprintln!("Failed to load program: {}", e);
                std::process::exit(1);
            }
        }
    };

    if program.is_empty() {
        eprintln!("No instructions to execute");
        std::process::exit(1);
    }

    program
}

fn run_program(path: &str, max_cycles: u64, trace: bool, dump_state: bool) {
    use ls8::{ConsoleReporter, Cpu};

    let program = read_program(path);

    // Create CPU and load program
    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_program(&program) {
        eprintln!("Failed to load program: {}", e);
        std::process::exit(1);
    }

    let mut reporter = ConsoleReporter;
    let result = if trace {
        cpu.run_traced(&mut reporter, max_cycles, |line| println!("{}", line))
    } else {
        cpu.run_limited(&mut reporter, max_cycles)
    };

    if dump_state {
        match serde_json::to_string_pretty(&cpu) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize state: {}", e),
        }
    }

    match result {
        Ok(_) if cpu.is_running() => {
            eprintln!("Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
            std::process::exit(2);
        }
        Ok(cycles) => {
            log::info!("{} cycles, final state {:?}", cycles, cpu.state);
        }
        // The diagnostic has already gone through the reporter
        Err(_) => std::process::exit(1),
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    let program = read_program(path);

    if let Err(e) = ls8::run_debugger(program) {
        eprintln!("Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("This build has no debugger; rebuild with the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use ls8::{assemble, save_program};

    let out_path = output.unwrap_or_else(|| {
        source_path.strip_suffix(".asm").unwrap_or(source_path).to_string() + ".ls8"
    });

    println!("Assembling: {} → {}", source_path, out_path);

    // Read source
    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    // Assemble
    let program = match assemble(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Assembled {} bytes", program.len());

    if let Err(e) = save_program(&out_path, &program) {
        eprintln!("Failed to save program: {}", e);
        std::process::exit(1);
    }

    println!("Saved to {}", out_path);
}

fn disassemble_file(path: &str) {
    use ls8::{disassemble, load_program};

    let program = match load_program(path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to load program: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", disassemble(&program));
}

fn run_self_test() {
    use ls8::{assemble, CaptureReporter, Cpu, CpuError, Reporter};
    use ls8::cpu::alu::{self, AluOp};
    use ls8::cpu::decode::{self, DISPATCH_TABLE};

    println!("━━━ LS-8 Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };

    let run = |source: &str| -> (Cpu, CaptureReporter, Result<u64, CpuError>) {
        let mut cpu = Cpu::new();
        let mut out = CaptureReporter::new();
        let result = match assemble(source) {
            Ok(program) => match cpu.load_program(&program) {
                Ok(()) => cpu.run_limited(&mut out, 1000),
                Err(e) => Err(e.into()),
            },
            Err(e) => {
                out.diagnostic(&e.to_string());
                Ok(0)
            }
        };
        (cpu, out, result)
    };

    // Test 1: Dispatch table agrees with the opcode bits
    check(
        "Dispatch table matches opcode bit fields",
        DISPATCH_TABLE.iter().all(|d| {
            decode::operand_count_of(d.opcode) == d.operand_count && decode::is_alu(d.opcode) == d.is_alu
        }),
    );

    // Test 2: ALU wraparound
    let mut ok = true;
    for a in 0..=255u8 {
        for b in [0u8, 1, 2, 127, 128, 255] {
            ok &= alu::apply(AluOp::Add, a, b) == Ok(((a as u16 + b as u16) % 256) as u8);
            ok &= alu::apply(AluOp::Sub, a, b) == Ok(((a as i16 - b as i16).rem_euclid(256)) as u8);
            ok &= alu::apply(AluOp::Mul, a, b) == Ok(((a as u16 * b as u16) % 256) as u8);
        }
    }
    check("ALU arithmetic wraps mod 256", ok);

    // Test 3: Multiply program
    let (cpu, out, result) = run("LDI R0, 8\nLDI R1, 9\nMUL R0, R1\nPRN R0\nHLT");
    check("LDI/MUL/PRN prints 72", result.is_ok() && cpu.is_halted() && out.output() == "72\n");

    // Test 4: Addition overflow
    let (_, out, _) = run("LDI R0, 200\nLDI R1, 100\nADD R0, R1\nPRN R0\nHLT");
    check("ADD wraps 300 to 44", out.values == [44]);

    // Test 5: Stack round trip
    let (cpu, _, result) = run("LDI R3, 42\nPUSH R3\nLDI R3, 0\nPOP R3\nHLT");
    check(
        "PUSH then POP restores register and SP",
        result.is_ok() && cpu.regs.get(3) == Ok(42) && cpu.regs.sp() == 0xF4,
    );

    // Test 6: Division by zero halts without an error
    let (cpu, out, result) = run("LDI R0, 1\nDIV R0, R1\nHLT");
    check(
        "Division by zero halts gracefully",
        result.is_ok() && cpu.is_halted() && out.diagnostics.len() == 1,
    );

    // Test 7: Unknown opcode
    let mut cpu = Cpu::new();
    let mut out = CaptureReporter::new();
    check(
        "Unknown opcode is a fatal fault",
        cpu.load_program(&[0xFF]).is_ok()
            && matches!(cpu.run(&mut out), Err(ref e) if e.kind() == "UnknownOpcode"),
    );

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
