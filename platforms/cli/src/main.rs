use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use turing_flow::{
    analyze, compile, decode, encode, EngineConfig, Halt, MachineLibrary, MachineLoader,
    MachineRecord, Snapshot, Speed, Tape, TuringMachine,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Print debug logs, including every executed step
    #[clap(short = 'd', long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode an {a,b} encoding into a machine and print it as JSON
    Decode {
        /// The encoding; read from stdin when omitted
        encoding: Option<String>,

        /// Mark this state as the start state
        #[clap(long)]
        start: Option<String>,
    },
    /// Encode a machine into the {a,b} format
    Encode {
        /// A machine file (.json or .ab) or the name of a built-in machine
        machine: String,
    },
    /// Print the transition table of a machine as JSON
    Compile {
        /// A machine file (.json or .ab) or the name of a built-in machine
        machine: String,
    },
    /// Report dropped rules and structural problems of a machine
    Check {
        /// A machine file (.json or .ab) or the name of a built-in machine
        machine: String,
    },
    /// Run a machine on a tape
    Run {
        /// A machine file (.json or .ab) or the name of a built-in machine
        machine: String,

        /// The initial tape contents
        #[clap(short, long, default_value = "")]
        tape: String,

        /// The initial head position
        #[clap(long, default_value_t = 0)]
        head: usize,

        /// Start from this state instead of the machine's start state
        #[clap(long)]
        start: Option<String>,

        /// Run speed in percent (1-100)
        #[clap(long)]
        speed: Option<u8>,

        /// An engine configuration file (TOML)
        #[clap(long)]
        config: Option<PathBuf>,

        /// Run without pausing between steps
        #[clap(long)]
        no_delay: bool,
    },
    /// List the built-in machines
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.command {
        Command::Decode { encoding, start } => decode_command(encoding, start),
        Command::Encode { machine } => {
            let machine = resolve_machine(&machine)?;
            println!("{}", encode(&machine.diagram)?);
            Ok(())
        }
        Command::Compile { machine } => {
            let machine = resolve_machine(&machine)?;
            let compilation = compile(&machine.diagram);
            println!("{}", compilation.table.to_json()?);
            Ok(())
        }
        Command::Check { machine } => check_command(&machine),
        Command::Run {
            machine,
            tape,
            head,
            start,
            speed,
            config,
            no_delay,
        } => {
            let options = RunOptions {
                tape,
                head,
                start,
                speed,
                config,
                no_delay,
            };
            run_command(&machine, options).await
        }
        Command::List => {
            for index in 0..MachineLibrary::count() {
                let info = MachineLibrary::info(index)?;
                println!(
                    "{:>2}  {:<20} {} states, {} transitions",
                    info.index, info.name, info.state_count, info.transition_count
                );
            }
            Ok(())
        }
    }
}

/// Loads `arg` as a machine file when such a path exists, as a built-in machine otherwise.
fn resolve_machine(arg: &str) -> Result<MachineRecord> {
    let path = Path::new(arg);
    if path.exists() {
        return MachineLoader::load_machine(path)
            .with_context(|| format!("failed to load machine file {}", path.display()));
    }

    MachineLibrary::get_by_name(arg).with_context(|| {
        format!(
            "'{}' is neither a machine file nor a built-in machine ({})",
            arg,
            MachineLibrary::names().join(", ")
        )
    })
}

fn decode_command(encoding: Option<String>, start: Option<String>) -> Result<()> {
    let encoding = match encoding {
        Some(encoding) => encoding,
        None if atty::isnt(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read encoding from stdin")?;
            buffer
        }
        None => bail!("no encoding given; pass it as an argument or pipe it to stdin"),
    };

    let mut diagram = decode(&encoding)?;
    if let Some(start) = start {
        diagram.make_sole_start(&start)?;
    }

    println!("{}", serde_json::to_string_pretty(&diagram)?);
    Ok(())
}

fn check_command(machine: &str) -> Result<()> {
    let machine = resolve_machine(machine)?;
    let compilation = compile(&machine.diagram);

    for warning in &compilation.warnings {
        println!("warning: {}", warning);
    }

    let problems = analyze(&compilation.table);
    for problem in &problems {
        println!("error: {}", problem);
    }

    if !problems.is_empty() {
        bail!("machine '{}' has {} problem(s)", machine.id, problems.len());
    }

    println!(
        "machine '{}' is valid: {} states, {} transitions",
        machine.id,
        machine.diagram.states.len(),
        compilation.table.transition_count()
    );
    Ok(())
}

struct RunOptions {
    tape: String,
    head: usize,
    start: Option<String>,
    speed: Option<u8>,
    config: Option<PathBuf>,
    no_delay: bool,
}

async fn run_command(machine: &str, options: RunOptions) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(speed) = options.speed {
        config = config.with_speed(Speed::new(speed)?);
    }

    let record = resolve_machine(machine)?;
    let table = compile(&record.diagram).table;

    let mut tape = Tape::with_input(&options.tape, config.tape_length);
    tape.set_head(options.head)?;

    let mut machine = match &options.start {
        Some(state) => TuringMachine::at(table, tape, state)?,
        None => TuringMachine::new(table, tape)?,
    };
    machine.set_trace_limit(config.trace_limit);

    println!("{}", render(&machine.snapshot()));

    let halt = if options.no_delay {
        let halt = machine.run_blocking(config.max_steps);
        for snapshot in machine.trace() {
            println!("{}", render(snapshot));
        }
        halt
    } else {
        let outcome = tokio::select! {
            halt = machine.run(config.pacing(), |snapshot| println!("{}", render(snapshot))) => {
                Some(halt)
            }
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(halt) => halt,
            None => {
                println!("\nStopped after {} steps.", machine.step_count());
                return Ok(());
            }
        }
    };

    match halt {
        Halt::Accepted => {
            println!(
                "\nAccepted in state {} after {} steps.",
                machine.state().id,
                machine.step_count()
            );
            Ok(())
        }
        Halt::Err(e) => bail!("machine halted after {} steps: {}", machine.step_count(), e),
    }
}

/// Formats a snapshot with the cell under the head in brackets.
fn render(snapshot: &Snapshot) -> String {
    let tape: String = snapshot
        .tape
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == snapshot.head {
                format!("[{}]", c)
            } else {
                c.to_string()
            }
        })
        .collect();

    format!("{:>5}  {:>4}  {}", snapshot.step, snapshot.state, tape)
}
