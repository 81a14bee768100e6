use std::{fmt::Display, process::ExitCode};

use lstar_core::prelude::*;
use lstar_learning::{prelude::*, Refinement};
use owo_colors::OwoColorize;

use tracing::{debug, error, trace, warn};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

mod targets;

const RULE: &str = "=======================================================";
const THIN_RULE: &str = "-------------------------------------------------------";

fn cli() -> clap::Command {
    Command::new("lstar-tutor")
        .about("Learns the tutorial automata with L* and narrates every step")
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info")
                .global(true),
        )
        .arg(
            Arg::new("depth")
                .short('d')
                .long("depth")
                .help("exploration depth of the W-method")
                .value_parser(clap::value_parser!(usize))
                .default_value("2")
                .global(true),
        )
        .arg(
            Arg::new("states")
                .short('n')
                .long("states")
                .help("number of states of the modular targets")
                .value_parser(clap::value_parser!(u32).range(2..))
                .default_value("4")
                .global(true),
        )
        .arg(
            Arg::new("step")
                .short('s')
                .long("step")
                .help("wait for ENTER before every step")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("dfa").about("learns a DFA over a and b"))
        .subcommand(Command::new("mealy").about("learns a Mealy machine over a, b and c"))
        .subcommand(Command::new("moore").about("learns a Moore machine over a, b and c"))
        .subcommand(
            Command::new("abstract-dfa")
                .about("learns a modular DFA over 1..1000 on the inputs 1..12"),
        )
        .subcommand(
            Command::new("abstract-mealy")
                .about("learns a modular Mealy machine through the abstract inputs 1, 2 and 3"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn banner(title: impl Display) {
    println!("{RULE}");
    println!(" {}", title.bold());
    println!("{THIN_RULE}");
}

/// Prints every step of a session to stdout, optionally waiting for the user in between.
struct Narrator {
    step: bool,
}

impl Narrator {
    fn pause(&self, prompt: &str) {
        if !self.step {
            return;
        }
        println!("Press {} to continue to {prompt}...", "ENTER".bold());
        let mut line = String::new();
        if let Err(err) = std::io::stdin().read_line(&mut line) {
            warn!("could not read from stdin: {err}");
        }
    }
}

impl<H: Machine + Display> LearningObserver<H> for Narrator {
    fn table_initialized(&mut self, table: &ObservationTable<H::Symbol, H::Output>) {
        banner("Initialized observation table");
        println!("{}", table.to_colored_string());
        self.pause("start learning");
    }

    fn table_closed(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        promoted: &[Word<H::Symbol>],
    ) {
        banner("Closing observation table");
        println!("Moved {} to the short prefixes", promoted.show().blue());
        println!("Open hypothesis model:\n{}", table.partial_model());
        println!("{}", table.to_colored_string());
        self.pause("check consistency");
    }

    fn table_made_consistent(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        added: &[Word<H::Symbol>],
    ) {
        banner("Making observation table consistent");
        println!("Added the suffixes {}", added.show().blue());
        println!("{}", table.to_colored_string());
        self.pause("continue learning");
    }

    fn hypothesis_built(
        &mut self,
        round: usize,
        table: &ObservationTable<H::Symbol, H::Output>,
        hypothesis: &Hypothesis<H>,
    ) {
        banner(format!("Hypothesis {round}"));
        println!("{}", table.to_colored_string());
        println!("Model:\n{hypothesis}");
    }

    fn counterexample_found(
        &mut self,
        _round: usize,
        counterexample: &Counterexample<H::Symbol, H::Output>,
    ) {
        println!("Counterexample: {}", counterexample.red());
        self.pause("refine the hypothesis");
    }

    fn table_refined(
        &mut self,
        table: &ObservationTable<H::Symbol, H::Output>,
        refinement: &Refinement<H::Symbol>,
    ) {
        banner("Refining observation table");
        println!("{refinement}");
        println!("{}", table.to_colored_string());
    }
}

/// Membership queries posed by the learner itself.
fn counted<M: MembershipOracle>(oracle: M) -> (CountingOracle<M>, QueryCounter) {
    let counting = CountingOracle::new(oracle, "Membership Queries");
    let counter = counting.counter();
    (counting, counter)
}

type Conformance<M> = CountingOracle<WMethodOracle<CountingOracle<M>>>;

/// A W-method oracle on top of `oracle`, counting both its membership queries and the
/// equivalence queries it answers.
fn conformance<M: MembershipOracle>(oracle: M, depth: usize) -> (Conformance<M>, Vec<QueryCounter>) {
    let testing = CountingOracle::new(oracle, "Membership Queries (Conformance Testing)");
    let tests = testing.counter();
    let equivalence = CountingOracle::new(WMethodOracle::new(testing, depth), "Equivalence Queries");
    let rounds = equivalence.counter();
    (equivalence, vec![tests, rounds])
}

fn run<H, M, E>(
    alphabet: Alphabet<H::Symbol>,
    membership: M,
    equivalence: E,
    counters: Vec<QueryCounter>,
    step: bool,
) -> Result<(), LearningError>
where
    H: LStarHypothesis + Display,
    M: MembershipOracle<Symbol = H::Symbol, Output = H::Output>,
    E: EquivalenceOracle<H>,
{
    debug!("learning over the alphabet {alphabet}");
    let start = std::time::Instant::now();
    let mut learner = LStar::<H, M>::new(alphabet, membership)?.with_observer(Narrator { step });
    let hypothesis = learner.learn(equivalence)?;
    let statistics = learner.statistics();

    banner("Final hypothesis");
    for counter in counters {
        println!("{counter}");
    }
    println!("{statistics}");
    println!();
    println!("Observation table:\n{}", learner.table().to_colored_string());
    println!();
    println!("Model:\n{hypothesis}");
    debug!("learning took {}ms", start.elapsed().as_millis());
    Ok(())
}

fn tutorial(matches: &ArgMatches) -> Result<(), LearningError> {
    let depth = matches.get_one::<usize>("depth").copied().unwrap_or(2);
    let states = matches.get_one::<u32>("states").copied().unwrap_or(4);
    let step = matches.get_flag("step");

    match matches.subcommand() {
        Some(("dfa", _)) => {
            let target = targets::angluin()?;
            let (membership, queries) = counted(SimulatorOracle::new(target.clone()));
            let (equivalence, mut counters) = conformance(SimulatorOracle::new(target.clone()), depth);
            counters.insert(0, queries);
            run::<Dfa<char>, _, _>(target.alphabet().clone(), membership, equivalence, counters, step)
        }
        Some(("mealy", _)) => {
            let target = targets::xyz_mealy()?;
            let (membership, queries) = counted(SimulatorOracle::new(target.clone()));
            let (equivalence, mut counters) = conformance(SimulatorOracle::new(target.clone()), depth);
            counters.insert(0, queries);
            run::<MealyMachine<char, char>, _, _>(
                target.alphabet().clone(),
                membership,
                equivalence,
                counters,
                step,
            )
        }
        Some(("moore", _)) => {
            let target = targets::xyz_moore()?;
            let (membership, queries) = counted(SimulatorOracle::new(target.clone()));
            let (equivalence, mut counters) = conformance(SimulatorOracle::new(target.clone()), depth);
            counters.insert(0, queries);
            run::<MooreMachine<char, char>, _, _>(
                target.alphabet().clone(),
                membership,
                equivalence,
                counters,
                step,
            )
        }
        Some(("abstract-dfa", _)) => {
            let target = targets::modular_dfa(states)?;
            let alphabet = Alphabet::new((1..=12).collect())?;
            let (membership, queries) = counted(SimulatorOracle::new(target.clone()));
            let (equivalence, mut counters) = conformance(SimulatorOracle::new(target), depth);
            counters.insert(0, queries);
            run::<Dfa<u32>, _, _>(alphabet, membership, equivalence, counters, step)
        }
        Some(("abstract-mealy", _)) => {
            let target = targets::modular_mealy(states)?;
            let alphabet = Alphabet::new(vec!["1".to_string(), "2".into(), "3".into()])?;
            let abstracted = |target: MealyMachine<u32, u32>| {
                MappedOracle::new(
                    SimulatorOracle::new(target),
                    |sym: &String| sym.parse::<u32>().ok(),
                    |out: Word<u32>| out.symbols().map(u32::to_string).collect::<Word<String>>(),
                )
            };
            let (membership, queries) = counted(abstracted(target.clone()));
            let (equivalence, mut counters) = conformance(abstracted(target), depth);
            counters.insert(0, queries);
            run::<MealyMachine<String, String>, _, _>(alphabet, membership, equivalence, counters, step)
        }
        _ => unreachable!(),
    }
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    match tutorial(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("learning failed: {err}");
            eprintln!("{}", err.red());
            ExitCode::FAILURE
        }
    }
}
