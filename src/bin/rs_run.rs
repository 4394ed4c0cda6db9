extern crate rs_script;

use clap::Parser as CParser;
use log::error;
use rs_script::engine::{RunOptions, ScriptEngine};
use rs_script::host::memory::{HeadlessAppRegistry, InMemoryEventBus, InMemoryFileSystem, NullCommandBus};
use rs_script::host::HostContext;
use rs_script::safety::SafetyLimits;

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long)]
    file: std::path::PathBuf,

    #[arg(short, long)]
    timeout: Option<u64>,

    /// Path to a JSON file overriding the default safety limits; unset
    /// fields keep their default value.
    #[arg(long)]
    safety_config: Option<std::path::PathBuf>,
}

fn load_safety_limits(path: Option<&std::path::Path>) -> SafetyLimits {
    let Some(path) = path else {
        return SafetyLimits::default();
    };
    match std::fs::read_to_string(path).ok().and_then(|s| serde_json::from_str(&s).ok()) {
        Some(limits) => limits,
        None => {
            error!("Could not load safety config from '{}', using defaults", path.to_string_lossy());
            SafetyLimits::default()
        }
    }
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();
    let args = Cli::parse();

    let file_content = std::fs::read_to_string(&args.file)
        .unwrap_or_else(|_| panic!("Could not read file: '{}'", args.file.to_string_lossy()));

    let mut host = HostContext::new();
    host.event_bus = Some(Box::new(InMemoryEventBus::default()));
    host.command_bus = Some(Box::new(NullCommandBus::default()));
    host.filesystem = Some(Box::new(InMemoryFileSystem::default()));
    host.app_registry = Some(Box::new(HeadlessAppRegistry::default()));

    let safety = load_safety_limits(args.safety_config.as_deref());
    let mut engine = ScriptEngine::initialize(host, safety);
    let options = RunOptions { timeout_ms: args.timeout, variables: Vec::new() };

    match engine.run(&file_content, options) {
        Ok(outcome) => {
            for line in &outcome.output {
                println!("{line}");
            }
            if let Some(err) = outcome.error {
                error!("{}", err.to_string_with_context(&file_content, 1));
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
