mod debug_report;

use dialwise::loader::{self, DialPlan};
use dialwise::{BuildOptions, InvalidPatternPolicy, LeafQuery, PatternKinds, Visibility, abbreviated_dialing, build};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

fn main() {
    env_logger::init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: &CliConfig) -> Result<(), String> {
    let plan = loader::load(&config.plan).map_err(|err| err.to_string())?;
    let visibility = resolve_visibility(config, &plan)?;
    let options = BuildOptions { on_invalid: config.on_invalid };
    let built = build(plan.patterns, &options).map_err(|err| err.to_string())?;
    debug_report::print_build(&built.metrics, config.color);

    let tree = &built.tree;
    if config.tree {
        println!("\n{}", tree.pretty());
    }
    if let Some(depth) = config.leaves {
        let mut query = LeafQuery::new(depth).kinds(config.kinds);
        if let Some(visibility) = &visibility {
            query = query.visibility(visibility.clone());
        }
        debug_report::print_leaves(tree, &tree.find_leaves(&query), config.color);
    }

    let visibility = visibility.unwrap_or_else(|| Visibility::parse(""));
    if config.abbreviated {
        debug_report::print_abbreviated(&abbreviated_dialing(tree, &visibility), config.color);
    }
    for digits in &config.digits {
        let result = tree.lookup(digits, &visibility).map_err(|err| err.to_string())?;
        debug_report::print_lookup(digits, &visibility, &result, config.color);
    }
    Ok(())
}

fn resolve_visibility(config: &CliConfig, plan: &DialPlan) -> Result<Option<Visibility>, String> {
    match (&config.visibility, &config.css) {
        (Some(_), Some(_)) => Err("--visibility and --css are mutually exclusive".to_string()),
        (Some(visibility), None) => Ok(Some(Visibility::parse(visibility))),
        (None, Some(name)) => {
            plan.search_space(name).map(Some).ok_or_else(|| format!("unknown calling search space '{name}'"))
        }
        (None, None) => Ok(None),
    }
}

struct CliConfig {
    plan: PathBuf,
    visibility: Option<String>,
    css: Option<String>,
    digits: Vec<String>,
    leaves: Option<usize>,
    kinds: PatternKinds,
    tree: bool,
    abbreviated: bool,
    on_invalid: InvalidPatternPolicy,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut plan: Option<PathBuf> = None;
    let mut visibility: Option<String> = None;
    let mut css: Option<String> = None;
    let mut digits: Vec<String> = Vec::new();
    let mut leaves: Option<usize> = None;
    let mut kinds = PatternKinds::all();
    let mut tree = false;
    let mut abbreviated = false;
    let mut on_invalid = InvalidPatternPolicy::Abort;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("dialwise {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--tree" => tree = true,
            "--abbreviated" => abbreviated = true,
            "--skip-invalid" => on_invalid = InvalidPatternPolicy::Skip,
            "--plan" | "-p" => plan = Some(PathBuf::from(take_value(&mut args, inline.clone(), "--plan")?)),
            "--visibility" | "-v" => visibility = Some(take_value(&mut args, inline.clone(), "--visibility")?),
            "--css" => css = Some(take_value(&mut args, inline.clone(), "--css")?),
            "--leaves" => {
                let raw = take_value(&mut args, inline.clone(), "--leaves")?;
                let depth = raw.parse().map_err(|_| format!("error: invalid --leaves '{raw}' (expected a depth)"))?;
                leaves = Some(depth);
            }
            "--kinds" => kinds = parse_kinds(&take_value(&mut args, inline.clone(), "--kinds")?)?,
            "--" => {
                digits.extend(args.by_ref());
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => digits.push(arg),
        }
    }

    let Some(plan) = plan else {
        return Err(format!("error: no dial plan provided\n\n{}", help_text()));
    };
    if digits.is_empty() && leaves.is_none() && !tree && !abbreviated {
        return Err(format!("error: nothing to do\n\n{}", help_text()));
    }

    Ok(CliConfig { plan, visibility, css, digits, leaves, kinds, tree, abbreviated, on_invalid, color })
}

fn take_value(args: &mut impl Iterator<Item = String>, inline: Option<String>, name: &str) -> Result<String, String> {
    match inline {
        Some(value) => Ok(value),
        None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
    }
}

fn parse_kinds(value: &str) -> Result<PatternKinds, String> {
    let mut kinds = PatternKinds::empty();
    for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        kinds |= match name.to_ascii_uppercase().as_str() {
            "DN" => PatternKinds::DN,
            "TP" => PatternKinds::TP,
            "RP" => PatternKinds::RP,
            _ => return Err(format!("error: invalid pattern kind '{name}' (expected DN, TP or RP)")),
        };
    }
    Ok(kinds)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "dialwise {version}

Digit analysis for telephony dial plans.

Usage:
  dialwise --plan <file> [OPTIONS] [--] <digits...>

Options:
  -p, --plan <file>          Dial plan file (css/dn/rp/tp lines).
  -v, --visibility <P1:P2>   Partitions visible to the caller, in priority order.
                             Default: the empty partition only.
  --css <name>               Use a calling search space declared in the plan.
  --leaves <depth>           List dial strings reachable down to <depth>.
  --kinds <DN,TP,RP>         Pattern kinds considered by --leaves. Default: all.
  --abbreviated              Look up every reachable translation rule.
  --tree                     Dump the digit analysis tree.
  --skip-invalid             Skip malformed patterns instead of failing.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Set RUST_LOG=dialwise=debug (or dialwise::match=trace) for engine traces.

Exit codes:
  0  Success.
  1  Dial plan or lookup error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
