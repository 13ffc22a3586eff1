use std::path::Path;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bbtag::analysis::Validator;
use bbtag::catalog::{SubtagDefinition, SubtagLookup};
use bbtag::language::{NodeId, NodeKind, SubtagName, Tree};
use bbtag::parsing;
use bbtag::problem;

fn main() -> ExitCode {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("bbtag")
        .version(VERSION)
        .propagate_version(true)
        .about("Parsing and analysis for the BBTag templating language.")
        .disable_help_subcommand(true)
        .subcommand(
            Command::new("check")
                .about("Parse and validate the given template")
                .arg(
                    Arg::new("subtags")
                        .long("subtags")
                        .value_name("CATALOG")
                        .help("A JSON file listing the known subtags to resolve names against. Without it only structural problems are reported."),
                )
                .arg(
                    Arg::new("max-problems")
                        .long("max-problems")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100")
                        .help("Report at most N problems. 0 turns validation off entirely."),
                )
                .arg(
                    Arg::new("concise")
                        .long("concise")
                        .action(ArgAction::SetTrue)
                        .help("One line per problem, without source context."),
                )
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The file containing the template you want to check."),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the parsed tree of the given template")
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The file containing the template you want to inspect."),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("check", submatches)) => run_check(submatches),
        Some(("tree", submatches)) => run_tree(submatches),
        _ => {
            println!("usage: bbtag [COMMAND] ...");
            println!("Try '--help' for more information.");
            ExitCode::FAILURE
        }
    }
}

fn run_check(submatches: &ArgMatches) -> ExitCode {
    let Some(filename) = submatches.get_one::<String>("filename") else {
        return ExitCode::FAILURE;
    };
    let filename = Path::new(filename);

    let content = match parsing::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}", problem::concise_loading_error(&error));
            return ExitCode::FAILURE;
        }
    };

    let lookup = match submatches.get_one::<String>("subtags") {
        Some(catalog) => match load_catalog(Path::new(catalog)) {
            Ok(lookup) => Some(lookup),
            Err(message) => {
                eprintln!("{}", message);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let limit = submatches
        .get_one::<usize>("max-problems")
        .copied()
        .unwrap_or(100);
    if limit == 0 {
        return ExitCode::SUCCESS;
    }

    let tree = parsing::parse(&content);
    let concise = submatches.get_flag("concise");

    let mut count = 0;
    for finding in Validator::new(&tree, lookup.as_ref()).take(limit) {
        if concise {
            println!("{}", problem::concise_finding(&finding, filename));
        } else {
            println!("{}", problem::full_finding(&finding, filename, &content));
            println!();
        }
        count += 1;
    }

    if count == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_tree(submatches: &ArgMatches) -> ExitCode {
    let Some(filename) = submatches.get_one::<String>("filename") else {
        return ExitCode::FAILURE;
    };

    let content = match parsing::load(Path::new(filename)) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}", problem::concise_loading_error(&error));
            return ExitCode::FAILURE;
        }
    };

    let tree = parsing::parse(&content);
    print!("{}", render_tree(&tree));
    ExitCode::SUCCESS
}

fn load_catalog(filename: &Path) -> Result<SubtagLookup, String> {
    let content = parsing::load(filename)
        .map_err(|error| problem::concise_loading_error(&error))?;
    let definitions: Vec<SubtagDefinition> = serde_json::from_str(&content)
        .map_err(|error| format!("error: {}: {}", filename.display(), error))?;

    debug!("catalog loaded, {} definitions", definitions.len());
    Ok(SubtagLookup::new(definitions))
}

fn render_tree(tree: &Tree) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), 0, &mut out);
    out
}

fn render_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let range = tree.range(id);

    match &tree.node(id).kind {
        NodeKind::Segment(segment) => {
            out.push_str(&format!("{}segment {}\n", indent, range));
            for &close in segment.unexpected_closes() {
                let position = tree
                    .map()
                    .cursor(close)
                    .position();
                out.push_str(&format!("{}  unexpected close at {}\n", indent, position));
            }
        }
        NodeKind::Subtag(subtag) => {
            let name = match subtag.name() {
                SubtagName::Static(name) => format!("{{{}}}", name),
                SubtagName::Dynamic => "{*dynamic*}".to_string(),
            };
            let note = if subtag.is_missing_close() {
                " (missing close)"
            } else {
                ""
            };
            out.push_str(&format!("{}subtag {} {}{}\n", indent, name, range, note));
        }
    }

    for &child in tree.children(id) {
        render_node(tree, child, depth + 1, out);
    }
}
