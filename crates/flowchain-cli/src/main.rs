//! Flowchain command line.
//!
//! Provides the `flowchain` binary:
//!
//! - `run` seeds the five default stages, applies wiring and equation edits
//!   from the arguments, evaluates the chain, and prints the result as JSON.
//! - `route` prints the SVG path data for one connector.
//!
//! Uses the same graph mutator, evaluator, and router as the HTTP server.

use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use flowchain_core::{Chain, CoreError, LinkPolicy, LinkRejection, LinkTarget, NodeId, WorkflowGraph};
use flowchain_eval::{ChainEvaluator, EvalConfig, Evaluation};
use flowchain_route::{Point, Router, RouterConfig};

/// Flowchain function-pipeline tools.
#[derive(Parser)]
#[command(name = "flowchain", about = "Flowchain function-pipeline tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wire the default stages and evaluate the chain.
    Run {
        /// Value fed into the chain.
        #[arg(short, long, default_value_t = flowchain_core::seed::DEFAULT_INITIAL_VALUE, allow_hyphen_values = true)]
        initial: f64,

        /// Link policy: free, or fixed (alias strict).
        #[arg(short, long, default_value = "free")]
        policy: LinkPolicy,

        /// Start from the default wiring SOURCE -> 1 -> 2 -> 4 -> 5 -> 3 -> FINAL.
        #[arg(long)]
        wired: bool,

        /// Node fed by the initial value.
        #[arg(short, long)]
        source: Option<u32>,

        /// Link `FROM:TO`, where TO is a node id, `final`, or `none`. Repeatable.
        #[arg(short, long = "link", value_parser = parse_link)]
        links: Vec<(NodeId, LinkTarget)>,

        /// Replace an equation: `NODE=EXPR`. Repeatable.
        #[arg(short, long = "equation", value_parser = parse_equation)]
        equations: Vec<(NodeId, String)>,

        /// Include a per-stage trace in the output.
        #[arg(long)]
        trace: bool,
    },

    /// Print the SVG path for one connector.
    Route {
        /// Start point `x,y`.
        #[arg(long, allow_hyphen_values = true)]
        start: Point,

        /// End point `x,y`.
        #[arg(long, allow_hyphen_values = true)]
        end: Point,

        /// Draw a straight terminal link.
        #[arg(long)]
        terminal: bool,

        /// Alignment threshold.
        #[arg(long, default_value_t = flowchain_route::router::DEFAULT_ALIGNMENT_THRESHOLD)]
        threshold: f64,

        /// Cubic control offset as a fraction of the horizontal delta.
        #[arg(long, default_value_t = flowchain_route::router::DEFAULT_CURVATURE)]
        curvature: f64,
    },
}

/// Arguments of the `run` subcommand.
struct RunArgs {
    initial: f64,
    policy: LinkPolicy,
    wired: bool,
    source: Option<u32>,
    links: Vec<(NodeId, LinkTarget)>,
    equations: Vec<(NodeId, String)>,
    trace: bool,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("link rejected: {0}")]
    Rejected(#[from] LinkRejection),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("equation for node {node} is not valid: '{text}'")]
    EquationRejected { node: NodeId, text: String },
}

impl RunError {
    fn exit_code(&self) -> i32 {
        match self {
            RunError::Rejected(_) => 2,
            RunError::Core(_) | RunError::EquationRejected { .. } => 3,
        }
    }
}

#[derive(Serialize)]
struct RunReport {
    chain: Chain,
    #[serde(flatten)]
    evaluation: Evaluation,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // Argument errors count as invalid input (exit 3); help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 3 } else { 0 });
        }
    };

    match cli.command {
        Commands::Run {
            initial,
            policy,
            wired,
            source,
            links,
            equations,
            trace,
        } => {
            let exit_code = run_chain(RunArgs {
                initial,
                policy,
                wired,
                source,
                links,
                equations,
                trace,
            });
            process::exit(exit_code);
        }
        Commands::Route {
            start,
            end,
            terminal,
            threshold,
            curvature,
        } => {
            let exit_code = run_route(start, end, terminal, threshold, curvature);
            process::exit(exit_code);
        }
    }
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 = chain reached FINAL, 1 = chain incomplete,
/// 2 = link rejected, 3 = invalid input.
fn run_chain(args: RunArgs) -> i32 {
    if !args.initial.is_finite() {
        eprintln!("Error: initial value must be finite");
        return 3;
    }

    let graph = match build_graph(&args) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {}", e);
            return e.exit_code();
        }
    };

    let evaluation = ChainEvaluator::new(&graph, EvalConfig { trace_enabled: args.trace })
        .run(args.initial);
    let complete = evaluation.is_complete();
    let report = RunReport {
        chain: graph.chain(),
        evaluation,
    };

    let json = serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {}\"}}", e));
    println!("{}", json);

    if complete {
        0
    } else {
        1
    }
}

/// Seeds the graph and applies source, links, then equations in that order.
fn build_graph(args: &RunArgs) -> Result<WorkflowGraph, RunError> {
    let mut graph = if args.wired {
        WorkflowGraph::with_default_chain(args.policy.clone())?
    } else {
        WorkflowGraph::seeded(args.policy.clone())
    };

    if let Some(node) = args.source {
        graph.connect_source(NodeId(node))?;
    }
    for (from, to) in &args.links {
        graph.propose_link(*from, *to)?;
    }
    for (node, text) in &args.equations {
        if !graph.set_equation(*node, text)? {
            return Err(RunError::EquationRejected {
                node: *node,
                text: text.clone(),
            });
        }
    }
    Ok(graph)
}

/// Execute the route subcommand. Returns 0, or 3 for a bad router config.
fn run_route(start: Point, end: Point, terminal: bool, threshold: f64, curvature: f64) -> i32 {
    let config = match RouterConfig::new(threshold, curvature) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 3;
        }
    };
    println!("{}", Router::new(config).route(start, end, terminal));
    0
}

/// Parses `FROM:TO`.
fn parse_link(s: &str) -> Result<(NodeId, LinkTarget), String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", s))?;
    let from = from
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a node id", from.trim()))?;
    let to = to.parse::<LinkTarget>().map_err(|e| e.to_string())?;
    Ok((NodeId(from), to))
}

/// Parses `NODE=EXPR`.
fn parse_equation(s: &str) -> Result<(NodeId, String), String> {
    let (node, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NODE=EXPR, got '{}'", s))?;
    let node = node
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not a node id", node.trim()))?;
    Ok((NodeId(node), text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            initial: 2.0,
            policy: LinkPolicy::Free,
            wired: false,
            source: None,
            links: Vec::new(),
            equations: Vec::new(),
            trace: false,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn policy_flag_accepts_strict() {
        let cli = Cli::try_parse_from(["flowchain", "run", "--policy", "strict"]).unwrap();
        match cli.command {
            Commands::Run { policy, .. } => assert_eq!(policy, LinkPolicy::default_fixed()),
            Commands::Route { .. } => panic!("expected run"),
        }
        assert!(Cli::try_parse_from(["flowchain", "run", "--policy", "loose"]).is_err());
    }

    #[test]
    fn parses_links() {
        assert_eq!(parse_link("1:2").unwrap(), (NodeId(1), LinkTarget::Node(NodeId(2))));
        assert_eq!(parse_link("3:final").unwrap(), (NodeId(3), LinkTarget::Final));
        assert_eq!(parse_link("3:none").unwrap(), (NodeId(3), LinkTarget::None));
        assert!(parse_link("3").is_err());
        assert!(parse_link("a:2").is_err());
    }

    #[test]
    fn parses_equations() {
        assert_eq!(
            parse_equation("2=x+1").unwrap(),
            (NodeId(2), "x+1".to_string())
        );
        assert!(parse_equation("x+1").is_err());
    }

    #[test]
    fn builds_chain_from_arguments() {
        let graph = build_graph(&RunArgs {
            source: Some(1),
            links: vec![
                (NodeId(1), LinkTarget::Node(NodeId(2))),
                (NodeId(2), LinkTarget::Final),
            ],
            equations: vec![(NodeId(2), "x+1".to_string())],
            ..args()
        })
        .unwrap();
        let evaluation = ChainEvaluator::new(&graph, EvalConfig::default()).run(3.0);
        assert_eq!(evaluation.output(), Some(10.0));
    }

    #[test]
    fn rejected_link_exits_2() {
        let err = build_graph(&RunArgs {
            links: vec![(NodeId(1), LinkTarget::Node(NodeId(1)))],
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_equation_exits_3() {
        let err = build_graph(&RunArgs {
            equations: vec![(NodeId(1), "x % 2".to_string())],
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let err = build_graph(&RunArgs {
            equations: vec![(NodeId(9), "x".to_string())],
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn wired_default_reaches_final() {
        let graph = build_graph(&RunArgs {
            wired: true,
            policy: LinkPolicy::default_fixed(),
            ..args()
        })
        .unwrap();
        assert!(graph.chain().complete);
    }
}
