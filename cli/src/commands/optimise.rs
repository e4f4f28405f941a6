use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{bail, Context, Result};
use louvain::{EdgeWeights, Graph, Optimiser, OptimiserConfig, Partition};
use serde::Serialize;

use crate::cli::{Cli, Format, OptimiseArgs};

/// Result written by `--format json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    membership: &'a [usize],
    sizes: Vec<usize>,
    quality: f64,
}

pub fn run(_cli: &Cli, args: &OptimiseArgs) -> Result<()> {
    let parsed = if args.edges.as_os_str() == "-" {
        read_edge_list(io::stdin().lock())
    } else {
        let file = File::open(&args.edges).with_context(|| format!("opening {}", args.edges.display()))?;
        read_edge_list(BufReader::new(file))
    };
    let (num_nodes, edges) = parsed.with_context(|| format!("reading edge list {}", args.edges.display()))?;
    tracing::info!(nodes = num_nodes, edges = edges.len(), "read edge list");

    let graph = Graph::from_edges(num_nodes, args.directed, &edges)?;
    let weights = if args.unweighted { EdgeWeights::Unit } else { EdgeWeights::Graph };
    let mut partition = Partition::new(graph, args.quality.into(), args.resolution, weights)?;

    let mut optimiser = Optimiser::from_config(optimiser_config(args)?)?;
    let improvement = optimiser.optimise_partition(&mut partition)?;
    tracing::info!(improvement, "{partition}");

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_partition(BufWriter::new(file), &partition, args.format)
        }
        None => write_partition(io::stdout().lock(), &partition, args.format),
    }
}

/// Settings from `--config`, overridden by explicit flags.
fn optimiser_config(args: &OptimiseArgs) -> Result<OptimiserConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => OptimiserConfig::default(),
    };
    if let Some(consider) = args.consider_comms { config.consider_comms = consider.into() }
    if let Some(seed) = args.seed { config.seed = Some(seed) }
    if let Some(max_levels) = args.max_levels { config.max_levels = Some(max_levels) }
    if args.refine { config.refine_partition = true }
    Ok(config)
}

fn read_config(path: &Path) -> Result<OptimiserConfig> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    OptimiserConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Parse `u v [w]` lines; `#` starts a comment. Returns the node count
/// (largest endpoint plus one) and the edges.
fn read_edge_list(reader: impl BufRead) -> Result<(usize, Vec<(usize, usize, f64)>)> {
    let mut edges = Vec::new();
    let mut num_nodes = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() { continue }

        let fields = content.split_whitespace().collect::<Vec<_>>();
        let (u, v, w) = match fields.as_slice() {
            [u, v] => (u, v, None),
            [u, v, w] => (u, v, Some(w)),
            _ => bail!("line {}: expected `u v [w]`, found {:?}", i + 1, content),
        };
        let u = u.parse::<usize>().with_context(|| format!("line {}: bad vertex {u:?}", i + 1))?;
        let v = v.parse::<usize>().with_context(|| format!("line {}: bad vertex {v:?}", i + 1))?;
        let w = match w {
            Some(w) => w.parse::<f64>().with_context(|| format!("line {}: bad weight {w:?}", i + 1))?,
            None => 1.0,
        };

        num_nodes = num_nodes.max(u + 1).max(v + 1);
        edges.push((u, v, w));
    }

    Ok((num_nodes, edges))
}

fn write_partition(mut out: impl Write, partition: &Partition, format: Format) -> Result<()> {
    match format {
        Format::Csv => {
            writeln!(out, "vertex,community")?;
            for (vertex, community) in partition.membership().iter().enumerate() {
                writeln!(out, "{vertex},{community}")?;
            }
        }
        Format::Json => {
            let report = Report {
                membership: partition.membership(),
                sizes: partition.sizes(),
                quality: partition.quality(),
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use louvain::QualityKind;

    use super::*;

    #[test]
    fn edge_list_skips_comments_and_defaults_weights() {
        let text = "# two triangles\n0 1\n1 2 2.5\n\n2 0 # closing edge\n3 4 0.5\n";
        let (num_nodes, edges) = read_edge_list(text.as_bytes()).unwrap();

        assert_eq!(num_nodes, 5);
        assert_eq!(edges, vec![(0, 1, 1.0), (1, 2, 2.5), (2, 0, 1.0), (3, 4, 0.5)]);
    }

    #[test]
    fn edge_list_reports_bad_lines() {
        let err = read_edge_list("0 1\n0 x\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));

        assert!(read_edge_list("0 1 2 3\n".as_bytes()).is_err());
        assert!(read_edge_list("0 -1\n".as_bytes()).is_err());
    }

    #[test]
    fn csv_and_json_output() {
        let graph = Graph::from_edges(3, false, &[(0, 1, 1.0)]).unwrap();
        let partition = Partition::with_membership(graph, QualityKind::Cpm, 0.5, EdgeWeights::Graph, &[0, 0, 1]).unwrap();

        let mut csv = Vec::new();
        write_partition(&mut csv, &partition, Format::Csv).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "vertex,community\n0,0\n1,0\n2,1\n");

        let mut json = Vec::new();
        write_partition(&mut json, &partition, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["membership"], serde_json::json!([0, 0, 1]));
        assert_eq!(value["sizes"], serde_json::json!([2, 1]));
        assert_eq!(value["quality"], serde_json::json!(0.5));
    }
}
