use std::error::Error;

use sgemm_lab::harness::{render_table, run_comparison, BenchConfig, VERIFY_LIMIT};
use sgemm_lab::{DEFAULT_SEED, DEFAULT_TOLERANCE};

fn parse_size(value: &str) -> Result<(usize, usize, usize), String> {
    let dims: Vec<usize> = value
        .split(',')
        .map(|d| d.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|err| format!("invalid size `{value}`: {err}"))?;

    match dims.as_slice() {
        [side] => Ok((*side, *side, *side)),
        [m, n, p] => Ok((*m, *n, *p)),
        _ => Err(format!("invalid size `{value}`: expected `N` or `M,N,P`")),
    }
}

fn parse_args() -> Result<BenchConfig, lexopt::Error> {
    use lexopt::prelude::*;

    let mut config = BenchConfig::default();
    let mut sizes = Vec::new();

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('s') | Long("size") => sizes.push(parse_size(&parser.value()?.string()?)?),
            Short('i') | Long("iterations") => config.iterations = parser.value()?.parse()?,
            Long("seed") => config.seed = parser.value()?.parse()?,
            Short('t') | Long("threads") => {
                config.kernel.parallel.threads = Some(parser.value()?.parse()?)
            }
            Long("tolerance") => config.tolerance = parser.value()?.parse()?,
            Long("no-verify-above") => config.verify_limit = parser.value()?.parse()?,
            Short('h') | Long("help") => {
                println!(
                    "Compare single-precision matrix multiplication kernels.

Usage: {bin_name} [OPTIONS]

Options:
  -s, --size <M,N,P>           Problem size, repeatable. `N` means N,N,N.
                               Default: 128, 256, 512 and 1024 cubes
  -i, --iterations <N>         Timed runs per kernel, best is kept [default: 3]
      --seed <N>               Input generator seed [default: {DEFAULT_SEED}]
  -t, --threads <N>            Worker threads for the parallel kernels
      --tolerance <X>          Max absolute error vs reference [default: {DEFAULT_TOLERANCE}]
      --no-verify-above <N>    Skip verification past this dimension [default: {VERIFY_LIMIT}]
  -h, --help                   Print help
",
                    bin_name = parser.bin_name().unwrap_or("sgemm-lab")
                );
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    if !sizes.is_empty() {
        config.sizes = sizes;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = parse_args()?;
    let reports = run_comparison(&config)?;

    let mut failed = false;
    for report in &reports {
        println!("{}", render_table(report));
        failed |= !report.all_passed();
    }

    if failed {
        return Err("one or more kernels did not match the reference".into());
    }
    Ok(())
}
