use std::mem;

use anyhow::Result;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use util::{parse_integer_line, read_input_file, render_report, BadInput};

pub const INPUT_PATH: &str = "input.txt";

pub const TOP_N: usize = 3;

#[derive(Error, Debug)]
pub enum CaloriesError {
    #[error("group {group}, line {line} is not an integer")]
    Parse {
        group: usize,
        line: usize,
        #[source]
        source: BadInput,
    },

    #[error("total of group {group} does not fit in i64")]
    Overflow { group: usize },

    #[error("sum of the biggest totals does not fit in i64")]
    RankOverflow,
}

/// Splits `input` into groups of non-blank lines, in input order.
///
/// A run of blank lines closes the current group. The group after the last
/// run is always emitted, so an empty input or a trailing blank line yields an
/// empty group, which totals 0.
pub fn split_groups(input: &str) -> impl Iterator<Item = Vec<&str>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut previous_blank = false;

    // `lines` also strips the `\r` of CRLF endings
    for line in input.lines() {
        if line.trim().is_empty() {
            if !previous_blank {
                groups.push(mem::take(&mut current));
            }
            previous_blank = true;
        } else {
            current.push(line);
            previous_blank = false;
        }
    }
    groups.push(current);

    groups.into_iter()
}

/// `group` is the 1-based position of the group, used for error reporting only.
pub fn group_total(group: usize, lines: &[&str]) -> Result<i64, CaloriesError> {
    lines
        .iter()
        .enumerate()
        .try_fold(0i64, |total, (i, line)| {
            let calories = parse_integer_line(line).map_err(|source| CaloriesError::Parse {
                group,
                line: i + 1,
                source,
            })?;

            total
                .checked_add(calories)
                .ok_or(CaloriesError::Overflow { group })
        })
}

pub fn group_totals(input: &str) -> Result<Vec<i64>, CaloriesError> {
    let totals = split_groups(input)
        .enumerate()
        .map(|(i, lines)| group_total(i + 1, &lines))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(groups = totals.len(), "summed groups");

    Ok(totals)
}

/// Sum of the `n` biggest totals, or of all of them when there are fewer than `n`.
pub fn top_n_total(totals: &[i64], n: usize) -> Result<i64, CaloriesError> {
    totals
        .iter()
        .copied()
        .sorted_unstable_by(|a, b| b.cmp(a))
        .take(n)
        .try_fold(0i64, |sum, total| sum.checked_add(total))
        .ok_or(CaloriesError::RankOverflow)
}

pub fn biggest_total(input: &str) -> Result<i64, CaloriesError> {
    top_n_total(&group_totals(input)?, 1)
}

pub fn biggest_three_total(input: &str) -> Result<i64, CaloriesError> {
    top_n_total(&group_totals(input)?, TOP_N)
}

/// Filter for `RUST_LOG`-style `directives`; nothing is logged when they are empty.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .parse_lossy(directives)
}

pub fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(&directives))
        .init();
}

/// Runs `solver` over `input`.
///
/// A bad line gets its rendered diagnostic written to stderr before the error is returned.
pub fn solve<F>(input: &str, solver: F) -> Result<i64>
where
    F: FnOnce(&str) -> Result<i64, CaloriesError>,
{
    let answer = solver(input);

    if let Err(CaloriesError::Parse { source, .. }) = &answer {
        eprintln!("{}", render_report(source)?);
    }

    let answer = answer?;
    debug!(answer, "solved");

    Ok(answer)
}

pub fn solve_input_file<F>(solver: F) -> Result<i64>
where
    F: FnOnce(&str) -> Result<i64, CaloriesError>,
{
    let input = read_input_file(INPUT_PATH)?;
    debug!(bytes = input.len(), path = INPUT_PATH, "read input");

    solve(&input, solver)
}
