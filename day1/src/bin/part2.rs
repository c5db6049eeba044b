use anyhow::Result;
use day1::{biggest_three_total, init_tracing, solve_input_file};

fn main() -> Result<()> {
    init_tracing();

    let answer = solve_input_file(biggest_three_total)?;

    println!("{answer}");

    Ok(())
}
