use medialivectl::cli;

fn main() -> anyhow::Result<()> {
    let code = cli::run()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
