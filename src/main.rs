fn main() -> anyhow::Result<()> {
    aquamark::run()?;
    Ok(())
}
