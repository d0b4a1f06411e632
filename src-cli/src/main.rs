fn main() -> anyhow::Result<()> {
    hashroute_cli::run()
}
