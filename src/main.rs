fn main() -> anyhow::Result<()> {
    chatlog_recovery::cli::run()
}
