fn main() -> anyhow::Result<()> {
    cfn_log::cli::run()
}
