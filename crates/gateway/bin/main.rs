//! The `ens-gateway` CLI.

fn main() -> eyre::Result<()> {
    ens_gateway::cmd::run()
}
