//! Version command.

use super::CommandStrategy;

#[derive(Debug, Clone, Copy)]
pub struct VersionStrategy;

impl CommandStrategy for VersionStrategy {
    type Input = ();

    async fn execute(&self, (): Self::Input) -> anyhow::Result<()> {
        println!("medichat {}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
