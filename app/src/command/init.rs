//! Configuration initialization command.

use medichat_config::Config;

use super::CommandStrategy;

#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, (): Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
