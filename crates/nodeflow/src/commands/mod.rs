mod create_node;

use clap::Subcommand;

use crate::config::Config;
use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create a node: store it, index its keywords and publish an event
    CreateNode(create_node::CreateNodeArgs),
}

impl Commands {
    pub(crate) fn execute(self, config: &Config) -> Result<()> {
        match self {
            Self::CreateNode(args) => create_node::run(args, config),
        }
    }
}
