pub mod agent;
pub mod algo;
pub mod ops;

#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "plugin")]
pub mod commands;

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct PacklistPlugin;

#[cfg(feature = "plugin")]
impl Plugin for PacklistPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Parse),
            Box::new(commands::Options),
            Box::new(commands::Filter),
            Box::new(commands::Kpis),
            Box::new(commands::Rank),
            Box::new(commands::Timeline),
            Box::new(commands::Graph),
            Box::new(commands::Licenses),
            Box::new(commands::Dashboard),
            Box::new(commands::Agents),
            Box::new(commands::Prompt),
        ]
    }
}
