use std::path::PathBuf;

use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Signature, Span, SyntaxShape, Type,
};

use super::util::json_output;
use crate::agent::catalog::{self, AgentCatalog};
use crate::ops;
use crate::PacklistPlugin;

pub struct Agents;

/// The catalog named by `--catalog`, or the embedded default.
pub(crate) fn catalog_flag(call: &EvaluatedCall) -> Result<AgentCatalog, LabeledError> {
    let path = call.get_flag::<String>("catalog")?.map(PathBuf::from);
    catalog::resolve_catalog(path.as_deref()).map_err(|e| catalog_error(e, call.head))
}

fn catalog_error(e: crate::agent::AgentError, span: Span) -> LabeledError {
    LabeledError::new("Cannot load agent catalog").with_label(e.to_string(), span)
}

impl PluginCommand for Agents {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist agents"
    }

    fn description(&self) -> &str {
        "List the analyst agents available for prompts"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::Nothing, Type::table())
            .named(
                "catalog",
                SyntaxShape::Filepath,
                "Agent catalog JSON file (default: embedded catalog)",
                Some('c'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["analyst", "persona", "llm", "roles"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"packlist agents | select index role"#,
            description: "Agent roles with their index",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &PacklistPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        _input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let catalog = catalog_flag(call)?;
        Ok(json_output(&ops::op_agents(&catalog), call.head))
    }
}
