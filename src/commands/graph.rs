use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::ops;
use crate::PacklistPlugin;

pub struct Graph;

impl PluginCommand for Graph {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist graph"
    }

    fn description(&self) -> &str {
        "Build the supplier → device → customer network"
    }

    fn extra_description(&self) -> &str {
        "Returns a record with `nodes` (id, group, role) and `links` (source, target, value). \
         Every row adds one supplier→device and one device→customer link. Empty fields become \
         \"Unknown Supplier\", \"Unknown Device\" or \"Unknown Customer\"."
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::record()),
                (Type::String, Type::record()),
            ])
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["network", "nodes", "edges", "supply", "chain", "flow"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist graph | get links | length"#,
            description: "Number of links (twice the row count)",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &PacklistPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let rows = filtered_rows(call, input)?;
        Ok(json_output(&ops::op_graph(&rows), call.head))
    }
}
