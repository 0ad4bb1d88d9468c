use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, Type};

use super::util::{filter_flags, input_rows, json_output, with_filter_flags};
use crate::ops;
use crate::PacklistPlugin;

pub struct Dashboard;

impl PluginCommand for Dashboard {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist dashboard"
    }

    fn description(&self) -> &str {
        "Compute every dashboard view over the (optionally filtered) packing list"
    }

    fn extra_description(&self) -> &str {
        "Returns filter, kpis, recent, category_stats, licenses, top_customers, \
         category_distribution, timeline, top_models and graph. Filter options are drawn \
         from the full list; everything else from the filtered rows."
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
        vec!["overview", "report", "summary", "charts"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open --raw packing_list.csv | packlist dashboard"#,
                description: "Full dashboard for a packing list",
                result: None,
            },
            Example {
                example: r#"open --raw packing_list.csv | packlist dashboard -f Suppliername -v B00079 | get kpis"#,
                description: "Headline counters for one supplier",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &PacklistPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let (field, value) = filter_flags(call)?;
        let rows = input_rows(input, call.head)?;
        Ok(json_output(
            &ops::op_dashboard(&rows, &field, &value),
            call.head,
        ))
    }
}
