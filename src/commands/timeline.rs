use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{filtered_rows, json_output, with_filter_flags};
use crate::ops;
use crate::PacklistPlugin;

pub struct Timeline;

impl PluginCommand for Timeline {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist timeline"
    }

    fn description(&self) -> &str {
        "Record count per delivery date, in date order"
    }

    fn extra_description(&self) -> &str {
        "Dates are ordered by their leading integer (day serials such as 45930). \
         Labels without one go last."
    }

    fn signature(&self) -> Signature {
        with_filter_flags(Signature::build(self.name()))
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
            ])
            .named(
                "by",
                SyntaxShape::String,
                "Date column (default: deliverdate)",
                Some('b'),
            )
            .category(Category::Math)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["dates", "trend", "series", "delivery"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist timeline"#,
            description: "Shipments per delivery date",
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
        let by = call.get_flag::<String>("by")?;
        let rows = filtered_rows(call, input)?;
        Ok(json_output(
            &ops::op_timeline(&rows, by.as_deref()),
            call.head,
        ))
    }
}
