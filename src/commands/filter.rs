use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type,
};

use super::util::{from_json, input_rows};
use crate::ops;
use crate::PacklistPlugin;

pub struct Filter;

impl PluginCommand for Filter {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist filter"
    }

    fn description(&self) -> &str {
        "Keep rows whose column equals a value exactly"
    }

    fn extra_description(&self) -> &str {
        "An empty field or value keeps every row."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
            ])
            .required("field", SyntaxShape::String, "Column to match")
            .required("value", SyntaxShape::String, "Exact value to keep")
            .category(Category::Filters)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["where", "select", "match", "subset"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist filter Suppliername B00079"#,
            description: "Rows shipped by one supplier",
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
        let head = call.head;
        let field: String = call.req(0)?;
        let value: String = call.req(1)?;
        let rows = input_rows(input, head)?;

        let filtered = ops::op_filter(&rows, &field, &value);
        let values: Vec<_> = filtered
            .as_array()
            .map(|rows| rows.iter().map(|r| from_json(r, head)).collect())
            .unwrap_or_default();
        Ok(ListStream::new(values.into_iter(), head, Signals::empty()).into())
    }
}
