use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, Type};

use super::util::{from_json, input_rows};
use crate::PacklistPlugin;

pub struct Parse;

impl PluginCommand for Parse {
    type Plugin = PacklistPlugin;

    fn name(&self) -> &str {
        "packlist parse"
    }

    fn description(&self) -> &str {
        "Parse packing-list CSV text into a table"
    }

    fn extra_description(&self) -> &str {
        "The first line is the header. Rows with fewer fields than the header are dropped, \
         extra fields are ignored, and one layer of surrounding quotes plus any curly quotes \
         are stripped from each value. All values stay strings."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::String, Type::table())
            .category(Category::Formats)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["csv", "packing", "list", "import", "shipment"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open --raw packing_list.csv | packlist parse"#,
            description: "Load a packing list as a table",
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
        let rows = input_rows(input, head)?;
        let values: Vec<_> = rows.iter().map(|r| from_json(r, head)).collect();
        Ok(ListStream::new(values.into_iter(), head, Signals::empty()).into())
    }
}
