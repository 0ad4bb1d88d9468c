use nu_plugin::{serve_plugin, MsgPackSerializer};
use nu_plugin_packlist::PacklistPlugin;

fn main() {
    serve_plugin(&PacklistPlugin, MsgPackSerializer {})
}
