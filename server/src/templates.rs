use crate::server_error::RenderError;
use minijinja::{context, Environment};

const HELLO_WORLD: &str = "hello_world.html";
const HELLO_WORLD_TEMPLATE: &str = include_str!("../templates/hello_world.html");

/// Compiled page templates. Values are HTML-escaped on render.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(HELLO_WORLD, HELLO_WORLD_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_hello_world(&self, title: &str, message: &str) -> Result<String, RenderError> {
        let template = self.env.get_template(HELLO_WORLD)?;
        Ok(template.render(context! { title, message })?)
    }
}
