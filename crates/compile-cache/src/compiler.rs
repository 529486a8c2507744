/// The external step that turns model source into a compiled artifact.
///
/// Implementations are synchronous and may block for as long as compilation takes.
pub trait ModelCompiler {
    type Model;

    fn id(&self) -> &str;

    fn compile(&self, model_source: &str) -> anyhow::Result<Self::Model>;
}

impl<F, M> ModelCompiler for F
where
    F: Fn(&str) -> anyhow::Result<M>,
{
    type Model = M;

    fn id(&self) -> &str {
        "fn"
    }

    fn compile(&self, model_source: &str) -> anyhow::Result<M> {
        self(model_source)
    }
}
