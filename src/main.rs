use anyhow::Result;
use terraform_provider_civo::{logging, CivoProvider};
use tf_provider::serve;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    serve("civo", CivoProvider::default()).await
}
