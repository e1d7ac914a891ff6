use clap::Args;
use lrseq_loader::VariantSource;
use tabled::Tabled;

use crate::config::Settings;
use crate::ui::table::Formatter;

#[derive(Debug, Clone, Args)]
pub struct VariantsArg {}

#[derive(Tabled)]
struct VariantRow {
    variant: String,
    kind: &'static str,
    location: String,
}

impl VariantsArg {
    pub fn run(&self, settings: &Settings) -> anyhow::Result<()> {
        let rows = settings
            .loader
            .variants
            .iter()
            .map(|(name, source)| match source {
                VariantSource::File { path } => VariantRow {
                    variant: name.clone(),
                    kind: "file",
                    location: path.clone(),
                },
                VariantSource::Chunked {
                    manifest,
                    chunk_dir,
                } => VariantRow {
                    variant: name.clone(),
                    kind: "chunked",
                    location: format!("{manifest} -> {chunk_dir}/"),
                },
            });

        let base = match settings.loader.base_url.as_str() {
            "" => ".",
            base => base,
        };
        let table = Formatter {
            header: Some(format!("variants under {base}")),
            ..Default::default()
        }
        .build(rows);
        println!("{table}");
        Ok(())
    }
}
