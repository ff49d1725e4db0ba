#![allow(missing_docs)]
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use specimen_core::codegen::Generator;
use specimen_core::harvest::{Harvester, InvalidationPolicy};

const USAGE: &str = "\
specimen - harvest JSON examples from API documentation and generate Rust models

USAGE:
  specimen harvest [--url URL] [--out-dir DIR] [--snapshot FILE] [--refresh]
  specimen generate [--source FILE-OR-DIR]... [--schema-file FILE] [--target FILE]
                    [--module NAME] [--rename OLD=NEW]... [--replace-type OLD=NEW]...
                    [--field-type Struct.field=TYPE]...

By default, harvest fetches the Jira Cloud platform REST v3 documentation
page, writes one example file per type under jira/, and snapshots the
captured payload to json.log so the next run can skip the network.
";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().pretty().init();

    match AppArgs::parse().context("parsing arguments")? {
        AppArgs::Harvest(args) => harvest(args).await?,
        AppArgs::Generate(args) => generate(args)?,
    }

    info!("Bye!");
    Ok(())
}

async fn harvest(args: HarvestArgs) -> Result<()> {
    let HarvestArgs {
        url,
        out_dir,
        snapshot,
        refresh,
    } = args;

    let mut builder = Harvester::builder();
    if let Some(url) = url {
        builder = builder.with_url(url);
    }
    if let Some(out_dir) = out_dir {
        builder = builder.with_out_dir(out_dir);
    }
    if let Some(snapshot) = snapshot {
        builder = builder.with_snapshot_path(snapshot);
    }
    if refresh {
        builder = builder.with_invalidation_policy(InvalidationPolicy::Refresh);
    }

    let harvester = builder.build().context("configuring the harvester")?;
    harvester.run().await.context("harvesting examples")?;
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let GenerateArgs {
        sources,
        schema_file,
        target,
        module,
        renames,
        replace_types,
        field_types,
    } = args;

    if sources.is_empty() && schema_file.is_none() {
        bail!("nothing to generate from: pass --source or --schema-file");
    }

    let mut generator = Generator::default();
    for source in sources {
        generator = generator.with_source(source);
    }
    if let Some(schema_file) = schema_file {
        generator = generator.with_schema_file(schema_file);
    }
    if let Some(module) = module {
        generator = generator.with_module(module);
    }
    for (from, to) in renames {
        generator = generator.with_rename(from, to);
    }
    for (from, to) in replace_types {
        generator = generator.with_replace_type(from, to);
    }
    for (field, to) in field_types {
        generator = generator.with_field_type(field, to);
    }

    let models = generator.render().context("generating models")?;

    match target {
        Some(target) => {
            if let Some(parent) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(&target, models)
                .with_context(|| format!("writing {}", target.display()))?;
            info!(target = %target.display(), "models written");
        }
        None => {
            std::io::stdout()
                .write_all(models.as_bytes())
                .context("writing models to stdout")?;
        }
    }
    Ok(())
}

#[derive(Debug)]
enum AppArgs {
    Harvest(HarvestArgs),
    Generate(GenerateArgs),
}

#[derive(Debug)]
struct HarvestArgs {
    url: Option<String>,
    out_dir: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    refresh: bool,
}

#[derive(Debug)]
struct GenerateArgs {
    sources: Vec<PathBuf>,
    schema_file: Option<PathBuf>,
    target: Option<PathBuf>,
    module: Option<String>,
    renames: Vec<(String, String)>,
    replace_types: Vec<(String, String)>,
    field_types: Vec<(String, String)>,
}

impl AppArgs {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        if pargs.contains(["-h", "--help"]) {
            std::io::stdout()
                .write_all(USAGE.as_bytes())
                .context("writing usage")?;
            std::process::exit(0);
        }

        let command = pargs.subcommand().context("reading the command")?;
        let parsed = match command.as_deref() {
            Some("harvest") => Self::Harvest(HarvestArgs::parse(&mut pargs)?),
            Some("generate") => Self::Generate(GenerateArgs::parse(&mut pargs)?),
            Some(other) => bail!("unknown command '{other}', expected 'harvest' or 'generate'"),
            None => bail!("missing command\n\n{USAGE}"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(parsed)
    }
}

impl HarvestArgs {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        Ok(Self {
            url: pargs
                .opt_value_from_str("--url")
                .context("parsing url argument")?,
            out_dir: pargs
                .opt_value_from_str("--out-dir")
                .context("parsing out-dir argument")?,
            snapshot: pargs
                .opt_value_from_str("--snapshot")
                .context("parsing snapshot argument")?,
            refresh: pargs.contains("--refresh"),
        })
    }
}

impl GenerateArgs {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        Ok(Self {
            sources: pargs
                .values_from_str("--source")
                .context("parsing source arguments")?,
            schema_file: pargs
                .opt_value_from_str("--schema-file")
                .context("parsing schema-file argument")?,
            target: pargs
                .opt_value_from_str("--target")
                .context("parsing target argument")?,
            module: pargs
                .opt_value_from_str("--module")
                .context("parsing module argument")?,
            renames: pargs
                .values_from_fn("--rename", key_value)
                .context("parsing rename arguments")?,
            replace_types: pargs
                .values_from_fn("--replace-type", key_value)
                .context("parsing replace-type arguments")?,
            field_types: pargs
                .values_from_fn("--field-type", key_value)
                .context("parsing field-type arguments")?,
        })
    }
}

fn key_value(raw: &str) -> Result<(String, String), &'static str> {
    let (key, value) = raw.split_once('=').ok_or("expected KEY=VALUE")?;
    Ok((key.to_string(), value.to_string()))
}
