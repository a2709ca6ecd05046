use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, info_span, trace};

use ecs_cli::input::InputSource;
use ecs_cli::logging::redact_value;
use ecs_cli::summary::{fields_table, mappings_table, page_footer, results_table};
use ecs_client::{ClientConfig, MappingClient};
use ecs_map::{
    BATCH_EXPORT_FILE_NAME, BatchComposer, BatchSession, CSV_EXPORT_FILE_NAME, Feedback,
    LoadState, MappingsTable, write_export,
};
use ecs_model::MappingId;

use crate::cli::{BatchArgs, EditArgs, FieldsArgs, ListArgs, MapArgs, PageArgs};

/// Settings file, then the `--base-url` flag or `ECS_MAPPER_URL`.
pub fn resolve_config(path: Option<&Path>, base_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path).context("load settings")?;
    if let Some(base_url) = base_url {
        config.base_url = base_url.to_string();
    }
    debug!(base_url = %config.base_url, "resolved settings");
    Ok(config)
}

pub fn run_fields(config: &ClientConfig, args: &FieldsArgs) -> Result<()> {
    let mut composer = composer(config, &args.batch)?;
    let feedback = if args.silent {
        Feedback::Silent
    } else {
        Feedback::Report
    };
    match composer.build_payload(feedback) {
        Some(items) => {
            println!("{}", fields_table(&items));
            println!("{} fields", items.len());
            Ok(())
        }
        None => match composer.error() {
            Some(message) => bail!("{message}"),
            None => {
                println!("No fields.");
                Ok(())
            }
        },
    }
}

pub fn run_map(mut config: ClientConfig, args: &MapArgs) -> Result<()> {
    if let Some(model) = &args.model {
        config.model.clone_from(model);
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    let mut composer = composer(&config, &args.batch)?;
    let Some(payload) = composer.build_payload(Feedback::Report) else {
        if let Some(message) = composer.error() {
            bail!("{message}");
        }
        println!("Nothing to map.");
        return Ok(());
    };

    let span = info_span!("map", fields = payload.len(), model = %config.model);
    let _guard = span.enter();
    for item in &payload {
        trace!(field = %item.field, sample = redact_value(&item.description), "submitting field");
    }

    let client = MappingClient::new(&config.base_url).context("create client")?;
    let mut session = BatchSession::new();
    let outcome = block_on(session.submit(&client, &payload, &config.model, config.limit))?;
    if outcome.is_err() {
        bail!("{}", session.error().unwrap_or("Mapping request failed"));
    }

    println!("{}", results_table(&session.rows()));
    println!("{} decisions", session.results().len());

    if let Some(export) = &args.export {
        let path = export
            .clone()
            .unwrap_or_else(|| PathBuf::from(BATCH_EXPORT_FILE_NAME));
        let json = session.export_json().context("export decisions")?;
        write_export(&path, &json).context("write decisions")?;
        println!("Exported: {}", path.display());
    }
    Ok(())
}

pub fn run_list(config: &ClientConfig, args: &ListArgs) -> Result<()> {
    let client = MappingClient::new(&config.base_url).context("create client")?;
    let table = load_page(config, &client, &args.page)?;

    match table.state() {
        LoadState::NotImplemented => {
            println!("The mapping service does not provide the mappings list yet.");
            return Ok(());
        }
        LoadState::Failed | LoadState::Idle => {
            bail!("{}", table.last_error().unwrap_or("Failed to load mappings"));
        }
        LoadState::Loaded => {}
    }

    let visible = table.visible_rows();
    println!("{}", mappings_table(&visible));
    println!("{}", page_footer(&table));

    if let Some(csv) = &args.csv {
        let path = csv
            .clone()
            .unwrap_or_else(|| PathBuf::from(CSV_EXPORT_FILE_NAME));
        let document = table.export_csv().context("export mappings")?;
        write_export(&path, &document).context("write mappings")?;
        println!("Exported {} rows: {}", visible.len(), path.display());
    }
    Ok(())
}

pub fn run_edit(config: &ClientConfig, args: &EditArgs) -> Result<()> {
    let client = MappingClient::new(&config.base_url).context("create client")?;
    let mut table = load_page(config, &client, &args.page)?;
    if table.state() != LoadState::Loaded {
        bail!("{}", table.last_error().unwrap_or("Failed to load mappings"));
    }

    let id = MappingId::from(args.id.as_str());
    let draft = table
        .start_edit(&id)
        .map_err(|e| anyhow!(e.user_message()))?;
    draft.mapped_field_name.clone_from(&args.mapped_field_name);
    if let Some(verified) = args.verified {
        draft.human_verified = verified;
    }

    block_on(table.save(&client))?.map_err(|e| anyhow!(e.user_message()))?;
    info!(%id, "mapping updated");

    let saved: Vec<_> = table.rows().iter().filter(|row| row.id == id).collect();
    println!("{}", mappings_table(&saved));
    println!("Saved mapping {id}");
    Ok(())
}

fn composer(config: &ClientConfig, args: &BatchArgs) -> Result<BatchComposer> {
    let mut config = config.clone();
    args.apply(&mut config);
    let source = InputSource::from(args.input.as_path());
    let input = source
        .read_to_string()
        .with_context(|| format!("read {source}"))?;
    Ok(BatchComposer::new(config.batch_config(), config.extractor()).with_input(input))
}

fn load_page(
    config: &ClientConfig,
    client: &MappingClient,
    args: &PageArgs,
) -> Result<MappingsTable> {
    let mut table = MappingsTable::new(args.page_size.unwrap_or(config.page_size));
    table.set_search(args.search.clone());
    table.set_page(args.page);
    block_on(table.reload(client))?;
    Ok(table)
}

/// Drive `future` to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    Ok(runtime.block_on(future))
}
