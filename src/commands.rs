use crate::{Dataset, OutputMode, emit_success};
use anyhow::Context as _;
use chemlink::config::{self, ChemlinkConfig};
use chemlink::importer::{Importer, Workbook};
use chemlink::linker::{self, CrossLinker};
use chemlink::query::{QueryEngine, SearchCriteria};
use chemlink::storage::{BatchResult, Store};
use chemlink::ui::{self, Icons, ProgressManager, Spinner};
use chemlink::{ChemicalRecord, ExposureLimitRecord};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct Context {
    pub chemicals: Store<ChemicalRecord>,
    pub limits: Store<ExposureLimitRecord>,
    pub database: PathBuf,
    pub output_mode: OutputMode,
}

fn source_name(path: &Path, source: Option<String>) -> String {
    source.unwrap_or_else(|| {
        path.file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

fn report_batch(output_mode: OutputMode, command: &str, result: &BatchResult) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!("{}", result);
        ui::record_failures(&result.errors);
        Ok(())
    } else {
        emit_success(output_mode, command, serde_json::to_value(result)?)
    }
}

pub async fn run_init(
    ctx: &Context,
    config_path: &Path,
    config: &ChemlinkConfig,
    force: bool,
) -> anyhow::Result<()> {
    ctx.chemicals.init().await?;
    ctx.limits.init().await?;
    config::write_config(config_path, config, force)?;

    if ctx.output_mode.is_human() {
        ui::success("Chemlink initialized");
        ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
        ui::status(Icons::FILE, "Config", &config_path.display().to_string());
    } else {
        emit_success(
            ctx.output_mode,
            "init",
            serde_json::json!({
                "database": ctx.database,
                "config": config_path,
            }),
        )?;
    }
    Ok(())
}

pub async fn run_import_limits(ctx: &Context, path: &Path, source: Option<String>) -> anyhow::Result<()> {
    let source = source_name(path, source);
    let workbook = Workbook::from_json_file(path)?;
    let started = Instant::now();

    if ctx.output_mode.is_human() {
        ui::header(&format!("Importing exposure limits from {}", source));
        ui::status(Icons::SHEET, "Sheets", &workbook.sheets.len().to_string());
    }

    let progress = ProgressManager::new(!ctx.output_mode.is_human() || config::is_quiet());
    let result = Importer::new(&ctx.limits)
        .import_workbook(&workbook, &source, progress.reporter())
        .await
        .context("import aborted, nothing was written")?;

    if ctx.output_mode.is_human() {
        progress.finish_with_summary(started.elapsed(), result.success_count, result.fail_count);
    }
    report_batch(ctx.output_mode, "import-limits", &result)
}

pub async fn run_import_sds(ctx: &Context, path: &Path, source: Option<String>) -> anyhow::Result<()> {
    let source = source_name(path, source);
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<ChemicalRecord> = serde_json::from_str(&contents)?;

    let spinner = Spinner::new(&format!("Importing {} safety data sheet(s)", records.len()));
    let result = Importer::new(&ctx.chemicals).import_chemicals(records, &source).await;
    spinner.finish_and_clear();

    let result = result.context("import aborted, nothing was written")?;
    report_batch(ctx.output_mode, "import-sds", &result)
}

pub async fn run_search(ctx: &Context, keyword: &str, dataset: Dataset) -> anyhow::Result<()> {
    if ctx.output_mode.is_human() {
        println!("{} Searching {:?} for: '{}'...", Icons::SEARCH, dataset, keyword);
    }

    match dataset {
        Dataset::Chemicals => {
            let results = QueryEngine::new(&ctx.chemicals).search(keyword).await?;
            print_chemicals(ctx.output_mode, "search", &results)
        }
        Dataset::Limits => {
            let results = QueryEngine::new(&ctx.limits).search(keyword).await?;
            print_limits(ctx.output_mode, "search", &results)
        }
    }
}

pub async fn run_find(ctx: &Context, criteria: &SearchCriteria) -> anyhow::Result<()> {
    let results = QueryEngine::new(&ctx.chemicals).advanced_search(criteria).await?;
    print_chemicals(ctx.output_mode, "find", &results)
}

pub async fn run_list(ctx: &Context, dataset: Dataset, page: usize, page_size: usize) -> anyhow::Result<()> {
    match dataset {
        Dataset::Chemicals => {
            let page = QueryEngine::new(&ctx.chemicals).get_all(page, page_size).await?;
            if ctx.output_mode.is_human() {
                print_chemicals(ctx.output_mode, "list", &page.data)?;
                ui::summary_row("Page", &format!("{}/{} ({} total)", page.page, page.total_pages, page.total));
                Ok(())
            } else {
                emit_success(ctx.output_mode, "list", serde_json::to_value(&page)?)
            }
        }
        Dataset::Limits => {
            let page = QueryEngine::new(&ctx.limits).get_all(page, page_size).await?;
            if ctx.output_mode.is_human() {
                print_limits(ctx.output_mode, "list", &page.data)?;
                ui::summary_row("Page", &format!("{}/{} ({} total)", page.page, page.total_pages, page.total));
                Ok(())
            } else {
                emit_success(ctx.output_mode, "list", serde_json::to_value(&page)?)
            }
        }
    }
}

pub async fn run_show(ctx: &Context, id: i64, dataset: Dataset) -> anyhow::Result<()> {
    let record = match dataset {
        Dataset::Chemicals => ctx.chemicals.get_by_id(id).await?.map(serde_json::to_value).transpose()?,
        Dataset::Limits => ctx.limits.get_by_id(id).await?.map(serde_json::to_value).transpose()?,
    };

    let Some(record) = record else {
        anyhow::bail!("no {:?} record with id {}", dataset, id);
    };

    if ctx.output_mode.is_human() {
        println!("{}", serde_json::to_string_pretty(&record)?);
        Ok(())
    } else {
        emit_success(ctx.output_mode, "show", record)
    }
}

pub async fn run_delete(ctx: &Context, id: i64, dataset: Dataset) -> anyhow::Result<()> {
    match dataset {
        Dataset::Chemicals => ctx.chemicals.delete(id).await?,
        Dataset::Limits => ctx.limits.delete(id).await?,
    }

    if ctx.output_mode.is_human() {
        println!("{} Deleted {:?} record {}", Icons::DEL, dataset, id);
        Ok(())
    } else {
        emit_success(ctx.output_mode, "delete", serde_json::json!({ "id": id }))
    }
}

pub async fn run_link(ctx: &Context, details: bool) -> anyhow::Result<()> {
    let spinner = Spinner::new("Linking safety data sheets to exposure limits");
    let summary = CrossLinker::new(&ctx.chemicals, &ctx.limits).run().await;
    spinner.finish_and_clear();
    let summary = summary?;

    if !ctx.output_mode.is_human() {
        return emit_success(ctx.output_mode, "link", serde_json::to_value(&summary)?);
    }

    println!("{} {}", Icons::LINK, summary);
    if details {
        ui::section("Linked");
        for entry in &summary.linked {
            println!(
                "  {} {} ↔ {}",
                ui::identifier(Some(&entry.identifier)),
                entry.left.name,
                entry.right.name
            );
        }
        ui::section("Unlinked");
        for entry in &summary.unlinked {
            println!("  {} {}", ui::identifier(Some(&entry.identifier)), entry.name);
        }
    }
    Ok(())
}

pub async fn run_lookup(ctx: &Context, cas: &str) -> anyhow::Result<()> {
    let combined = linker::lookup(&ctx.chemicals, &ctx.limits, cas).await?;
    let report = linker::CompletenessReport::from(&combined);

    if !ctx.output_mode.is_human() {
        return emit_success(
            ctx.output_mode,
            "lookup",
            serde_json::json!({
                "record": combined,
                "completeness": report,
            }),
        );
    }

    ui::header(&format!("CAS {}", ui::identifier(Some(cas))));
    match &combined.chemical {
        Some(chemical) => {
            ui::section("Safety data sheet");
            println!("{}", ui::chemicals_table(std::slice::from_ref(chemical)));
        }
        None => ui::empty("No safety data sheet"),
    }
    match &combined.exposure_limit {
        Some(limit) => {
            ui::section("Exposure limit");
            println!("{}", ui::exposure_limits_table(std::slice::from_ref(limit)));
            ui::hazard_flags(limit);
        }
        None => ui::empty("No exposure limit"),
    }

    ui::section(&format!("Completeness {}%", report.completeness_percentage));
    for recommendation in &report.recommendations {
        ui::recommendation(recommendation);
    }
    Ok(())
}

pub async fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let chemicals = QueryEngine::new(&ctx.chemicals).get_statistics().await?;
    let limits = QueryEngine::new(&ctx.limits).get_statistics().await?;

    if !ctx.output_mode.is_human() {
        return emit_success(
            ctx.output_mode,
            "stats",
            serde_json::json!({ "chemicals": chemicals, "exposure_limits": limits }),
        );
    }

    println!("{} Chemlink Statistics ({})", Icons::STATS, ctx.database.display());
    let chemical_total = chemicals.total.to_string();
    let chemical_batches = chemicals.batches.to_string();
    let limit_total = limits.total.to_string();
    let limit_batches = limits.batches.to_string();
    println!(
        "{}",
        ui::stats_table(&[
            ("Safety data sheets", &chemical_total),
            ("SDS import batches", &chemical_batches),
            ("Exposure limits", &limit_total),
            ("Limit import batches", &limit_batches),
        ])
    );

    let recent = ctx.limits.batches().await?;
    if let Some(last) = recent.last() {
        ui::info("Last limit import", &format!("{} ({})", last.source, last.imported_at.format("%Y-%m-%d %H:%M")));
    }
    Ok(())
}

pub async fn run_clear(ctx: &Context, dataset: Option<Dataset>) -> anyhow::Result<()> {
    match dataset {
        Some(Dataset::Chemicals) => ctx.chemicals.clear().await?,
        Some(Dataset::Limits) => ctx.limits.clear().await?,
        None => ctx.chemicals.clear_with::<ExposureLimitRecord>().await?,
    }

    let chemicals = ctx.chemicals.count().await?;
    let limits = ctx.limits.count().await?;

    if ctx.output_mode.is_human() {
        ui::success("Cleared");
        ui::summary_row("Safety data sheets", &chemicals.to_string());
        ui::summary_row("Exposure limits", &limits.to_string());
        Ok(())
    } else {
        emit_success(
            ctx.output_mode,
            "clear",
            serde_json::json!({ "chemicals": chemicals, "exposure_limits": limits }),
        )
    }
}

fn print_chemicals(output_mode: OutputMode, command: &str, records: &[ChemicalRecord]) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_success(output_mode, command, serde_json::to_value(records)?);
    }
    if records.is_empty() {
        ui::empty("No records found.");
    } else {
        println!("{}", ui::chemicals_table(records));
    }
    Ok(())
}

fn print_limits(output_mode: OutputMode, command: &str, records: &[ExposureLimitRecord]) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_success(output_mode, command, serde_json::to_value(records)?);
    }
    if records.is_empty() {
        ui::empty("No records found.");
    } else {
        println!("{}", ui::exposure_limits_table(records));
    }
    Ok(())
}
