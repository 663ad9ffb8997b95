use std::path::Path;

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, CellAlignment, Color};
use tracing::info;

use colmap_catalog::{MappingSettings, SchemaCatalog};
use colmap_cli::session::{MapSession, load_catalog, source_files};
use colmap_ingest::{extract_columns, get_sample_data};
use colmap_map::{
    AutoMapOutcome, ConfidenceLevel, ConfidenceThresholds, FieldDecision, InvalidMappingDetector, InvalidReason,
    MappingSummary, RequiredMappingValidator, apply_file_statuses, check_file_statuses_async,
};
use colmap_model::FileStatus;

use crate::cli::{
    AutomapArgs, MapArgs, MapFileArg, PreviewArgs, RemoveFileArgs, TypesArgs, UnmapArgs,
    ValidateArgs,
};
use crate::output::{align_column, dim_cell, flag_cell, ok_cell, percent, styled_table};

/// Catalog options shared by every command.
pub struct CatalogArgs<'a> {
    pub registry: Option<&'a Path>,
    pub settings: Option<&'a Path>,
}

impl CatalogArgs<'_> {
    fn load(&self) -> Result<SchemaCatalog<MappingSettings>> {
        load_catalog(self.registry, self.settings)
    }
}

// =========================================================================
// Source inspection
// =========================================================================

pub fn run_columns(path: &Path) -> Result<bool> {
    let files = source_files(path)?;
    if files.is_empty() {
        println!("No supported source files in {}.", path.display());
        return Ok(true);
    }

    let mut table = styled_table(&["File", "Table", "#", "Column", "Samples"]);
    for file in &files {
        let tables = extract_columns(file).with_context(|| format!("read {}", file.display()))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for (name, columns) in &tables {
            for column in columns {
                table.add_row(vec![
                    Cell::new(&file_name),
                    Cell::new(name),
                    Cell::new(column.column_index),
                    Cell::new(&column.column_name),
                    Cell::new(column.sample_value_count),
                ]);
            }
        }
    }
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    println!("{table}");
    Ok(true)
}

pub fn run_preview(args: &PreviewArgs) -> Result<bool> {
    let table_name = match &args.table {
        Some(name) => name.clone(),
        None => extract_columns(&args.file)
            .with_context(|| format!("read {}", args.file.display()))?
            .into_keys()
            .next()
            .ok_or_else(|| anyhow!("{} has no tables", args.file.display()))?,
    };
    let sample = get_sample_data(&args.file, &table_name, args.rows)
        .with_context(|| format!("preview {table_name} in {}", args.file.display()))?;

    let headers: Vec<&str> = sample.headers.iter().map(String::as_str).collect();
    let mut table = styled_table(&headers);
    for row in &sample.rows {
        table.add_row(row);
    }
    println!("{}", sample.table_name);
    println!("{table}");
    Ok(true)
}

// =========================================================================
// Schema
// =========================================================================

pub fn run_types(catalog_args: &CatalogArgs<'_>, args: &TypesArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let Some(data_type) = &args.data_type else {
        let mut table = styled_table(&["Type", "Plural", "Fields", "Required", "Description"]);
        for name in catalog.available_data_types() {
            let visible = catalog.get_properties_for_type(&name);
            table.add_row(vec![
                Cell::new(&name).fg(Color::Blue),
                dim_cell(catalog.plural_name(&name).unwrap_or_default()),
                Cell::new(visible.len()),
                Cell::new(visible.iter().filter(|p| p.is_required).count()),
                Cell::new(catalog.get_data_type_description(&name).unwrap_or_default()),
            ]);
        }
        println!("{table}");
        return Ok(true);
    };

    let all = catalog
        .try_all_properties_for_type(data_type)
        .with_context(|| format!("describe {data_type}"))?;
    let mut table = styled_table(&["Field", "Type", "Required", "Computed", "Visible", "Description"]);
    for property in all {
        let visible = catalog.is_property_visible(data_type, &property.property_name);
        if !visible && !args.all {
            continue;
        }
        table.add_row(vec![
            Cell::new(&property.property_name),
            dim_cell(&property.property_type),
            flag_cell(property.is_required),
            flag_cell(property.is_computed),
            flag_cell(visible),
            Cell::new(property.description_text().unwrap_or_default()),
        ]);
    }
    println!("{table}");
    Ok(true)
}

// =========================================================================
// Editing
// =========================================================================

pub fn run_automap(catalog_args: &CatalogArgs<'_>, args: &AutomapArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map.map)?;
    let report = session.auto_map(&catalog, &args.data_type, &args.file, args.table.as_deref())?;

    match report.outcome {
        AutoMapOutcome::NoSourceColumns => println!("The selected table has no columns."),
        AutoMapOutcome::AllFieldsMapped => {
            println!("Every field of {} is already mapped.", report.data_type);
        }
        AutoMapOutcome::Completed { applied } => {
            println!("Mapped {applied} field(s) of {}.", report.data_type);
        }
    }

    if !report.decisions.is_empty() {
        let mut table = styled_table(&["Field", "Column", "Score", "Result"]);
        for (field, decision) in &report.decisions {
            let row = match decision {
                FieldDecision::Matched {
                    column,
                    score,
                    reason,
                } => vec![
                    Cell::new(field),
                    Cell::new(column),
                    Cell::new(percent(*score)),
                    Cell::new(reason.to_string()).fg(Color::Green),
                ],
                FieldDecision::LowConfidence {
                    column,
                    score,
                    threshold,
                } => vec![
                    Cell::new(field),
                    Cell::new(column),
                    Cell::new(percent(*score)),
                    Cell::new(format!("below {}", percent(*threshold))).fg(Color::Yellow),
                ],
                FieldDecision::NoMatch => vec![
                    Cell::new(field),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("no match"),
                ],
            };
            table.add_row(row);
        }
        align_column(&mut table, 2, CellAlignment::Right);
        println!("{table}");
    }
    if let Some(fallback) = &report.fallback {
        println!(
            "{} bound to {:?} by {}.",
            fallback.property_name, fallback.column, fallback.rule
        );
    }

    save(&mut session, &catalog)?;
    Ok(true)
}

pub fn run_map(catalog_args: &CatalogArgs<'_>, args: &MapArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map.map)?;
    let change = session.map_column(&catalog, &args.data_type, &args.property, &args.column)?;

    if let Some(other) = &change.displaced {
        println!("{:?} was bound to {other}; that mapping was removed.", args.column);
    }
    if let Some(previous) = &change.previous {
        println!("Replaced previous column {:?}.", previous.column_header);
    }
    save(&mut session, &catalog)?;
    Ok(true)
}

pub fn run_unmap(catalog_args: &CatalogArgs<'_>, args: &UnmapArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map.map)?;
    let removed = session
        .document
        .remove_mapping(&args.data_type, &args.property);
    if removed.is_none() {
        println!("{}.{} is not mapped.", args.data_type, args.property);
        return Ok(true);
    }
    save(&mut session, &catalog)?;
    Ok(true)
}

// =========================================================================
// Audits
// =========================================================================

pub fn run_validate(catalog_args: &CatalogArgs<'_>, args: &ValidateArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map.map)?;

    let report = RequiredMappingValidator::validate(&catalog, &session.document);
    let mut table = styled_table(&["Type", "Required", "Missing"]);
    for validation in &report.types {
        table.add_row(vec![
            Cell::new(&validation.data_type),
            Cell::new(validation.required.len()),
            if validation.is_valid() {
                ok_cell(true, "none")
            } else {
                ok_cell(false, &validation.missing.join(", "))
            },
        ]);
    }
    println!("{table}");

    let invalid = InvalidMappingDetector::detect(&catalog, &session.document);
    if !invalid.is_empty() {
        let mut table = styled_table(&["Type", "Field", "Column", "Problem"]);
        for finding in &invalid {
            let problem = match finding.reason {
                InvalidReason::UnknownType => "unknown type",
                InvalidReason::PropertyNotVisible => "field hidden or removed",
            };
            table.add_row(vec![
                Cell::new(&finding.data_type),
                Cell::new(&finding.property_name),
                Cell::new(&finding.column_header),
                Cell::new(problem).fg(Color::Yellow),
            ]);
        }
        println!("{table}");
        if args.fix {
            let removed = InvalidMappingDetector::remove(&mut session.document, &invalid);
            println!("Removed {removed} invalid mapping(s).");
            save(&mut session, &catalog)?;
        }
    }

    let clean = report.is_valid() && (invalid.is_empty() || args.fix);
    info!(
        missing = report.missing_count(),
        invalid = invalid.len(),
        "Validation finished"
    );
    Ok(clean)
}

pub fn run_remove_file(catalog_args: &CatalogArgs<'_>, args: &RemoveFileArgs) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map.map)?;
    let report = session.remove_file(&args.file, args.apply)?;

    if report.is_empty() {
        println!("No mappings depend only on {}.", args.file.display());
    } else {
        let mut table = styled_table(&["Type", "Field", "Column"]);
        for orphan in &report.orphaned {
            table.add_row(vec![
                Cell::new(&orphan.data_type),
                Cell::new(&orphan.property_name),
                Cell::new(&orphan.column_header),
            ]);
        }
        println!("{table}");
        for (data_type, display) in &report.stale_table_references {
            println!("{data_type} selects table {display:?}.");
        }
    }

    if args.apply {
        save(&mut session, &catalog)?;
    } else {
        println!("Nothing was removed; rerun with --apply to remove the file.");
    }
    Ok(true)
}

pub fn run_check(catalog_args: &CatalogArgs<'_>, args: &MapFileArg) -> Result<bool> {
    let catalog = catalog_args.load()?;
    let mut session = MapSession::open(&args.map)?;

    let paths = session
        .document
        .referenced_files()
        .iter()
        .map(|f| f.file_path.clone())
        .collect();
    let runtime = tokio::runtime::Runtime::new().context("start runtime")?;
    let statuses = runtime.block_on(check_file_statuses_async(paths))?;
    apply_file_statuses(&mut session.document, &statuses);

    let mut files = styled_table(&["File", "Status"]);
    for file in session.document.referenced_files() {
        let status = match file.status {
            FileStatus::Available => ok_cell(true, "available"),
            FileStatus::Missing => ok_cell(false, "missing"),
            FileStatus::Unknown => dim_cell("unknown"),
        };
        files.add_row(vec![Cell::new(file.file_path.display()), status]);
    }
    println!("{files}");

    let thresholds = ConfidenceThresholds::default();
    let mut types = styled_table(&["Type", "Table", "Mapped", "Auto", "Low", "Required"]);
    let data_types: Vec<String> = session.document.mapped_types().map(str::to_string).collect();
    for data_type in data_types {
        let summary = MappingSummary::for_type(&catalog, &session.document, &data_type);
        let low = session
            .document
            .mappings_for(&data_type)
            .iter()
            .filter_map(|entry| thresholds.categorize(entry))
            .filter(|level| *level == ConfidenceLevel::Low)
            .count();
        types.add_row(vec![
            Cell::new(&data_type),
            dim_cell(session.document.table_reference(&data_type).unwrap_or("-")),
            Cell::new(format!("{}/{}", summary.mapped, summary.total_fields)),
            Cell::new(summary.automatic),
            Cell::new(low),
            ok_cell(
                summary.is_complete(),
                &format!("{}/{}", summary.required_mapped, summary.required_total),
            ),
        ]);
    }
    println!("{types}");

    let missing = statuses
        .iter()
        .filter(|(_, s)| *s == FileStatus::Missing)
        .count();
    Ok(missing == 0)
}

fn save(session: &mut MapSession, catalog: &SchemaCatalog<MappingSettings>) -> Result<()> {
    if session.save(catalog)? {
        println!("Saved {}.", session.path().display());
    }
    Ok(())
}
