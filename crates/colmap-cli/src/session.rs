//! A map file opened for editing from the command line.
//!
//! Each command opens the map, re-extracts the columns of the referenced
//! files that still exist, applies one change and saves.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::warn;

use colmap_catalog::{MappingSettings, SchemaCatalog, SchemaRegistry};
use colmap_ingest::list_source_files;
use colmap_map::{
    AutoMapReport, AutoMapper, MappingDocument, OrphanReport, OrphanedMappingDetector,
    SourceColumns,
};
use colmap_model::{ColumnInfo, MappingEntry, TableReference};
use colmap_persistence::{MapFile, is_valid_map_file, read_map_file, save_map_file};

/// Builds the catalog from an optional registry file and settings file.
///
/// Without a registry file the built-in types are used; without a settings
/// file the per-user settings (or defaults) apply.
pub fn load_catalog(
    registry: Option<&Path>,
    settings: Option<&Path>,
) -> Result<SchemaCatalog<MappingSettings>> {
    let registry = match registry {
        Some(path) => SchemaRegistry::load(path)
            .with_context(|| format!("load schema registry {}", path.display()))?,
        None => SchemaRegistry::builtin().context("load built-in schema registry")?,
    };
    let settings = settings.map_or_else(MappingSettings::load, MappingSettings::load_from);
    Ok(SchemaCatalog::new(Arc::new(registry), settings))
}

/// The source files named by `path`: the file itself, or every supported
/// file in it when it is a directory.
pub fn source_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        list_source_files(path).with_context(|| format!("list source files in {}", path.display()))
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

/// Where a `map` call left the column's previous binding.
#[derive(Debug, Clone, PartialEq)]
pub struct MapChange {
    pub previous: Option<MappingEntry>,
    /// Property that was bound to the same column and got unbound.
    pub displaced: Option<String>,
}

pub struct MapSession {
    path: PathBuf,
    pub document: MappingDocument,
    pub sources: SourceColumns,
}

impl MapSession {
    /// Opens `path`, or starts a new map named after it if it doesn't exist.
    ///
    /// Columns recorded at the last save stand in for referenced files that
    /// can no longer be read.
    pub fn open(path: &Path) -> Result<Self> {
        let (document, mut sources) = if path.exists() {
            if !is_valid_map_file(path) {
                bail!("{} is not a map file", path.display());
            }
            let file = read_map_file(path).with_context(|| format!("load map {}", path.display()))?;
            let sources = file.recorded_sources();
            (file.into_document(), sources)
        } else {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("map");
            (MappingDocument::new(name), SourceColumns::new())
        };

        for file in document.referenced_files() {
            if let Err(error) = sources.register_file(&file.file_path) {
                let recorded = !sources.tables_for_file(&file.file_path).is_empty();
                warn!(
                    path = %file.file_path.display(),
                    %error,
                    recorded,
                    "Using saved columns for unreadable source file"
                );
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
            sources,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// References a source file and records its columns.
    pub fn add_source(&mut self, file: &Path) -> Result<Vec<TableReference>> {
        let file = absolute(file)?;
        let tables = self
            .sources
            .register_file(&file)
            .with_context(|| format!("read columns of {}", file.display()))?;
        self.document.add_referenced_file(&file);
        Ok(tables)
    }

    /// Picks a table of a registered file. `table` may be omitted when the
    /// file has exactly one.
    pub fn resolve_table(&self, file: &Path, table: Option<&str>) -> Result<TableReference> {
        let file = absolute(file)?;
        let tables = self.sources.tables_for_file(&file);
        let found = match table {
            Some(name) => tables
                .iter()
                .find(|t| t.table_name.eq_ignore_ascii_case(name))
                .copied(),
            None if tables.len() == 1 => tables.first().copied(),
            None => {
                let names: Vec<&str> = tables.iter().map(|t| t.table_name.as_str()).collect();
                bail!(
                    "{} has {} tables; choose one with --table ({})",
                    file.display(),
                    names.len(),
                    names.join(", ")
                );
            }
        };
        found
            .cloned()
            .ok_or_else(|| anyhow!("no table {:?} in {}", table.unwrap_or_default(), file.display()))
    }

    /// Selects the type's source table and auto-maps its columns.
    pub fn auto_map(
        &mut self,
        catalog: &SchemaCatalog<MappingSettings>,
        data_type: &str,
        file: &Path,
        table: Option<&str>,
    ) -> Result<AutoMapReport> {
        let data_type = catalog
            .canonical_name(data_type)
            .ok_or_else(|| anyhow!("unknown type {data_type:?}"))?
            .to_string();
        self.add_source(file)?;
        let reference = self.resolve_table(file, table)?;
        let display = reference.display_name();
        let columns: Vec<ColumnInfo> = self
            .sources
            .columns(&display)
            .map(<[ColumnInfo]>::to_vec)
            .unwrap_or_default();

        self.document.set_table_reference(&data_type, &display)?;
        let mapper = AutoMapper::new(catalog.settings().automap.clone());
        mapper
            .auto_map(catalog, &mut self.document, &data_type, &columns)
            .with_context(|| format!("auto-map {data_type}"))
    }

    /// Binds `column` to `property`, unbinding whatever property held the
    /// column before.
    pub fn map_column(
        &mut self,
        catalog: &SchemaCatalog<MappingSettings>,
        data_type: &str,
        property: &str,
        column: &str,
    ) -> Result<MapChange> {
        let data_type = catalog
            .canonical_name(data_type)
            .ok_or_else(|| anyhow!("unknown type {data_type:?}"))?
            .to_string();
        let property = catalog
            .get_properties_for_type(&data_type)
            .into_iter()
            .find(|p| p.property_name.eq_ignore_ascii_case(property))
            .map(|p| p.property_name)
            .ok_or_else(|| anyhow!("{data_type} has no visible field {property:?}"))?;

        let displaced = self
            .document
            .property_for_column(&data_type, column)
            .filter(|bound| !bound.eq_ignore_ascii_case(&property))
            .map(str::to_string);
        if let Some(other) = &displaced {
            warn!(data_type = %data_type, column, property = %other, "Replacing existing binding");
            self.document.remove_mapping(&data_type, other);
        }

        let previous = self.document.update_mapping(&data_type, &property, column)?;
        Ok(MapChange {
            previous,
            displaced,
        })
    }

    /// Reports what removing `file` would orphan; removes it when `apply`.
    pub fn remove_file(&mut self, file: &Path, apply: bool) -> Result<OrphanReport> {
        let file = absolute(file)?;
        if !self.document.is_referenced(&file) {
            bail!("{} is not referenced by this map", file.display());
        }
        let report = OrphanedMappingDetector::detect(&self.document, &self.sources, &file);
        if apply {
            OrphanedMappingDetector::remove_file(&mut self.document, &mut self.sources, &report);
        }
        Ok(report)
    }

    /// Saves when there are unsaved changes. Returns whether it wrote.
    pub fn save(&mut self, catalog: &SchemaCatalog<MappingSettings>) -> Result<bool> {
        if !self.document.is_dirty() {
            return Ok(false);
        }
        let file = MapFile::from_document_with_catalog(&self.document, catalog)
            .with_source_columns(&self.sources);
        if let Err(error) = save_map_file(&mut self.document, &self.path, file) {
            let message = error.user_message();
            return Err(anyhow::Error::new(error).context(message));
        }
        Ok(true)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolve {}", path.display()))
}
