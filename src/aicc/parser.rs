//! AICC course file decoder.

use super::csv::{CsvTable, parse_table};
use super::ini::{CourseFile, parse_course_file};
use super::model::{
    AiccManifest, AssignableUnit, Course, CourseBehavior, CourseStructure, Descriptor, ROOT_BLOCK,
};
use crate::access::{FileAccess, extension};
use crate::common::encoding::decode_text;
use crate::common::error::{ParseError, ParseResult};
use crate::common::options::ParseOptions;
use crate::common::source::read_source;
use crate::detection::ModuleType;
use crate::manifest::{ModuleMetadata, ModuleParser, ParsedModule};
use std::str::FromStr;

/// Paths of the four course files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFiles {
    pub crs: String,
    pub des: String,
    pub au: String,
    pub cst: String,
}

/// Parses AICC packages.
#[derive(Debug)]
pub struct AiccParser<A> {
    access: A,
    options: ParseOptions,
}

impl<A: FileAccess> AiccParser<A> {
    pub fn new(access: A) -> Self {
        Self::with_options(access, ParseOptions::default())
    }

    pub fn with_options(access: A, options: ParseOptions) -> Self {
        Self { access, options }
    }

    /// Locate the `.crs`, `.des`, `.au` and `.cst` files at the package root.
    ///
    /// An exact-case extension match wins; otherwise the first
    /// case-insensitive match is used.
    pub fn locate_files(&self) -> ParseResult<CourseFiles> {
        let files = self.access.list_files("").map_err(|e| ParseError::list("", e))?;
        let find = |ext: &str| -> ParseResult<String> {
            files
                .iter()
                .find(|f| extension(f) == Some(ext))
                .or_else(|| files.iter().find(|f| extension(f).is_some_and(|e| e.eq_ignore_ascii_case(ext))))
                .cloned()
                .ok_or_else(|| ParseError::MissingFile(format!("*.{}", ext)))
        };
        Ok(CourseFiles {
            crs: find("crs")?,
            des: find("des")?,
            au: find("au")?,
            cst: find("cst")?,
        })
    }

    /// Parse the four course files and resolve the course structure.
    pub fn parse_manifest(&self) -> ParseResult<AiccManifest> {
        tracing::debug!(root = self.access.root_path(), "parsing AICC course");
        let files = self.locate_files()?;

        let course_file = parse_course_file(&self.read_text(&files.crs)?, &files.crs)?;
        let course = decode_course(&course_file, &files.crs)?;
        let course_behavior = decode_course_behavior(&course_file, &files.crs)?;
        let descriptors = decode_descriptors(&parse_table(&self.read_text(&files.des)?, &files.des)?, &files.des)?;
        let mut assignable_units = decode_assignable_units(&parse_table(&self.read_text(&files.au)?, &files.au)?, &files.au)?;
        let course_structure = decode_course_structure(&parse_table(&self.read_text(&files.cst)?, &files.cst)?);

        check_members(&course_structure, &assignable_units)?;
        let root_system_id = resolve_root(&course_structure, &assignable_units)?;

        for au in &mut assignable_units {
            au.descriptor = descriptors
                .iter()
                .find(|d| d.system_id.eq_ignore_ascii_case(&au.system_id))
                .cloned();
        }

        let manifest = AiccManifest {
            course: course_file.section("course").map(|_| course),
            course_behavior,
            assignable_units,
            descriptors,
            course_structure,
            root_system_id: Some(root_system_id),
        };
        require_title_and_launch(&manifest, &files)?;

        tracing::debug!(
            assignable_units = manifest.assignable_units.len(),
            root = manifest.root_system_id.as_deref().unwrap_or_default(),
            "parsed AICC course"
        );
        Ok(manifest)
    }

    /// Parse and project into [`ModuleMetadata`].
    pub fn parse_metadata(&self) -> ParseResult<ModuleMetadata<AiccManifest>> {
        ModuleMetadata::from_manifest(self.parse_manifest()?, &self.access)
    }

    fn read_text(&self, path: &str) -> ParseResult<String> {
        let bytes = read_source(&self.access, path, &self.options)?;
        let decoded = decode_text(&bytes, path, self.options.legacy_encoding_fallback)?;
        if decoded.used_fallback() {
            tracing::warn!(path, "course file decoded with the Windows-1252 fallback");
        }
        Ok(decoded.text)
    }
}

impl<A: FileAccess> ModuleParser for AiccParser<A> {
    fn module_type(&self) -> ModuleType {
        ModuleType::Aicc
    }

    fn parse(&self) -> ParseResult<ParsedModule> {
        self.parse_metadata().map(ParsedModule::Aicc)
    }
}

fn parse_field<T>(value: Option<&str>, file: &str, field: &str) -> ParseResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| ParseError::format(file, field, format!("invalid value '{}': {}", v, e)))
        })
        .transpose()
}

fn decode_course(file: &CourseFile, path: &str) -> ParseResult<Course> {
    let value = |key: &str| file.value("course", key);
    let number = |key: &str| parse_field::<u32>(value(key), path, &format!("[Course] {}", key));
    Ok(Course {
        course_creator: value("course_creator").map(str::to_string),
        course_id: value("course_id").map(str::to_string),
        course_system: value("course_system").map(str::to_string),
        course_title: value("course_title").map(str::to_string),
        level: value("level").map(str::to_string),
        max_fields_cst: number("Max_Fields_CST")?,
        max_fields_ort: number("Max_Fields_ORT")?,
        total_aus: number("Total_AUs")?,
        total_blocks: number("Total_Blocks")?,
        total_objectives: number("Total_Objectives")?,
        total_complex_obj: number("Total_Complex_Obj")?,
        version: value("version").map(str::to_string),
        description: file.description.clone(),
    })
}

fn decode_course_behavior(file: &CourseFile, path: &str) -> ParseResult<Option<CourseBehavior>> {
    if file.section("course_behavior").is_none() {
        return Ok(None);
    }
    Ok(Some(CourseBehavior {
        max_normal: parse_field(
            file.value("course_behavior", "max_normal"),
            path,
            "[Course_Behavior] Max_Normal",
        )?,
    }))
}

fn require_system_id_column(table: &CsvTable, path: &str) -> ParseResult<()> {
    if table.column("system_id").is_none() && !table.rows.is_empty() {
        return Err(ParseError::format(path, "System_ID", "missing column"));
    }
    Ok(())
}

fn decode_descriptors(table: &CsvTable, path: &str) -> ParseResult<Vec<Descriptor>> {
    require_system_id_column(table, path)?;
    Ok(table
        .records()
        .filter_map(|record| {
            Some(Descriptor {
                system_id: record.get("system_id")?.to_string(),
                developer_id: record.get("developer_id").map(str::to_string),
                title: record.get("title").map(str::to_string),
                description: record.get("description").map(str::to_string),
            })
        })
        .collect())
}

fn decode_assignable_units(table: &CsvTable, path: &str) -> ParseResult<Vec<AssignableUnit>> {
    require_system_id_column(table, path)?;
    table
        .records()
        .enumerate()
        .map(|(index, record)| {
            let system_id = record.get("system_id").ok_or_else(|| {
                ParseError::format(path, "System_ID", format!("row {} has no system ID", index + 2))
            })?;
            Ok(AssignableUnit {
                system_id: system_id.to_string(),
                au_type: record.get("type").map(str::to_string),
                command_line: record.get("command_line").map(str::to_string),
                file_name: record.get("file_name").map(str::to_string),
                core_vendor: record.get("core_vendor").map(str::to_string),
                max_score: parse_field(record.get("max_score"), path, "Max_Score")?,
                mastery_score: parse_field(record.get("mastery_score"), path, "Mastery_Score")?,
                max_time_allowed: record.get("max_time_allowed").map(str::to_string),
                time_limit_action: record.get("time_limit_action").map(str::to_string),
                system_vendor: record.get("system_vendor").map(str::to_string),
                web_launch: record.get("web_launch").map(str::to_string),
                au_password: record.get("au_password").map(str::to_string),
                descriptor: None,
            })
        })
        .collect()
}

/// One edge per (block, member) pair; a row may list several members.
fn decode_course_structure(table: &CsvTable) -> Vec<CourseStructure> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let (block, members) = row.split_first()?;
            (!block.is_empty()).then_some((block, members))
        })
        .flat_map(|(block, members)| {
            members
                .iter()
                .filter(|m| !m.is_empty())
                .map(move |member| CourseStructure {
                    block: block.clone(),
                    member: member.clone(),
                })
        })
        .collect()
}

fn is_assignable_unit(units: &[AssignableUnit], name: &str) -> bool {
    units.iter().any(|au| au.system_id.eq_ignore_ascii_case(name))
}

/// Every member must name an assignable unit.
fn check_members(structure: &[CourseStructure], units: &[AssignableUnit]) -> ParseResult<()> {
    match structure.iter().find(|edge| !is_assignable_unit(units, &edge.member)) {
        Some(edge) => Err(ParseError::Structure(format!(
            "No assignable unit found with ID: {}",
            edge.member
        ))),
        None => Ok(()),
    }
}

/// The first member of the block named exactly `ROOT`.
fn resolve_root(structure: &[CourseStructure], units: &[AssignableUnit]) -> ParseResult<String> {
    let no_root = || ParseError::Structure("No root assignable unit found.".to_string());
    let member = structure
        .iter()
        .find(|edge| edge.block == ROOT_BLOCK)
        .map(|edge| edge.member.as_str())
        .ok_or_else(no_root)?;
    units
        .iter()
        .find(|au| au.system_id.eq_ignore_ascii_case(member))
        .map(|au| au.system_id.clone())
        .ok_or_else(no_root)
}

fn require_title_and_launch(manifest: &AiccManifest, files: &CourseFiles) -> ParseResult<()> {
    use crate::common::is_blank;
    use crate::manifest::PackageManifest;

    if is_blank(manifest.title()) {
        return Err(ParseError::format(&files.crs, "[Course] Course_Title", "course title is missing"));
    }
    if is_blank(manifest.launch_url()) {
        return Err(ParseError::format(
            &files.au,
            "File_Name",
            format!(
                "root assignable unit {} has no file name",
                manifest.root_system_id.as_deref().unwrap_or_default()
            ),
        ));
    }
    Ok(())
}
