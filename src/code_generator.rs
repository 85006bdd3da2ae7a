use itertools::Itertools;
use log::debug;
use prost_types::compiler::code_generator_response;

use crate::config::{Config, PathMode};
use crate::descriptor::FileDescriptorProto;
use crate::ident::{go_package_name, go_package_option, go_quote, split_go_package};
use crate::table::PermissionTable;
use crate::Error;

const HEADER_TEMPLATE: &str = include_str!("templates/header.go.tmpl");
const PERMISSIONS_TEMPLATE: &str = include_str!("templates/permissions.go.tmpl");
const CONTEXT_INTERCEPTOR_TEMPLATE: &str = include_str!("templates/context_interceptor.go.tmpl");

/// Appended to the output prefix of each `.proto` file to name its generated file.
pub const FILE_SUFFIX: &str = "_permissions.pb.go";

/// Generates the permissions file for a single `.proto` file.
///
/// Returns `None` if the file declares no services.
pub fn generate_file(
    config: &Config,
    file: &FileDescriptorProto,
) -> Result<Option<code_generator_response::File>, Error> {
    if file.service.is_empty() {
        debug!("file: {:?} has no services, skipping", file.name());
        return Ok(None);
    }

    debug!("file: {:?}, package: {:?}", file.name(), file.package());

    let table = PermissionTable::build(file, config.extension_field_number);
    let name = output_file_name(config, file)?;
    let content = emit(file, &table);

    Ok(content.map(|content| code_generator_response::File {
        name: Some(name),
        content: Some(content),
        ..Default::default()
    }))
}

/// Renders the generated source for `file` from its permission table.
///
/// The output is the header, the permissions map and the interceptor
/// scaffold, in that order. Returns `None` if the file declares no services.
pub fn emit(file: &FileDescriptorProto, table: &PermissionTable) -> Option<String> {
    if file.service.is_empty() {
        return None;
    }

    let header = HEADER_TEMPLATE
        .replace("{{source}}", file.name())
        .replace("{{package}}", &go_package_name(file));
    let permissions = PERMISSIONS_TEMPLATE.replace("{{permissions}}", &permissions_map(table));

    let mut content = header;
    content.push('\n');
    content.push_str(&permissions);
    content.push('\n');
    content.push_str(CONTEXT_INTERCEPTOR_TEMPLATE);
    Some(content)
}

/// Formats the body of the permissions map literal, one entry per line:
///
/// ```text
///     "/pkg.Svc/Method": { "read", "write", },
/// ```
pub fn permissions_map(table: &PermissionTable) -> String {
    let mut buf = String::new();
    for entry in table.iter() {
        buf.push('\t');
        buf.push_str(&go_quote(&entry.full_name));
        buf.push_str(": { ");
        buf.push_str(
            &entry
                .permissions
                .iter()
                .map(|permission| format!("{},", go_quote(permission)))
                .join(" "),
        );
        buf.push_str(" },\n");
    }
    buf
}

/// Derives the name of the file generated for `file`.
pub fn output_file_name(config: &Config, file: &FileDescriptorProto) -> Result<String, Error> {
    let mut name = output_prefix(config, file)?;
    name.push_str(FILE_SUFFIX);
    Ok(name)
}

fn output_prefix(config: &Config, file: &FileDescriptorProto) -> Result<String, Error> {
    let source = file.name();
    let prefix = match source.rfind('.') {
        Some(idx) if !source[idx..].contains('/') => &source[..idx],
        _ => source,
    };

    if config.paths == PathMode::SourceRelative {
        return Ok(prefix.to_owned());
    }

    let base = prefix.rsplit('/').next().unwrap_or(prefix);
    let import_path = match go_package_option(file) {
        Some(go_package) => split_go_package(go_package).0,
        None => prefix.rfind('/').map_or("", |idx| &prefix[..idx]),
    };
    let prefix = if import_path.is_empty() || import_path == "." {
        base.to_owned()
    } else {
        format!("{}/{}", import_path.trim_end_matches('/'), base)
    };

    match config.module {
        Some(ref module) => match prefix.strip_prefix(module.as_str()) {
            Some(rest) if rest.starts_with('/') => Ok(rest[1..].to_owned()),
            _ => Err(Error::OutputPath {
                file: format!("{}{}", prefix, FILE_SUFFIX),
                module: module.clone(),
            }),
        },
        None => Ok(prefix),
    }
}
