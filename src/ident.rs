//! Utility functions for working with Go identifiers and literals.

use std::fmt::Write;
use std::path::Path;

use crate::descriptor::FileDescriptorProto;

const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Converts `s` into a valid Go identifier.
///
/// Characters other than letters and digits become `_`, and names which would
/// start with a non-letter or collide with a keyword are prefixed with `_`.
pub fn go_sanitized(s: &str) -> String {
    let ident: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    let starts_with_letter = ident.chars().next().map_or(false, char::is_alphabetic);
    if !starts_with_letter || GO_KEYWORDS.contains(&ident.as_str()) {
        format!("_{}", ident)
    } else {
        ident
    }
}

/// Splits a `go_package` option into its import path and explicit package name.
pub fn split_go_package(go_package: &str) -> (&str, Option<&str>) {
    match go_package.split_once(';') {
        Some((import_path, name)) => (import_path, Some(name)),
        None => (go_package, None),
    }
}

/// Returns the `go_package` option of `file`, if it is set and non-empty.
pub fn go_package_option(file: &FileDescriptorProto) -> Option<&str> {
    file.options
        .as_ref()
        .map(|options| options.go_package())
        .filter(|go_package| !go_package.is_empty())
}

/// Chooses the name of the Go package generated code for `file` belongs to.
pub fn go_package_name(file: &FileDescriptorProto) -> String {
    if let Some(go_package) = go_package_option(file) {
        let (import_path, name) = split_go_package(go_package);
        let name = name.unwrap_or_else(|| import_path.rsplit('/').next().unwrap_or(import_path));
        return go_sanitized(name);
    }

    if !file.package().is_empty() {
        return go_sanitized(&file.package().replace('.', "_"));
    }

    let stem = Path::new(file.name())
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    go_sanitized(stem)
}

/// Quotes `s` as a Go interpreted string literal.
pub fn go_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(quoted, "\\x{:02x}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::descriptor::FileOptions;

    fn file(name: &str, package: Option<&str>, go_package: Option<&str>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_owned()),
            package: package.map(ToOwned::to_owned),
            service: Vec::new(),
            options: go_package.map(|go_package| FileOptions {
                go_package: Some(go_package.to_owned()),
            }),
        }
    }

    #[test]
    fn test_go_sanitized() {
        assert_eq!("foo", go_sanitized("foo"));
        assert_eq!("foo_bar", go_sanitized("foo-bar"));
        assert_eq!("foo_v1", go_sanitized("foo.v1"));
        assert_eq!("_1foo", go_sanitized("1foo"));
        assert_eq!("__foo", go_sanitized("_foo"));
        assert_eq!("_type", go_sanitized("type"));
        assert_eq!("_", go_sanitized(""));
        assert_eq!("héllo", go_sanitized("héllo"));
    }

    #[test]
    fn test_split_go_package() {
        assert_eq!(
            ("example.com/api/v1", Some("apiv1")),
            split_go_package("example.com/api/v1;apiv1")
        );
        assert_eq!(("example.com/api/v1", None), split_go_package("example.com/api/v1"));
    }

    #[test]
    fn test_go_package_name() {
        let name = |f: FileDescriptorProto| go_package_name(&f);
        assert_eq!(
            "apiv1",
            name(file("a.proto", Some("acme.api.v1"), Some("example.com/api/v1;apiv1")))
        );
        assert_eq!(
            "v1",
            name(file("a.proto", Some("acme.api.v1"), Some("example.com/api/v1")))
        );
        assert_eq!(
            "grpc_health",
            name(file("a.proto", Some("acme"), Some("example.com/grpc-health")))
        );
        assert_eq!("acme_api_v1", name(file("a.proto", Some("acme.api.v1"), None)));
        assert_eq!("acme", name(file("a.proto", Some("acme"), Some(""))));
        assert_eq!("users", name(file("protos/users.proto", None, None)));
    }

    #[test]
    fn test_go_quote() {
        assert_eq!(r#""read""#, go_quote("read"));
        assert_eq!(r#""/pkg.Svc/Method""#, go_quote("/pkg.Svc/Method"));
        assert_eq!(r#""""#, go_quote(""));
        assert_eq!(r#"" a b ""#, go_quote(" a b "));
        assert_eq!(r#""say \"hi\"\\""#, go_quote(r#"say "hi"\"#));
        assert_eq!(r#""a\nb\tc\x00""#, go_quote("a\nb\tc\0"));
        assert_eq!(r#""lecture:écrire""#, go_quote("lecture:écrire"));
    }
}
